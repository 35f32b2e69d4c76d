//! Create command: file the agenda issue for the next meeting.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::Config;
use crate::output::file_issue;
use crate::service::{MeetingService, validate_configuration};

/// Runs the whole workflow relative to `now`.
///
/// A dry run writes the issue body to `writer` and files nothing.
/// Returns the created issue's URL.
pub async fn run<W: Write>(
    writer: &mut W,
    config: Config,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    validate_configuration(&config, true).await?;

    let service = MeetingService::new(config)?;
    let issue = service.prepare_issue(now).await?;

    let issue_url = if service.config().dry_run {
        tracing::info!("Dry run, only outputting issue body");
        writeln!(writer, "{}", issue.body)?;
        None
    } else {
        Some(file_issue(&service, &issue).await?.html_url)
    };

    tracing::info!("Meeting creation completed successfully");
    if let Some(url) = &issue_url {
        tracing::info!(%url, "issue URL");
    }
    Ok(issue_url)
}
