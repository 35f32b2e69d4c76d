//! Filing the agenda issue and recording GitHub Actions step outputs.

use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use mtg_core::meeting_date;
use mtg_github::CreatedIssue;

use crate::error::MeetingError;
use crate::service::{MeetingService, PreparedIssue};

/// Step outputs of a created agenda issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutputs {
    pub issue_url: String,
    pub next_meeting_date: String,
    /// Skipped when empty.
    pub location: String,
}

impl StepOutputs {
    /// `KEY=value` lines in the order they are written.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("ISSUE_URL={}", self.issue_url),
            format!("NEXT_MEETING_DATE={}", self.next_meeting_date),
        ];
        if !self.location.is_empty() {
            lines.push(format!("LOCATION={}", self.location));
        }
        lines
    }

    /// Appends the outputs to a `$GITHUB_OUTPUT` file.
    pub async fn append_to(&self, path: &Path) -> Result<(), MeetingError> {
        let to_error = |source: std::io::Error| MeetingError::Output {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(to_error)?;
        let mut contents = self.lines().join("\n");
        contents.push('\n');
        file.write_all(contents.as_bytes()).await.map_err(to_error)?;
        file.flush().await.map_err(to_error)
    }
}

/// Creates the issue and appends the step outputs when `$GITHUB_OUTPUT` is set.
pub async fn file_issue(
    service: &MeetingService,
    issue: &PreparedIssue,
) -> Result<CreatedIssue, MeetingError> {
    let created = service
        .client()
        .create_issue(service.owner(), service.repo(), &issue.title, &issue.body)
        .await
        .map_err(MeetingError::IssueCreation)?;

    let outputs = StepOutputs {
        issue_url: created.html_url.clone(),
        next_meeting_date: meeting_date(issue.meeting.next_meeting_utc),
        location: issue.meeting.location.clone(),
    };
    tracing::info!(date = %outputs.next_meeting_date, "next meeting");
    tracing::info!(url = %created.html_url, number = created.number, "created issue");

    match &service.config().github_output {
        Some(path) => outputs.append_to(path).await?,
        None => tracing::debug!("GITHUB_OUTPUT not set, skipping step outputs"),
    }

    Ok(created)
}
