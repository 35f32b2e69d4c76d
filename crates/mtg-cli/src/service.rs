//! The agenda workflow: validate, resolve, gather, render.

use std::path::Path;

use chrono::{DateTime, Utc};
use mtg_core::{
    BodyContext, HostTimezone, ResolveError, ResolvedMeeting, issue_title, render_agenda,
    render_body, render_meeting_times, resolve,
};
use mtg_github::Client;

use crate::Config;
use crate::error::MeetingError;

/// Reads a UTF-8 file.
pub async fn read_file(path: &Path) -> Result<String, MeetingError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MeetingError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the meeting file, rejecting blank content.
pub async fn read_meeting(path: &Path) -> Result<String, MeetingError> {
    let text = read_file(path).await?;
    if text.trim().is_empty() {
        return Err(ResolveError::EmptyContent.into());
    }
    Ok(text)
}

/// The configured host timezone, or the detected one.
pub fn host_timezone(config: &Config) -> Result<HostTimezone, MeetingError> {
    match config.host_timezone.as_deref() {
        Some(name) => {
            HostTimezone::from_name(name).map_err(|err| MeetingError::configuration(err.to_string()))
        }
        None => Ok(HostTimezone::detect()),
    }
}

/// Checks everything a run needs before doing any work.
///
/// With `require_github`, the token and target repository must be known too.
/// All problems are reported together.
pub async fn validate_configuration(
    config: &Config,
    require_github: bool,
) -> Result<(), MeetingError> {
    let mut problems = Vec::new();

    if read_file(&config.meeting_path).await.is_err() {
        problems.push(format!(
            "Meeting ICS file not found: {}",
            config.meeting_path.display()
        ));
    }

    if let Some(template) = &config.meeting_template {
        if read_file(template).await.is_err() {
            problems.push(format!(
                "Custom template file not found: {}",
                template.display()
            ));
        }
    }

    if let Some(Err(err)) = config.host_timezone.as_deref().map(HostTimezone::from_name) {
        problems.push(err.to_string());
    }

    if require_github {
        if config.github_token.is_none() {
            problems.push("GitHub token is not set".to_string());
        }
        if config.repository().is_none() {
            problems.push("repository is not set (expected owner/repo)".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(MeetingError::Configuration { problems })
    }
}

/// Resolves the next meeting at or after `now`.
pub async fn next_meeting(
    config: &Config,
    now: DateTime<Utc>,
) -> Result<ResolvedMeeting, MeetingError> {
    let text = read_meeting(&config.meeting_path).await?;
    let host = host_timezone(config)?;
    tracing::debug!(?host, path = %config.meeting_path.display(), "resolving next meeting");
    Ok(resolve(&text, now, &host)?)
}

/// A rendered agenda issue, ready to file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedIssue {
    pub meeting: ResolvedMeeting,
    pub title: String,
    pub body: String,
}

/// Creates agenda issues for one repository.
#[derive(Debug)]
pub struct MeetingService {
    config: Config,
    client: Client,
    owner: String,
    repo: String,
}

impl MeetingService {
    pub fn new(config: Config) -> Result<Self, MeetingError> {
        let token = config
            .github_token
            .clone()
            .ok_or_else(|| MeetingError::configuration("GitHub token is not set"))?;
        let (owner, repo) = config
            .repository()
            .map(|(owner, repo)| (owner.to_string(), repo.to_string()))
            .ok_or_else(|| {
                MeetingError::configuration("repository is not set (expected owner/repo)")
            })?;
        let client = Client::new(token, &config.api_url)
            .map_err(|err| MeetingError::configuration(err.to_string()))?;

        Ok(Self {
            config,
            client,
            owner,
            repo,
        })
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Resolves the next meeting, gathers the agenda and renders the issue.
    pub async fn prepare_issue(&self, now: DateTime<Utc>) -> Result<PreparedIssue, MeetingError> {
        let config = &self.config;
        let meeting = next_meeting(config, now).await?;

        let items = self
            .client
            .fetch_agenda_items(&self.owner, &self.repo, &config.agenda_label, config.org_wide)
            .await
            .map_err(MeetingError::AgendaFetch)?;
        tracing::info!(count = items.len(), label = %config.agenda_label, "collected agenda items");

        let template = match &config.meeting_template {
            Some(path) => Some(read_file(path).await?),
            None => None,
        };

        let times = render_meeting_times(&config.timezones, meeting.next_meeting_utc);
        let issues = render_agenda(&items, config.org_wide);
        let body = render_body(
            template.as_deref(),
            &BodyContext {
                owner: &self.owner,
                repo: &self.repo,
                location: &meeting.location,
                slack_channel: config.slack_channel.as_deref(),
                times: &times,
                issues: &issues,
                label: &config.agenda_label,
                date: meeting.next_meeting_utc,
            },
        );

        Ok(PreparedIssue {
            title: issue_title(meeting.next_meeting_utc),
            body,
            meeting,
        })
    }
}
