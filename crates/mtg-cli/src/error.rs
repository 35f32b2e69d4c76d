//! Failures of the agenda workflow.

use std::io;
use std::path::PathBuf;

use mtg_core::ResolveError;
use mtg_github::GithubError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("failed to read file: {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Every problem found, joined.
    #[error("configuration validation failed: {}", problems.join(", "))]
    Configuration { problems: Vec<String> },
    #[error("failed to fetch agenda items")]
    AgendaFetch(#[source] GithubError),
    #[error("failed to create issue")]
    IssueCreation(#[source] GithubError),
    #[error("failed to write step outputs to {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl MeetingError {
    pub fn configuration(problem: impl Into<String>) -> Self {
        Self::Configuration {
            problems: vec![problem.into()],
        }
    }

    /// Stable code reported alongside the message.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::AgendaFetch(_) => "AGENDA_FETCH_ERROR",
            Self::IssueCreation(_) => "ISSUE_CREATION_ERROR",
            Self::Output { .. } => "OUTPUT_ERROR",
            Self::Resolve(err) => err.code(),
        }
    }
}
