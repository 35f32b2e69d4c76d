//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

/// Recurring meeting agendas.
///
/// Reads a recurring meeting from an `.ics` file, works out when it next
/// happens, and files a GitHub issue listing every open item carrying the
/// agenda label.
#[derive(Debug, Parser)]
#[command(name = "mtg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the agenda issue for the next meeting.
    Create(CreateArgs),

    /// Show when and where the next meeting is.
    Next(NextArgs),

    /// Check the configuration without contacting GitHub.
    Validate(MeetingArgs),
}

/// Options shared by every command that reads the meeting file.
#[derive(Debug, Default, Clone, Args)]
pub struct MeetingArgs {
    /// Path to the meeting `.ics` file.
    #[arg(long)]
    pub meeting_path: Option<PathBuf>,

    /// Timezones to list meeting times in (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub timezones: Option<Vec<String>>,

    /// IANA name of the timezone whose daylight-saving status applies.
    #[arg(long)]
    pub host_timezone: Option<String>,
}

#[derive(Debug, Default, Clone, Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub meeting: MeetingArgs,

    /// Print the issue body instead of creating the issue.
    #[arg(long)]
    pub dry_run: bool,

    /// Collect agenda items from every repository of the owner.
    #[arg(long)]
    pub org_wide: bool,

    /// Label marking agenda items.
    #[arg(long)]
    pub label: Option<String>,

    /// Custom issue body template.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Slack channel link shown next to the location.
    #[arg(long)]
    pub slack_channel: Option<String>,

    /// Repository to file the issue in, as `owner/repo`.
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Debug, Default, Clone, Args)]
pub struct NextArgs {
    #[command(flatten)]
    pub meeting: MeetingArgs,

    /// Find the first meeting at or after this instant (RFC 3339) instead of now.
    #[arg(long)]
    pub after: Option<DateTime<Utc>>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
