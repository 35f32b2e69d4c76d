//! Configuration loading and management.
//!
//! Layers, later wins: built-in defaults, `~/.config/mtg/config.toml`, the
//! `--config` file, environment (`GITHUB_TOKEN`, `GITHUB_REPOSITORY`,
//! `GITHUB_OUTPUT`, then GitHub Actions `INPUT_*` inputs), command-line flags.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::{CreateArgs, MeetingArgs, NextArgs};

const DEFAULT_MEETING_PATH: &str = ".github/meeting.ics";
const DEFAULT_AGENDA_LABEL: &str = "agenda";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token used for every GitHub API call.
    pub github_token: Option<String>,
    /// `owner/repo`, as set by GitHub Actions. Fills in `org` and `repo`.
    pub github_repository: Option<String>,
    pub org: Option<String>,
    pub repo: Option<String>,
    /// Path to the meeting `.ics` file.
    pub meeting_path: PathBuf,
    /// Custom issue body template.
    pub meeting_template: Option<PathBuf>,
    pub slack_channel: Option<String>,
    /// Timezones the meeting time is listed in.
    #[serde(deserialize_with = "timezone_list")]
    pub timezones: Vec<String>,
    /// Timezone whose daylight-saving status applies. Detected when unset.
    pub host_timezone: Option<String>,
    pub agenda_label: String,
    #[serde(deserialize_with = "flag")]
    pub dry_run: bool,
    #[serde(deserialize_with = "flag")]
    pub org_wide: bool,
    /// GitHub REST API root.
    pub api_url: String,
    /// File that step outputs are appended to.
    pub github_output: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("org", &self.org)
            .field("repo", &self.repo)
            .field("meeting_path", &self.meeting_path)
            .field("meeting_template", &self.meeting_template)
            .field("slack_channel", &self.slack_channel)
            .field("timezones", &self.timezones)
            .field("host_timezone", &self.host_timezone)
            .field("agenda_label", &self.agenda_label)
            .field("dry_run", &self.dry_run)
            .field("org_wide", &self.org_wide)
            .field("api_url", &self.api_url)
            .field("github_output", &self.github_output)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            github_repository: None,
            org: None,
            repo: None,
            meeting_path: PathBuf::from(DEFAULT_MEETING_PATH),
            meeting_template: None,
            slack_channel: None,
            timezones: vec![DEFAULT_TIMEZONE.to_string()],
            host_timezone: None,
            agenda_label: DEFAULT_AGENDA_LABEL.to_string(),
            dry_run: false,
            org_wide: false,
            api_url: mtg_github::GITHUB_API_URL.to_string(),
            github_output: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file, with `overrides`
    /// from the command line on top.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Variables GitHub Actions sets for every step, then the action inputs
        figment = figment
            .merge(Env::raw().only(&["github_token", "github_repository", "github_output"]))
            .merge(Env::prefixed("INPUT_"));

        Self::from_figment(figment.merge(Serialized::defaults(overrides)))
    }

    /// Extracts and normalizes configuration from an assembled figment.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract::<Self>().map(Self::normalized)
    }

    /// The `(owner, repo)` issues are filed in, when both are known.
    pub fn repository(&self) -> Option<(&str, &str)> {
        Some((self.org.as_deref()?, self.repo.as_deref()?))
    }

    /// Actions passes unset inputs as empty strings; those fall back to the
    /// defaults here.
    fn normalized(mut self) -> Self {
        self.github_token = non_empty(self.github_token);
        self.github_repository = non_empty(self.github_repository);
        self.org = non_empty(self.org);
        self.repo = non_empty(self.repo);
        self.slack_channel = non_empty(self.slack_channel);
        self.host_timezone = non_empty(self.host_timezone);
        self.meeting_template = self
            .meeting_template
            .filter(|path| !path.as_os_str().is_empty());
        self.github_output = self
            .github_output
            .filter(|path| !path.as_os_str().is_empty());

        if self.meeting_path.as_os_str().is_empty() {
            self.meeting_path = PathBuf::from(DEFAULT_MEETING_PATH);
        }
        if self.agenda_label.trim().is_empty() {
            self.agenda_label = DEFAULT_AGENDA_LABEL.to_string();
        }
        if self.api_url.trim().is_empty() {
            self.api_url = mtg_github::GITHUB_API_URL.to_string();
        }

        self.timezones = self
            .timezones
            .iter()
            .map(|zone| zone.trim())
            .filter(|zone| !zone.is_empty())
            .map(str::to_string)
            .collect();
        if self.timezones.is_empty() {
            self.timezones = vec![DEFAULT_TIMEZONE.to_string()];
        }

        if let Some((owner, name)) = self
            .github_repository
            .as_deref()
            .and_then(|full| full.split_once('/'))
        {
            self.org.get_or_insert_with(|| owner.to_string());
            self.repo.get_or_insert_with(|| name.to_string());
        }

        self
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_wide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_template: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl From<&MeetingArgs> for ConfigOverrides {
    fn from(args: &MeetingArgs) -> Self {
        Self {
            meeting_path: args.meeting_path.clone(),
            timezones: args.timezones.clone(),
            host_timezone: args.host_timezone.clone(),
            ..Self::default()
        }
    }
}

impl From<&NextArgs> for ConfigOverrides {
    fn from(args: &NextArgs) -> Self {
        Self::from(&args.meeting)
    }
}

impl From<&CreateArgs> for ConfigOverrides {
    /// `--repo` takes `owner/repo`; a bare name keeps the configured owner.
    fn from(args: &CreateArgs) -> Self {
        let (org, repo) = match args.repo.as_deref().map(|full| full.split_once('/')) {
            Some(Some((owner, name))) => (Some(owner.to_string()), Some(name.to_string())),
            Some(None) => (None, args.repo.clone()),
            None => (None, None),
        };

        Self {
            dry_run: args.dry_run.then_some(true),
            org_wide: args.org_wide.then_some(true),
            agenda_label: args.label.clone(),
            meeting_template: args.template.clone(),
            slack_channel: args.slack_channel.clone(),
            org,
            repo,
            ..Self::from(&args.meeting)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

/// Accepts a list or a comma-separated string.
fn timezone_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(zones) => zones,
        OneOrMany::One(text) => text.split(',').map(str::to_string).collect(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// Accepts a boolean, or a string that is on only when it reads `true`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
    })
}

/// Returns the platform-specific config directory for mtg.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mtg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(toml: &str, overrides: &ConfigOverrides) -> Config {
        Config::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::string(toml))
                .merge(Serialized::defaults(overrides)),
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = load("", &ConfigOverrides::default());
        assert_eq!(config.meeting_path, PathBuf::from(".github/meeting.ics"));
        assert_eq!(config.agenda_label, "agenda");
        assert_eq!(config.timezones, vec!["UTC"]);
        assert_eq!(config.api_url, "https://api.github.com");
        assert!(!config.dry_run);
        assert!(!config.org_wide);
        assert_eq!(config.repository(), None);
    }

    #[test]
    fn timezones_accept_comma_separated_string() {
        let config = load(
            r#"timezones = "UTC, America/New_York,,Europe/London ""#,
            &ConfigOverrides::default(),
        );
        assert_eq!(
            config.timezones,
            vec!["UTC", "America/New_York", "Europe/London"]
        );
    }

    #[test]
    fn timezones_accept_list() {
        let config = load(
            r#"timezones = ["Asia/Tokyo", "Australia/Sydney"]"#,
            &ConfigOverrides::default(),
        );
        assert_eq!(config.timezones, vec!["Asia/Tokyo", "Australia/Sydney"]);
    }

    #[test]
    fn flags_are_true_only_for_true() {
        let config = load(
            "dry_run = \"true\"\norg_wide = \"yes\"",
            &ConfigOverrides::default(),
        );
        assert!(config.dry_run);
        assert!(!config.org_wide);

        let config = load("dry_run = false\norg_wide = true", &ConfigOverrides::default());
        assert!(!config.dry_run);
        assert!(config.org_wide);
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let config = load(
            r#"
            github_token = ""
            slack_channel = " "
            agenda_label = ""
            meeting_path = ""
            meeting_template = ""
            timezones = ""
            "#,
            &ConfigOverrides::default(),
        );
        assert_eq!(config.github_token, None);
        assert_eq!(config.slack_channel, None);
        assert_eq!(config.agenda_label, "agenda");
        assert_eq!(config.meeting_path, PathBuf::from(".github/meeting.ics"));
        assert_eq!(config.meeting_template, None);
        assert_eq!(config.timezones, vec!["UTC"]);
    }

    #[test]
    fn repository_derives_from_github_repository() {
        let config = load(
            r#"github_repository = "octo/widgets""#,
            &ConfigOverrides::default(),
        );
        assert_eq!(config.repository(), Some(("octo", "widgets")));
    }

    #[test]
    fn explicit_org_wins_over_github_repository() {
        let config = load(
            "github_repository = \"octo/widgets\"\norg = \"acme\"",
            &ConfigOverrides::default(),
        );
        assert_eq!(config.repository(), Some(("acme", "widgets")));
    }

    #[test]
    fn overrides_win_over_file() {
        let args = CreateArgs {
            meeting: MeetingArgs {
                meeting_path: Some(PathBuf::from("team.ics")),
                timezones: Some(vec!["Europe/Berlin".to_string()]),
                host_timezone: None,
            },
            dry_run: true,
            label: Some("sync".to_string()),
            repo: Some("acme/gadgets".to_string()),
            ..CreateArgs::default()
        };
        let config = load(
            r#"
            meeting_path = "meeting.ics"
            agenda_label = "agenda"
            org_wide = true
            github_repository = "octo/widgets"
            "#,
            &ConfigOverrides::from(&args),
        );
        assert_eq!(config.meeting_path, PathBuf::from("team.ics"));
        assert_eq!(config.timezones, vec!["Europe/Berlin"]);
        assert_eq!(config.agenda_label, "sync");
        assert!(config.dry_run);
        // unset flag leaves the file value alone
        assert!(config.org_wide);
        assert_eq!(config.repository(), Some(("acme", "gadgets")));
    }

    #[test]
    fn bare_repo_flag_keeps_owner() {
        let args = CreateArgs {
            repo: Some("gadgets".to_string()),
            ..CreateArgs::default()
        };
        let config = load(
            r#"github_repository = "octo/widgets""#,
            &ConfigOverrides::from(&args),
        );
        assert_eq!(config.repository(), Some(("octo", "gadgets")));
    }

    #[test]
    fn load_from_reads_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mtg.toml");
        std::fs::write(&path, "meeting_path = \"calendars/weekly.ics\"\n").unwrap();

        let config = Config::load_from(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.meeting_path, PathBuf::from("calendars/weekly.ics"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = load(r#"github_token = "ghp_secret""#, &ConfigOverrides::default());
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_dirs_config_path_ends_with_mtg() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "mtg");
        }
    }
}
