//! Validate command: check configuration without contacting GitHub.

use std::io::Write;

use anyhow::Result;

use crate::Config;
use crate::service::validate_configuration;

pub async fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    validate_configuration(config, false).await?;

    writeln!(writer, "Configuration OK")?;
    writeln!(writer, "Meeting file: {}", config.meeting_path.display())?;
    if let Some(template) = &config.meeting_template {
        writeln!(writer, "Template: {}", template.display())?;
    }
    match config.repository() {
        Some((owner, repo)) => writeln!(writer, "Repository: {owner}/{repo}")?,
        None => writeln!(writer, "Repository: not set")?,
    }
    writeln!(writer, "Agenda label: {}", config.agenda_label)?;
    writeln!(writer, "Timezones: {}", config.timezones.join(", "))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::MeetingError;

    #[tokio::test]
    async fn reports_checked_configuration() {
        let temp = tempfile::tempdir().unwrap();
        let meeting_path = temp.path().join("meeting.ics");
        std::fs::write(&meeting_path, "BEGIN:VCALENDAR\nEND:VCALENDAR\n").unwrap();
        let config = Config {
            meeting_path: meeting_path.clone(),
            org: Some("octo".to_string()),
            repo: Some("widgets".to_string()),
            timezones: vec!["UTC".to_string(), "Europe/Paris".to_string()],
            ..Config::default()
        };

        let mut output = Vec::new();
        run(&mut output, &config).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&meeting_path.display().to_string(), "[TEMP]/meeting.ics");
        assert_eq!(
            output,
            "Configuration OK\n\
             Meeting file: [TEMP]/meeting.ics\n\
             Repository: octo/widgets\n\
             Agenda label: agenda\n\
             Timezones: UTC, Europe/Paris\n"
        );
    }

    #[tokio::test]
    async fn missing_meeting_file_fails() {
        let config = Config {
            meeting_path: "/nonexistent/meeting.ics".into(),
            ..Config::default()
        };
        let err = run(&mut Vec::new(), &config).await.unwrap_err();
        let err = err.downcast_ref::<MeetingError>().unwrap();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }
}
