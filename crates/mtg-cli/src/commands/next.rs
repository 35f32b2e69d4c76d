//! Next command: show when and where the next meeting is.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use mtg_core::{ResolvedMeeting, meeting_date, meeting_times};

use crate::Config;
use crate::service::next_meeting;

#[derive(Debug, Serialize)]
struct NextMeeting<'a> {
    #[serde(flatten)]
    meeting: &'a ResolvedMeeting,
    date: String,
    times: Vec<ZonedTime>,
}

#[derive(Debug, Serialize)]
struct ZonedTime {
    timezone: String,
    time: String,
}

pub async fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let meeting = next_meeting(config, now).await?;
    let times = meeting_times(&config.timezones, meeting.next_meeting_utc);

    if json {
        let output = NextMeeting {
            meeting: &meeting,
            date: meeting_date(meeting.next_meeting_utc),
            times: times
                .iter()
                .map(|time| ZonedTime {
                    timezone: time.timezone.clone(),
                    time: time.clock(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Next meeting: {} ({})",
        meeting_date(meeting.next_meeting_utc),
        meeting.next_meeting_utc.format("%Y-%m-%d %H:%M UTC")
    )?;
    if !meeting.location.is_empty() {
        writeln!(writer, "Location: {}", meeting.location)?;
    }
    for time in &times {
        writeln!(writer, "- {} {}", time.clock(), time.timezone)?;
    }

    Ok(())
}
