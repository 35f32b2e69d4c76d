//! Meeting time rendered in each configured timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%-I:%M %p";

/// The meeting start as seen from one timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingTime {
    /// Label shown next to the time.
    pub timezone: String,
    pub date: DateTime<Tz>,
}

impl MeetingTime {
    /// Wall-clock time, e.g. `2:30 PM`.
    pub fn clock(&self) -> String {
        self.date.format(TIME_FORMAT).to_string()
    }
}

/// Converts `date` into each timezone.
///
/// Names missing from the tz database keep the UTC time and are labeled
/// `<name> (invalid)` so the rendered body stays intact.
pub fn meeting_times(timezones: &[String], date: DateTime<Utc>) -> Vec<MeetingTime> {
    timezones
        .iter()
        .map(|name| match name.parse::<Tz>() {
            Ok(zone) => MeetingTime {
                timezone: name.clone(),
                date: date.with_timezone(&zone),
            },
            Err(err) => {
                tracing::warn!(timezone = %name, error = %err, "failed to convert time to timezone");
                MeetingTime {
                    timezone: format!("{name} (invalid)"),
                    date: date.with_timezone(&chrono_tz::UTC),
                }
            }
        })
        .collect()
}

/// Renders one `- <h:mm AM/PM> <timezone>` line per timezone.
pub fn render_meeting_times(timezones: &[String], date: DateTime<Utc>) -> String {
    meeting_times(timezones, date)
        .iter()
        .map(|time| format!("- {} {}\n", time.clock(), time.timezone))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meeting() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 18, 14, 30, 0).unwrap()
    }

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn renders_each_timezone() {
        let rendered = render_meeting_times(
            &zones(&["UTC", "America/New_York", "Asia/Kolkata"]),
            meeting(),
        );
        assert_eq!(
            rendered,
            "- 2:30 PM UTC\n- 9:30 AM America/New_York\n- 8:00 PM Asia/Kolkata\n"
        );
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        let times = meeting_times(&zones(&["Nowhere/Special"]), meeting());
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].timezone, "Nowhere/Special (invalid)");
        assert_eq!(times[0].date.with_timezone(&Utc), meeting());
        assert_eq!(
            render_meeting_times(&zones(&["Nowhere/Special"]), meeting()),
            "- 2:30 PM Nowhere/Special (invalid)\n"
        );
    }

    #[test]
    fn no_timezones_renders_nothing() {
        assert_eq!(render_meeting_times(&[], meeting()), "");
    }
}
