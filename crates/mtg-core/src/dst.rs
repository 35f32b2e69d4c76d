//! Daylight-saving status of the host timezone.

use chrono::{DateTime, Datelike, Local, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::OffsetComponents;
use thiserror::Error;

/// Answers whether daylight saving is in effect at an instant.
pub trait DstSource {
    fn is_dst(&self, at: DateTime<Utc>) -> bool;
}

/// The timezone whose daylight-saving status drives the correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostTimezone {
    /// An IANA zone, either detected or configured.
    Named(chrono_tz::Tz),
    /// The process-local zone, when no IANA name is available.
    Local,
}

/// Error returned for timezone names missing from the tz database.
#[derive(Debug, Clone, Error)]
#[error("unknown timezone: {0}")]
pub struct UnknownTimezone(String);

impl HostTimezone {
    /// Detects the host zone, falling back to the process-local offset rules.
    pub fn detect() -> Self {
        match iana_time_zone::get_timezone() {
            Ok(name) => name.parse().map_or_else(
                |_| {
                    tracing::debug!(%name, "host timezone not in tz database, using local offsets");
                    Self::Local
                },
                Self::Named,
            ),
            Err(err) => {
                tracing::debug!(error = %err, "could not detect host timezone");
                Self::Local
            }
        }
    }

    /// Uses an explicitly configured IANA zone.
    pub fn from_name(name: &str) -> Result<Self, UnknownTimezone> {
        name.trim()
            .parse()
            .map(Self::Named)
            .map_err(|_| UnknownTimezone(name.to_string()))
    }
}

impl DstSource for HostTimezone {
    fn is_dst(&self, at: DateTime<Utc>) -> bool {
        match self {
            Self::Named(zone) => {
                zone.offset_from_utc_datetime(&at.naive_utc()).dst_offset() != TimeDelta::zero()
            }
            Self::Local => local_is_dst(at),
        }
    }
}

/// Local zone is in daylight saving when its offset exceeds the smaller of its
/// January and July offsets.
fn local_is_dst(at: DateTime<Utc>) -> bool {
    let offset_at = |instant: DateTime<Utc>| {
        Local
            .offset_from_utc_datetime(&instant.naive_utc())
            .fix()
            .local_minus_utc()
    };
    let year = at.year();
    let standard = [1, 7]
        .into_iter()
        .filter_map(|month| Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single())
        .map(offset_at)
        .min();
    standard.is_some_and(|standard| offset_at(at) > standard)
}
