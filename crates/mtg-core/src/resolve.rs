//! Next-meeting resolution from raw calendar text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::correct::correct;
use crate::document::CalendarDocument;
use crate::dst::DstSource;
use crate::error::ResolveError;
use crate::extract::{find_location, find_rule};

/// The next meeting: where, and when in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMeeting {
    /// First location found in the calendar, verbatim; empty when absent.
    pub location: String,
    /// Corrected start of the next occurrence.
    pub next_meeting_utc: DateTime<Utc>,
}

/// Resolves the next meeting relative to `now`.
///
/// `now` is both the inclusive lower bound for the occurrence and the instant
/// whose daylight-saving status is checked.
pub fn resolve(
    text: &str,
    now: DateTime<Utc>,
    dst: &impl DstSource,
) -> Result<ResolvedMeeting, ResolveError> {
    if text.trim().is_empty() {
        return Err(ResolveError::MissingRecurrenceRule);
    }

    let document = CalendarDocument::parse(text)?;
    let rule = find_rule(&document).ok_or(ResolveError::MissingRecurrenceRule)?;
    let location = find_location(&document);

    let raw = rule
        .next_at_or_after(now)
        .ok_or(ResolveError::NoNextOccurrence)?;
    let dst_active = dst.is_dst(now);
    let next_meeting_utc = correct(&raw, dst_active);
    tracing::debug!(
        rule = rule.as_str(),
        raw = %raw.wall_clock,
        offset = %raw.offset,
        dst_active,
        corrected = %next_meeting_utc,
        "resolved next meeting"
    );

    Ok(ResolvedMeeting {
        location,
        next_meeting_utc,
    })
}

/// Resolves the next meeting relative to the system clock.
pub fn resolve_now(text: &str, dst: &impl DstSource) -> Result<ResolvedMeeting, ResolveError> {
    resolve(text, Utc::now(), dst)
}
