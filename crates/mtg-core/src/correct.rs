//! Offset and daylight-saving correction of resolved occurrences.
//!
//! Recurrence expansion reports occurrences as local wall-clock readings and
//! does not track daylight-saving drift across the series. Two fixed steps
//! turn such a reading into the instant reported for the meeting:
//!
//! 1. [`normalize_offset`] removes the zone offset: behind UTC adds the offset
//!    magnitude, ahead of (or at) UTC subtracts it.
//! 2. [`compensate_dst`] adds one hour unless daylight saving is active *now*
//!    for the host. The check uses the evaluation time, not the occurrence date.

use chrono::{DateTime, TimeDelta, Utc};

use crate::rule::RawOccurrence;

/// Removes the zone offset from a raw occurrence.
pub(crate) fn normalize_offset(raw: &RawOccurrence) -> DateTime<Utc> {
    let offset_seconds = raw.offset.local_minus_utc();
    let magnitude = TimeDelta::seconds(i64::from(offset_seconds.unsigned_abs()));
    if offset_seconds < 0 {
        raw.wall_clock + magnitude
    } else {
        raw.wall_clock - magnitude
    }
}

/// Adds one hour when daylight saving is not active at evaluation time.
pub(crate) fn compensate_dst(normalized: DateTime<Utc>, dst_active_now: bool) -> DateTime<Utc> {
    if dst_active_now {
        normalized
    } else {
        normalized + TimeDelta::hours(1)
    }
}

/// Applies both steps, in order, to any occurrence of a series.
pub(crate) fn correct(raw: &RawOccurrence, dst_active_now: bool) -> DateTime<Utc> {
    compensate_dst(normalize_offset(raw), dst_active_now)
}
