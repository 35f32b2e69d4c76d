//! Recurrence rules compiled from calendar entities.

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use crate::error::ParseFailure;

/// Occurrences fetched per lookup; the first one at or after the reference wins.
const LOOKUP_LIMIT: u16 = 2;

/// A recurrence series anchored at its `DTSTART`.
///
/// Obtained from a [`CalendarDocument`](crate::CalendarDocument); evaluation is
/// delegated to the `rrule` crate.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    rule: String,
    set: RRuleSet,
}

impl RecurrenceRule {
    /// Compiles an `RRULE` value against its series start.
    pub(crate) fn compile(rule: &str, dt_start: DateTime<Tz>) -> Result<Self, ParseFailure> {
        let to_failure = |source: rrule::RRuleError| ParseFailure::Rule {
            rule: rule.to_string(),
            source,
        };
        let set = rule
            .parse::<RRule<Unvalidated>>()
            .map_err(to_failure)?
            .build(dt_start)
            .map_err(to_failure)?;
        Ok(Self {
            rule: rule.to_string(),
            set,
        })
    }

    /// The `RRULE` value this series was compiled from.
    pub fn as_str(&self) -> &str {
        &self.rule
    }

    /// Next occurrence at or after `reference`, inclusive.
    ///
    /// Returns `None` once a bounded (`COUNT`/`UNTIL`) series is exhausted.
    pub(crate) fn next_at_or_after(&self, reference: DateTime<Utc>) -> Option<RawOccurrence> {
        let reference = reference.with_timezone(&Tz::UTC);
        self.set
            .clone()
            .after(reference - TimeDelta::seconds(1))
            .all(LOOKUP_LIMIT)
            .dates
            .into_iter()
            .find(|occurrence| *occurrence >= reference)
            .map(RawOccurrence::from_zoned)
    }
}

/// An occurrence as produced by rule evaluation.
///
/// `wall_clock` carries the local clock reading in a UTC-typed value; it is
/// only a correct instant once [`crate::correct`] has removed `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawOccurrence {
    pub(crate) wall_clock: DateTime<Utc>,
    pub(crate) offset: FixedOffset,
}

impl RawOccurrence {
    fn from_zoned(occurrence: DateTime<Tz>) -> Self {
        Self {
            wall_clock: occurrence.naive_local().and_utc(),
            offset: occurrence.offset().fix(),
        }
    }
}
