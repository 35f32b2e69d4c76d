//! Errors raised while resolving the next meeting from calendar text.

use thiserror::Error;

/// Meeting resolution errors.
///
/// Every variant maps to a stable machine-readable code via [`ResolveError::code`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The meeting file had no content at all.
    #[error("meeting .ics content is empty")]
    EmptyContent,
    /// The calendar text could not be parsed.
    #[error("error parsing .ics file: {0}")]
    CalendarParse(#[source] ParseFailure),
    /// The parser produced no calendar.
    #[error("no calendar data found in .ics content")]
    InvalidCalendarData,
    /// No entity in the document carries a recurrence rule.
    #[error("could not find rrule within .ics file")]
    MissingRecurrenceRule,
    /// The recurrence series has no occurrence at or after now.
    #[error("could not find next meeting date in .ics file")]
    NoNextOccurrence,
}

impl ResolveError {
    /// Machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyContent => "EMPTY_ICS_CONTENT",
            Self::CalendarParse(_) => "ICS_PARSE_ERROR",
            Self::InvalidCalendarData => "INVALID_ICS_DATA",
            Self::MissingRecurrenceRule => "MISSING_RRULE",
            Self::NoNextOccurrence => "NO_NEXT_MEETING",
        }
    }
}

/// Underlying cause of a [`ResolveError::CalendarParse`].
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The content line parser rejected the input.
    #[error("{0}")]
    Syntax(String),
    /// `BEGIN`/`END` markers do not nest.
    #[error("unbalanced component: {0}")]
    Structure(String),
    /// An `RRULE` value could not be compiled.
    #[error("invalid recurrence rule `{rule}`: {source}")]
    Rule {
        rule: String,
        #[source]
        source: rrule::RRuleError,
    },
    /// An entity carries an `RRULE` but no `DTSTART`.
    #[error("recurrence rule `{0}` has no DTSTART")]
    MissingStart(String),
    /// A `DTSTART` value is not a valid date or date-time.
    #[error("invalid DTSTART `{0}`")]
    InvalidStart(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ResolveError::EmptyContent.code(), "EMPTY_ICS_CONTENT");
        assert_eq!(
            ResolveError::CalendarParse(ParseFailure::Syntax("bad".to_string())).code(),
            "ICS_PARSE_ERROR"
        );
        assert_eq!(ResolveError::InvalidCalendarData.code(), "INVALID_ICS_DATA");
        assert_eq!(ResolveError::MissingRecurrenceRule.code(), "MISSING_RRULE");
        assert_eq!(ResolveError::NoNextOccurrence.code(), "NO_NEXT_MEETING");
    }

    #[test]
    fn parse_error_message_includes_cause() {
        let err = ResolveError::CalendarParse(ParseFailure::Structure("VEVENT".to_string()));
        assert_eq!(
            err.to_string(),
            "error parsing .ics file: unbalanced component: VEVENT"
        );
    }
}
