//! Core domain logic for recurring meeting agendas.
//!
//! This crate contains the fundamental types and logic for:
//! - Resolution: finding the next meeting in `.ics` text, corrected to UTC
//! - Document: the generic property tree a calendar is parsed into
//! - Rendering: meeting times per timezone, agenda items and the issue body

pub mod agenda;
pub mod body;
mod correct;
pub mod document;
pub mod dst;
mod error;
pub mod extract;
mod resolve;
mod rule;
pub mod times;

pub use agenda::{AgendaItem, render_agenda};
pub use body::{BodyContext, issue_title, meeting_date, render_body};
pub use document::{CalendarDocument, Entity, Node};
pub use dst::{DstSource, HostTimezone, UnknownTimezone};
pub use error::{ParseFailure, ResolveError};
pub use resolve::{ResolvedMeeting, resolve, resolve_now};
pub use rule::RecurrenceRule;
pub use times::{MeetingTime, meeting_times, render_meeting_times};
