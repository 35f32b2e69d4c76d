//! Property lookup across every entity of a calendar document.
//!
//! The search is depth-first in document order and the first present value
//! wins. Entity kinds are not ranked, so a recurrence exception visited before
//! its master can supply the value.

use crate::document::{CalendarDocument, Entity, Node};
use crate::rule::RecurrenceRule;

/// First present value for `name` anywhere in the document.
pub fn find_property<'a>(document: &'a CalendarDocument, name: &str) -> Option<&'a Node> {
    let name = name.to_ascii_lowercase();
    document
        .entities()
        .find_map(|(_, entity)| find_in_entity(entity, &name))
}

fn find_in_entity<'a>(entity: &'a Entity, name: &str) -> Option<&'a Node> {
    if let Some(node) = entity.get_all(name).find(|node| node.is_present()) {
        return Some(node);
    }
    entity
        .fields()
        .find_map(|(_, node)| node.as_map().and_then(|child| find_in_entity(child, name)))
}

/// First recurrence rule in the document.
pub fn find_rule(document: &CalendarDocument) -> Option<&RecurrenceRule> {
    find_property(document, "rrule").and_then(Node::as_rule)
}

/// First location in the document, or an empty string.
pub fn find_location(document: &CalendarDocument) -> String {
    find_property(document, "location")
        .and_then(Node::as_text)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CalendarDocument {
        CalendarDocument::parse(text).unwrap()
    }

    #[test]
    fn finds_property_nested_in_child_component() {
        let document = parse(
            "\
BEGIN:VCALENDAR
BEGIN:VEVENT
UID:a
SUMMARY:top
BEGIN:VALARM
ACTION:DISPLAY
DESCRIPTION:Reminder text
END:VALARM
END:VEVENT
END:VCALENDAR
",
        );
        let found = find_property(&document, "description").and_then(Node::as_text);
        assert_eq!(found, Some("Reminder text"));
    }

    #[test]
    fn first_entity_in_document_order_wins() {
        let document = parse(
            "\
BEGIN:VCALENDAR
BEGIN:VEVENT
UID:first
LOCATION:Room A
END:VEVENT
BEGIN:VEVENT
UID:second
LOCATION:Room B
END:VEVENT
END:VCALENDAR
",
        );
        assert_eq!(find_location(&document), "Room A");
    }

    #[test]
    fn empty_values_are_skipped() {
        let document = parse(
            "\
BEGIN:VCALENDAR
BEGIN:VEVENT
UID:first
LOCATION:
END:VEVENT
BEGIN:VEVENT
UID:second
LOCATION:https://example.com/call
END:VEVENT
END:VCALENDAR
",
        );
        assert_eq!(find_location(&document), "https://example.com/call");
    }

    #[test]
    fn own_field_is_preferred_over_nested_one() {
        let document = parse(
            "\
BEGIN:VCALENDAR
BEGIN:VEVENT
UID:a
BEGIN:VALARM
ACTION:DISPLAY
LOCATION:nested
END:VALARM
LOCATION:own
END:VEVENT
END:VCALENDAR
",
        );
        assert_eq!(find_location(&document), "own");
    }

    #[test]
    fn exception_before_master_shadows_it() {
        let document = parse(
            "\
BEGIN:VCALENDAR
BEGIN:VEVENT
RECURRENCE-ID:20240619T133000Z
DTSTART:20240620T133000Z
LOCATION:Exception room
END:VEVENT
BEGIN:VEVENT
UID:master
DTSTART:20240417T133000Z
RRULE:FREQ=MONTHLY;BYDAY=3WE
LOCATION:Master room
END:VEVENT
END:VCALENDAR
",
        );
        assert_eq!(find_location(&document), "Exception room");
        assert!(find_rule(&document).is_some());
    }

    #[test]
    fn missing_location_is_empty() {
        let document = parse("BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:a\nEND:VEVENT\nEND:VCALENDAR\n");
        assert_eq!(find_location(&document), "");
        assert!(find_rule(&document).is_none());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let document = parse(
            "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:a\nLOCATION:Hall\nEND:VEVENT\nEND:VCALENDAR\n",
        );
        assert_eq!(
            find_property(&document, "LOCATION").and_then(Node::as_text),
            Some("Hall")
        );
    }
}
