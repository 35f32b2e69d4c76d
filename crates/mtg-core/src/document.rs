//! Generic property tree built from calendar text.
//!
//! Content lines are read by the `ical` crate's property parser. This module
//! only arranges them into nested entities: one top-level entity per calendar
//! component, keyed by its `UID` (or `TZID` for timezones), with nested
//! components and recurrence exceptions as child mappings. Any `RRULE` is
//! compiled against the `DTSTART` of the same component.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone};
use ical::PropertyParser;
use ical::property::Property;
use rrule::Tz;

use crate::error::{ParseFailure, ResolveError};
use crate::rule::RecurrenceRule;

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";
const CALENDAR_COMPONENTS: [&str; 5] = ["VEVENT", "VTODO", "VJOURNAL", "VFREEBUSY", "VTIMEZONE"];

/// A value in the property tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A property value, verbatim.
    Text(String),
    /// A compiled recurrence rule.
    Rule(RecurrenceRule),
    /// A nested component or grouping.
    Map(Entity),
}

impl Node {
    /// Whether this value counts as present: non-empty text, a rule, or a mapping.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Rule(_) | Self::Map(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_rule(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub const fn as_map(&self) -> Option<&Entity> {
        match self {
            Self::Map(entity) => Some(entity),
            _ => None,
        }
    }
}

/// An ordered mapping from field name to [`Node`].
///
/// Field names may repeat (e.g. several `attendee` properties); order is the
/// order of the source document.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    fields: Vec<(String, Node)>,
}

impl Entity {
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        self.fields.push((key.into(), node));
    }

    /// All values stored under `key`, in order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Node> {
        self.fields
            .iter()
            .filter(move |(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.get_all(key).next()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    fn get_map_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.fields.iter_mut().find_map(|(name, node)| match node {
            Node::Map(entity) if name == key => Some(entity),
            _ => None,
        })
    }
}

/// A parsed calendar: entity id → entity, in document order.
#[derive(Debug, Clone, Default)]
pub struct CalendarDocument {
    entities: Vec<(String, Entity)>,
}

impl CalendarDocument {
    /// Parses calendar text into a property tree.
    pub fn parse(text: &str) -> Result<Self, ResolveError> {
        let components = read_components(text.trim()).map_err(ResolveError::CalendarParse)?;
        let mut calendars = Vec::new();
        let mut loose = Vec::new();
        for component in components {
            match component.name.as_str() {
                "VCALENDAR" => calendars.push(component),
                name if CALENDAR_COMPONENTS.contains(&name) => loose.push(component),
                name => tracing::debug!(component = name, "skipping non-calendar component"),
            }
        }
        // Bare components outside any VCALENDAR form one implicit calendar.
        if !loose.is_empty() {
            tracing::debug!(count = loose.len(), "wrapping top-level components in a calendar");
            calendars.push(RawComponent {
                name: "VCALENDAR".to_string(),
                children: loose,
                ..RawComponent::default()
            });
        }
        if calendars.is_empty() {
            return Err(ResolveError::InvalidCalendarData);
        }

        let mut document = Self::default();
        for calendar in &calendars {
            let zones = ZoneTable::collect(calendar);
            document
                .add_calendar(calendar, &zones)
                .map_err(ResolveError::CalendarParse)?;
        }
        tracing::debug!(entities = document.len(), "parsed calendar document");
        Ok(document)
    }

    /// Entities in document order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(id, entity)| (id.as_str(), entity))
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|(entity_id, _)| entity_id == id)
            .map(|(_, entity)| entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn add_calendar(
        &mut self,
        calendar: &RawComponent,
        zones: &ZoneTable,
    ) -> Result<(), ParseFailure> {
        if !calendar.properties.is_empty() {
            let mut header = Entity::default();
            for property in &calendar.properties {
                header.insert(
                    property.name.to_ascii_lowercase(),
                    Node::Text(property.value.clone().unwrap_or_default()),
                );
            }
            self.entities.push(("vcalendar".to_string(), header));
        }

        for (index, component) in calendar.children.iter().enumerate() {
            let entity = build_entity(component, zones)?;
            let uid = component.property_value("UID");

            if let (Some(uid), Some(recurrence_id)) =
                (uid, component.property_value("RECURRENCE-ID"))
            {
                if let Some(master) = self.entity_mut(uid) {
                    if master.get_map_mut("recurrences").is_none() {
                        master.insert("recurrences", Node::Map(Entity::default()));
                    }
                    if let Some(recurrences) = master.get_map_mut("recurrences") {
                        recurrences.insert(recurrence_id, Node::Map(entity));
                    }
                    continue;
                }
            }

            let id = match component.name.as_str() {
                "VTIMEZONE" => component.property_value("TZID"),
                _ => uid,
            }
            .map_or_else(
                || format!("{}-{index}", component.name.to_ascii_lowercase()),
                str::to_string,
            );
            self.entities.push((id, entity));
        }
        Ok(())
    }

    fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|(entity_id, _)| entity_id == id)
            .map(|(_, entity)| entity)
    }
}

/// A component as delimited by `BEGIN`/`END`, before conversion.
#[derive(Debug, Default)]
struct RawComponent {
    name: String,
    properties: Vec<Property>,
    children: Vec<RawComponent>,
}

impl RawComponent {
    fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(name))
    }

    fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name)
            .and_then(|property| property.value.as_deref())
            .filter(|value| !value.is_empty())
    }
}

fn read_components(text: &str) -> Result<Vec<RawComponent>, ParseFailure> {
    let mut roots = Vec::new();
    let mut stack: Vec<RawComponent> = Vec::new();

    for line in PropertyParser::from_reader(text.as_bytes()) {
        let property = line.map_err(|err| ParseFailure::Syntax(err.to_string()))?;
        let value = property.value.as_deref().unwrap_or_default();

        if property.name.eq_ignore_ascii_case("BEGIN") {
            stack.push(RawComponent {
                name: value.to_ascii_uppercase(),
                ..RawComponent::default()
            });
        } else if property.name.eq_ignore_ascii_case("END") {
            let component = stack
                .pop()
                .filter(|component| component.name.eq_ignore_ascii_case(value))
                .ok_or_else(|| ParseFailure::Structure(format!("END:{value}")))?;
            match stack.last_mut() {
                Some(parent) => parent.children.push(component),
                None => roots.push(component),
            }
        } else if let Some(current) = stack.last_mut() {
            current.properties.push(property);
        } else {
            return Err(ParseFailure::Structure(format!(
                "{} outside of any component",
                property.name
            )));
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseFailure::Structure(format!("BEGIN:{}", open.name)));
    }
    Ok(roots)
}

fn build_entity(component: &RawComponent, zones: &ZoneTable) -> Result<Entity, ParseFailure> {
    let mut entity = Entity::default();
    for property in &component.properties {
        let key = property.name.to_ascii_lowercase();
        let value = property.value.clone().unwrap_or_default();
        if key == "rrule" && !value.is_empty() {
            let start = component
                .property("DTSTART")
                .ok_or_else(|| ParseFailure::MissingStart(value.clone()))?;
            let dt_start = zones.resolve_start(start)?;
            entity.insert(key, Node::Rule(RecurrenceRule::compile(&value, dt_start)?));
        } else {
            entity.insert(key, Node::Text(value));
        }
    }
    for child in &component.children {
        entity.insert(
            child.name.to_ascii_lowercase(),
            Node::Map(build_entity(child, zones)?),
        );
    }
    Ok(entity)
}

/// Fixed offsets declared by the document's `VTIMEZONE` blocks.
#[derive(Debug, Default)]
struct ZoneTable {
    standard_offsets: HashMap<String, FixedOffset>,
}

impl ZoneTable {
    fn collect(calendar: &RawComponent) -> Self {
        let standard_offsets = calendar
            .children
            .iter()
            .filter(|component| component.name == "VTIMEZONE")
            .filter_map(|zone| {
                let tzid = zone.property_value("TZID")?;
                let offset = zone
                    .children
                    .iter()
                    .find(|block| block.name == "STANDARD")
                    .and_then(|block| block.property_value("TZOFFSETTO"))
                    .and_then(parse_utc_offset)?;
                Some((tzid.to_string(), offset))
            })
            .collect();
        Self { standard_offsets }
    }

    /// Interprets a `DTSTART` property as the series anchor.
    ///
    /// `...Z` values are UTC, `TZID` values use the named IANA zone or the
    /// document's own definition, floating values and dates use host local time.
    fn resolve_start(&self, property: &Property) -> Result<DateTime<Tz>, ParseFailure> {
        let raw = property.value.as_deref().unwrap_or_default().trim();
        let invalid = || ParseFailure::InvalidStart(raw.to_string());

        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
            return Ok(localize(&Tz::Local(chrono::Local), midnight));
        }

        if let Some(utc) = raw.strip_suffix('Z') {
            let naive =
                NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT).map_err(|_| invalid())?;
            return Ok(naive.and_utc().with_timezone(&Tz::UTC));
        }

        let naive = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).map_err(|_| invalid())?;
        let Some(tzid) = parameter(property, "TZID") else {
            return Ok(localize(&Tz::Local(chrono::Local), naive));
        };

        if let Ok(zone) = tzid.parse::<chrono_tz::Tz>() {
            return Ok(localize(&Tz::Tz(zone), naive));
        }
        if let Some(offset) = self.standard_offsets.get(tzid) {
            let instant = offset
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(invalid)?;
            return Ok(instant.with_timezone(&Tz::UTC));
        }

        tracing::warn!(tzid, "unknown TZID, treating DTSTART as UTC");
        Ok(naive.and_utc().with_timezone(&Tz::UTC))
    }
}

/// Places a local reading in `zone`.
///
/// Ambiguous readings take the earlier instant. Readings inside a forward
/// transition gap use the offset in effect before the gap, so `02:30` on a
/// spring-forward night becomes `03:30` daylight time.
fn localize<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> DateTime<Z> {
    zone.from_local_datetime(&naive).earliest().unwrap_or_else(|| {
        let before_gap = zone
            .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
            .fix();
        let offset = TimeDelta::seconds(i64::from(before_gap.local_minus_utc()));
        zone.from_utc_datetime(&(naive - offset))
    })
}

fn parameter<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|value| value.trim_matches('"'))
}

/// Parses a `TZOFFSETTO`/`TZOFFSETFROM` value such as `-0500` or `+053000`.
fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let (sign, digits) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    if !(digits.len() == 4 || digits.len() == 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    let seconds: i32 = digits.get(4..6).map_or(Ok(0), str::parse).ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}
