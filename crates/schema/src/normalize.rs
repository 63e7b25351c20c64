//! Loading and normalising input documents.
//!
//! Input files have been written by several revisions of the annotation tool. Loading validates
//! the outer structure strictly (an array of papers, each with a `paper_code` and an `events`
//! array) and then normalises every event leniently into the canonical [`Event`] shape.
//!
//! Event migrations:
//! - `Main Action` becomes `Action` unless a non-empty `Action` is present.
//! - Short event-type keys (`Background`, `Method`, `Result`, `Conclusion`) map to the full keys.
//! - `Arguments.Object` given as a plain string becomes the primary object.
//! - `Arguments.Object` in the base/attached shape maps `Base_Object` and `Attached_Object` onto
//!   the primary and secondary objects; modifier keys stay as object extras.
//! - Flat `Arguments.Primary_Object` / `Arguments.Secondary_Object` values replace the nested
//!   ones when non-empty.
//! - A stored `annotations` list is discarded.
//! - When several event-type fields are populated, the first in canonical order is kept.

use crate::constants::{
    ABSTRACT_KEY, ACTION_KEY, ANNOTATIONS_KEY, ARGUMENTS_KEY, EVENTS_KEY, LEGACY_ACTION_KEY,
    LEGACY_PRIMARY_OBJECT_KEY, LEGACY_SECONDARY_OBJECT_KEY, OBJECT_KEY, PAPER_CODE_KEY,
    SUMMARY_SOFT_LIMIT, TEXT_KEY,
};
use crate::model::{Arguments, Document, Event, EventType, ObjectArguments, ObjectRole, Paper, Role, Slot};
use crate::{SchemaError, SchemaResult};
use scievent_types::PaperCode;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

const EXPECTED_ARRAY: &str = "Invalid format: Expected an array of papers";
const EXPECTED_PAPER_FIELDS: &str =
    "Invalid format: Each paper must have paper_code and events array";

/// Paper fields read by the loader. Everything, `abstract` included, is carried through as
/// given.
#[derive(Deserialize)]
struct RawPaper {
    paper_code: PaperCode,
    #[serde(rename = "abstract", default, deserialize_with = "present")]
    abstract_value: Option<Value>,
    events: Vec<Value>,
    #[serde(flatten)]
    extras: Map<String, Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it survives export.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Parses and normalises a JSON document.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidJson`] if `input` is not JSON, and the errors of
/// [`normalize_document`] otherwise.
pub fn read_document(input: &str) -> SchemaResult<Document> {
    let value: Value = serde_json::from_str(input).map_err(SchemaError::InvalidJson)?;
    normalize_document(value)
}

/// Validates the outer structure of `value` and normalises every event.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidFormat`] if the top level is not an array, a paper lacks a
/// non-empty `paper_code` string or an `events` array, or an event is not an object.
/// [`SchemaError::Mismatch`] reports a paper that passed those checks but still failed to
/// deserialise, with the field path.
pub fn normalize_document(value: Value) -> SchemaResult<Document> {
    let Value::Array(raw_papers) = value else {
        return Err(SchemaError::InvalidFormat(EXPECTED_ARRAY.to_string()));
    };

    if !raw_papers.iter().all(has_paper_fields) {
        return Err(SchemaError::InvalidFormat(EXPECTED_PAPER_FIELDS.to_string()));
    }

    let papers = raw_papers
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize_paper(index, raw))
        .collect::<SchemaResult<Vec<_>>>()?;

    let document = Document::new(papers);
    tracing::info!(
        papers = document.papers().len(),
        events = document.event_count(),
        "Loaded document"
    );
    Ok(document)
}

fn has_paper_fields(paper: &Value) -> bool {
    let code_ok = paper
        .get(PAPER_CODE_KEY)
        .and_then(Value::as_str)
        .is_some_and(|code| !code.trim().is_empty());
    let events_ok = paper.get(EVENTS_KEY).is_some_and(Value::is_array);
    code_ok && events_ok
}

fn normalize_paper(index: usize, raw: Value) -> SchemaResult<Paper> {
    let raw: RawPaper =
        serde_path_to_error::deserialize(raw).map_err(|err| SchemaError::Mismatch {
            path: format!("[{index}].{}", err.path()),
            message: err.inner().to_string(),
        })?;

    let events = raw
        .events
        .into_iter()
        .enumerate()
        .map(|(event_index, event)| match event {
            Value::Object(fields) => Ok(normalize_event(fields)),
            _ => Err(SchemaError::InvalidFormat(format!(
                "Invalid format: event {event_index} of paper {index} ('{}') is not an object",
                raw.paper_code
            ))),
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    tracing::debug!(
        paper_code = %raw.paper_code,
        events = events.len(),
        has_abstract = raw.abstract_value.is_some(),
        "Normalised paper"
    );
    Ok(Paper::from_parts(
        raw.paper_code,
        raw.abstract_value,
        events,
        raw.extras,
    ))
}

/// Normalises one event object into the canonical shape. Never fails.
pub fn normalize_event(mut fields: Map<String, Value>) -> Event {
    let (event_type, summary) = take_event_type(&mut fields);

    let text = match fields.shift_remove(TEXT_KEY) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => {
            tracing::warn!(value = %other, "Event Text is not a string; using its JSON form");
            other.to_string()
        }
    };

    let action = fields
        .shift_remove(ACTION_KEY)
        .map(|v| slot_from_value(&v, ACTION_KEY))
        .unwrap_or_default();
    let legacy_action = fields
        .shift_remove(LEGACY_ACTION_KEY)
        .map(|v| slot_from_value(&v, LEGACY_ACTION_KEY))
        .unwrap_or_default();
    let action = if action.is_empty() {
        legacy_action
    } else {
        action
    };

    let arguments = match fields.shift_remove(ARGUMENTS_KEY) {
        Some(Value::Object(map)) => normalize_arguments(map),
        None | Some(Value::Null) => Arguments::default(),
        Some(other) => {
            tracing::warn!(value = %other, "Event Arguments is not an object; discarding it");
            Arguments::default()
        }
    };

    if fields.shift_remove(ANNOTATIONS_KEY).is_some() {
        tracing::debug!("Discarded stored annotations list");
    }

    if summary.chars().count() > SUMMARY_SOFT_LIMIT {
        tracing::warn!(
            length = summary.chars().count(),
            limit = SUMMARY_SOFT_LIMIT,
            "Event summary is longer than usual"
        );
    }

    Event::from_parts(event_type, summary, text, action, arguments, fields)
}

/// Removes every event-type field (full or short key) and picks the one to keep.
fn take_event_type(fields: &mut Map<String, Value>) -> (Option<EventType>, String) {
    let mut found: Vec<(EventType, String)> = Vec::new();
    for event_type in EventType::ALL {
        let full = fields.shift_remove(event_type.key()).map(summary_from_value);
        let short = fields.shift_remove(event_type.legacy_key()).map(summary_from_value);
        let summary = match (full, short) {
            (Some(full), Some(short)) if full.is_empty() => Some(short),
            (Some(full), _) => Some(full),
            (None, short) => short,
        };
        if let Some(summary) = summary {
            found.push((event_type, summary));
        }
    }

    let chosen = found
        .iter()
        .position(|(_, summary)| !summary.is_empty())
        .unwrap_or(0);

    let mut kept = None;
    for (position, (event_type, summary)) in found.into_iter().enumerate() {
        if position == chosen {
            kept = Some((event_type, summary));
        } else if !summary.is_empty() {
            tracing::warn!(
                dropped = event_type.key(),
                "Event has more than one populated event type; keeping the first"
            );
        }
    }

    match kept {
        Some((event_type, summary)) => (Some(event_type), summary),
        None => (None, String::new()),
    }
}

fn summary_from_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn normalize_arguments(mut map: Map<String, Value>) -> Arguments {
    let mut arguments = Arguments::default();

    for role in Role::ALL {
        if let Some(value) = map.shift_remove(role.key()) {
            *arguments.role_mut(role) = slot_from_value(&value, role.key());
        }
    }

    match map.shift_remove(OBJECT_KEY) {
        Some(Value::Object(object)) => *arguments.object_mut() = normalize_object(object),
        Some(Value::String(primary)) => {
            *arguments.object_mut().slot_mut(ObjectRole::Primary) = Slot::single(primary);
        }
        None | Some(Value::Null) => {}
        Some(other) => {
            tracing::warn!(value = %other, "Arguments.Object has an unexpected shape; discarding it");
        }
    }

    for (key, role) in [
        (LEGACY_PRIMARY_OBJECT_KEY, ObjectRole::Primary),
        (LEGACY_SECONDARY_OBJECT_KEY, ObjectRole::Secondary),
    ] {
        if let Some(value) = map.shift_remove(key) {
            let slot = slot_from_value(&value, key);
            if !slot.is_empty() {
                *arguments.object_mut().slot_mut(role) = slot;
            }
        }
    }

    arguments.set_extras(map);
    arguments
}

fn normalize_object(mut map: Map<String, Value>) -> ObjectArguments {
    let mut object = ObjectArguments::default();

    for role in ObjectRole::ALL {
        let canonical = map
            .shift_remove(role.key())
            .map(|v| slot_from_value(&v, role.key()))
            .unwrap_or_default();
        let legacy_key = ObjectArguments::legacy_key(role);
        let legacy = map
            .shift_remove(legacy_key)
            .map(|v| slot_from_value(&v, legacy_key))
            .unwrap_or_default();

        *object.slot_mut(role) = if canonical.is_empty() {
            legacy
        } else {
            canonical
        };
    }

    object.set_extras(map);
    object
}

/// Reads a slot leniently. Strings and arrays of strings are taken as they are.
///
/// Slots hold text, so numbers and booleans are kept as their JSON text (`42` becomes `"42"`)
/// and export as strings from then on. Nested objects and arrays are dropped with a warning.
fn slot_from_value(value: &Value, field: &str) -> Slot {
    match value {
        Value::Null => Slot::empty(),
        Value::String(s) => Slot::single(s.clone()),
        Value::Array(items) => Slot::from_values(items.iter().filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            Value::Bool(_) | Value::Number(_) => Some(item.to_string()),
            _ => {
                tracing::warn!(field, value = %item, "Dropping nested value from slot");
                None
            }
        })),
        Value::Bool(_) | Value::Number(_) => Slot::single(value.to_string()),
        Value::Object(_) => {
            tracing::warn!(field, "Slot holds an object; treating it as empty");
            Slot::empty()
        }
    }
}
