//! Export of documents to plain JSON.
//!
//! Export resolves every slot value through a [`TextResolver`]: values that name a registered
//! annotation become that annotation's text, anything else is passed through as literal text.
//! Keys come out in a fixed order so exported files diff cleanly.

use crate::constants::{
    ABSTRACT_KEY, ACTION_KEY, ARGUMENTS_KEY, DEFAULT_EXPORT_BASE_NAME, EVENTS_KEY,
    EXPORT_FILE_SUFFIX, OBJECT_KEY, PAPER_CODE_KEY, TEXT_KEY,
};
use crate::model::{Arguments, Document, Event, ObjectArguments, ObjectRole, Paper, Role, Slot, SlotShape};
use crate::SchemaResult;
use serde_json::{Map, Value};

/// Looks up the text behind a slot value.
pub trait TextResolver {
    /// Returns the resolved text, or `None` if `value` is literal text.
    fn resolve(&self, value: &str) -> Option<&str>;
}

/// Resolver that treats every value as literal text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl TextResolver for NoResolver {
    fn resolve(&self, _value: &str) -> Option<&str> {
        None
    }
}

fn resolve_str(value: &str, resolver: &impl TextResolver) -> String {
    resolver.resolve(value).unwrap_or(value).to_string()
}

fn export_slot(slot: &Slot, resolver: &impl TextResolver) -> Value {
    match slot.shape() {
        SlotShape::Empty => Value::String(String::new()),
        SlotShape::Single(value) => Value::String(resolve_str(value, resolver)),
        SlotShape::Many(values) => Value::Array(
            values
                .iter()
                .map(|value| Value::String(resolve_str(value, resolver)))
                .collect(),
        ),
    }
}

/// Resolves strings anywhere inside an extra value.
fn export_extra(value: &Value, resolver: &impl TextResolver) -> Value {
    match value {
        Value::String(s) => Value::String(resolve_str(s, resolver)),
        Value::Array(items) => Value::Array(items.iter().map(|v| export_extra(v, resolver)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), export_extra(v, resolver)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn append_extras(out: &mut Map<String, Value>, extras: &Map<String, Value>, resolver: &impl TextResolver) {
    for (key, value) in extras {
        if out.contains_key(key) {
            continue;
        }
        out.insert(key.clone(), export_extra(value, resolver));
    }
}

fn export_object(object: &ObjectArguments, resolver: &impl TextResolver) -> Value {
    let mut out = Map::new();
    for role in ObjectRole::ALL {
        out.insert(role.key().to_string(), export_slot(object.slot(role), resolver));
    }
    append_extras(&mut out, object.extras(), resolver);
    Value::Object(out)
}

fn export_arguments(arguments: &Arguments, resolver: &impl TextResolver) -> Value {
    let mut out = Map::new();
    for role in Role::ALL {
        out.insert(role.key().to_string(), export_slot(arguments.role(role), resolver));
        if role == Role::Agent {
            out.insert(OBJECT_KEY.to_string(), export_object(arguments.object(), resolver));
        }
    }
    append_extras(&mut out, arguments.extras(), resolver);
    Value::Object(out)
}

/// Exports one event: event-type field, `Text`, `Action`, `Arguments`, then extras.
pub fn export_event(event: &Event, resolver: &impl TextResolver) -> Value {
    let mut out = Map::new();
    if let Some(event_type) = event.event_type() {
        out.insert(
            event_type.key().to_string(),
            Value::String(event.summary().to_string()),
        );
    }
    out.insert(TEXT_KEY.to_string(), Value::String(event.text().to_string()));
    out.insert(ACTION_KEY.to_string(), export_slot(event.action(), resolver));
    out.insert(
        ARGUMENTS_KEY.to_string(),
        export_arguments(event.arguments(), resolver),
    );
    append_extras(&mut out, event.extras(), resolver);
    Value::Object(out)
}

/// Exports one paper: `paper_code`, `abstract` when present, `events`, then extras.
pub fn export_paper(paper: &Paper, resolver: &impl TextResolver) -> Value {
    let mut out = Map::new();
    out.insert(
        PAPER_CODE_KEY.to_string(),
        Value::String(paper.paper_code().to_string()),
    );
    if let Some(abstract_value) = paper.abstract_value() {
        out.insert(ABSTRACT_KEY.to_string(), abstract_value.clone());
    }
    out.insert(
        EVENTS_KEY.to_string(),
        Value::Array(
            paper
                .events()
                .iter()
                .map(|event| export_event(event, resolver))
                .collect(),
        ),
    );
    append_extras(&mut out, paper.extras(), resolver);
    Value::Object(out)
}

/// Exports a whole document as a JSON array of papers.
pub fn export_document(document: &Document, resolver: &impl TextResolver) -> Value {
    Value::Array(
        document
            .papers()
            .iter()
            .map(|paper| export_paper(paper, resolver))
            .collect(),
    )
}

/// Renders an exported document with 2-space indentation.
///
/// # Errors
///
/// Returns [`crate::SchemaError::InvalidJson`] if serialisation fails.
pub fn write_document(document: &Document, resolver: &impl TextResolver) -> SchemaResult<String> {
    let value = export_document(document, resolver);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Returns the export file name for a source file name.
///
/// A trailing `.json` is stripped before the suffix is added; a missing or empty name falls
/// back to `annotated_data`.
pub fn export_file_name(source_name: Option<&str>) -> String {
    let base = source_name
        .map(|name| name.strip_suffix(".json").unwrap_or(name))
        .filter(|base| !base.is_empty())
        .unwrap_or(DEFAULT_EXPORT_BASE_NAME);
    format!("{base}{EXPORT_FILE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventType;
    use crate::path::SlotPath;
    use crate::normalize::normalize_document;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, String>);

    impl TextResolver for MapResolver {
        fn resolve(&self, value: &str) -> Option<&str> {
            self.0.get(value).map(String::as_str)
        }
    }

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn export_orders_event_keys() {
        let doc = normalize_document(json!([{"events": [{
            "extra": true,
            "Text": "Cats chase mice.",
            "Arguments": {"Contradictions": "", "Agent": "Cats", "Custom": "x"},
            "Results/Findings": "s",
        }], "paper_code": "P1"}]))
        .unwrap();

        let out = export_document(&doc, &NoResolver);
        let paper = &out[0];
        assert_eq!(keys(paper), ["paper_code", "events"]);

        let event = &paper["events"][0];
        assert_eq!(
            keys(event),
            ["Results/Findings", "Text", "Action", "Arguments", "extra"]
        );
        assert_eq!(
            keys(&event["Arguments"]),
            [
                "Agent",
                "Object",
                "Context",
                "Purpose",
                "Method",
                "Results",
                "Analysis",
                "Challenge",
                "Ethical",
                "Implications",
                "Contradictions",
                "Custom"
            ]
        );
        assert_eq!(
            keys(&event["Arguments"]["Object"]),
            ["Primary Object", "Secondary Object"]
        );
        assert!(event.get("annotations").is_none());
    }

    #[test]
    fn export_resolves_ids_and_passes_literals() {
        let mut event = Event::new(Some(EventType::ResultsFindings), "Cats chase mice.");
        event.slot_mut(SlotPath::Action).push("ann_1_a");
        event
            .slot_mut(SlotPath::Argument(Role::Context))
            .push("ann_2_b");
        event
            .slot_mut(SlotPath::Argument(Role::Context))
            .push("funding");

        let resolver = MapResolver(HashMap::from([
            ("ann_1_a".to_string(), "chase".to_string()),
            ("ann_2_b".to_string(), "in the lab".to_string()),
        ]));
        let out = export_event(&event, &resolver);

        assert_eq!(out["Action"], json!("chase"));
        assert_eq!(out["Arguments"]["Context"], json!(["in the lab", "funding"]));
        assert_eq!(out["Arguments"]["Agent"], json!(""));
        assert_eq!(out["Arguments"]["Object"]["Primary Object"], json!(""));
    }

    #[test]
    fn export_resolves_inside_extras() {
        let doc = normalize_document(json!([{"paper_code": "P1", "events": [{
            "Text": "t",
            "notes": {"see": ["ann_1_a", 3]}
        }]}]))
        .unwrap();
        let resolver = MapResolver(HashMap::from([(
            "ann_1_a".to_string(),
            "resolved".to_string(),
        )]));

        let out = export_document(&doc, &resolver);
        assert_eq!(out[0]["events"][0]["notes"], json!({"see": ["resolved", 3]}));
    }

    #[test]
    fn export_is_stable_for_canonical_input() {
        let input = json!([{
            "paper_code": "P1",
            "abstract": "A.",
            "events": [{
                "Methods/Approach": "m",
                "Text": "Cats chase mice.",
                "Action": "chase",
                "Arguments": {
                    "Agent": ["Cats", "Dogs"],
                    "Object": {"Primary Object": "mice", "Secondary Object": ""},
                    "Context": "", "Purpose": "", "Method": "", "Results": "",
                    "Analysis": "", "Challenge": "", "Ethical": "", "Implications": "",
                    "Contradictions": ""
                }
            }],
            "venue": "X"
        }]);

        let once = export_document(&normalize_document(input.clone()).unwrap(), &NoResolver);
        assert_eq!(once, input);
        let twice = export_document(&normalize_document(once.clone()).unwrap(), &NoResolver);
        assert_eq!(twice, once);
    }

    #[test]
    fn paper_fields_pass_through_unchanged() {
        let input = json!([
            {"paper_code": " P1 ", "abstract": {"en": "About cats."}, "events": []},
            {"paper_code": "P2", "abstract": null, "events": []}
        ]);

        let out = export_document(&normalize_document(input.clone()).unwrap(), &NoResolver);
        assert_eq!(out, input);
        assert_eq!(keys(&out[1]), ["paper_code", "abstract", "events"]);
    }

    #[test]
    fn scalar_slot_literals_export_as_strings() {
        let doc = normalize_document(json!([{"paper_code": "P1", "events": [{
            "Text": "t",
            "Arguments": {"Results": 42, "Analysis": [true, "x"]}
        }]}]))
        .unwrap();

        let arguments = &export_document(&doc, &NoResolver)[0]["events"][0]["Arguments"];
        assert_eq!(arguments["Results"], json!("42"));
        assert_eq!(arguments["Analysis"], json!(["true", "x"]));
    }

    #[test]
    fn write_document_uses_two_space_indent() {
        let doc = normalize_document(json!([{"paper_code": "P1", "events": []}])).unwrap();
        let text = write_document(&doc, &NoResolver).unwrap();
        assert!(text.starts_with("[\n  {\n    \"paper_code\": \"P1\""), "{text}");
    }

    #[test]
    fn export_file_names() {
        assert_eq!(export_file_name(Some("papers.json")), "papers_annotated.json");
        assert_eq!(export_file_name(Some("papers")), "papers_annotated.json");
        assert_eq!(export_file_name(Some(".json")), "annotated_data_annotated.json");
        assert_eq!(export_file_name(None), "annotated_data_annotated.json");
    }
}
