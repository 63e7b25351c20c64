//! Slot mutation rules.
//!
//! These functions apply assignments and removals to a single [`Event`] and keep the
//! [`AnnotationStore`] consistent with it. They hold no state of their own; the session decides
//! which event they operate on.

use crate::config::{ActionPolicy, AnnotatorConfig};
use crate::store::AnnotationStore;
use crate::{AnnotatorError, AnnotatorResult};
use annotation_id::AnnotationId;
use scievent_schema::{Event, EventPath, SlotPath};
use scievent_types::Span;
use serde::{Serialize, Serializer};

/// What a removal changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Nothing was held at the path.
    Unchanged,
    /// These slot values were detached (and purged from the store when registered there).
    Removed(Vec<String>),
    /// The event summary was reset to empty.
    SummaryCleared,
}

impl RemoveOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, RemoveOutcome::Unchanged)
    }
}

/// One registered span reachable from an event's slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpanAnnotation {
    pub id: String,
    #[serde(rename = "type", serialize_with = "serialize_display")]
    pub slot: SlotPath,
    pub start: usize,
    pub end: usize,
}

fn serialize_display<S: Serializer>(slot: &SlotPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(slot)
}

/// Lists the registered spans held by `event`, ordered by start offset.
///
/// Slot values that the store does not know (literal text from a loaded file) are skipped.
pub fn span_annotations(event: &Event, store: &AnnotationStore) -> Vec<SpanAnnotation> {
    let mut spans: Vec<SpanAnnotation> = event
        .slots()
        .flat_map(move |(slot, values)| {
            values.values().iter().filter_map(move |value| {
                store.get(value).map(|record| SpanAnnotation {
                    id: value.clone(),
                    slot,
                    start: record.start,
                    end: record.end,
                })
            })
        })
        .collect();
    spans.sort_by_key(|span| (span.start, span.end));
    spans
}

/// Rejects `span` if it overlaps a span already registered on `event`.
///
/// # Errors
///
/// Returns [`AnnotatorError::Overlap`] naming the first overlapping annotation.
pub fn check_overlap(event: &Event, store: &AnnotationStore, span: Span) -> AnnotatorResult<()> {
    for existing in span_annotations(event, store) {
        let Ok(existing_span) = Span::new(existing.start, existing.end) else {
            continue;
        };
        if span.overlaps(&existing_span) {
            return Err(AnnotatorError::Overlap {
                span,
                existing: existing_span,
                existing_id: existing.id,
            });
        }
    }
    Ok(())
}

/// Checks that a new value may be assigned to `slot` under `config`.
///
/// # Errors
///
/// - [`AnnotatorError::ActionAlreadyAssigned`] if the Action is occupied under the single policy.
/// - [`AnnotatorError::ActionRequired`] if the action-first rule is on and Action is empty.
pub fn check_assignable(
    event: &Event,
    slot: SlotPath,
    config: &AnnotatorConfig,
) -> AnnotatorResult<()> {
    let action_empty = event.action().is_empty();
    if slot.is_action() {
        if config.action_policy() == ActionPolicy::Single && !action_empty {
            return Err(AnnotatorError::ActionAlreadyAssigned);
        }
    } else if config.require_action_first() && action_empty {
        return Err(AnnotatorError::ActionRequired { slot });
    }
    Ok(())
}

/// Attaches `id` to `slot`: empty becomes a single value, a single value promotes to a list,
/// a list grows.
///
/// # Errors
///
/// Returns the errors of [`check_assignable`]; the event is untouched on error.
pub fn assign(
    event: &mut Event,
    slot: SlotPath,
    id: &AnnotationId,
    config: &AnnotatorConfig,
) -> AnnotatorResult<()> {
    check_assignable(event, slot, config)?;
    event.slot_mut(slot).push(id.as_str());
    tracing::debug!(%slot, %id, len = event.slot(slot).len(), "Assigned annotation");
    Ok(())
}

/// Detaches whatever `path` addresses and purges the detached identifiers from `store`.
///
/// - An element of a list is removed and the list demotes (two values to one, one to empty).
/// - Element 0 of a single value removes that value; an element of an empty slot is a no-op.
/// - A whole slot is emptied.
/// - A summary path clears the summary when the event carries that type.
///
/// # Errors
///
/// Returns [`AnnotatorError::IndexOutOfRange`] if an element index does not exist. Nothing is
/// changed on error.
pub fn remove(
    event: &mut Event,
    path: &EventPath,
    store: &mut AnnotationStore,
) -> AnnotatorResult<RemoveOutcome> {
    let outcome = match *path {
        EventPath::Summary(event_type) => {
            if event.event_type() == Some(event_type) && !event.summary().is_empty() {
                event.set_summary(String::new());
                RemoveOutcome::SummaryCleared
            } else {
                RemoveOutcome::Unchanged
            }
        }
        EventPath::Slot(slot) => {
            let removed = event.slot_mut(slot).take();
            purge(store, removed)
        }
        EventPath::Element(slot, index) => {
            let target = event.slot_mut(slot);
            let len = target.len();
            if target.is_empty() {
                RemoveOutcome::Unchanged
            } else {
                match target.remove_at(index) {
                    Some(value) => purge(store, vec![value]),
                    None => return Err(AnnotatorError::IndexOutOfRange { slot, index, len }),
                }
            }
        }
    };

    if outcome.changed() {
        tracing::debug!(%path, ?outcome, "Removed value");
    }
    Ok(outcome)
}

fn purge(store: &mut AnnotationStore, removed: Vec<String>) -> RemoveOutcome {
    if removed.is_empty() {
        return RemoveOutcome::Unchanged;
    }
    for value in &removed {
        store.remove(value);
    }
    RemoveOutcome::Removed(removed)
}
