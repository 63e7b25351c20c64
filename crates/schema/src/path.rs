//! Logical paths into an event.
//!
//! Callers address event fields with a small dotted vocabulary:
//!
//! - `Background/Introduction` (and the other event-type keys): the event's summary
//! - `Action`: the action slot (`Main Action` is accepted when parsing)
//! - `Arguments.<Role>`: an argument role, e.g. `Arguments.Agent`
//! - `Arguments.Object.<SubRole>`: e.g. `Arguments.Object.Primary Object`
//! - any slot path followed by `.<index>`: one element of that slot
//!
//! Parsing produces an [`EventPath`]; `Display` gives back the canonical dotted form.

use crate::constants::{ACTION_KEY, ARGUMENTS_KEY, LEGACY_ACTION_KEY, OBJECT_KEY};
use crate::model::{EventType, ObjectRole, Role};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("unknown segment '{segment}' in path '{path}'")]
    UnknownSegment { path: String, segment: String },

    #[error("path '{path}' is incomplete")]
    Incomplete { path: String },

    #[error("invalid element index '{segment}' in path '{path}'")]
    InvalidIndex { path: String, segment: String },

    #[error("unexpected segment '{segment}' after the end of path '{path}'")]
    TrailingSegment { path: String, segment: String },
}

/// A role slot within an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotPath {
    Action,
    Argument(Role),
    Object(ObjectRole),
}

impl SlotPath {
    /// Every slot in canonical export order.
    pub fn all() -> Vec<SlotPath> {
        let mut slots = vec![SlotPath::Action, SlotPath::Argument(Role::Agent)];
        slots.extend(ObjectRole::ALL.into_iter().map(SlotPath::Object));
        slots.extend(
            Role::ALL
                .into_iter()
                .filter(|role| *role != Role::Agent)
                .map(SlotPath::Argument),
        );
        slots
    }

    pub fn is_action(&self) -> bool {
        matches!(self, SlotPath::Action)
    }
}

impl fmt::Display for SlotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotPath::Action => f.write_str(ACTION_KEY),
            SlotPath::Argument(role) => write!(f, "{ARGUMENTS_KEY}.{role}"),
            SlotPath::Object(role) => write!(f, "{ARGUMENTS_KEY}.{OBJECT_KEY}.{role}"),
        }
    }
}

impl FromStr for SlotPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<EventPath>()? {
            EventPath::Slot(slot) => Ok(slot),
            EventPath::Summary(_) => Err(PathError::UnknownSegment {
                path: s.to_string(),
                segment: s.to_string(),
            }),
            EventPath::Element(_, index) => Err(PathError::TrailingSegment {
                path: s.to_string(),
                segment: index.to_string(),
            }),
        }
    }
}

/// Any addressable field of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventPath {
    /// The summary stored under an event-type key.
    Summary(EventType),
    /// A whole slot.
    Slot(SlotPath),
    /// One element of a slot. Index 0 also addresses a scalar value.
    Element(SlotPath, usize),
}

impl fmt::Display for EventPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPath::Summary(event_type) => f.write_str(event_type.key()),
            EventPath::Slot(slot) => write!(f, "{slot}"),
            EventPath::Element(slot, index) => write!(f, "{slot}.{index}"),
        }
    }
}

impl From<SlotPath> for EventPath {
    fn from(slot: SlotPath) -> Self {
        EventPath::Slot(slot)
    }
}

impl FromStr for EventPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        // Event-type keys contain '/' but never '.', so match them whole first.
        if let Some(event_type) = EventType::from_key(s) {
            return Ok(EventPath::Summary(event_type));
        }

        let segments: Vec<&str> = s.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(PathError::EmptySegment {
                path: s.to_string(),
            });
        }

        let unknown = |segment: &str| PathError::UnknownSegment {
            path: s.to_string(),
            segment: segment.to_string(),
        };
        let incomplete = || PathError::Incomplete {
            path: s.to_string(),
        };

        let (slot, rest) = match segments.as_slice() {
            [head, rest @ ..] if *head == ACTION_KEY || *head == LEGACY_ACTION_KEY => {
                (SlotPath::Action, rest)
            }
            [head] if *head == ARGUMENTS_KEY => return Err(incomplete()),
            [head, object] if *head == ARGUMENTS_KEY && *object == OBJECT_KEY => {
                return Err(incomplete())
            }
            [head, object, sub, rest @ ..] if *head == ARGUMENTS_KEY && *object == OBJECT_KEY => {
                let role = ObjectRole::from_key(sub).ok_or_else(|| unknown(*sub))?;
                (SlotPath::Object(role), rest)
            }
            [head, role, rest @ ..] if *head == ARGUMENTS_KEY => {
                let role = Role::from_key(role).ok_or_else(|| unknown(*role))?;
                (SlotPath::Argument(role), rest)
            }
            [head, ..] => return Err(unknown(*head)),
            [] => return Err(PathError::Empty),
        };

        match rest {
            [] => Ok(EventPath::Slot(slot)),
            [index] => {
                let index = index.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                    path: s.to_string(),
                    segment: index.to_string(),
                })?;
                Ok(EventPath::Element(slot, index))
            }
            [_, extra, ..] => Err(PathError::TrailingSegment {
                path: s.to_string(),
                segment: extra.to_string(),
            }),
        }
    }
}
