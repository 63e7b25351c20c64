//! Canonical paper/event document model.
//!
//! This is the in-memory shape every loaded document is normalised into, whatever schema
//! revision it was written with. Role slots hold either literal text (values loaded from an
//! already-annotated file) or annotation identifiers minted during the current session; the
//! model does not distinguish the two, the export resolver does.
//!
//! Key types:
//! - [`Slot`]: tri-state role value (empty, single value, or two or more values).
//! - [`Event`]: one annotatable unit with its summary, text, action and arguments.
//! - [`Document`]: the ordered list of [`Paper`]s loaded from one input file.

use crate::constants::{LEGACY_ATTACHED_OBJECT_KEY, LEGACY_BASE_OBJECT_KEY};
use crate::path::SlotPath;
use scievent_types::PaperCode;
use serde_json::{Map, Value};
use std::fmt;

/// The fixed set of event types. An event carries exactly one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    BackgroundIntroduction,
    MethodsApproach,
    ResultsFindings,
    ConclusionsImplications,
}

impl EventType {
    /// All event types in canonical order.
    pub const ALL: [EventType; 4] = [
        EventType::BackgroundIntroduction,
        EventType::MethodsApproach,
        EventType::ResultsFindings,
        EventType::ConclusionsImplications,
    ];

    /// The JSON key this event type is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            EventType::BackgroundIntroduction => "Background/Introduction",
            EventType::MethodsApproach => "Methods/Approach",
            EventType::ResultsFindings => "Results/Findings",
            EventType::ConclusionsImplications => "Conclusions/Implications",
        }
    }

    /// The short key used by the earliest documents (`Background`, `Method`, ...).
    pub fn legacy_key(&self) -> &'static str {
        match self {
            EventType::BackgroundIntroduction => "Background",
            EventType::MethodsApproach => "Method",
            EventType::ResultsFindings => "Result",
            EventType::ConclusionsImplications => "Conclusion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Argument roles other than the nested object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Agent,
    Context,
    Purpose,
    Method,
    Results,
    Analysis,
    Challenge,
    Ethical,
    Implications,
    Contradictions,
}

impl Role {
    /// All roles in canonical export order. `Object` sits between `Agent` and `Context`.
    pub const ALL: [Role; 10] = [
        Role::Agent,
        Role::Context,
        Role::Purpose,
        Role::Method,
        Role::Results,
        Role::Analysis,
        Role::Challenge,
        Role::Ethical,
        Role::Implications,
        Role::Contradictions,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Role::Agent => "Agent",
            Role::Context => "Context",
            Role::Purpose => "Purpose",
            Role::Method => "Method",
            Role::Results => "Results",
            Role::Analysis => "Analysis",
            Role::Challenge => "Challenge",
            Role::Ethical => "Ethical",
            Role::Implications => "Implications",
            Role::Contradictions => "Contradictions",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sub-roles of `Arguments.Object`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRole {
    Primary,
    Secondary,
}

impl ObjectRole {
    pub const ALL: [ObjectRole; 2] = [ObjectRole::Primary, ObjectRole::Secondary];

    pub fn key(&self) -> &'static str {
        match self {
            ObjectRole::Primary => "Primary Object",
            ObjectRole::Secondary => "Secondary Object",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Borrowed view of a [`Slot`]'s tri-state shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotShape<'a> {
    Empty,
    Single(&'a str),
    Many(&'a [String]),
}

/// A role value: empty, one value, or two or more values.
///
/// The shape is derived from the number of held values, so a one-element or zero-element
/// array cannot be represented. Empty strings are never held.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    values: Vec<String>,
}

impl Slot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self::from_values([value.into()])
    }

    /// Builds a slot from any number of values, skipping empty strings.
    pub fn from_values(values: impl IntoIterator<Item = String>) -> Self {
        Self {
            values: values.into_iter().filter(|v| !v.is_empty()).collect(),
        }
    }

    pub fn shape(&self) -> SlotShape<'_> {
        match self.values.as_slice() {
            [] => SlotShape::Empty,
            [one] => SlotShape::Single(one),
            many => SlotShape::Many(many),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// All held values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Adds a value: empty becomes single, single promotes to a two-element array, arrays
    /// append. Empty strings are ignored.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.push(value);
        }
    }

    /// Removes the value at `index`, demoting the shape as needed.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.values.len() {
            Some(self.values.remove(index))
        } else {
            None
        }
    }

    /// Empties the slot, returning everything it held.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.values)
    }
}

/// The nested `Arguments.Object` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectArguments {
    primary: Slot,
    secondary: Slot,
    extras: Map<String, Value>,
}

impl ObjectArguments {
    pub fn slot(&self, role: ObjectRole) -> &Slot {
        match role {
            ObjectRole::Primary => &self.primary,
            ObjectRole::Secondary => &self.secondary,
        }
    }

    pub fn slot_mut(&mut self, role: ObjectRole) -> &mut Slot {
        match role {
            ObjectRole::Primary => &mut self.primary,
            ObjectRole::Secondary => &mut self.secondary,
        }
    }

    /// Keys outside the fixed sub-roles, in encounter order (for example the modifier fields of
    /// the base/attached object schema).
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub(crate) fn set_extras(&mut self, extras: Map<String, Value>) {
        self.extras = extras;
    }

    /// Names of the legacy keys whose values migrate into the fixed sub-roles.
    pub(crate) fn legacy_key(role: ObjectRole) -> &'static str {
        match role {
            ObjectRole::Primary => LEGACY_BASE_OBJECT_KEY,
            ObjectRole::Secondary => LEGACY_ATTACHED_OBJECT_KEY,
        }
    }
}

/// The fixed-shape `Arguments` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    agent: Slot,
    object: ObjectArguments,
    context: Slot,
    purpose: Slot,
    method: Slot,
    results: Slot,
    analysis: Slot,
    challenge: Slot,
    ethical: Slot,
    implications: Slot,
    contradictions: Slot,
    extras: Map<String, Value>,
}

impl Arguments {
    pub fn role(&self, role: Role) -> &Slot {
        match role {
            Role::Agent => &self.agent,
            Role::Context => &self.context,
            Role::Purpose => &self.purpose,
            Role::Method => &self.method,
            Role::Results => &self.results,
            Role::Analysis => &self.analysis,
            Role::Challenge => &self.challenge,
            Role::Ethical => &self.ethical,
            Role::Implications => &self.implications,
            Role::Contradictions => &self.contradictions,
        }
    }

    pub fn role_mut(&mut self, role: Role) -> &mut Slot {
        match role {
            Role::Agent => &mut self.agent,
            Role::Context => &mut self.context,
            Role::Purpose => &mut self.purpose,
            Role::Method => &mut self.method,
            Role::Results => &mut self.results,
            Role::Analysis => &mut self.analysis,
            Role::Challenge => &mut self.challenge,
            Role::Ethical => &mut self.ethical,
            Role::Implications => &mut self.implications,
            Role::Contradictions => &mut self.contradictions,
        }
    }

    pub fn object(&self) -> &ObjectArguments {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut ObjectArguments {
        &mut self.object
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub(crate) fn set_extras(&mut self, extras: Map<String, Value>) {
        self.extras = extras;
    }
}

/// One annotatable unit of a paper.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    event_type: Option<EventType>,
    summary: String,
    text: String,
    action: Slot,
    arguments: Arguments,
    extras: Map<String, Value>,
}

impl Event {
    /// Creates an event with empty summary, action and arguments.
    pub fn new(event_type: Option<EventType>, text: impl Into<String>) -> Self {
        Self {
            event_type,
            summary: String::new(),
            text: text.into(),
            action: Slot::empty(),
            arguments: Arguments::default(),
            extras: Map::new(),
        }
    }

    pub fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    /// Free-text summary stored under the event-type key.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Replaces the summary. Callers enforce that the event has a type.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    /// The source text spans are drawn from. Fixed once the event is normalised.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn action(&self) -> &Slot {
        &self.action
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Keys outside the canonical event shape, in encounter order.
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub fn slot(&self, path: SlotPath) -> &Slot {
        match path {
            SlotPath::Action => &self.action,
            SlotPath::Argument(role) => self.arguments.role(role),
            SlotPath::Object(role) => self.arguments.object.slot(role),
        }
    }

    pub fn slot_mut(&mut self, path: SlotPath) -> &mut Slot {
        match path {
            SlotPath::Action => &mut self.action,
            SlotPath::Argument(role) => self.arguments.role_mut(role),
            SlotPath::Object(role) => self.arguments.object.slot_mut(role),
        }
    }

    /// Every slot of the event with its path, in canonical export order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotPath, &Slot)> {
        SlotPath::all().into_iter().map(move |path| (path, self.slot(path)))
    }

    pub(crate) fn from_parts(
        event_type: Option<EventType>,
        summary: String,
        text: String,
        action: Slot,
        arguments: Arguments,
        extras: Map<String, Value>,
    ) -> Self {
        Self {
            event_type,
            summary,
            text,
            action,
            arguments,
            extras,
        }
    }
}

/// A paper and its events.
#[derive(Clone, Debug, PartialEq)]
pub struct Paper {
    paper_code: PaperCode,
    abstract_value: Option<Value>,
    events: Vec<Event>,
    extras: Map<String, Value>,
}

impl Paper {
    pub fn new(paper_code: PaperCode, events: Vec<Event>) -> Self {
        Self {
            paper_code,
            abstract_value: None,
            events,
            extras: Map::new(),
        }
    }

    pub fn paper_code(&self) -> &PaperCode {
        &self.paper_code
    }

    /// The `abstract` field as loaded, of whatever JSON type. `Some(Value::Null)` when the
    /// key was present with a null value.
    pub fn abstract_value(&self) -> Option<&Value> {
        self.abstract_value.as_ref()
    }

    /// The abstract when it is a string.
    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_value.as_ref().and_then(Value::as_str)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event_mut(&mut self, index: usize) -> Option<&mut Event> {
        self.events.get_mut(index)
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub(crate) fn from_parts(
        paper_code: PaperCode,
        abstract_value: Option<Value>,
        events: Vec<Event>,
        extras: Map<String, Value>,
    ) -> Self {
        Self {
            paper_code,
            abstract_value,
            events,
            extras,
        }
    }
}

/// Position of one event inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventLocator {
    pub paper: usize,
    pub event: usize,
}

impl EventLocator {
    pub fn new(paper: usize, event: usize) -> Self {
        Self { paper, event }
    }
}

impl fmt::Display for EventLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "paper {} event {}", self.paper, self.event)
    }
}

/// The papers loaded from one input file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    papers: Vec<Paper>,
}

impl Document {
    pub fn new(papers: Vec<Paper>) -> Self {
        Self { papers }
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn paper(&self, index: usize) -> Option<&Paper> {
        self.papers.get(index)
    }

    pub fn event(&self, at: EventLocator) -> Option<&Event> {
        self.papers.get(at.paper)?.events.get(at.event)
    }

    pub fn event_mut(&mut self, at: EventLocator) -> Option<&mut Event> {
        self.papers.get_mut(at.paper)?.event_mut(at.event)
    }

    /// Total number of events across all papers.
    pub fn event_count(&self) -> usize {
        self.papers.iter().map(|p| p.events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
