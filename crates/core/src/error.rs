use scievent_schema::{PathError, SchemaError, SlotPath};
use scievent_types::{Span, SpanError};

#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("element {index} of {slot} does not exist ({len} values)")]
    IndexOutOfRange {
        slot: SlotPath,
        index: usize,
        len: usize,
    },
    #[error("span {span} overlaps existing annotation {existing_id} at {existing}")]
    Overlap {
        span: Span,
        existing: Span,
        existing_id: String,
    },
    #[error("invalid span: {0}")]
    InvalidSpan(#[from] SpanError),
    #[error("Action already holds a value; remove it before assigning another")]
    ActionAlreadyAssigned,
    #[error("cannot assign {slot} before Action is annotated")]
    ActionRequired { slot: SlotPath },
    #[error("paper {0} not found")]
    PaperNotFound(usize),
    #[error("event {event} not found in paper {paper}")]
    EventNotFound { paper: usize, event: usize },
    #[error("event has no event type, so it has no summary")]
    NoEventType,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AnnotatorResult<T> = std::result::Result<T, AnnotatorError>;
