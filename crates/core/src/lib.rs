//! # SciEvent Core
//!
//! Annotation store and mutation engine for SciEvent documents.
//!
//! This crate owns the editing state:
//! - [`AnnotationStore`]: span text keyed by annotation identifier
//! - [`mutator`]: assignment (with promotion), removal (with demotion and store purging),
//!   overlap checks and the recomputed span list
//! - [`AnnotationSession`]: one open document plus its store and configuration
//!
//! **No I/O**: callers read input files and write exports. The document model and JSON boundary
//! live in `scievent-schema`.

pub mod config;
mod error;
pub mod mutator;
mod session;
mod store;

pub use config::{ActionPolicy, AnnotatorConfig};
pub use error::{AnnotatorError, AnnotatorResult};
pub use mutator::{RemoveOutcome, SpanAnnotation};
pub use session::AnnotationSession;
pub use store::{AnnotationRecord, AnnotationStore};

pub use annotation_id::AnnotationId;
pub use scievent_schema::{EventLocator, EventPath, SlotPath};
pub use scievent_types::Span;
