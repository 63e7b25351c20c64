//! # SciEvent Schema
//!
//! The paper/event document model and its JSON boundary.
//!
//! This crate covers:
//! - the canonical document model ([`Document`], [`Paper`], [`Event`], [`Slot`])
//! - the dotted path vocabulary used to address event fields ([`EventPath`], [`SlotPath`])
//! - loading and legacy migration of input files ([`read_document`])
//! - export with identifier resolution and fixed key order ([`export_document`])
//!
//! **No session state**: the annotation store and the mutation rules live in `scievent-core`.
//! Export only needs something that implements [`TextResolver`].

pub mod constants;
mod export;
mod model;
mod normalize;
mod path;

pub use export::{
    export_document, export_event, export_file_name, export_paper, write_document, NoResolver,
    TextResolver,
};
pub use model::{
    Arguments, Document, Event, EventLocator, EventType, ObjectArguments, ObjectRole, Paper, Role,
    Slot, SlotShape,
};
pub use normalize::{normalize_document, normalize_event, read_document};
pub use path::{EventPath, PathError, SlotPath};

/// Errors that can occur when reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidFormat(String),
    #[error("invalid value at {path}: {message}")]
    Mismatch { path: String, message: String },
    #[error(transparent)]
    Path(#[from] PathError),
}

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
