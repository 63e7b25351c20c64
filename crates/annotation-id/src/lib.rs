//! Annotation identifier utilities.
//!
//! Every span registered with the annotation store is keyed by an opaque identifier. Exported
//! documents never contain these identifiers (they are resolved to span text on export), but
//! they do appear in the live document tree and in removal paths, so the format is fixed:
//!
//! `ann_<unix-millis>_<suffix>`
//!
//! - `unix-millis`: decimal milliseconds since the Unix epoch at mint time
//! - `suffix`: lowercase base36 characters (`0-9`, `a-z`); 9 characters when minted here
//!
//! Example: `ann_1736604922045_k3j9x0q2m`
//!
//! This module provides:
//! - [`AnnotationId`], a wrapper that guarantees the canonical format once constructed.
//! - [`AnnotationIdGenerator`], which mints identifiers whose timestamp part strictly increases
//!   within one generator, so a single store never issues two identifiers for the same
//!   millisecond.
//!
//! Notes:
//! - Suffixes of 1 to 9 characters are accepted by [`AnnotationId::parse`] so identifiers
//!   written by older tooling (which occasionally produced shorter suffixes) still parse.
//! - Collisions between generators are not formally prevented; the random suffix makes them
//!   negligible in practice.

mod id;

pub use id::{AnnotationId, AnnotationIdGenerator, ID_PREFIX, SUFFIX_LEN};

/// Error type for annotation identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for annotation identifier operations.
pub type IdResult<T> = Result<T, IdError>;
