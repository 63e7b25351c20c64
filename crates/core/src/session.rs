//! Editing session over one open document.
//!
//! An [`AnnotationSession`] owns the document, its annotation store and the configuration it
//! was opened with. Every mutation goes through `&mut self`, so the store and the document
//! cannot drift apart between calls.

use crate::config::AnnotatorConfig;
use crate::mutator::{self, RemoveOutcome, SpanAnnotation};
use crate::store::AnnotationStore;
use crate::{AnnotatorError, AnnotatorResult};
use annotation_id::AnnotationId;
use scievent_schema::constants::SUMMARY_SOFT_LIMIT;
use scievent_schema::{
    export_document, export_file_name, read_document, write_document, Document, Event,
    EventLocator, EventPath, SlotPath,
};
use scievent_types::{Span, SpanError};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct AnnotationSession {
    config: AnnotatorConfig,
    document: Document,
    store: AnnotationStore,
    source_name: Option<String>,
}

impl AnnotationSession {
    /// Creates a session with no document loaded.
    pub fn new(config: AnnotatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a session and loads `input` into it.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::Schema`] if `input` is not a valid document.
    pub fn open(
        config: AnnotatorConfig,
        input: &str,
        source_name: Option<&str>,
    ) -> AnnotatorResult<Self> {
        let mut session = Self::new(config);
        session.load(input, source_name)?;
        Ok(session)
    }

    /// Replaces the open document with `input` and clears the store.
    ///
    /// On error the previously open document and store are left untouched.
    pub fn load(&mut self, input: &str, source_name: Option<&str>) -> AnnotatorResult<()> {
        let document = read_document(input)?;
        self.document = document;
        self.store.clear();
        self.source_name = source_name.map(str::to_string);
        tracing::info!(
            source = self.source_name.as_deref().unwrap_or("<unnamed>"),
            papers = self.document.papers().len(),
            "Opened document"
        );
        Ok(())
    }

    /// Drops the open document and every registered annotation.
    pub fn reset(&mut self) {
        self.document = Document::default();
        self.store.clear();
        self.source_name = None;
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Returns the event at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::PaperNotFound`] or [`AnnotatorError::EventNotFound`].
    pub fn event(&self, at: EventLocator) -> AnnotatorResult<&Event> {
        if self.document.paper(at.paper).is_none() {
            return Err(AnnotatorError::PaperNotFound(at.paper));
        }
        self.document
            .event(at)
            .ok_or(AnnotatorError::EventNotFound {
                paper: at.paper,
                event: at.event,
            })
    }

    /// Registers the text under `span` and assigns it to `slot`.
    ///
    /// The span text is taken from the event's `Text`. All checks run before the store is
    /// touched, so a rejected call changes nothing.
    ///
    /// # Errors
    ///
    /// - [`AnnotatorError::InvalidSpan`] if `span` reaches past the end of the text or covers
    ///   only whitespace.
    /// - [`AnnotatorError::Overlap`] if `span` overlaps an existing annotation on the event.
    /// - The policy errors of [`mutator::check_assignable`].
    pub fn annotate(
        &mut self,
        at: EventLocator,
        slot: SlotPath,
        span: Span,
    ) -> AnnotatorResult<AnnotationId> {
        let event = event_mut(&mut self.document, at)?;
        let text = span.slice(event.text())?.to_string();
        if text.trim().is_empty() {
            return Err(SpanError::Blank {
                start: span.start(),
                end: span.end(),
            }
            .into());
        }
        mutator::check_assignable(event, slot, &self.config)?;
        mutator::check_overlap(event, &self.store, span)?;

        let id = self.store.add(&text, span.start(), span.end());
        mutator::assign(event, slot, &id, &self.config)?;
        tracing::debug!(%at, %slot, %span, %id, "Annotated span");
        Ok(id)
    }

    /// Detaches the value at `path` and purges it from the store.
    ///
    /// # Errors
    ///
    /// Returns a locator error or [`AnnotatorError::IndexOutOfRange`].
    pub fn remove(&mut self, at: EventLocator, path: &EventPath) -> AnnotatorResult<RemoveOutcome> {
        let event = event_mut(&mut self.document, at)?;
        mutator::remove(event, path, &mut self.store)
    }

    /// Parses a dotted path and removes the value it addresses.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::Path`] if `path` is malformed, otherwise as [`Self::remove`].
    pub fn remove_path(&mut self, at: EventLocator, path: &str) -> AnnotatorResult<RemoveOutcome> {
        let path: EventPath = path.parse()?;
        self.remove(at, &path)
    }

    /// Replaces the event's summary.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::NoEventType`] if the event has no event type to hold it.
    pub fn set_summary(&mut self, at: EventLocator, summary: &str) -> AnnotatorResult<()> {
        let event = event_mut(&mut self.document, at)?;
        if event.event_type().is_none() {
            return Err(AnnotatorError::NoEventType);
        }
        let length = summary.chars().count();
        if length > SUMMARY_SOFT_LIMIT {
            tracing::warn!(%at, length, limit = SUMMARY_SOFT_LIMIT, "Summary is longer than usual");
        }
        event.set_summary(summary);
        Ok(())
    }

    /// The registered spans on an event, recomputed from its slots.
    pub fn highlights(&self, at: EventLocator) -> AnnotatorResult<Vec<SpanAnnotation>> {
        let event = self.event(at)?;
        Ok(mutator::span_annotations(event, &self.store))
    }

    /// Exports the document with identifiers resolved to their text.
    pub fn export_value(&self) -> Value {
        export_document(&self.document, &self.store)
    }

    /// Renders the exported document as indented JSON.
    pub fn export(&self) -> AnnotatorResult<String> {
        let rendered = write_document(&self.document, &self.store)?;
        tracing::info!(
            papers = self.document.papers().len(),
            annotations = self.store.len(),
            "Exported document"
        );
        Ok(rendered)
    }

    /// File name for the export of the open document.
    pub fn export_file_name(&self) -> String {
        export_file_name(self.source_name.as_deref())
    }
}

fn event_mut(document: &mut Document, at: EventLocator) -> AnnotatorResult<&mut Event> {
    if document.paper(at.paper).is_none() {
        return Err(AnnotatorError::PaperNotFound(at.paper));
    }
    document.event_mut(at).ok_or(AnnotatorError::EventNotFound {
        paper: at.paper,
        event: at.event,
    })
}
