//! Output strategies for per-document serialization.

use std::io::Write;

use super::types::ElementKind;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::types::DocumentId;
use crate::xml::{StartElement, TextContent};

/// Trait for per-document output strategies.
///
/// Chosen once when the splitter is built and invoked for every event that
/// falls inside a document. The splitter has already validated nesting, so
/// implementations only see elements in positions the hierarchy allows.
/// Annotation events never reach a strategy.
pub trait OutputStrategy {
    /// Format this strategy writes.
    fn format(&self) -> OutputFormat;

    /// A `<text>` element opened; `out` is the fresh document sink.
    fn begin_document(
        &mut self,
        out: &mut dyn Write,
        start: &StartElement,
        id: &DocumentId,
    ) -> Result<()>;

    /// An element opened inside the current document.
    fn open_element(
        &mut self,
        out: &mut dyn Write,
        kind: ElementKind,
        start: &StartElement,
    ) -> Result<()>;

    /// Non-blank text inside the current document.
    fn text(&mut self, out: &mut dyn Write, text: &TextContent) -> Result<()>;

    /// An element inside the current document closed.
    fn close_element(&mut self, out: &mut dyn Write, kind: ElementKind, name: &str)
        -> Result<()>;

    /// The `<text>` element closed; everything for the document must be
    /// written to `out` before returning.
    fn end_document(&mut self, out: &mut dyn Write, name: &str) -> Result<()>;
}
