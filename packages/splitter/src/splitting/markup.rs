//! Markup strategy: reconstructs each text as a standalone XML file.

use std::io::Write;

use encoding_rs::Encoding;

use super::strategy::OutputStrategy;
use super::types::ElementKind;
use crate::config::{resolve_encoding, OutputFormat};
use crate::error::Result;
use crate::types::DocumentId;
use crate::xml::{StartElement, TextContent};

/// Mirrors every element, attribute and non-blank text of a document.
///
/// Attribute values and text are written in their source (still escaped)
/// form, so no extra escaping is applied and the output stays well-formed.
/// Whitespace-only text between tags is dropped and all other text is
/// trimmed.
pub struct MarkupStrategy {
    encoding: &'static Encoding,
    label: String,
}

impl MarkupStrategy {
    /// Create a strategy writing in the encoding named by `label`.
    pub fn new(label: &str) -> Result<Self> {
        Ok(Self {
            encoding: resolve_encoding(label)?,
            label: label.trim().to_string(),
        })
    }

    /// Encoding label written into the XML declaration.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn write_str(&self, out: &mut dyn Write, s: &str) -> Result<()> {
        // Unmappable characters come out as numeric character references
        let (bytes, _, _) = self.encoding.encode(s);
        out.write_all(&bytes)?;
        Ok(())
    }

    fn write_start_tag(&self, out: &mut dyn Write, start: &StartElement) -> Result<()> {
        self.write_str(out, &render_start_tag(start))
    }
}

impl OutputStrategy for MarkupStrategy {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markup
    }

    fn begin_document(
        &mut self,
        out: &mut dyn Write,
        start: &StartElement,
        _id: &DocumentId,
    ) -> Result<()> {
        self.write_str(
            out,
            &format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", self.label),
        )?;
        self.write_start_tag(out, start)
    }

    fn open_element(
        &mut self,
        out: &mut dyn Write,
        _kind: ElementKind,
        start: &StartElement,
    ) -> Result<()> {
        self.write_start_tag(out, start)
    }

    fn text(&mut self, out: &mut dyn Write, text: &TextContent) -> Result<()> {
        let trimmed = text.raw.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.write_str(out, trimmed)
    }

    fn close_element(
        &mut self,
        out: &mut dyn Write,
        _kind: ElementKind,
        name: &str,
    ) -> Result<()> {
        self.write_str(out, &format!("</{name}>"))
    }

    fn end_document(&mut self, out: &mut dyn Write, name: &str) -> Result<()> {
        self.write_str(out, &format!("</{name}>\n"))
    }
}

/// Render an open tag with its attributes in source order.
///
/// Values are written as found in the source. A value that itself contains
/// a double quote (it was single-quoted in the source) keeps single quotes.
fn render_start_tag(start: &StartElement) -> String {
    let mut tag = format!("<{}", start.name);
    for attr in &start.attributes {
        let quote = if attr.raw.contains('"') { '\'' } else { '"' };
        tag.push(' ');
        tag.push_str(&attr.name);
        tag.push('=');
        tag.push(quote);
        tag.push_str(&attr.raw);
        tag.push(quote);
    }
    tag.push('>');
    tag
}
