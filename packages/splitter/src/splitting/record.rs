//! Record strategy: builds each text as a typed record and writes it as JSON.

use std::io::Write;

use super::strategy::OutputStrategy;
use super::types::ElementKind;
use crate::config::OutputFormat;
use crate::error::{Result, SplitterError};
use crate::types::{Document, DocumentId, Paragraph, Sentence, Token, Variant};
use crate::xml::{StartElement, TextContent};

/// Where character data currently goes.
#[derive(Debug, Default, PartialEq, Eq)]
enum Routing {
    #[default]
    None,
    /// Inside `<tag>`: collected into one entry of the document tags.
    Tag(String),
    /// Inside `<source>`: collected into the current sentence source.
    Source(String),
}

/// Open builder for one level below the document.
#[derive(Debug)]
enum Frame {
    Paragraph(Paragraph),
    Sentence(Sentence),
    Token(Token),
    Variant(Variant),
}

impl Frame {
    fn kind(&self) -> ElementKind {
        match self {
            Self::Paragraph(_) => ElementKind::Paragraph,
            Self::Sentence(_) => ElementKind::Sentence,
            Self::Token(_) => ElementKind::Token,
            Self::Variant(_) => ElementKind::Variant,
        }
    }
}

/// Builds a [`Document`] from typed frames and serializes it on close.
///
/// Frames are pushed on open and popped into their parent on close, so only
/// the builders on the path from the document to the current element are
/// alive at any time.
#[derive(Debug, Default)]
pub struct RecordStrategy {
    document: Option<Document>,
    frames: Vec<Frame>,
    routing: Routing,
}

impl RecordStrategy {
    /// Create a new record strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn document_mut(&mut self, tag: &str) -> Result<&mut Document> {
        self.document
            .as_mut()
            .ok_or_else(|| unexpected(tag, None))
    }

    fn current_variant(&mut self, tag: &str) -> Result<&mut Variant> {
        match self.frames.last_mut() {
            Some(Frame::Variant(variant)) => Ok(variant),
            other => Err(unexpected(tag, other.map(|f| f.kind()))),
        }
    }

    fn current_sentence(&mut self, tag: &str) -> Result<&mut Sentence> {
        match self.frames.last_mut() {
            Some(Frame::Sentence(sentence)) => Ok(sentence),
            other => Err(unexpected(tag, other.map(|f| f.kind()))),
        }
    }

    /// Pop the innermost frame and append it to its parent.
    fn close_frame(&mut self, kind: ElementKind, tag: &str) -> Result<()> {
        let frame = match self.frames.pop() {
            Some(frame) if frame.kind() == kind => frame,
            other => return Err(unexpected(tag, other.map(|f| f.kind()))),
        };

        match (frame, self.frames.last_mut()) {
            (Frame::Paragraph(paragraph), None) => {
                self.document
                    .as_mut()
                    .ok_or_else(|| unexpected(tag, None))?
                    .paragraphs
                    .push(paragraph);
            }
            (Frame::Sentence(sentence), Some(Frame::Paragraph(paragraph))) => {
                paragraph.sentences.push(sentence);
            }
            (Frame::Token(token), Some(Frame::Sentence(sentence))) => {
                sentence.tokens.push(token);
            }
            (Frame::Variant(variant), Some(Frame::Token(token))) => {
                token.variants.push(variant);
            }
            (_, parent) => {
                let parent = parent.map(|f| f.kind());
                return Err(unexpected(tag, parent));
            }
        }

        Ok(())
    }
}

impl OutputStrategy for RecordStrategy {
    fn format(&self) -> OutputFormat {
        OutputFormat::Record
    }

    fn begin_document(
        &mut self,
        _out: &mut dyn Write,
        start: &StartElement,
        id: &DocumentId,
    ) -> Result<()> {
        self.frames.clear();
        self.routing = Routing::None;
        self.document = Some(Document::from_start(start, id)?);
        Ok(())
    }

    fn open_element(
        &mut self,
        _out: &mut dyn Write,
        kind: ElementKind,
        start: &StartElement,
    ) -> Result<()> {
        match kind {
            ElementKind::Paragraph => {
                let paragraph = Paragraph::from_start(start)?;
                self.frames.push(Frame::Paragraph(paragraph));
            }
            ElementKind::Sentence => {
                let sentence = Sentence::from_start(start)?;
                self.frames.push(Frame::Sentence(sentence));
            }
            ElementKind::Token => {
                let token = Token::from_start(start)?;
                self.frames.push(Frame::Token(token));
            }
            ElementKind::Variant => {
                let variant = Variant::from_start(start)?;
                self.frames.push(Frame::Variant(variant));
            }
            ElementKind::Grammeme => {
                let value = start.attribute("v").unwrap_or_default();
                self.current_variant(&start.name)?.add_grammeme(value);
            }
            ElementKind::Tag => self.routing = Routing::Tag(String::new()),
            ElementKind::Source => self.routing = Routing::Source(String::new()),
            ElementKind::Annotation | ElementKind::Document | ElementKind::Container => {}
        }
        Ok(())
    }

    fn text(&mut self, _out: &mut dyn Write, text: &TextContent) -> Result<()> {
        // Kept untrimmed so whitespace between fragments survives
        match &mut self.routing {
            Routing::Tag(buf) | Routing::Source(buf) => buf.push_str(&text.unescaped),
            Routing::None => {}
        }
        Ok(())
    }

    fn close_element(
        &mut self,
        _out: &mut dyn Write,
        kind: ElementKind,
        name: &str,
    ) -> Result<()> {
        match kind {
            ElementKind::Paragraph
            | ElementKind::Sentence
            | ElementKind::Token
            | ElementKind::Variant => self.close_frame(kind, name)?,
            ElementKind::Tag => {
                if let Routing::Tag(tag) = std::mem::take(&mut self.routing) {
                    let tag = tag.trim();
                    if !tag.is_empty() {
                        self.document_mut(name)?.tags.push(tag.to_string());
                    }
                }
            }
            ElementKind::Source => {
                if let Routing::Source(source) = std::mem::take(&mut self.routing) {
                    self.current_sentence(name)?.source.push_str(source.trim());
                }
            }
            ElementKind::Annotation
            | ElementKind::Document
            | ElementKind::Grammeme
            | ElementKind::Container => {}
        }
        Ok(())
    }

    fn end_document(&mut self, out: &mut dyn Write, name: &str) -> Result<()> {
        if let Some(frame) = self.frames.last() {
            return Err(unexpected(name, Some(frame.kind())));
        }

        let document = self.document.take().ok_or_else(|| unexpected(name, None))?;
        self.routing = Routing::None;

        serde_json::to_writer(&mut *out, &document)?;
        Ok(())
    }
}

fn unexpected(tag: &str, context: Option<ElementKind>) -> SplitterError {
    SplitterError::UnexpectedElement {
        tag: tag.to_string(),
        context: context.map(|kind| kind.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn start(name: &str, attributes: &[(&str, &str)]) -> StartElement {
        attributes
            .iter()
            .fold(StartElement::new(name), |s, (k, v)| s.with_attribute(*k, *v))
    }

    /// Feed `(kind, element)` opens and closes through the strategy.
    struct Driver {
        strategy: RecordStrategy,
        out: Vec<u8>,
    }

    impl Driver {
        fn begin(attributes: &[(&str, &str)]) -> Self {
            let mut strategy = RecordStrategy::new();
            let mut out = Vec::new();
            let text = start("text", attributes);
            let id = DocumentId::from_start(&text).unwrap();
            strategy.begin_document(&mut out, &text, &id).unwrap();
            Self { strategy, out }
        }

        fn open(&mut self, kind: ElementKind, name: &str, attributes: &[(&str, &str)]) -> &mut Self {
            self.strategy
                .open_element(&mut self.out, kind, &start(name, attributes))
                .unwrap();
            self
        }

        fn text(&mut self, text: &str) -> &mut Self {
            self.strategy
                .text(&mut self.out, &TextContent::new(text))
                .unwrap();
            self
        }

        fn close(&mut self, kind: ElementKind, name: &str) -> &mut Self {
            self.strategy.close_element(&mut self.out, kind, name).unwrap();
            self
        }

        fn finish(&mut self) -> String {
            self.strategy.end_document(&mut self.out, "text").unwrap();
            String::from_utf8(std::mem::take(&mut self.out)).unwrap()
        }
    }

    #[test]
    fn test_single_sentence_document() {
        use ElementKind::{Grammeme, Paragraph, Sentence, Source, Token, Variant};

        let json = Driver::begin(&[("id", "5"), ("parent", "0")])
            .open(Paragraph, "paragraph", &[("id", "0")])
            .open(Sentence, "sentence", &[("id", "0")])
            .open(Source, "source", &[])
            .text("Hi.")
            .close(Source, "source")
            .open(Token, "token", &[("id", "0"), ("text", "Hi")])
            .open(Variant, "l", &[("id", "0"), ("t", "hi")])
            .open(Grammeme, "g", &[("v", "NOUN")])
            .close(Grammeme, "g")
            .open(Grammeme, "g", &[("v", "sing")])
            .close(Grammeme, "g")
            .close(Variant, "l")
            .close(Token, "token")
            .close(Sentence, "sentence")
            .close(Paragraph, "paragraph")
            .finish();

        assert_eq!(
            json,
            r#"{"id":5,"parent":0,"name":"","tags":[],"paragraphs":[{"id":0,"sentences":[{"id":0,"source":"Hi.","tokens":[{"id":0,"text":"Hi","variants":[{"id":0,"t":"hi","grammemes":["NOUN","sing"]}]}]}]}]}"#
        );
    }

    #[test]
    fn test_tags_are_collected_in_order() {
        use ElementKind::{Container, Tag};

        let json = Driver::begin(&[("id", "1"), ("name", "Частный корреспондент")])
            .open(Container, "tags", &[])
            .open(Tag, "tag", &[])
            .text("Год:2008")
            .close(Tag, "tag")
            .open(Tag, "tag", &[])
            .text("   ")
            .close(Tag, "tag")
            .open(Tag, "tag", &[])
            .text(" url:http://www.chaskor.ru ")
            .close(Tag, "tag")
            .close(Container, "tags")
            .finish();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Частный корреспондент");
        assert_eq!(
            value["tags"],
            serde_json::json!(["Год:2008", "url:http://www.chaskor.ru"])
        );
    }

    #[test]
    fn test_split_marker_text_keeps_inner_whitespace() {
        use ElementKind::{Container, Paragraph, Sentence, Source, Tag};

        let json = Driver::begin(&[("id", "8")])
            .open(Tag, "tag", &[])
            .text(" Тема:")
            .open(Container, "b", &[])
            .close(Container, "b")
            .text(" Медиа ")
            .close(Tag, "tag")
            .open(Paragraph, "paragraph", &[("id", "1")])
            .open(Sentence, "sentence", &[("id", "1")])
            .open(Source, "source", &[])
            .text("  a ")
            .text("b  ")
            .close(Source, "source")
            .close(Sentence, "sentence")
            .close(Paragraph, "paragraph")
            .finish();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tags"], serde_json::json!(["Тема: Медиа"]));
        assert_eq!(value["paragraphs"][0]["sentences"][0]["source"], "a b");
    }

    #[test]
    fn test_empty_grammeme_is_dropped() {
        use ElementKind::{Grammeme, Paragraph, Sentence, Token, Variant};

        let json = Driver::begin(&[("id", "2")])
            .open(Paragraph, "paragraph", &[])
            .open(Sentence, "sentence", &[])
            .open(Token, "token", &[])
            .open(Variant, "l", &[])
            .open(Grammeme, "g", &[("v", "")])
            .close(Grammeme, "g")
            .open(Grammeme, "g", &[])
            .close(Grammeme, "g")
            .open(Grammeme, "g", &[("v", "PNCT")])
            .close(Grammeme, "g")
            .close(Variant, "l")
            .close(Token, "token")
            .close(Sentence, "sentence")
            .close(Paragraph, "paragraph")
            .finish();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let grammemes = &value["paragraphs"][0]["sentences"][0]["tokens"][0]["variants"][0]["grammemes"];
        assert_eq!(grammemes, &serde_json::json!(["PNCT"]));
    }

    #[test]
    fn test_text_outside_markers_is_ignored() {
        use ElementKind::{Paragraph, Sentence};

        let json = Driver::begin(&[("id", "3")])
            .text("stray")
            .open(Paragraph, "paragraph", &[("id", "1")])
            .open(Sentence, "sentence", &[("id", "1")])
            .text("also stray")
            .close(Sentence, "sentence")
            .close(Paragraph, "paragraph")
            .finish();

        assert_eq!(
            json,
            r#"{"id":3,"parent":0,"name":"","tags":[],"paragraphs":[{"id":1,"sentences":[{"id":1,"source":"","tokens":[]}]}]}"#
        );
    }

    #[test]
    fn test_grammeme_outside_variant_is_unexpected() {
        let mut driver = Driver::begin(&[("id", "4")]);
        driver.open(ElementKind::Paragraph, "paragraph", &[]);
        let err = driver
            .strategy
            .open_element(&mut driver.out, ElementKind::Grammeme, &start("g", &[("v", "X")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unexpected element <g> in paragraph");
    }

    #[test]
    fn test_unclosed_frame_at_document_end() {
        let mut driver = Driver::begin(&[("id", "6")]);
        driver.open(ElementKind::Paragraph, "paragraph", &[]);
        let err = driver
            .strategy
            .end_document(&mut driver.out, "text")
            .unwrap_err();
        assert!(matches!(err, SplitterError::UnexpectedElement { .. }));
        assert!(driver.out.is_empty());
    }

    #[test]
    fn test_invalid_id_attribute() {
        let mut driver = Driver::begin(&[("id", "7")]);
        let err = driver
            .strategy
            .open_element(
                &mut driver.out,
                ElementKind::Paragraph,
                &start("paragraph", &[("id", "first")]),
            )
            .unwrap_err();
        assert!(matches!(err, SplitterError::InvalidAttribute { .. }));
    }
}
