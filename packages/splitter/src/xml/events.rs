//! Forward-only structural event stream over a corpus file.
//!
//! Wraps [`quick_xml::Reader`] so the rest of the crate only ever sees three
//! owned event kinds: element open (with attributes), element close and text.
//! Nothing beyond the currently open element names is retained between
//! events, so memory stays bounded by nesting depth rather than corpus size.

use std::io::BufRead;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::ANNOTATION_TAG;
use crate::error::{Result, SplitterError};

/// A single attribute of an element, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name as written in the source.
    pub name: String,

    /// Value exactly as written between the quotes, entities still escaped.
    pub raw: String,

    /// Value with entity and character references resolved.
    pub value: String,
}

/// An element-open event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Qualified element name.
    pub name: String,

    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    /// Create an element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute whose raw and unescaped forms are identical.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.attributes.push(Attribute {
            name: name.into(),
            raw: escape(&value).into_owned(),
            value,
        });
        self
    }

    /// Look up the unescaped value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Attributes as a flat JSON object, preserving source order.
    #[must_use]
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.attributes
            .iter()
            .map(|attr| (attr.name.clone(), serde_json::Value::from(attr.value.as_str())))
            .collect()
    }
}

/// A text-content event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    /// Text as written in the source, entities still escaped.
    pub raw: String,

    /// Text with entity and character references resolved.
    pub unescaped: String,
}

impl TextContent {
    /// Create text content from an unescaped string.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let unescaped = text.into();
        Self {
            raw: escape(&unescaped).into_owned(),
            unescaped,
        }
    }

    /// Whether the text is nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.unescaped.trim().is_empty()
    }
}

/// Structural events delivered to the splitter, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// An element was opened.
    Open(StartElement),

    /// An element was closed.
    Close { name: String },

    /// Character data between tags.
    Text(TextContent),
}

/// Lazy, single-pass iterator of [`SourceEvent`]s over an XML byte stream.
///
/// Self-closing elements are expanded into an `Open` followed by a `Close`.
/// Comments, processing instructions, the XML declaration and doctype are
/// skipped. The first error ends the stream.
pub struct EventSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    open: Vec<String>,
    done: bool,
}

impl<R: BufRead> EventSource<R> {
    /// Create a new event source over a buffered reader.
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            done: false,
        }
    }

    /// Current nesting depth of the stream.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Byte offset of the reader in the input.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn next_event(&mut self) -> Result<Option<SourceEvent>> {
        loop {
            self.buf.clear();
            let position = self.byte_position();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| SplitterError::malformed(position, e))?;

            match event {
                Event::Start(start) => {
                    let element = read_start(&start, position)?;
                    self.open.push(element.name.clone());
                    return Ok(Some(SourceEvent::Open(element)));
                }
                Event::End(end) => {
                    let name = decode_utf8(end.name().as_ref(), position)?;
                    self.open.pop();
                    return Ok(Some(SourceEvent::Close { name }));
                }
                Event::Text(text) => {
                    let raw = decode_utf8(&text, position)?;
                    let unescaped = unescape(&raw)
                        .map_err(|e| SplitterError::malformed(position, e))?
                        .into_owned();
                    return Ok(Some(SourceEvent::Text(TextContent { raw, unescaped })));
                }
                Event::CData(cdata) => {
                    let text = decode_utf8(&cdata, position)?;
                    return Ok(Some(SourceEvent::Text(TextContent::new(text))));
                }
                Event::Eof => {
                    if let Some(name) = self.open.last() {
                        return Err(SplitterError::malformed(
                            self.reader.buffer_position() as u64,
                            format!("unexpected end of input, <{name}> is not closed"),
                        ));
                    }
                    return Ok(None);
                }
                // Self-closing tags are expanded by the reader configuration,
                // so only comments, PIs, the declaration and doctype land here.
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for EventSource<R> {
    type Item = Result<SourceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read the attributes of the corpus root `<annotation>` element.
///
/// Stops at the first element-open event: returns it when it is the
/// annotation element and `None` otherwise. Used to derive the default output
/// directory before the real pass starts.
pub fn peek_annotation<R: BufRead>(inner: R) -> Result<Option<StartElement>> {
    for event in EventSource::new(inner) {
        if let SourceEvent::Open(start) = event? {
            return Ok((start.name == ANNOTATION_TAG).then_some(start));
        }
    }
    Ok(None)
}

fn read_start(start: &BytesStart<'_>, position: u64) -> Result<StartElement> {
    let name = decode_utf8(start.name().as_ref(), position)?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| SplitterError::malformed(position, e))?;
        let raw = decode_utf8(&attr.value, position)?;
        let value = unescape(&raw)
            .map_err(|e| SplitterError::malformed(position, e))?
            .into_owned();
        attributes.push(Attribute {
            name: decode_utf8(attr.key.as_ref(), position)?,
            raw,
            value,
        });
    }

    Ok(StartElement { name, attributes })
}

fn decode_utf8(bytes: &[u8], position: u64) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| SplitterError::malformed(position, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(xml: &str) -> Result<Vec<SourceEvent>> {
        EventSource::new(xml.as_bytes()).collect()
    }

    #[test]
    fn test_open_close_text_in_order() {
        let events = collect(r#"<a x="1"><b>hi</b></a>"#).unwrap();
        assert_eq!(
            events,
            vec![
                SourceEvent::Open(StartElement::new("a").with_attribute("x", "1")),
                SourceEvent::Open(StartElement::new("b")),
                SourceEvent::Text(TextContent::new("hi")),
                SourceEvent::Close {
                    name: "b".to_string()
                },
                SourceEvent::Close {
                    name: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_element_is_expanded() {
        let events = collect(r#"<l><g v="NOUN"/></l>"#).unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[1], SourceEvent::Open(s) if s.attribute("v") == Some("NOUN")));
        assert!(matches!(&events[2], SourceEvent::Close { name } if name == "g"));
    }

    #[test]
    fn test_skips_declaration_and_comments() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- c --><a/>";
        let events = collect(xml).unwrap();
        let opens = events
            .iter()
            .filter(|e| matches!(e, SourceEvent::Open(_)))
            .count();
        assert_eq!(opens, 1);
    }

    #[test]
    fn test_attribute_keeps_raw_and_unescaped_value() {
        let events = collect(r#"<text name="A &amp; B"/>"#).unwrap();
        let SourceEvent::Open(start) = &events[0] else {
            panic!("expected open event");
        };
        assert_eq!(start.attributes[0].raw, "A &amp; B");
        assert_eq!(start.attributes[0].value, "A & B");
        assert_eq!(start.attribute("name"), Some("A & B"));
    }

    #[test]
    fn test_text_keeps_raw_and_unescaped() {
        let events = collect("<source>a &lt; b</source>").unwrap();
        let SourceEvent::Text(text) = &events[1] else {
            panic!("expected text event");
        };
        assert_eq!(text.raw, "a &lt; b");
        assert_eq!(text.unescaped, "a < b");
    }

    #[test]
    fn test_cdata_is_delivered_as_text() {
        let events = collect("<source><![CDATA[x < y]]></source>").unwrap();
        let SourceEvent::Text(text) = &events[1] else {
            panic!("expected text event");
        };
        assert_eq!(text.unescaped, "x < y");
        assert_eq!(text.raw, "x &lt; y");
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        let result = collect("<a><b></a>");
        assert!(matches!(
            result,
            Err(SplitterError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_unclosed_element_at_eof_is_malformed() {
        let err = collect("<annotation><text id=\"1\">").unwrap_err();
        assert!(err.to_string().contains("<text> is not closed"));
    }

    #[test]
    fn test_stream_is_fused_after_error() {
        let mut source = EventSource::new("<a></b>".as_bytes());
        assert!(matches!(source.next(), Some(Ok(SourceEvent::Open(_)))));
        assert!(matches!(source.next(), Some(Err(_))));
        assert!(source.next().is_none());
    }

    #[test]
    fn test_depth_tracks_open_elements() {
        let mut source = EventSource::new("<a><b/></a>".as_bytes());
        source.next();
        assert_eq!(source.depth(), 1);
        source.next();
        assert_eq!(source.depth(), 2);
        source.next();
        assert_eq!(source.depth(), 1);
    }

    #[test]
    fn test_peek_annotation() {
        let xml = r#"<annotation version="0.11" revision="3709973"><text id="1"/></annotation>"#;
        let annotation = peek_annotation(xml.as_bytes()).unwrap().unwrap();
        assert_eq!(annotation.attribute("version"), Some("0.11"));
        assert_eq!(annotation.attribute("revision"), Some("3709973"));
    }

    #[test]
    fn test_peek_annotation_other_root() {
        let xml = r#"<corpus><annotation version="1"/></corpus>"#;
        assert!(peek_annotation(xml.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_to_json_map_preserves_order() {
        let start = StartElement::new("annotation")
            .with_attribute("version", "0.12")
            .with_attribute("revision", "4063847");
        let map = start.to_json_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["version", "revision"]);
    }

    #[test]
    fn test_byte_position_advances() {
        let mut source = EventSource::new(r#"<a><b/></a>"#.as_bytes());
        assert_eq!(source.byte_position(), 0);
        source.next();
        assert_eq!(source.byte_position(), 3);
    }

    #[test]
    fn test_malformed_input_reports_position() {
        let err = collect("<a><b></a>").unwrap_err();
        assert!(matches!(err, SplitterError::MalformedInput { position, .. } if position >= 6));
    }
}
