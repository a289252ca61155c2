//! Core data types for the splitter.
//!
//! The record types mirror the OpenCorpora text hierarchy
//! (text → paragraph → sentence → token → lemma) and serialize to the JSON
//! record layout written per document. Field order is part of the output
//! format.

use std::fmt;

use serde::Serialize;

use crate::config::validate_document_id;
use crate::error::Result;
use crate::xml::{int_attribute, required_attribute, string_attribute, StartElement};

/// Identifier of one corpus text.
///
/// Keeps the id exactly as written in the source, which names the output
/// file, next to its integer value, which goes into the JSON record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    raw: String,
    value: i64,
}

impl DocumentId {
    /// Read and validate the `id` attribute of a `<text>` element.
    pub fn from_start(start: &StartElement) -> Result<Self> {
        let raw = required_attribute(start, "id")?.trim().to_string();
        let value = validate_document_id(&raw)?;
        Ok(Self { raw, value })
    }

    /// The id as written in the source (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The integer value of the id.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Morphological variant (lemma) of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: i64,
    /// Base form.
    pub t: String,
    pub grammemes: Vec<String>,
}

impl Variant {
    /// Build a variant from an `<l>` element.
    pub fn from_start(start: &StartElement) -> Result<Self> {
        Ok(Self {
            id: int_attribute(start, "id", 0)?,
            t: string_attribute(start, "t"),
            grammemes: Vec::new(),
        })
    }

    /// Record a grammeme; empty values are dropped.
    pub fn add_grammeme(&mut self, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.grammemes.push(value.to_string());
        }
    }
}

/// A token with its surface text and candidate variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Token {
    pub id: i64,
    pub text: String,
    pub variants: Vec<Variant>,
}

impl Token {
    /// Build a token from a `<token>` element.
    pub fn from_start(start: &StartElement) -> Result<Self> {
        Ok(Self {
            id: int_attribute(start, "id", 0)?,
            text: string_attribute(start, "text"),
            variants: Vec::new(),
        })
    }
}

/// A sentence with its source excerpt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub id: i64,
    pub source: String,
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Build a sentence from a `<sentence>` element.
    pub fn from_start(start: &StartElement) -> Result<Self> {
        Ok(Self {
            id: int_attribute(start, "id", 0)?,
            source: String::new(),
            tokens: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub id: i64,
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    /// Build a paragraph from a `<paragraph>` element.
    pub fn from_start(start: &StartElement) -> Result<Self> {
        Ok(Self {
            id: int_attribute(start, "id", 0)?,
            sentences: Vec::new(),
        })
    }
}

/// One corpus text, serialized as one JSON record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: i64,
    pub parent: i64,
    pub name: String,
    pub tags: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Build a document from a `<text>` element and its validated id.
    pub fn from_start(start: &StartElement, id: &DocumentId) -> Result<Self> {
        Ok(Self {
            id: id.value(),
            parent: int_attribute(start, "parent", 0)?,
            name: string_attribute(start, "name"),
            tags: Vec::new(),
            paragraphs: Vec::new(),
        })
    }
}
