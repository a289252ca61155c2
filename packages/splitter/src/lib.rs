//! Corpus Splitter - Split an OpenCorpora corpus dump into one file per text.
//!
//! The corpus is read as a stream of XML events in a single forward pass.
//! Every `<text>` element is written to `<id>.xml` (mirrored markup) or
//! `<id>.json` (a typed record), and the attributes of the `<annotation>`
//! root go to `annotation.json`.
//!
//! # Example
//!
//! ```
//! use corpus_splitter::config::{validate_document_id, OutputFormat};
//!
//! assert_eq!(validate_document_id("42").unwrap(), 42);
//! assert_eq!(OutputFormat::Record.extension(), "json");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Tag names, constants and validation
//! - [`types`]: Document record types (text, paragraph, sentence, token, lemma)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Streaming XML event source
//! - [`output`]: Atomic per-document and annotation sinks
//! - [`splitting`]: Hierarchy validation and output strategies
//! - [`splitter`]: Run orchestration and output directory lifecycle
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod splitter;
pub mod splitting;
pub mod types;
pub mod xml;

// Re-export main functions
pub use splitter::{run_split, split_corpus, OutputDecision, SplitOptions, SplitOutcome};

// Re-export commonly used items
pub use config::OutputFormat;
pub use error::{Result, SplitterError};
pub use splitting::{CancelToken, DocumentSplitter, SplitSummary};
pub use types::{Document, DocumentId, Paragraph, Sentence, Token, Variant};
