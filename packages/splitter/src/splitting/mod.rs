//! Document splitting for OpenCorpora corpora.
//!
//! A single forward pass over the corpus events validates nesting against
//! the text hierarchy and writes every `<text>` element to its own file,
//! either mirrored as markup or built into a JSON record.

mod config;
mod engine;
mod markup;
mod record;
mod registry;
mod strategy;
mod types;

pub use config::create_corpus_hierarchy;
pub use engine::{CancelToken, DocumentSplitter};
pub use markup::MarkupStrategy;
pub use record::RecordStrategy;
pub use registry::HierarchyRegistry;
pub use strategy::OutputStrategy;
pub use types::{ElementKind, ElementSpec, SplitSummary, State};
