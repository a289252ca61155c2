//! Output files: per-document sinks and the corpus annotation artifact.

mod file;
mod sink;

pub use file::AtomicFile;
pub use sink::{AnnotationSink, DocumentSink, OutputLayout};
