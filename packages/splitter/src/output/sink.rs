//! Document and annotation sinks.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::file::AtomicFile;
use crate::config::{OutputFormat, ANNOTATION_FILE_NAME};
use crate::error::{Result, SplitterError};
use crate::types::DocumentId;

/// Where output files go for one run.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    format: OutputFormat,
}

impl OutputLayout {
    /// Create a layout rooted at `dir` for the given document format.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-document output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// `<dir>/<id>.<ext>`
    #[must_use]
    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", id.as_str(), self.format.extension()))
    }

    /// `<dir>/annotation.json`, whatever the document format.
    #[must_use]
    pub fn annotation_path(&self) -> PathBuf {
        self.dir.join(ANNOTATION_FILE_NAME)
    }
}

/// Output resource for exactly one document.
///
/// Opened when a `<text>` element starts and closed when it ends. Dropping an
/// open sink (the abort path) releases it and discards the partial file.
#[derive(Debug)]
pub struct DocumentSink {
    id: DocumentId,
    file: AtomicFile,
}

impl DocumentSink {
    /// Open the sink for a document.
    ///
    /// An already existing output file for this id is reported as
    /// `DuplicateDocumentId`.
    pub fn open(layout: &OutputLayout, id: DocumentId) -> Result<Self> {
        let file = AtomicFile::create(layout.document_path(&id)).map_err(|e| match e {
            SplitterError::ResourceCreation { source, .. }
                if source.kind() == io::ErrorKind::AlreadyExists =>
            {
                SplitterError::DuplicateDocumentId(id.to_string())
            }
            other => other,
        })?;

        tracing::debug!(id = %id, path = %file.path().display(), "Opened document sink");
        Ok(Self { id, file })
    }

    /// Id of the document being written.
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Flush and publish the document. Returns the final path.
    pub fn close(self) -> Result<PathBuf> {
        self.file.commit()
    }
}

impl Write for DocumentSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Writer for the corpus-level `annotation.json`.
///
/// Always JSON, also when documents are written as XML.
pub struct AnnotationSink;

impl AnnotationSink {
    /// Write the annotation attributes as one flat JSON object.
    pub fn write(
        layout: &OutputLayout,
        attributes: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<PathBuf> {
        let mut file = AtomicFile::create(layout.annotation_path())?;
        serde_json::to_writer_pretty(&mut file, attributes)?;
        file.write_all(b"\n")?;
        file.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::StartElement;
    use std::fs;
    use tempfile::tempdir;

    fn document_id(raw: &str) -> DocumentId {
        DocumentId::from_start(&StartElement::new("text").with_attribute("id", raw)).unwrap()
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("out", OutputFormat::Markup);
        assert_eq!(
            layout.document_path(&document_id("12")),
            Path::new("out").join("12.xml")
        );
        assert_eq!(
            layout.annotation_path(),
            Path::new("out").join("annotation.json")
        );

        let layout = OutputLayout::new("out", OutputFormat::Record);
        assert_eq!(
            layout.document_path(&document_id("12")),
            Path::new("out").join("12.json")
        );
    }

    #[test]
    fn test_document_sink_write_and_close() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), OutputFormat::Record);

        let mut sink = DocumentSink::open(&layout, document_id("5")).unwrap();
        assert_eq!(sink.id().as_str(), "5");
        sink.write_all(b"{\"id\":5}").unwrap();
        let path = sink.close().unwrap();

        assert_eq!(path, dir.path().join("5.json"));
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"id\":5}");
    }

    #[test]
    fn test_document_sink_existing_file_is_duplicate() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), OutputFormat::Markup);
        fs::write(dir.path().join("9.xml"), "previous run").unwrap();

        let err = DocumentSink::open(&layout, document_id("9")).unwrap_err();
        assert!(matches!(err, SplitterError::DuplicateDocumentId(ref id) if id == "9"));
    }

    #[test]
    fn test_annotation_sink_writes_flat_object() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), OutputFormat::Markup);
        let attributes = StartElement::new("annotation")
            .with_attribute("version", "0.11")
            .with_attribute("revision", "3709973")
            .to_json_map();

        let path = AnnotationSink::write(&layout, &attributes).unwrap();
        assert_eq!(path, dir.path().join("annotation.json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["version"], "0.11");
        assert_eq!(value["revision"], "3709973");
    }
}
