//! Streaming splitter that routes corpus events into per-document sinks.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::create_corpus_hierarchy;
use super::registry::HierarchyRegistry;
use super::strategy::OutputStrategy;
use super::types::{ElementKind, SplitSummary, State};
use crate::error::{Result, SplitterError};
use crate::output::{AnnotationSink, DocumentSink, OutputLayout};
use crate::types::DocumentId;
use crate::xml::{SourceEvent, StartElement, TextContent};

/// Shared flag that stops a running split after the current document.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One open element.
#[derive(Debug)]
struct Frame {
    kind: ElementKind,
    name: String,
}

type ProgressCallback = Box<dyn FnMut(&Path)>;

/// Splits a corpus event stream into one output file per `<text>`.
///
/// Nesting is validated against the hierarchy registry using the nearest
/// enclosing element that is not a container. Everything inside a document
/// is forwarded to the output strategy `S`; the annotation element is
/// written once as `annotation.json`.
///
/// At most one document sink is open at a time. When an error aborts the
/// run the open sink is dropped, which discards its partial output.
pub struct DocumentSplitter<S: OutputStrategy> {
    registry: HierarchyRegistry,
    strategy: S,
    layout: OutputLayout,
    frames: Vec<Frame>,
    current: Option<DocumentSink>,
    written: HashSet<i64>,
    annotation: Option<PathBuf>,
    documents: usize,
    cancel: Option<CancelToken>,
    progress: Option<ProgressCallback>,
}

impl<S: OutputStrategy> DocumentSplitter<S> {
    /// Create a splitter writing into `layout` with the corpus hierarchy.
    #[must_use]
    pub fn new(strategy: S, layout: OutputLayout) -> Self {
        Self::with_registry(create_corpus_hierarchy(), strategy, layout)
    }

    /// Create a splitter with a custom hierarchy registry.
    #[must_use]
    pub fn with_registry(registry: HierarchyRegistry, strategy: S, layout: OutputLayout) -> Self {
        if strategy.format() != layout.format() {
            tracing::warn!(
                strategy = %strategy.format(),
                layout = %layout.format(),
                "Output strategy and layout disagree on format"
            );
        }

        Self {
            registry,
            strategy,
            layout,
            frames: Vec::new(),
            current: None,
            written: HashSet::new(),
            annotation: None,
            documents: 0,
            cancel: None,
            progress: None,
        }
    }

    /// Attach a cancel token, checked after every finished document.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a callback invoked with the path of every finished document.
    #[must_use]
    pub fn with_progress(mut self, progress: impl FnMut(&Path) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Current position in the text hierarchy.
    #[must_use]
    pub fn state(&self) -> State {
        State::from_kind(
            self.frames
                .iter()
                .rev()
                .map(|frame| frame.kind)
                .find(ElementKind::is_structural),
        )
    }

    /// Number of documents written so far.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Process one event from the source.
    pub fn handle(&mut self, event: SourceEvent) -> Result<()> {
        match event {
            SourceEvent::Open(start) => self.open(start),
            SourceEvent::Close { name } => self.close(&name),
            SourceEvent::Text(text) => self.text(&text),
        }
    }

    /// Feed a whole event stream and finish.
    pub fn run<I>(mut self, events: I) -> Result<SplitSummary>
    where
        I: IntoIterator<Item = Result<SourceEvent>>,
    {
        for event in events {
            self.handle(event?)?;
        }
        self.finish()
    }

    /// Complete the run after the last event.
    pub fn finish(self) -> Result<SplitSummary> {
        if let Some(frame) = self.frames.last() {
            return Err(SplitterError::malformed(
                0,
                format!("end of input inside <{}>", frame.name),
            ));
        }

        Ok(SplitSummary {
            documents: self.documents,
            annotation: self.annotation,
        })
    }

    /// Kind of the nearest open element that is not a container.
    fn parent_kind(&self) -> Option<ElementKind> {
        self.frames
            .iter()
            .rev()
            .map(|frame| frame.kind)
            .find(|kind| *kind != ElementKind::Container)
    }

    fn classify(&self, start: &StartElement) -> Result<ElementKind> {
        let parent = self.parent_kind();

        match self.registry.get_spec(&start.name) {
            Some(spec) if spec.allows_parent(parent) => Ok(spec.kind),
            None if self.current.is_some() => {
                tracing::debug!(tag = %start.name, "Unknown element inside text, mirroring as container");
                Ok(ElementKind::Container)
            }
            _ => Err(SplitterError::UnexpectedElement {
                tag: start.name.clone(),
                context: self.frames.last().map(|frame| frame.name.clone()),
            }),
        }
    }

    fn open(&mut self, start: StartElement) -> Result<()> {
        let kind = self.classify(&start)?;

        match kind {
            ElementKind::Annotation => self.capture_annotation(&start)?,
            ElementKind::Document => self.begin_document(&start)?,
            _ => {
                if let Some(sink) = self.current.as_mut() {
                    self.strategy.open_element(sink, kind, &start)?;
                }
            }
        }

        self.frames.push(Frame {
            kind,
            name: start.name,
        });
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let frame = match self.frames.pop() {
            Some(frame) if frame.name == name => frame,
            other => {
                return Err(SplitterError::UnexpectedElement {
                    tag: format!("/{name}"),
                    context: other.map(|frame| frame.name),
                })
            }
        };

        match frame.kind {
            ElementKind::Document => self.end_document(&frame.name),
            ElementKind::Annotation => Ok(()),
            kind => match self.current.as_mut() {
                Some(sink) => self.strategy.close_element(sink, kind, name),
                None => Ok(()),
            },
        }
    }

    fn text(&mut self, text: &TextContent) -> Result<()> {
        if text.is_blank() {
            return Ok(());
        }
        match self.current.as_mut() {
            Some(sink) => self.strategy.text(sink, text),
            None => Ok(()),
        }
    }

    fn capture_annotation(&mut self, start: &StartElement) -> Result<()> {
        if self.annotation.is_some() {
            return Err(SplitterError::DuplicateAnnotation);
        }

        let path = AnnotationSink::write(&self.layout, &start.to_json_map())?;
        tracing::debug!(path = %path.display(), "Wrote annotation");
        self.annotation = Some(path);
        Ok(())
    }

    fn begin_document(&mut self, start: &StartElement) -> Result<()> {
        let id = DocumentId::from_start(start)?;
        if self.written.contains(&id.value()) {
            return Err(SplitterError::DuplicateDocumentId(id.to_string()));
        }

        let mut sink = DocumentSink::open(&self.layout, id.clone())?;
        self.strategy.begin_document(&mut sink, start, &id)?;
        self.current = Some(sink);
        Ok(())
    }

    fn end_document(&mut self, name: &str) -> Result<()> {
        let Some(mut sink) = self.current.take() else {
            return Ok(());
        };

        self.strategy.end_document(&mut sink, name)?;
        let id = sink.id().value();
        let path = sink.close()?;

        tracing::debug!(id, path = %path.display(), "Wrote document");
        self.written.insert(id);
        self.documents += 1;

        if let Some(progress) = self.progress.as_mut() {
            progress(&path);
        }

        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            tracing::warn!(documents = self.documents, "Split cancelled");
            return Err(SplitterError::Cancelled);
        }
        Ok(())
    }
}
