//! Types for the document splitting state machine.

use std::fmt;

/// Role an element plays in the corpus hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Corpus root carrying version/revision metadata.
    Annotation,
    /// One text; the unit of output.
    Document,
    Paragraph,
    Sentence,
    Token,
    /// Lemma variant of a token.
    Variant,
    /// Grammeme marker attached to a variant.
    Grammeme,
    /// Text tag marker.
    Tag,
    /// Sentence source marker.
    Source,
    /// Wrapper without data of its own; transparent for nesting checks.
    Container,
}

impl ElementKind {
    /// Whether the element is a level of the text hierarchy.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Document | Self::Paragraph | Self::Sentence | Self::Token | Self::Variant
        )
    }

    /// Name used in error messages and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::Document => "document",
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Token => "token",
            Self::Variant => "variant",
            Self::Grammeme => "grammeme",
            Self::Tag => "tag",
            Self::Source => "source",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative specification of an element in the hierarchy.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    /// XML tag name.
    pub tag: String,

    /// What the element means to the splitter.
    pub kind: ElementKind,

    /// Kinds allowed as the nearest non-container ancestor.
    pub parents: Vec<ElementKind>,

    /// Whether the element may appear with no ancestor at all.
    pub at_root: bool,
}

impl ElementSpec {
    /// Create a new element specification.
    #[must_use]
    pub fn new(tag: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            tag: tag.into(),
            kind,
            parents: Vec::new(),
            at_root: false,
        }
    }

    /// Set the allowed parent kinds.
    #[must_use]
    pub fn with_parents(mut self, parents: impl IntoIterator<Item = ElementKind>) -> Self {
        self.parents = parents.into_iter().collect();
        self
    }

    /// Set whether the element may be a root element.
    #[must_use]
    pub fn with_root(mut self, at_root: bool) -> Self {
        self.at_root = at_root;
        self
    }

    /// Check whether the element may appear under `parent`.
    ///
    /// `None` means no enclosing element.
    #[must_use]
    pub fn allows_parent(&self, parent: Option<ElementKind>) -> bool {
        match parent {
            None => self.at_root,
            Some(kind) => self.parents.contains(&kind),
        }
    }
}

/// Position of the splitter in the text hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between documents.
    Idle,
    InDocument,
    InParagraph,
    InSentence,
    InToken,
    InVariant,
}

impl State {
    /// State corresponding to the innermost open structural element.
    #[must_use]
    pub fn from_kind(kind: Option<ElementKind>) -> Self {
        match kind {
            Some(ElementKind::Document) => Self::InDocument,
            Some(ElementKind::Paragraph) => Self::InParagraph,
            Some(ElementKind::Sentence) => Self::InSentence,
            Some(ElementKind::Token) => Self::InToken,
            Some(ElementKind::Variant) => Self::InVariant,
            _ => Self::Idle,
        }
    }
}

/// Result of a completed split run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Number of document files written.
    pub documents: usize,

    /// Path of the annotation artifact, if the corpus had one.
    pub annotation: Option<std::path::PathBuf>,
}
