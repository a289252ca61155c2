//! Configuration constants and validation functions for the splitter.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;

use crate::error::{Result, SplitterError};
use crate::xml::StartElement;

/// Corpus root element carrying the corpus-level metadata.
pub const ANNOTATION_TAG: &str = "annotation";

/// One corpus text; becomes one output file.
pub const DOCUMENT_TAG: &str = "text";

/// Paragraph inside a text.
pub const PARAGRAPH_TAG: &str = "paragraph";

/// Sentence inside a paragraph.
pub const SENTENCE_TAG: &str = "sentence";

/// Token inside a sentence.
pub const TOKEN_TAG: &str = "token";

/// Morphological variant (lemma) of a token.
pub const VARIANT_TAG: &str = "l";

/// Grammeme marker; its `v` attribute is one grammeme of the variant.
pub const GRAMMEME_TAG: &str = "g";

/// Text tag marker; its content is one entry of the document tag list.
pub const TAG_TAG: &str = "tag";

/// Sentence source marker; its content is the raw sentence text.
pub const SOURCE_TAG: &str = "source";

/// Wrapper elements that carry no data of their own.
pub const CONTAINER_TAGS: [&str; 5] = ["tags", "paragraphs", "tokens", "tfr", "v"];

/// File name of the corpus metadata artifact inside the output directory.
pub const ANNOTATION_FILE_NAME: &str = "annotation.json";

/// Default text encoding for markup output.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Document id pattern: an optionally signed decimal integer.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid regex"));

/// Per-document output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Reconstructed XML, one file per text.
    #[value(name = "xml")]
    Markup,

    /// One JSON record per text.
    #[value(name = "json")]
    Record,
}

impl OutputFormat {
    /// File extension for documents written in this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markup => "xml",
            Self::Record => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Validate a document id as written in the source.
///
/// The id names the output file, so it must be a plain integer; anything
/// else (including path separators) is rejected.
///
/// # Examples
/// ```
/// use corpus_splitter::config::validate_document_id;
///
/// assert_eq!(validate_document_id("5").unwrap(), 5);
/// assert!(validate_document_id("../5").is_err());
/// ```
pub fn validate_document_id(raw: &str) -> Result<i64> {
    let invalid = || SplitterError::InvalidAttribute {
        element: DOCUMENT_TAG.to_string(),
        attribute: "id".to_string(),
        value: raw.to_string(),
    };

    if !DOCUMENT_ID_PATTERN.is_match(raw) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}

/// Resolve an output encoding label.
///
/// Accepts any WHATWG encoding label that `encoding_rs` can encode into
/// directly. UTF-16 labels are rejected because `encoding_rs` only decodes
/// them.
///
/// # Examples
/// ```
/// use corpus_splitter::config::resolve_encoding;
///
/// assert_eq!(resolve_encoding("utf-8").unwrap().name(), "UTF-8");
/// assert_eq!(resolve_encoding("cp1251").unwrap().name(), "windows-1251");
/// assert!(resolve_encoding("klingon").is_err());
/// ```
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SplitterError::UnsupportedEncoding(label.to_string()))?;

    if encoding.output_encoding() != encoding {
        return Err(SplitterError::UnsupportedEncoding(label.to_string()));
    }

    Ok(encoding)
}

/// Strip characters that are unsafe in a single path component.
///
/// # Examples
/// ```
/// use corpus_splitter::config::sanitize_path_component;
///
/// assert_eq!(sanitize_path_component("0.11"), "0.11");
/// assert_eq!(sanitize_path_component("../etc"), "..etc");
/// ```
pub fn sanitize_path_component(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .collect()
}

/// Default output directory for a corpus: `v.<version>.<revision>`.
///
/// Returns `None` when the annotation lacks either attribute.
///
/// # Examples
/// ```
/// use corpus_splitter::config::default_output_dir;
/// use corpus_splitter::xml::StartElement;
///
/// let annotation = StartElement::new("annotation")
///     .with_attribute("version", "0.11")
///     .with_attribute("revision", "3709973");
/// assert_eq!(
///     default_output_dir(&annotation).unwrap().to_str(),
///     Some("v.0.11.3709973")
/// );
/// ```
pub fn default_output_dir(annotation: &StartElement) -> Option<PathBuf> {
    let version = sanitize_path_component(annotation.attribute("version")?);
    let revision = sanitize_path_component(annotation.attribute("revision")?);
    Some(PathBuf::from(format!("v.{version}.{revision}")))
}
