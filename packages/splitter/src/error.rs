//! Error types for the splitter.
//!
//! Every variant is fatal for the current run: the orchestrator stops at the
//! first error and reports it. The overwrite decision on an existing output
//! directory is not an error, see [`crate::splitter::OutputDecision`].

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the splitter library.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// The corpus file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The event stream could not complete well-formed nesting.
    #[error("Malformed input at byte {position}: {message}")]
    MalformedInput { position: u64, message: String },

    /// An element appeared where the corpus hierarchy does not allow it.
    #[error("Unexpected element <{tag}>{}", .context.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    UnexpectedElement {
        tag: String,
        context: Option<String>,
    },

    /// A document id was already written in this run or exists on disk.
    #[error("Duplicate document id: {0}")]
    DuplicateDocumentId(String),

    /// A second annotation element was found.
    #[error("Duplicate <annotation> element: corpus metadata may only appear once")]
    DuplicateAnnotation,

    /// An output file could not be created.
    #[error("Failed to create {}: {source}", .path.display())]
    ResourceCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required attribute is absent.
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute value could not be interpreted.
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    /// The requested output encoding is unknown or cannot be written.
    #[error("Unsupported output encoding: '{0}'")]
    UnsupportedEncoding(String),

    /// No output directory given and none can be derived from the corpus.
    #[error("No <annotation> element in {}; use -o/--output to set the output path", .0.display())]
    MissingAnnotation(PathBuf),

    /// The run was cancelled between two documents.
    #[error("Split cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl SplitterError {
    /// Build a `MalformedInput` error from any displayable reader failure.
    pub(crate) fn malformed(position: u64, message: impl std::fmt::Display) -> Self {
        Self::MalformedInput {
            position,
            message: message.to_string(),
        }
    }
}

/// Result type alias for splitter operations.
pub type Result<T> = std::result::Result<T, SplitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SplitterError::DuplicateDocumentId("42".to_string());
        assert_eq!(err.to_string(), "Duplicate document id: 42");
    }

    #[test]
    fn test_unexpected_element_with_context() {
        let err = SplitterError::UnexpectedElement {
            tag: "token".to_string(),
            context: Some("paragraph".to_string()),
        };
        assert_eq!(err.to_string(), "Unexpected element <token> in paragraph");
    }

    #[test]
    fn test_unexpected_element_without_context() {
        let err = SplitterError::UnexpectedElement {
            tag: "token".to_string(),
            context: None,
        };
        assert_eq!(err.to_string(), "Unexpected element <token>");
    }

    #[test]
    fn test_malformed_input_display() {
        let err = SplitterError::malformed(17, "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Malformed input at byte 17: unexpected end of file"
        );
    }

    #[test]
    fn test_input_not_found_display() {
        let err = SplitterError::InputNotFound(PathBuf::from("missing.xml"));
        assert_eq!(err.to_string(), "Input file not found: missing.xml");
    }
}
