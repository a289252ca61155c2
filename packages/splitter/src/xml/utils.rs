//! Attribute helpers for reading typed values off element-open events.

use super::events::StartElement;
use crate::error::{Result, SplitterError};

/// Get a string attribute, defaulting to the empty string.
///
/// # Examples
/// ```
/// use corpus_splitter::xml::{string_attribute, StartElement};
///
/// let start = StartElement::new("text").with_attribute("name", "Частный корреспондент");
/// assert_eq!(string_attribute(&start, "name"), "Частный корреспондент");
/// assert_eq!(string_attribute(&start, "missing"), "");
/// ```
pub fn string_attribute(start: &StartElement, name: &str) -> String {
    start.attribute(name).unwrap_or_default().to_string()
}

/// Get an integer attribute, falling back to `default` when it is absent.
///
/// Surrounding whitespace is ignored. A value that is present but not an
/// integer is an error rather than silently replaced by the default.
///
/// # Examples
/// ```
/// use corpus_splitter::xml::{int_attribute, StartElement};
///
/// let start = StartElement::new("paragraph").with_attribute("id", " 12 ");
/// assert_eq!(int_attribute(&start, "id", 0).unwrap(), 12);
/// assert_eq!(int_attribute(&start, "parent", 0).unwrap(), 0);
///
/// let bad = StartElement::new("paragraph").with_attribute("id", "twelve");
/// assert!(int_attribute(&bad, "id", 0).is_err());
/// ```
pub fn int_attribute(start: &StartElement, name: &str, default: i64) -> Result<i64> {
    match start.attribute(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| invalid_attribute(start, name, value)),
    }
}

/// Get an attribute that must be present.
///
/// # Examples
/// ```
/// use corpus_splitter::xml::{required_attribute, StartElement};
///
/// let start = StartElement::new("text").with_attribute("id", "5");
/// assert_eq!(required_attribute(&start, "id").unwrap(), "5");
/// assert!(required_attribute(&start, "parent").is_err());
/// ```
pub fn required_attribute<'a>(start: &'a StartElement, name: &str) -> Result<&'a str> {
    start
        .attribute(name)
        .ok_or_else(|| SplitterError::MissingAttribute {
            element: start.name.clone(),
            attribute: name.to_string(),
        })
}

/// Build an `InvalidAttribute` error for an element.
pub fn invalid_attribute(start: &StartElement, name: &str, value: &str) -> SplitterError {
    SplitterError::InvalidAttribute {
        element: start.name.clone(),
        attribute: name.to_string(),
        value: value.to_string(),
    }
}
