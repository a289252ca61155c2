//! XML event stream and attribute utilities.

mod events;
mod utils;

pub use events::{peek_annotation, Attribute, EventSource, SourceEvent, StartElement, TextContent};
pub use utils::{int_attribute, invalid_attribute, required_attribute, string_attribute};
