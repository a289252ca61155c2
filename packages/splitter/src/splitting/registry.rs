//! Hierarchy registry for document splitting.

use std::collections::HashMap;

use super::types::{ElementKind, ElementSpec};

/// Registry of element specifications for the hierarchy.
pub struct HierarchyRegistry {
    specs: HashMap<String, ElementSpec>,
}

impl HierarchyRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Register an element specification.
    pub fn register(&mut self, spec: ElementSpec) {
        self.specs.insert(spec.tag.clone(), spec);
    }

    /// Get the specification for a tag.
    #[must_use]
    pub fn get_spec(&self, tag: &str) -> Option<&ElementSpec> {
        self.specs.get(tag)
    }

    /// Get the kind registered for a tag.
    #[must_use]
    pub fn kind_of(&self, tag: &str) -> Option<ElementKind> {
        self.specs.get(tag).map(|spec| spec.kind)
    }
}

impl Default for HierarchyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
