//! Configuration for the OpenCorpora text hierarchy.

use super::registry::HierarchyRegistry;
use super::types::{ElementKind, ElementSpec};
use crate::config::{
    ANNOTATION_TAG, DOCUMENT_TAG, GRAMMEME_TAG, PARAGRAPH_TAG, SENTENCE_TAG, SOURCE_TAG, TAG_TAG,
    TOKEN_TAG, VARIANT_TAG,
};

/// Create hierarchy registry for the OpenCorpora corpus structure.
///
/// Parents are the nearest enclosing element that is not a container:
///
/// ```text
/// annotation
/// └── text
///     ├── tags
///     │   └── tag
///     └── paragraphs
///         └── paragraph
///             └── sentence
///                 ├── source
///                 └── tokens
///                     └── token
///                         └── tfr
///                             └── v
///                                 └── l
///                                     └── g
/// ```
#[must_use]
pub fn create_corpus_hierarchy() -> HierarchyRegistry {
    use ElementKind::{
        Annotation, Container, Document, Grammeme, Paragraph, Sentence, Source, Tag, Token,
        Variant,
    };

    let mut registry = HierarchyRegistry::new();

    registry.register(ElementSpec::new(ANNOTATION_TAG, Annotation).with_root(true));

    // A bare <text> root is accepted so single-text files split too
    registry.register(
        ElementSpec::new(DOCUMENT_TAG, Document)
            .with_parents([Annotation])
            .with_root(true),
    );

    registry.register(ElementSpec::new("tags", Container).with_parents([Document]));
    registry.register(ElementSpec::new(TAG_TAG, Tag).with_parents([Document]));

    registry.register(ElementSpec::new("paragraphs", Container).with_parents([Document]));
    registry.register(ElementSpec::new(PARAGRAPH_TAG, Paragraph).with_parents([Document]));

    registry.register(ElementSpec::new(SENTENCE_TAG, Sentence).with_parents([Paragraph]));
    registry.register(ElementSpec::new(SOURCE_TAG, Source).with_parents([Sentence]));

    registry.register(ElementSpec::new("tokens", Container).with_parents([Sentence]));
    registry.register(ElementSpec::new(TOKEN_TAG, Token).with_parents([Sentence]));

    registry.register(ElementSpec::new("tfr", Container).with_parents([Token]));
    registry.register(ElementSpec::new("v", Container).with_parents([Token]));
    registry.register(ElementSpec::new(VARIANT_TAG, Variant).with_parents([Token]));

    registry.register(ElementSpec::new(GRAMMEME_TAG, Grammeme).with_parents([Variant]));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONTAINER_TAGS;

    #[test]
    fn test_create_corpus_hierarchy() {
        let registry = create_corpus_hierarchy();

        let text = registry.get_spec("text").unwrap();
        assert_eq!(text.kind, ElementKind::Document);
        assert!(text.at_root);
        assert!(text.allows_parent(Some(ElementKind::Annotation)));
        assert!(!text.allows_parent(Some(ElementKind::Document)));

        let token = registry.get_spec("token").unwrap();
        assert!(token.allows_parent(Some(ElementKind::Sentence)));
        assert!(!token.allows_parent(None));

        let grammeme = registry.get_spec("g").unwrap();
        assert_eq!(grammeme.parents, vec![ElementKind::Variant]);
    }

    #[test]
    fn test_all_containers_registered() {
        let registry = create_corpus_hierarchy();
        for tag in CONTAINER_TAGS {
            assert_eq!(registry.kind_of(tag), Some(ElementKind::Container), "{tag}");
        }
    }
}
