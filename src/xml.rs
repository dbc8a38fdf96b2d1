//! Definition Document View
//!
//! A thin typed view over the XML reader used for pipeline definitions.
//! Extension parsers receive an [`ElementView`] instead of a parser-internal
//! node type, keeping the reader an implementation detail of this crate.

use crate::errors::{PipelineError, Result};

/// Interprets a permissive boolean token.
///
/// `"true"` / `"1"` mean `true`, `"false"` / `"0"` mean `false` (both
/// case-insensitively); any other token is unrecognized. Definition files
/// written for older engine versions mix both spellings, so every boolean
/// attribute accepts either family.
#[must_use]
pub fn bool_token(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Some(false)
    } else {
        None
    }
}

/// Read-only view of one element of a pipeline definition document.
#[derive(Clone, Copy)]
pub struct ElementView<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
}

impl<'a, 'input> ElementView<'a, 'input> {
    pub(crate) fn new(node: roxmltree::Node<'a, 'input>) -> Self {
        Self { node }
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> &'a str {
        self.node.tag_name().name()
    }

    /// An attribute's raw value, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// An attribute's value, or `default` when absent.
    #[must_use]
    pub fn attr_or(&self, name: &str, default: &'a str) -> &'a str {
        self.node.attribute(name).unwrap_or(default)
    }

    /// A mandatory attribute; absence is a definition error naming both the
    /// element and the attribute.
    pub fn require(&self, element: &'static str, attr: &'static str) -> Result<&'a str> {
        self.node
            .attribute(attr)
            .ok_or(PipelineError::MissingAttribute { element, attr })
    }

    /// An integer attribute, defaulting to 0 when absent or unparsable.
    #[must_use]
    pub fn attr_u32(&self, name: &str) -> u32 {
        self.attr(name).and_then(|s| s.trim().parse().ok()).unwrap_or(0)
    }

    /// A float attribute, defaulting to `default` when absent or unparsable.
    #[must_use]
    pub fn attr_f32(&self, name: &str, default: f32) -> f32 {
        self.attr(name)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    /// A permissive boolean attribute (see [`bool_token`]), falling back to
    /// `default` when the attribute is absent or its token is unrecognized.
    #[must_use]
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.attr(name).and_then(bool_token).unwrap_or(default)
    }

    /// Child elements, in document order. Text and comment nodes are skipped.
    pub fn children(&self) -> impl Iterator<Item = ElementView<'a, 'input>> + use<'a, 'input> {
        self.node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(ElementView::new)
    }

    /// Number of child elements.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.node.children().filter(roxmltree::Node::is_element).count()
    }

    /// First child element with the given tag name.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<ElementView<'a, 'input>> {
        self.children().find(|c| c.tag() == tag)
    }

    /// 1-based line of the element's start tag in the source document.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.node.document().text_pos_at(self.node.range().start).row
    }
}
