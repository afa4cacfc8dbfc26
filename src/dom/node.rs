//! Annotation node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

use super::span::Span;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Id of the document node in every host document
pub const DOCUMENT_NODE: NodeId = 0;

/// Type of annotation node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root, spans the whole text
    Document,
    /// Named span
    Element,
}

/// An attribute stored on its element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Index into the name pool
    pub name_id: u32,
    /// Attribute value
    pub value: String,
}

/// An annotation node in the arena
#[derive(Debug, Clone)]
pub struct AnnotationNode {
    /// Type of this node
    pub kind: NodeKind,
    /// Index into the name pool
    pub name_id: u32,
    /// Covered characters
    pub span: Span,
    /// Parent node (None for the document node and for detached nodes)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Attributes in first-set order
    pub attributes: Vec<Attribute>,
}

impl AnnotationNode {
    /// Create the document node
    pub fn document(len: usize) -> Self {
        AnnotationNode {
            kind: NodeKind::Document,
            name_id: 0,
            span: Span::new(0, len),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            attributes: Vec::new(),
        }
    }

    /// Create a detached element node
    pub fn element(name_id: u32, span: Span) -> Self {
        AnnotationNode {
            kind: NodeKind::Element,
            name_id,
            span,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            attributes: Vec::new(),
        }
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Set an attribute, replacing an earlier value for the same name
    pub fn set_attribute(&mut self, name_id: u32, value: String) {
        match self.attributes.iter_mut().find(|a| a.name_id == name_id) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name_id, value }),
        }
    }

    /// Get an attribute value by interned name
    pub fn attribute(&self, name_id: u32) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name_id == name_id)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_node() {
        let doc = AnnotationNode::document(11);
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert_eq!(doc.span, Span::new(0, 11));
    }

    #[test]
    fn test_element_node() {
        let elem = AnnotationNode::element(3, Span::new(4, 7));
        assert!(elem.is_element());
        assert_eq!(elem.name_id, 3);
        assert!(!elem.has_children());
    }

    #[test]
    fn test_attribute_last_write_wins() {
        let mut elem = AnnotationNode::element(1, Span::new(0, 2));
        elem.set_attribute(2, "x".to_string());
        elem.set_attribute(2, "y".to_string());
        assert_eq!(elem.attributes.len(), 1);
        assert_eq!(elem.attribute(2), Some("y"));
    }
}
