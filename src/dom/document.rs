//! Annotation Document - text buffer plus arena-based span tree
//!
//! The host side of a merge:
//! - Owns the text, which merges never alter
//! - Node 0 is the document node spanning the whole text
//! - Root-level annotations are the document node's children
//! - Incoming nodes are placed with boundary balancing (see `balance`)

use super::arena::{Arena, ChildIter, DescendantIter};
use super::balance::Balancing;
use super::node::{AnnotationNode, NodeId, NodeKind, DOCUMENT_NODE};
use super::span::Span;
use crate::error::{ConflictReason, MergeConflict};

/// A text with a forest of annotations over it
#[derive(Debug, Clone)]
pub struct AnnotationDocument {
    text: String,
    char_len: usize,
    pub(crate) arena: Arena,
}

impl AnnotationDocument {
    /// Create a document over `text` with no annotations
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        let mut arena = Arena::new();
        arena.alloc(AnnotationNode::document(char_len));
        AnnotationDocument {
            text,
            char_len,
            arena,
        }
    }

    /// The annotated text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The document node (index 0)
    pub fn document_node(&self) -> &AnnotationNode {
        self.arena.node(DOCUMENT_NODE)
    }

    /// Root-level annotations
    pub fn roots(&self) -> ChildIter<'_> {
        self.arena.children(DOCUMENT_NODE)
    }

    /// Number of element nodes
    pub fn element_count(&self) -> usize {
        self.arena.descendants(DOCUMENT_NODE).count()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&AnnotationNode> {
        self.arena.get(id)
    }

    /// Get node name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.arena.name(id)
    }

    /// Get node span
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.arena.get(id).map(|n| n.span)
    }

    /// Text covered by a node
    pub fn covered_text(&self, id: NodeId) -> Option<&str> {
        self.span(id).map(|span| span.slice(&self.text))
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name_id = self.arena.names.lookup(name)?;
        self.arena.get(id)?.attribute(name_id)
    }

    /// Get all attribute names and values for a node
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        let Some(node) = self.arena.get(id) else {
            return Vec::new();
        };
        node.attributes
            .iter()
            .filter_map(|attr| {
                let name = self.arena.names.get(attr.name_id)?;
                Some((name, attr.value.as_str()))
            })
            .collect()
    }

    /// Set an attribute on an element, replacing an earlier value
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let name_id = self.arena.names.intern(name);
        if let Some(node) = self.arena.get_mut(id) {
            if node.is_element() {
                node.set_attribute(name_id, value.to_string());
            }
        }
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        self.arena.children(id)
    }

    /// Iterate over all descendants of a node
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        self.arena.descendants(id)
    }

    /// All elements with the given name, in document order
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        let Some(name_id) = self.arena.names.lookup(name) else {
            return Vec::new();
        };
        self.arena
            .descendants(DOCUMENT_NODE)
            .filter(|&id| self.arena.node(id).name_id == name_id)
            .collect()
    }

    /// Add pre-existing markup
    ///
    /// Uses `Balancing::Strict`: a span crossing existing markup is refused
    /// rather than splitting it.
    pub fn add_span(&mut self, name: &str, span: impl Into<Span>) -> Result<NodeId, MergeConflict> {
        self.place(DOCUMENT_NODE, name, span.into(), &[], &[], Balancing::Strict)
    }

    /// Merge a finished subtree from another arena at its own span
    ///
    /// The whole subtree is checked before anything changes, and a strict
    /// merge that fails halfway is rolled back, so a failed merge leaves the
    /// document as it was.
    pub fn merge(
        &mut self,
        source: &Arena,
        root: NodeId,
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        self.check_subtree(source, root)?;
        match balancing {
            Balancing::Inner => self.merge_within(DOCUMENT_NODE, source, root, balancing),
            Balancing::Strict => {
                let checkpoint = self.arena.clone();
                let result = self.merge_within(DOCUMENT_NODE, source, root, balancing);
                if result.is_err() {
                    self.arena = checkpoint;
                }
                result
            }
        }
    }

    /// Insert a single node from another arena, ignoring its children
    ///
    /// `claimed` names nodes of this document that were inserted earlier as
    /// the new node's children; they end up inside it.
    pub fn insert(
        &mut self,
        source: &Arena,
        node: NodeId,
        claimed: &[NodeId],
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        let name = source.name(node).unwrap_or_default();
        let element = source.node(node);
        let attributes = attribute_pairs(source, element);
        self.place(
            DOCUMENT_NODE,
            name,
            element.span,
            &attributes,
            claimed,
            balancing,
        )
    }

    fn merge_within(
        &mut self,
        parent: NodeId,
        source: &Arena,
        node: NodeId,
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        let name = source.name(node).unwrap_or_default();
        let element = source.node(node);
        let attributes = attribute_pairs(source, element);
        let id = self.place(parent, name, element.span, &attributes, &[], balancing)?;
        for child in source.children(node) {
            self.merge_within(id, source, child, balancing)?;
        }
        Ok(id)
    }

    fn check_subtree(&self, source: &Arena, root: NodeId) -> Result<(), MergeConflict> {
        let root_span = source.node(root).span;
        self.check_span(source.name(root).unwrap_or_default(), root_span, DOCUMENT_NODE)?;
        for id in source.descendants(root) {
            let node = source.node(id);
            let parent_span = node
                .parent
                .map(|p| source.node(p).span)
                .unwrap_or(root_span);
            if !node.span.is_ordered() || !parent_span.contains(node.span) {
                return Err(MergeConflict {
                    name: source.name(id).unwrap_or_default().to_string(),
                    span: node.span,
                    reason: if node.span.is_ordered() {
                        ConflictReason::OutsideParent { parent_span }
                    } else {
                        ConflictReason::Inverted
                    },
                });
            }
        }
        Ok(())
    }

    /// Verify span nesting and sibling order for the whole tree
    pub fn check_invariants(&self) -> Result<(), String> {
        for id in self.arena.descendants(DOCUMENT_NODE) {
            let node = self.arena.node(id);
            if node.kind != NodeKind::Element {
                return Err(format!("node {id} is not an element"));
            }
            if !node.span.is_ordered() {
                return Err(format!("node {id} has inverted span {}", node.span));
            }
            let parent = node.parent.ok_or_else(|| format!("node {id} has no parent"))?;
            let parent_span = self.arena.node(parent).span;
            if !parent_span.contains(node.span) {
                return Err(format!(
                    "node {id} {} escapes its parent {parent_span}",
                    node.span
                ));
            }
            if let Some(prev) = node.prev_sibling {
                let prev_span = self.arena.node(prev).span;
                if prev_span.end > node.span.start {
                    return Err(format!(
                        "node {id} {} overlaps its previous sibling {prev_span}",
                        node.span
                    ));
                }
            }
        }
        Ok(())
    }

    /// Compact one-line rendering such as `s[0,11){np[4,7)}`, for diagnostics
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_children(DOCUMENT_NODE, &mut out);
        out
    }

    fn outline_children(&self, id: NodeId, out: &mut String) {
        for (i, child) in self.arena.children(id).enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(self.arena.name(child).unwrap_or_default());
            out.push_str(&self.arena.node(child).span.to_string());
            if self.arena.node(child).has_children() {
                out.push('{');
                self.outline_children(child, out);
                out.push('}');
            }
        }
    }
}

fn attribute_pairs<'a>(source: &'a Arena, node: &'a AnnotationNode) -> Vec<(&'a str, &'a str)> {
    node.attributes
        .iter()
        .filter_map(|attr| Some((source.names.get(attr.name_id)?, attr.value.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_tree() -> (Arena, NodeId) {
        let mut arena = Arena::new();
        let root = arena.alloc_element("np", Span::new(4, 7));
        let det = arena.alloc_element("noun", Span::new(4, 7));
        arena.append_child(root, det);
        let key = arena.names.intern("id");
        arena.node_mut(root).set_attribute(key, "n1".to_string());
        (arena, root)
    }

    #[test]
    fn test_new_document() {
        let doc = AnnotationDocument::new("The cat sat");
        assert_eq!(doc.char_len(), 11);
        assert_eq!(doc.document_node().span, Span::new(0, 11));
        assert_eq!(doc.roots().count(), 0);
        assert_eq!(doc.outline(), "");
    }

    #[test]
    fn test_add_span_and_read_back() {
        let mut doc = AnnotationDocument::new("The cat sat");
        let s = doc.add_span("s", 0..11).unwrap();
        assert_eq!(doc.node_name(s), Some("s"));
        assert_eq!(doc.covered_text(s), Some("The cat sat"));
        assert_eq!(doc.roots().collect::<Vec<_>>(), vec![s]);
    }

    #[test]
    fn test_merge_into_existing_markup() {
        let mut doc = AnnotationDocument::new("The cat sat");
        let s = doc.add_span("s", 0..11).unwrap();
        let (arena, root) = source_tree();

        let np = doc.merge(&arena, root, Balancing::Inner).unwrap();

        assert_eq!(doc.get_node(np).and_then(|n| n.parent), Some(s));
        assert_eq!(doc.span(s), Some(Span::new(0, 11)));
        assert_eq!(doc.get_attribute(np, "id"), Some("n1"));
        assert_eq!(doc.outline(), "s[0,11){np[4,7){noun[4,7)}}");
        assert_eq!(doc.text(), "The cat sat");
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_insert_ignores_children() {
        let mut doc = AnnotationDocument::new("The cat sat");
        let (arena, root) = source_tree();
        doc.insert(&arena, root, &[], Balancing::Inner).unwrap();
        assert_eq!(doc.outline(), "np[4,7)");
    }

    #[test]
    fn test_failed_strict_merge_rolls_back() {
        let mut doc = AnnotationDocument::new("The cat sat");
        doc.add_span("x", 5..9).unwrap();

        let mut arena = Arena::new();
        let root = arena.alloc_element("s", Span::new(0, 11));
        let np = arena.alloc_element("np", Span::new(4, 7));
        arena.append_child(root, np);

        let before = doc.outline();
        assert!(doc.merge(&arena, root, Balancing::Strict).is_err());
        assert_eq!(doc.outline(), before);
    }

    #[test]
    fn test_merge_rejects_child_outside_parent() {
        let mut doc = AnnotationDocument::new("The cat sat");
        let mut arena = Arena::new();
        let root = arena.alloc_element("np", Span::new(4, 7));
        let bad = arena.alloc_element("w", Span::new(6, 9));
        arena.append_child(root, bad);

        let err = doc.merge(&arena, root, Balancing::Inner).unwrap_err();
        assert_eq!(err.name, "w");
        assert_eq!(
            err.reason,
            ConflictReason::OutsideParent {
                parent_span: Span::new(4, 7)
            }
        );
        assert_eq!(doc.element_count(), 0);
    }

    #[test]
    fn test_find_by_name_and_attributes() {
        let mut doc = AnnotationDocument::new("a b c");
        let a = doc.add_span("w", 0..1).unwrap();
        doc.add_span("w", 2..3).unwrap();
        doc.set_attribute(a, "pos", "det");
        assert_eq!(doc.find_by_name("w").len(), 2);
        assert!(doc.find_by_name("missing").is_empty());
        assert_eq!(doc.attributes(a), vec![("pos", "det")]);
    }
}
