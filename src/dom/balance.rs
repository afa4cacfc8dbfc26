//! Boundary balancing
//!
//! Places a new span into the host tree so that containment nests. The new
//! node descends to the deepest existing element containing it, adopts the
//! siblings that fall inside it and splits siblings that cross one of its
//! boundaries. Elements strictly before `start` or strictly after `end` are
//! never touched.

use super::document::AnnotationDocument;
use super::node::{AnnotationNode, NodeId, DOCUMENT_NODE};
use super::span::Span;
use crate::error::{ConflictReason, MergeConflict};

/// How a new span reconciles with existing spans it partially overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Balancing {
    /// Split crossing elements at the new span's boundaries
    #[default]
    Inner,
    /// Refuse crossing elements with a `MergeConflict`
    Strict,
}

/// Position of an existing sibling relative to the span being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    Inside,
    After,
    /// Starts before the new span and ends inside it
    CrossStart,
    /// Starts inside the new span and ends after it
    CrossEnd,
}

fn classify(existing: Span, span: Span) -> Side {
    if existing.is_empty() {
        let pos = existing.start;
        return if pos <= span.start {
            Side::Before
        } else if pos >= span.end {
            Side::After
        } else {
            Side::Inside
        };
    }
    if existing.end <= span.start {
        Side::Before
    } else if existing.start >= span.end {
        Side::After
    } else if span.contains(existing) {
        Side::Inside
    } else if existing.start < span.start {
        Side::CrossStart
    } else {
        Side::CrossEnd
    }
}

/// Whether placement should continue inside `existing`
///
/// Equal spans nest the new node inside the existing one. A zero-width span
/// only descends into elements that contain its position strictly.
fn descends_into(existing: Span, span: Span) -> bool {
    if span.is_empty() {
        existing.strictly_contains_pos(span.start)
    } else {
        !existing.is_empty() && existing.contains(span)
    }
}

impl AnnotationDocument {
    /// Place one new element below `within`
    ///
    /// `claimed` lists nodes already in the tree that must end up inside the
    /// new element even when their span equals it; placement never descends
    /// into them.
    pub(crate) fn place(
        &mut self,
        within: NodeId,
        name: &str,
        span: Span,
        attributes: &[(&str, &str)],
        claimed: &[NodeId],
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        self.check_span(name, span, within)?;

        let mut parent = within;
        'descend: loop {
            for child in self.arena.children(parent) {
                if claimed.contains(&child) {
                    continue;
                }
                if descends_into(self.arena.node(child).span, span) {
                    parent = child;
                    continue 'descend;
                }
            }
            break;
        }

        let mut inside = Vec::new();
        let mut anchor = None;
        let mut cursor = self.arena.node(parent).first_child;
        while let Some(child) = cursor {
            let existing = self.arena.node(child).span;
            let side = if claimed.contains(&child) {
                Side::Inside
            } else {
                classify(existing, span)
            };
            match side {
                Side::Before => {}
                Side::Inside => inside.push(child),
                Side::After => {
                    if anchor.is_none() {
                        anchor = Some(child);
                    }
                    // claimed markers at `end` may still follow other markers
                    if !existing.is_empty() || existing.start > span.end {
                        break;
                    }
                }
                Side::CrossStart | Side::CrossEnd if balancing == Balancing::Strict => {
                    return Err(MergeConflict {
                        name: name.to_string(),
                        span,
                        reason: ConflictReason::Crossing {
                            existing: self.arena.name(child).unwrap_or_default().to_string(),
                            existing_span: existing,
                        },
                    });
                }
                Side::CrossStart => {
                    // the left fragment stays; markers lifted to the split
                    // point and the right fragment are classified next
                    self.split(child, span.start);
                }
                Side::CrossEnd => {
                    self.split(child, span.end);
                    inside.push(child);
                }
            }
            cursor = self.arena.node(child).next_sibling;
        }

        // a claimed marker on a boundary shared with the element we descended
        // into was left outside it when it was inserted
        let stray: Vec<NodeId> = claimed
            .iter()
            .copied()
            .filter(|&c| !self.is_below(c, parent))
            .collect();
        if !stray.is_empty() {
            inside.extend(stray);
            inside.sort_by_key(|&c| {
                let s = self.arena.node(c).span;
                (s.start, !s.is_empty())
            });
        }

        let name_id = self.arena.names.intern(name);
        let mut node = AnnotationNode::element(name_id, span);
        for (key, value) in attributes {
            let key_id = self.arena.names.intern(key);
            node.set_attribute(key_id, (*value).to_string());
        }
        let id = self.arena.alloc(node);
        self.arena.insert_before(parent, anchor, id);
        for child in inside {
            self.arena.detach(child);
            self.arena.append_child(id, child);
        }
        Ok(id)
    }

    /// Split an element at `at`, returning the right-hand fragment
    ///
    /// Both fragments keep the name and attributes. Descendants crossing
    /// `at` are split the same way. Zero-width descendants at `at` belong to
    /// neither fragment and are lifted out between the two.
    fn split(&mut self, id: NodeId, at: usize) -> NodeId {
        let (name_id, attributes, end) = {
            let node = self.arena.node(id);
            (node.name_id, node.attributes.clone(), node.span.end)
        };
        log::debug!(
            "splitting `{}` {} at {}",
            self.arena.name(id).unwrap_or_default(),
            self.arena.node(id).span,
            at
        );

        let mut right = AnnotationNode::element(name_id, Span::new(at, end));
        right.attributes = attributes;
        let right_id = self.arena.alloc(right);
        self.arena.node_mut(id).span.end = at;
        self.arena.insert_after(id, right_id);
        let parent = self.arena.node(id).parent.unwrap_or(DOCUMENT_NODE);

        let mut cursor = self.arena.node(id).first_child;
        while let Some(child) = cursor {
            let span = self.arena.node(child).span;
            if span.strictly_contains_pos(at) {
                self.split(child, at);
            }
            // nested splits lift their markers right after `child`
            let next = self.arena.node(child).next_sibling;
            if span.is_empty() && span.start == at {
                self.arena.detach(child);
                self.arena.insert_before(parent, Some(right_id), child);
            } else if span.start >= at {
                self.arena.detach(child);
                self.arena.append_child(right_id, child);
            }
            cursor = next;
        }
        right_id
    }

    fn is_below(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.arena.node(id).parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.arena.node(p).parent;
        }
        false
    }

    /// Reject spans that no balancing can place
    pub(crate) fn check_span(
        &self,
        name: &str,
        span: Span,
        within: NodeId,
    ) -> Result<(), MergeConflict> {
        let conflict = |reason| MergeConflict {
            name: name.to_string(),
            span,
            reason,
        };
        if !span.is_ordered() {
            return Err(conflict(ConflictReason::Inverted));
        }
        if span.end > self.char_len() {
            return Err(conflict(ConflictReason::OutOfBounds {
                len: self.char_len(),
            }));
        }
        let parent_span = self.arena.node(within).span;
        if !parent_span.contains(span) {
            return Err(conflict(ConflictReason::OutsideParent { parent_span }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(doc: &mut AnnotationDocument, name: &str, span: Span) -> NodeId {
        doc.place(DOCUMENT_NODE, name, span, &[], &[], Balancing::Inner)
            .unwrap()
    }

    #[test]
    fn test_classify() {
        let span = Span::new(4, 7);
        assert_eq!(classify(Span::new(0, 4), span), Side::Before);
        assert_eq!(classify(Span::new(7, 9), span), Side::After);
        assert_eq!(classify(Span::new(4, 6), span), Side::Inside);
        assert_eq!(classify(Span::new(2, 5), span), Side::CrossStart);
        assert_eq!(classify(Span::new(5, 9), span), Side::CrossEnd);
        assert_eq!(classify(Span::empty_at(4), span), Side::Before);
        assert_eq!(classify(Span::empty_at(5), span), Side::Inside);
        assert_eq!(classify(Span::empty_at(7), span), Side::After);
    }

    #[test]
    fn test_nested_placement() {
        let mut doc = AnnotationDocument::new("The cat sat");
        let s = place(&mut doc, "s", Span::new(0, 11));
        let np = place(&mut doc, "np", Span::new(4, 7));
        assert_eq!(doc.get_node(np).and_then(|n| n.parent), Some(s));
        assert_eq!(doc.outline(), "s[0,11){np[4,7)}");
    }

    #[test]
    fn test_adopts_inside_siblings() {
        let mut doc = AnnotationDocument::new("The cat sat");
        place(&mut doc, "w", Span::new(0, 3));
        place(&mut doc, "w", Span::new(4, 7));
        place(&mut doc, "w", Span::new(8, 11));
        place(&mut doc, "np", Span::new(0, 7));
        assert_eq!(doc.outline(), "np[0,7){w[0,3) w[4,7)} w[8,11)");
    }

    #[test]
    fn test_split_crossing_start() {
        let mut doc = AnnotationDocument::new("abcdefgh");
        place(&mut doc, "x", Span::new(0, 3));
        place(&mut doc, "r", Span::new(1, 5));
        assert_eq!(doc.outline(), "x[0,1) r[1,5){x[1,3)}");
    }

    #[test]
    fn test_split_crossing_end_keeps_attributes() {
        let mut doc = AnnotationDocument::new("abcdefgh");
        let x = place(&mut doc, "x", Span::new(3, 8));
        doc.set_attribute(x, "lang", "nl");
        place(&mut doc, "r", Span::new(1, 5));
        assert_eq!(doc.outline(), "r[1,5){x[3,5)} x[5,8)");
        let fragments = doc.find_by_name("x");
        assert_eq!(fragments.len(), 2);
        for id in fragments {
            assert_eq!(doc.get_attribute(id, "lang"), Some("nl"));
        }
    }

    #[test]
    fn test_split_recurses_into_descendants() {
        let mut doc = AnnotationDocument::new("abcdefgh");
        place(&mut doc, "p", Span::new(0, 6));
        place(&mut doc, "b", Span::new(2, 6));
        place(&mut doc, "i", Span::new(3, 5));
        place(&mut doc, "r", Span::new(4, 8));
        assert_eq!(
            doc.outline(),
            "p[0,4){b[2,4){i[3,4)}} r[4,8){p[4,6){b[4,6){i[4,5)}}}"
        );
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_zero_width_does_not_split() {
        let mut doc = AnnotationDocument::new("abcdef");
        place(&mut doc, "x", Span::new(0, 3));
        place(&mut doc, "y", Span::new(3, 6));
        place(&mut doc, "mark", Span::empty_at(3));
        assert_eq!(doc.outline(), "x[0,3) mark[3,3) y[3,6)");
    }

    #[test]
    fn test_zero_width_descends_strictly() {
        let mut doc = AnnotationDocument::new("abcdef");
        place(&mut doc, "x", Span::new(0, 6));
        place(&mut doc, "mark", Span::empty_at(2));
        place(&mut doc, "edge", Span::empty_at(6));
        assert_eq!(doc.outline(), "x[0,6){mark[2,2)} edge[6,6)");
    }

    #[test]
    fn test_equal_span_nests_inside() {
        let mut doc = AnnotationDocument::new("cat");
        place(&mut doc, "host", Span::new(0, 3));
        place(&mut doc, "new", Span::new(0, 3));
        assert_eq!(doc.outline(), "host[0,3){new[0,3)}");
    }

    #[test]
    fn test_claimed_equal_span_is_enclosed() {
        let mut doc = AnnotationDocument::new("cat");
        let child = place(&mut doc, "child", Span::new(0, 3));
        doc.place(
            DOCUMENT_NODE,
            "parent",
            Span::new(0, 3),
            &[],
            &[child],
            Balancing::Inner,
        )
        .unwrap();
        assert_eq!(doc.outline(), "parent[0,3){child[0,3)}");
    }

    #[test]
    fn test_split_lifts_markers_at_split_point() {
        let mut doc = AnnotationDocument::new("abcdefgh");
        place(&mut doc, "x", Span::new(0, 4));
        place(&mut doc, "m", Span::empty_at(2));
        assert_eq!(doc.outline(), "x[0,4){m[2,2)}");

        place(&mut doc, "r", Span::new(2, 6));
        assert_eq!(doc.outline(), "x[0,2) m[2,2) r[2,6){x[2,4)}");
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_claimed_marker_behind_host_marker() {
        let mut doc = AnnotationDocument::new("abcd");
        place(&mut doc, "m", Span::empty_at(2));
        let c = place(&mut doc, "c", Span::empty_at(2));
        assert_eq!(doc.outline(), "m[2,2) c[2,2)");

        doc.place(DOCUMENT_NODE, "p", Span::new(0, 2), &[], &[c], Balancing::Inner)
            .unwrap();
        assert_eq!(doc.outline(), "p[0,2){c[2,2)} m[2,2)");
    }

    #[test]
    fn test_claimed_marker_on_shared_boundary() {
        let mut doc = AnnotationDocument::new("abcd");
        place(&mut doc, "x", Span::new(0, 4));
        let c = place(&mut doc, "c", Span::empty_at(0));
        assert_eq!(doc.outline(), "c[0,0) x[0,4)");

        doc.place(DOCUMENT_NODE, "p", Span::new(0, 4), &[], &[c], Balancing::Inner)
            .unwrap();
        assert_eq!(doc.outline(), "x[0,4){p[0,4){c[0,0)}}");
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_strict_rejects_crossing() {
        let mut doc = AnnotationDocument::new("abcdefgh");
        place(&mut doc, "x", Span::new(0, 3));
        let err = doc
            .place(DOCUMENT_NODE, "r", Span::new(1, 5), &[], &[], Balancing::Strict)
            .unwrap_err();
        assert_eq!(
            err.reason,
            ConflictReason::Crossing {
                existing: "x".to_string(),
                existing_span: Span::new(0, 3),
            }
        );
        assert_eq!(doc.outline(), "x[0,3)");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut doc = AnnotationDocument::new("abc");
        let err = doc
            .place(DOCUMENT_NODE, "r", Span::new(1, 5), &[], &[], Balancing::Inner)
            .unwrap_err();
        assert_eq!(err.reason, ConflictReason::OutOfBounds { len: 3 });
    }

    #[test]
    fn test_inverted() {
        let mut doc = AnnotationDocument::new("abc");
        let err = doc
            .place(DOCUMENT_NODE, "r", Span::new(2, 1), &[], &[], Balancing::Inner)
            .unwrap_err();
        assert_eq!(err.reason, ConflictReason::Inverted);
    }
}
