//! Node arena shared by host documents and the builder's pending trees
//!
//! Nodes are linked through parent/child/sibling indices, which makes moving
//! a node under a new parent (the core of balancing) an O(1) relink.

use super::node::{AnnotationNode, NodeId};
use super::span::Span;
use super::strings::NamePool;

/// Growable node storage with slot recycling
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<AnnotationNode>,
    /// Interned element and attribute names
    pub names: NamePool,
    /// Released slots available for reuse
    free: Vec<NodeId>,
}

impl Arena {
    /// Create an empty arena
    pub fn new() -> Self {
        Arena {
            nodes: Vec::with_capacity(64),
            names: NamePool::new(),
            free: Vec::new(),
        }
    }

    /// Store a detached node and return its id
    pub fn alloc(&mut self, node: AnnotationNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = node;
            id
        } else {
            let id = self.nodes.len() as NodeId;
            self.nodes.push(node);
            id
        }
    }

    /// Allocate a detached element node, interning its name
    pub fn alloc_element(&mut self, name: &str, span: Span) -> NodeId {
        let name_id = self.names.intern(name);
        self.alloc(AnnotationNode::element(name_id, span))
    }

    /// Return a detached subtree's slots to the free list
    pub fn release(&mut self, root: NodeId) {
        let mut ids: Vec<NodeId> = self.descendants(root).collect();
        ids.push(root);
        for id in ids {
            let node = &mut self.nodes[id as usize];
            node.parent = None;
            node.first_child = None;
            node.last_child = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            node.attributes.clear();
            self.free.push(id);
        }
    }

    /// Number of live (not released) nodes
    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots ever allocated
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&AnnotationNode> {
        self.nodes.get(id as usize)
    }

    /// Get a mutable node by ID
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AnnotationNode> {
        self.nodes.get_mut(id as usize)
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &AnnotationNode {
        &self.nodes[id as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut AnnotationNode {
        &mut self.nodes[id as usize]
    }

    /// Get node name as string
    pub fn name(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        self.names.get(node.name_id)
    }

    /// Link a detached child as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let last_child_opt = self.nodes[parent as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child);
        } else {
            self.nodes[parent as usize].first_child = Some(child);
        }
        self.nodes[parent as usize].last_child = Some(child);
        self.nodes[child as usize].parent = Some(parent);
    }

    /// Link a detached child into `parent` right before `anchor`
    ///
    /// With no anchor the child is appended.
    pub fn insert_before(&mut self, parent: NodeId, anchor: Option<NodeId>, child: NodeId) {
        let Some(anchor) = anchor else {
            self.append_child(parent, child);
            return;
        };
        let prev = self.nodes[anchor as usize].prev_sibling;
        self.nodes[child as usize].prev_sibling = prev;
        self.nodes[child as usize].next_sibling = Some(anchor);
        self.nodes[anchor as usize].prev_sibling = Some(child);
        match prev {
            Some(prev) => self.nodes[prev as usize].next_sibling = Some(child),
            None => self.nodes[parent as usize].first_child = Some(child),
        }
        self.nodes[child as usize].parent = Some(parent);
    }

    /// Link a detached node right after `sibling`, under the same parent
    pub fn insert_after(&mut self, sibling: NodeId, child: NodeId) {
        let Some(parent) = self.nodes[sibling as usize].parent else {
            return;
        };
        let next = self.nodes[sibling as usize].next_sibling;
        self.insert_before(parent, next, child);
    }

    /// Unlink a node from its parent and siblings, keeping its subtree
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        match prev {
            Some(prev) => self.nodes[prev as usize].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent as usize].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next as usize].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent as usize].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get(id).and_then(|n| n.first_child);
        ChildIter { arena: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut stack = Vec::new();
        if let Some(node) = self.get(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { arena: self, stack }
    }
}

/// Iterator over child nodes
pub struct ChildIter<'a> {
    arena: &'a Arena,
    next: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'a> {
    arena: &'a Arena,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DescendantIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.arena.get(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.arena.get(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}
