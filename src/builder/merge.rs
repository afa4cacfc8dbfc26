//! Merge seam between the builder and a host document

use crate::dom::{AnnotationDocument, Arena, Balancing, NodeId};
use crate::error::MergeConflict;

/// A document that finished nodes can be handed to
pub trait MergeTarget {
    /// Incorporate `root` and its subtree, read from `source`
    fn merge(
        &mut self,
        source: &Arena,
        root: NodeId,
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict>;

    /// Incorporate the single node `node`, read from `source`
    ///
    /// `claimed` lists host nodes inserted earlier as its children.
    fn insert(
        &mut self,
        source: &Arena,
        node: NodeId,
        claimed: &[NodeId],
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict>;
}

impl MergeTarget for AnnotationDocument {
    fn merge(
        &mut self,
        source: &Arena,
        root: NodeId,
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        AnnotationDocument::merge(self, source, root, balancing)
    }

    fn insert(
        &mut self,
        source: &Arena,
        node: NodeId,
        claimed: &[NodeId],
        balancing: Balancing,
    ) -> Result<NodeId, MergeConflict> {
        AnnotationDocument::insert(self, source, node, claimed, balancing)
    }
}
