//! Annotation Tree Builder
//!
//! Consumes grammar events and turns them into positioned annotation nodes
//! that are merged into a host document.
//!
//! ## Strategies
//!
//! - `Deferred` - subtrees are assembled in the builder's own arena and a
//!   root-level node is merged once, with its whole subtree, when it closes
//! - `Incremental` - every node is inserted into the host as soon as it
//!   closes, then released; a parent encloses the children inserted before it
//!
//! Both strategies place each node with the same balancing contract and
//! produce the same host tree.

pub mod merge;
pub mod tree;

pub use merge::MergeTarget;
pub use tree::{BuildReport, TreeBuilder};

use crate::core::chars::is_qualified;

/// When finished nodes reach the host document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Merge each root-level subtree once, when it closes
    #[default]
    Deferred,
    /// Insert each node as soon as it closes
    Incremental,
}

/// Whether a terminal inside an attribute scope advances the cursor
///
/// Attribute characters always go to the attribute value; this only decides
/// whether they also count as text of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeCursor {
    /// Never advance inside an attribute
    #[default]
    Hold,
    /// Advance unless the attribute name has a `prefix:`
    Unqualified,
    /// Always advance
    Advance,
}

impl AttributeCursor {
    /// Does a terminal of attribute `name` advance the cursor
    #[inline]
    pub fn advances(self, name: &str) -> bool {
        match self {
            AttributeCursor::Hold => false,
            AttributeCursor::Unqualified => !is_qualified(name),
            AttributeCursor::Advance => true,
        }
    }
}
