//! DOM Module - Arena-based annotation documents
//!
//! Implements the host side of a merge using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for parent/child/sibling links
//! - String interning for element/attribute names
//! - Boundary balancing for placing new spans into existing markup

pub mod arena;
pub mod balance;
pub mod document;
pub mod node;
pub mod span;
pub mod strings;

pub use arena::Arena;
pub use balance::Balancing;
pub use document::AnnotationDocument;
pub use node::{AnnotationNode, Attribute, NodeId, NodeKind, DOCUMENT_NODE};
pub use span::Span;
pub use strings::NamePool;
