//! Error types for annotation
//!
//! Every failure is fatal to the current invocation: the builder stops,
//! propagates the error and performs no further merges. Nothing is retried,
//! the outcome is deterministic for a given event stream.

use thiserror::Error;

use crate::dom::Span;

/// Result alias used throughout the crate
pub type Result<T, E = AnnotateError> = std::result::Result<T, E>;

/// Top-level annotation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateError {
    /// A terminal carried a codepoint that is not an XML 1.0 `Char`
    #[error("illegal content character U+{codepoint:04X} at cursor {cursor}")]
    IllegalContentCharacter { codepoint: u32, cursor: usize },

    /// The event stream is not well nested
    #[error("structural mismatch at cursor {cursor}: {kind}")]
    StructuralMismatch { kind: Mismatch, cursor: usize },

    /// A terminal or excluded run would move the cursor past `usize::MAX`
    #[error("cursor overflow: cannot advance {length} char(s) from cursor {cursor}")]
    CursorOverflow { length: usize, cursor: usize },

    /// The host document could not absorb a finished node
    #[error(transparent)]
    MergeConflict(#[from] MergeConflict),

    /// The event source itself reported that the input did not match
    #[error("event source failed at cursor {cursor}: {message}")]
    Source { message: String, cursor: usize },

    /// Options could not be built
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AnnotateError {
    /// Cursor position at which the error was raised, if it has one
    pub fn cursor(&self) -> Option<usize> {
        match self {
            AnnotateError::IllegalContentCharacter { cursor, .. }
            | AnnotateError::StructuralMismatch { cursor, .. }
            | AnnotateError::CursorOverflow { cursor, .. }
            | AnnotateError::Source { cursor, .. } => Some(*cursor),
            AnnotateError::MergeConflict(conflict) => Some(conflict.span.end),
            AnnotateError::Config(_) => None,
        }
    }

    /// Build a source failure, for use by event source implementations
    pub fn source(message: impl Into<String>, cursor: usize) -> Self {
        AnnotateError::Source {
            message: message.into(),
            cursor,
        }
    }
}

/// The ways an event stream can be badly nested
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("end of nonterminal `{0}` with no open nonterminal")]
    UnopenedEnd(String),

    #[error("end of nonterminal `{found}` while `{open}` is open")]
    NameMismatch { open: String, found: String },

    #[error("nonterminal with an empty name")]
    EmptyName,

    #[error("attribute `{0}` outside any open nonterminal")]
    AttributeOutsideNode(String),

    #[error("end of attribute with no open attribute")]
    UnopenedAttributeEnd,

    #[error("nonterminal `{0}` started inside an attribute")]
    NonterminalInAttribute(String),

    #[error("end of nonterminal `{0}` while one of its attributes is open")]
    AttributeOpenAtEnd(String),

    #[error("stream ended with {open_nodes} open nonterminal(s) and {open_attributes} open attribute(s)")]
    Unclosed {
        open_nodes: usize,
        open_attributes: usize,
    },
}

/// A node that the host document could not place
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot merge `{name}` {span}: {reason}")]
pub struct MergeConflict {
    /// Name of the node being merged
    pub name: String,
    /// Its span
    pub span: Span,
    /// Why placement failed
    pub reason: ConflictReason,
}

/// Why a merge or insert failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("span is inverted")]
    Inverted,

    #[error("span exceeds the text length {len}")]
    OutOfBounds { len: usize },

    #[error("crosses the boundary of `{existing}` {existing_span}")]
    Crossing { existing: String, existing_span: Span },

    #[error("lies outside its target parent {parent_span}")]
    OutsideParent { parent_span: Span },
}

/// Option parsing errors, raised when options are built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported option \"{key}\": \"{value}\"")]
    UnknownOption { key: String, value: String },

    #[error("invalid value \"{value}\" for option \"{key}\", expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}
