//! tixml - grammar-event driven span annotation
//!
//! A grammar engine replays its breakdown of a text as a stream of events;
//! `tixml` turns that stream into a tree of named, character-offset spans
//! and merges it into markup that may already exist over the same text.
//!
//! Pipeline:
//! EventSource -> TreeBuilder -> MergeTarget (AnnotationDocument)
//!
//! Entry points:
//! - `Annotator::annotate` / `annotate_into` - one input, standalone or overlay
//! - `Annotator::annotate_batch` - many inputs on the Rayon pool
//! - `TreeBuilder` + `events::drive` - feed events by hand
//! - `SourceCache::get_or_prepare` - share prepared sources between calls

pub mod annotator;
pub mod builder;
pub mod cache;
pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod events;
pub mod strategy;
pub mod trace;

// ============================================================================
// Re-exports
// ============================================================================

pub use annotator::{Annotated, Annotator, Report};
pub use builder::{AttributeCursor, BuildReport, MergeStrategy, MergeTarget, TreeBuilder};
pub use cache::SourceCache;
pub use config::Options;
pub use dom::{AnnotationDocument, AnnotationNode, Arena, Balancing, NodeId, Span};
pub use error::{AnnotateError, ConfigError, ConflictReason, MergeConflict, Mismatch, Result};
pub use events::{drive, EventHandler, EventRecorder, EventSource, GrammarEvent, RecordedEvents};
pub use trace::{LineWriter, LogSink, MemorySink, NullSink, TraceSink};
