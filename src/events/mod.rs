//! Grammar Event Module
//!
//! Event-based interface between a grammar engine and the tree builder.
//!
//! ## Architecture
//!
//! ```text
//! EventSource ---> EventHandler (TreeBuilder) ---> AnnotationDocument
//!      |
//!      +---> EventRecorder ---> RecordedEvents (replayable EventSource)
//! ```
//!
//! ## Event Types
//!
//! - `StartNonterminal` / `EndNonterminal` - a recognized span opens / closes
//! - `StartAttribute` / `EndAttribute` - an attribute of the open span
//! - `Terminal` - one recognized character
//! - `Excluded` - input consumed but dropped from the output text
//!
//! Sources may push events into a handler or hand out an iterator that
//! `drive` feeds to one; both keep strict synchronous ordering.

pub mod event;
pub mod recorder;

pub use event::{drive, terminals, EventHandler, EventKind, EventSource, GrammarEvent};
pub use recorder::{EventRecorder, RecordedEvents};
