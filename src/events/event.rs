//! Grammar Event Types
//!
//! The six structural events a grammar engine emits while it replays its
//! breakdown of an input text, plus the handler and source seams.

use std::fmt;

use crate::error::Result;

/// A structural event produced by an event source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarEvent {
    /// A nonterminal begins
    StartNonterminal(String),
    /// The innermost open nonterminal ends
    EndNonterminal(String),
    /// An attribute of the innermost open nonterminal begins
    StartAttribute(String),
    /// The innermost open attribute ends
    EndAttribute,
    /// One recognized character
    Terminal(u32),
    /// Characters consumed by the grammar but dropped from the output
    Excluded(usize),
}

/// Event discriminant, used in trace lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StartNonterminal,
    EndNonterminal,
    StartAttribute,
    EndAttribute,
    Terminal,
    Excluded,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::StartNonterminal => "startNonterminal",
            EventKind::EndNonterminal => "endNonterminal",
            EventKind::StartAttribute => "startAttribute",
            EventKind::EndAttribute => "endAttribute",
            EventKind::Terminal => "terminal",
            EventKind::Excluded => "excluded",
        };
        f.write_str(name)
    }
}

impl GrammarEvent {
    /// Get the discriminant
    pub fn kind(&self) -> EventKind {
        match self {
            GrammarEvent::StartNonterminal(_) => EventKind::StartNonterminal,
            GrammarEvent::EndNonterminal(_) => EventKind::EndNonterminal,
            GrammarEvent::StartAttribute(_) => EventKind::StartAttribute,
            GrammarEvent::EndAttribute => EventKind::EndAttribute,
            GrammarEvent::Terminal(_) => EventKind::Terminal,
            GrammarEvent::Excluded(_) => EventKind::Excluded,
        }
    }

    /// Deliver this event to a handler
    pub fn apply(&self, handler: &mut dyn EventHandler) -> Result<()> {
        match self {
            GrammarEvent::StartNonterminal(name) => handler.start_nonterminal(name),
            GrammarEvent::EndNonterminal(name) => handler.end_nonterminal(name),
            GrammarEvent::StartAttribute(name) => handler.start_attribute(name),
            GrammarEvent::EndAttribute => handler.end_attribute(),
            GrammarEvent::Terminal(codepoint) => handler.terminal(*codepoint),
            GrammarEvent::Excluded(length) => handler.excluded(*length),
        }
    }
}

/// Terminal events for each character of `text`
pub fn terminals(text: &str) -> impl Iterator<Item = GrammarEvent> + '_ {
    text.chars().map(|c| GrammarEvent::Terminal(c as u32))
}

/// Trait for handling grammar events
///
/// The event source calls these methods synchronously, in document order,
/// and waits for each to return before producing the next event. An `Err`
/// aborts the rest of the stream.
pub trait EventHandler {
    /// Called when a nonterminal starts
    fn start_nonterminal(&mut self, name: &str) -> Result<()>;

    /// Called when the innermost open nonterminal ends
    fn end_nonterminal(&mut self, name: &str) -> Result<()>;

    /// Called when an attribute of the innermost open nonterminal starts
    fn start_attribute(&mut self, name: &str) -> Result<()>;

    /// Called when the innermost open attribute ends
    fn end_attribute(&mut self) -> Result<()>;

    /// Called for each recognized character
    fn terminal(&mut self, codepoint: u32) -> Result<()>;

    /// Called for input that was consumed but not reproduced
    fn excluded(&mut self, length: usize) -> Result<()>;
}

/// A prepared grammar that can replay its breakdown of an input
///
/// Implementations are read-only after preparation and may be shared by
/// concurrent invocations; each invocation brings its own handler.
pub trait EventSource {
    /// Emit the events for `input` into `handler`
    ///
    /// A grammar that does not match the input reports it with
    /// `AnnotateError::Source`.
    fn emit(&self, input: &str, handler: &mut dyn EventHandler) -> Result<()>;
}

impl<F> EventSource for F
where
    F: Fn(&str, &mut dyn EventHandler) -> Result<()>,
{
    fn emit(&self, input: &str, handler: &mut dyn EventHandler) -> Result<()> {
        self(input, handler)
    }
}

/// Pull-style delivery: feed a finite event sequence to a handler
pub fn drive<I>(events: I, handler: &mut dyn EventHandler) -> Result<()>
where
    I: IntoIterator<Item = GrammarEvent>,
{
    for event in events {
        event.apply(handler)?;
    }
    Ok(())
}
