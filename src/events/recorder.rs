//! Event Recorder
//!
//! Implements EventHandler to capture an event stream, and replays a
//! captured stream as an EventSource.

use super::event::{EventHandler, EventSource, GrammarEvent};
use crate::error::Result;

/// Handler that records every event it receives
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    events: Vec<GrammarEvent>,
}

impl EventRecorder {
    /// Create a new recorder
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
        }
    }

    /// Get the recorded events as a slice
    pub fn events(&self) -> &[GrammarEvent] {
        &self.events
    }

    /// Take the recorded events
    pub fn take_events(&mut self) -> Vec<GrammarEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get number of recorded events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Turn the recording into a replayable source
    pub fn into_source(self) -> RecordedEvents {
        RecordedEvents {
            events: self.events,
        }
    }
}

impl EventHandler for EventRecorder {
    fn start_nonterminal(&mut self, name: &str) -> Result<()> {
        self.events
            .push(GrammarEvent::StartNonterminal(name.to_string()));
        Ok(())
    }

    fn end_nonterminal(&mut self, name: &str) -> Result<()> {
        self.events.push(GrammarEvent::EndNonterminal(name.to_string()));
        Ok(())
    }

    fn start_attribute(&mut self, name: &str) -> Result<()> {
        self.events.push(GrammarEvent::StartAttribute(name.to_string()));
        Ok(())
    }

    fn end_attribute(&mut self) -> Result<()> {
        self.events.push(GrammarEvent::EndAttribute);
        Ok(())
    }

    fn terminal(&mut self, codepoint: u32) -> Result<()> {
        self.events.push(GrammarEvent::Terminal(codepoint));
        Ok(())
    }

    fn excluded(&mut self, length: usize) -> Result<()> {
        self.events.push(GrammarEvent::Excluded(length));
        Ok(())
    }
}

/// A fixed event stream that replays regardless of the input text
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordedEvents {
    events: Vec<GrammarEvent>,
}

impl RecordedEvents {
    /// Get the events as a slice
    pub fn events(&self) -> &[GrammarEvent] {
        &self.events
    }
}

impl From<Vec<GrammarEvent>> for RecordedEvents {
    fn from(events: Vec<GrammarEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<GrammarEvent> for RecordedEvents {
    fn from_iter<I: IntoIterator<Item = GrammarEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl EventSource for RecordedEvents {
    fn emit(&self, _input: &str, handler: &mut dyn EventHandler) -> Result<()> {
        for event in &self.events {
            event.apply(handler)?;
        }
        Ok(())
    }
}
