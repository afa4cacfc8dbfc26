//! Tree Builder
//!
//! Implements `EventHandler`: keeps the stack of open nonterminals and the
//! text cursor, and hands finished nodes to a `MergeTarget` according to
//! the configured strategy.

use std::fmt;
use std::sync::Arc;

use super::merge::MergeTarget;
use super::MergeStrategy;
use crate::config::Options;
use crate::core::chars::content_char;
use crate::dom::{AnnotationDocument, Arena, NodeId, Span};
use crate::error::{AnnotateError, Mismatch, Result};
use crate::events::{EventHandler, EventKind};
use crate::trace::{NullSink, TraceSink};

/// Counters of a builder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Final cursor position
    pub cursor: usize,
    /// Root-level nodes closed
    pub roots: usize,
    /// Nodes handed to the host document
    pub merged: usize,
}

/// An open nonterminal
struct OpenNode {
    /// Slot in the pending arena
    id: NodeId,
    /// Host ids of children already inserted (incremental only)
    claimed: Vec<NodeId>,
}

/// An open attribute scope of the innermost open node
struct AttributeFrame {
    name: String,
    value: String,
}

/// Builds annotation nodes from grammar events into a host document
///
/// One builder serves one event stream. Errors abort the stream; under the
/// deferred strategy nothing of an unfinished root subtree reaches the host.
pub struct TreeBuilder<'d, T: MergeTarget + ?Sized = AnnotationDocument> {
    target: &'d mut T,
    options: Options,
    trace: Arc<dyn TraceSink>,
    /// Nodes not yet handed to the target
    pending: Arena,
    stack: Vec<OpenNode>,
    attributes: Vec<AttributeFrame>,
    cursor: usize,
    roots: usize,
    merged: usize,
}

impl<'d, T: MergeTarget + ?Sized> TreeBuilder<'d, T> {
    /// Create a builder that merges into `target`
    pub fn new(target: &'d mut T, options: Options) -> Self {
        TreeBuilder {
            target,
            options,
            trace: Arc::new(NullSink),
            pending: Arena::new(),
            stack: Vec::with_capacity(32),
            attributes: Vec::new(),
            cursor: 0,
            roots: 0,
            merged: 0,
        }
    }

    /// Send trace lines to `sink`
    pub fn with_trace(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    /// Current cursor position
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of open nonterminals
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Counters so far
    pub fn report(&self) -> BuildReport {
        BuildReport {
            cursor: self.cursor,
            roots: self.roots,
            merged: self.merged,
        }
    }

    /// End the stream, checking that every scope was closed
    pub fn finish(self) -> Result<BuildReport> {
        if !self.stack.is_empty() || !self.attributes.is_empty() {
            return Err(self.mismatch(Mismatch::Unclosed {
                open_nodes: self.stack.len(),
                open_attributes: self.attributes.len(),
            }));
        }
        Ok(self.report())
    }

    fn mismatch(&self, kind: Mismatch) -> AnnotateError {
        AnnotateError::StructuralMismatch {
            kind,
            cursor: self.cursor,
        }
    }

    fn trace_event(&self, kind: EventKind, detail: fmt::Arguments<'_>) {
        if self.options.trace {
            self.trace
                .line(&format!("{} {} @{}", kind, detail, self.cursor));
        }
    }

    fn advance(&mut self, length: usize) -> Result<()> {
        self.cursor = self
            .cursor
            .checked_add(length)
            .ok_or(AnnotateError::CursorOverflow {
                length,
                cursor: self.cursor,
            })?;
        Ok(())
    }

    /// Hand a closed node to the target
    fn deliver(&mut self, node: OpenNode) -> Result<()> {
        let name = self.pending.name(node.id).unwrap_or_default().to_string();
        let span = self.pending.node(node.id).span;

        match self.options.merge {
            MergeStrategy::Deferred => {
                if let Some(parent) = self.stack.last() {
                    self.pending.append_child(parent.id, node.id);
                    return Ok(());
                }
                let count = 1 + self.pending.descendants(node.id).count();
                let result = self
                    .target
                    .merge(&self.pending, node.id, self.options.balancing);
                self.pending.release(node.id);
                result?;
                self.roots += 1;
                self.merged += count;
                if self.options.verbose {
                    self.trace
                        .line(&format!("merged {} {}, {} node(s)", name, span, count));
                }
            }
            MergeStrategy::Incremental => {
                let result = self.target.insert(
                    &self.pending,
                    node.id,
                    &node.claimed,
                    self.options.balancing,
                );
                self.pending.release(node.id);
                let host = result?;
                self.merged += 1;
                match self.stack.last_mut() {
                    Some(parent) => parent.claimed.push(host),
                    None => self.roots += 1,
                }
                if self.options.verbose {
                    self.trace.line(&format!(
                        "inserted {} {} over {} child(ren)",
                        name,
                        span,
                        node.claimed.len()
                    ));
                }
            }
        }
        log::debug!("closed `{}` {}", name, span);
        Ok(())
    }
}

impl<T: MergeTarget + ?Sized> EventHandler for TreeBuilder<'_, T> {
    fn start_nonterminal(&mut self, name: &str) -> Result<()> {
        self.trace_event(EventKind::StartNonterminal, format_args!("{}", name));
        if name.is_empty() {
            return Err(self.mismatch(Mismatch::EmptyName));
        }
        if !self.attributes.is_empty() {
            return Err(self.mismatch(Mismatch::NonterminalInAttribute(name.to_string())));
        }
        let id = self
            .pending
            .alloc_element(name, Span::empty_at(self.cursor));
        self.stack.push(OpenNode {
            id,
            claimed: Vec::new(),
        });
        Ok(())
    }

    fn end_nonterminal(&mut self, name: &str) -> Result<()> {
        self.trace_event(EventKind::EndNonterminal, format_args!("{}", name));
        let Some(open) = self.stack.last() else {
            return Err(self.mismatch(Mismatch::UnopenedEnd(name.to_string())));
        };
        let open_name = self.pending.name(open.id).unwrap_or_default();
        if open_name != name {
            return Err(self.mismatch(Mismatch::NameMismatch {
                open: open_name.to_string(),
                found: name.to_string(),
            }));
        }
        if !self.attributes.is_empty() {
            return Err(self.mismatch(Mismatch::AttributeOpenAtEnd(name.to_string())));
        }
        let Some(node) = self.stack.pop() else {
            return Err(self.mismatch(Mismatch::UnopenedEnd(name.to_string())));
        };
        self.pending.node_mut(node.id).span.end = self.cursor;
        self.deliver(node)
    }

    fn start_attribute(&mut self, name: &str) -> Result<()> {
        self.trace_event(EventKind::StartAttribute, format_args!("{}", name));
        if self.stack.is_empty() {
            return Err(self.mismatch(Mismatch::AttributeOutsideNode(name.to_string())));
        }
        self.attributes.push(AttributeFrame {
            name: name.to_string(),
            value: String::new(),
        });
        Ok(())
    }

    fn end_attribute(&mut self) -> Result<()> {
        let Some(frame) = self.attributes.pop() else {
            self.trace_event(EventKind::EndAttribute, format_args!("-"));
            return Err(self.mismatch(Mismatch::UnopenedAttributeEnd));
        };
        self.trace_event(
            EventKind::EndAttribute,
            format_args!("{}={:?}", frame.name, frame.value),
        );
        let Some(owner) = self.stack.last().map(|open| open.id) else {
            return Err(self.mismatch(Mismatch::AttributeOutsideNode(frame.name)));
        };
        let name_id = self.pending.names.intern(&frame.name);
        self.pending
            .node_mut(owner)
            .set_attribute(name_id, frame.value);
        Ok(())
    }

    fn terminal(&mut self, codepoint: u32) -> Result<()> {
        self.trace_event(EventKind::Terminal, format_args!("U+{:04X}", codepoint));
        let Some(ch) = content_char(codepoint) else {
            return Err(AnnotateError::IllegalContentCharacter {
                codepoint,
                cursor: self.cursor,
            });
        };
        let advances = match self.attributes.last() {
            None => true,
            Some(frame) => self.options.attribute_cursor.advances(&frame.name),
        };
        if advances {
            self.advance(1)?;
        }
        if let Some(frame) = self.attributes.last_mut() {
            frame.value.push(ch);
        }
        Ok(())
    }

    fn excluded(&mut self, length: usize) -> Result<()> {
        self.trace_event(EventKind::Excluded, format_args!("{}", length));
        self.advance(length)
    }
}
