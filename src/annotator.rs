//! Annotator - one prepared event source, many invocations
//!
//! Each call runs its own `TreeBuilder`, so one annotator can serve
//! concurrent invocations as long as its event source is `Sync`.
//!
//! Modes:
//! - Standalone: `annotate(input)` builds a fresh document over the input
//! - Overlay: `annotate_into(&mut doc)` merges into existing markup over the
//!   document's own text

use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::builder::{BuildReport, TreeBuilder};
use crate::config::Options;
use crate::dom::AnnotationDocument;
use crate::error::{AnnotateError, Result};
use crate::events::EventSource;
use crate::trace::{LineWriter, NullSink, TraceSink};

/// Outcome of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Cursor when the stream ended
    pub cursor: usize,
    /// Root-level nodes closed
    pub roots: usize,
    /// Nodes handed to the document
    pub merged: usize,
    /// Source failure, kept when `fail_on_error` is off
    pub failure: Option<AnnotateError>,
    /// Wall time, when `timing` is on
    pub elapsed: Option<Duration>,
}

impl Report {
    /// True when the event source matched the input
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn new(build: BuildReport, failure: Option<AnnotateError>) -> Self {
        Report {
            cursor: build.cursor,
            roots: build.roots,
            merged: build.merged,
            failure,
            elapsed: None,
        }
    }
}

/// A standalone result: the new document and how it was built
#[derive(Debug, Clone)]
pub struct Annotated {
    /// Document over the input text holding the new annotations
    pub document: AnnotationDocument,
    /// Counters and outcome of the run
    pub report: Report,
}

/// Runs a shared event source over inputs and documents
pub struct Annotator<S> {
    source: Arc<S>,
    options: Options,
    trace: Arc<dyn TraceSink>,
}

impl<S> Clone for Annotator<S> {
    fn clone(&self) -> Self {
        Annotator {
            source: Arc::clone(&self.source),
            options: self.options,
            trace: Arc::clone(&self.trace),
        }
    }
}

impl<S: EventSource> Annotator<S> {
    /// Annotator over `source` with default options
    pub fn new(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Annotator over an already shared source (see `SourceCache`)
    pub fn from_shared(source: Arc<S>) -> Self {
        Annotator {
            source,
            options: Options::default(),
            trace: Arc::new(NullSink),
        }
    }

    /// Replace the options used by every later invocation
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Send trace and summary lines to `sink`
    pub fn with_trace(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    /// Current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The shared event source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build a fresh document over `input`
    pub fn annotate(&self, input: &str) -> Result<Annotated> {
        let mut document = AnnotationDocument::new(input);
        let report = self.run(input, &mut document)?;
        Ok(Annotated { document, report })
    }

    /// Merge into `document`, using its text as the input
    pub fn annotate_into(&self, document: &mut AnnotationDocument) -> Result<Report> {
        let input = document.text().to_string();
        self.run(&input, document)
    }

    fn run(&self, input: &str, document: &mut AnnotationDocument) -> Result<Report> {
        let started = self.options.timing.then(Instant::now);

        let mut builder =
            TreeBuilder::new(document, self.options).with_trace(Arc::clone(&self.trace));
        let mut report = match self.source.emit(input, &mut builder) {
            Ok(()) => Report::new(builder.finish()?, None),
            Err(err @ AnnotateError::Source { .. }) if !self.options.fail_on_error => {
                log::warn!("event source failed: {}", err);
                Report::new(builder.report(), Some(err))
            }
            Err(err) => return Err(err),
        };
        report.elapsed = started.map(|at| at.elapsed());

        self.summarize(input, &report);
        Ok(report)
    }

    fn summarize(&self, input: &str, report: &Report) {
        if !(self.options.verbose || self.options.timing || report.failure.is_some()) {
            return;
        }
        let mut out = LineWriter::new(self.trace.as_ref());
        if let Some(failure) = &report.failure {
            let _ = writeln!(out, "failed: {}", failure);
        }
        if self.options.verbose {
            let _ = writeln!(
                out,
                "annotated {} char(s): cursor {}, {} root(s), {} node(s)",
                input.chars().count(),
                report.cursor,
                report.roots,
                report.merged
            );
        }
        if let Some(elapsed) = report.elapsed {
            let _ = write!(out, "elapsed {:?}", elapsed);
        }
        out.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MergeStrategy;
    use crate::error::Mismatch;
    use crate::events::{terminals, EventHandler, GrammarEvent, RecordedEvents};
    use crate::trace::MemorySink;

    /// Wraps every run of ASCII letters in a `w` nonterminal, fails on digits
    fn words(input: &str, handler: &mut dyn EventHandler) -> Result<()> {
        let mut in_word = false;
        for (at, ch) in input.chars().enumerate() {
            if ch.is_ascii_digit() {
                return Err(AnnotateError::source(format!("unexpected {:?}", ch), at));
            }
            let letter = ch.is_ascii_alphabetic();
            if letter && !in_word {
                handler.start_nonterminal("w")?;
            } else if !letter && in_word {
                handler.end_nonterminal("w")?;
            }
            in_word = letter;
            handler.terminal(ch as u32)?;
        }
        if in_word {
            handler.end_nonterminal("w")?;
        }
        Ok(())
    }

    type Words = fn(&str, &mut dyn EventHandler) -> Result<()>;

    fn annotator() -> Annotator<Words> {
        Annotator::new(words as Words)
    }

    #[test]
    fn test_standalone() {
        let annotated = annotator().annotate("The cat sat").unwrap();
        assert_eq!(annotated.document.outline(), "w[0,3) w[4,7) w[8,11)");
        assert_eq!(annotated.report.cursor, 11);
        assert_eq!(annotated.report.roots, 3);
        assert!(annotated.report.is_success());
        assert!(annotated.report.elapsed.is_none());
    }

    #[test]
    fn test_overlay() {
        let mut doc = AnnotationDocument::new("The cat sat");
        doc.add_span("s", 0..11).unwrap();
        doc.add_span("x", 2..5).unwrap();

        let report = annotator().annotate_into(&mut doc).unwrap();
        assert_eq!(report.merged, 3);
        assert_eq!(
            doc.outline(),
            "s[0,11){w[0,3){x[2,3)} x[3,4) w[4,7){x[4,5)} w[8,11)}"
        );
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_source_failure_reported() {
        let sink = Arc::new(MemorySink::new());
        let annotator = annotator().with_trace(sink.clone());

        let annotated = annotator.annotate("ab 1").unwrap();
        assert_eq!(annotated.document.outline(), "w[0,2)");
        assert_eq!(
            annotated.report.failure,
            Some(AnnotateError::source("unexpected '1'", 3))
        );
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].starts_with("failed: event source failed at cursor 3"));
    }

    #[test]
    fn test_source_failure_propagated() {
        let options = Options::default().with_fail_on_error(true);
        let err = annotator().with_options(options).annotate("1").unwrap_err();
        assert!(matches!(err, AnnotateError::Source { cursor: 0, .. }));
    }

    #[test]
    fn test_structural_errors_always_propagate() {
        let source = |_input: &str, handler: &mut dyn EventHandler| -> Result<()> {
            handler.start_nonterminal("open")
        };
        let err = Annotator::new(source).annotate("a").unwrap_err();
        assert_eq!(
            err,
            AnnotateError::StructuralMismatch {
                kind: Mismatch::Unclosed {
                    open_nodes: 1,
                    open_attributes: 0
                },
                cursor: 0
            }
        );
    }

    #[test]
    fn test_verbose_and_timing() {
        let sink = Arc::new(MemorySink::new());
        let options = Options::default()
            .with_verbose(true)
            .with_timing(true)
            .with_merge(MergeStrategy::Incremental);
        let annotator = annotator().with_options(options).with_trace(sink.clone());

        let annotated = annotator.annotate("ab cd").unwrap();
        assert!(annotated.report.elapsed.is_some());

        let lines = sink.lines();
        assert_eq!(lines[0], "inserted w [0,2) over 0 child(ren)");
        assert_eq!(
            lines[2],
            "annotated 5 char(s): cursor 5, 2 root(s), 2 node(s)"
        );
        assert!(lines[3].starts_with("elapsed "));
    }

    #[test]
    fn test_recorded_events_replay() {
        let mut events = vec![GrammarEvent::StartNonterminal("R".into())];
        events.extend(terminals("ab"));
        events.push(GrammarEvent::EndNonterminal("R".into()));
        let source: RecordedEvents = events.into_iter().collect();

        let annotator = Annotator::new(source);
        for _ in 0..2 {
            let annotated = annotator.annotate("ab").unwrap();
            assert_eq!(annotated.document.outline(), "R[0,2)");
        }
        assert_eq!(annotator.source().events().len(), 4);
    }
}
