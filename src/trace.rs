//! Trace output
//!
//! Diagnostics go to a `TraceSink` injected at construction. Sinks receive
//! whole lines; `LineWriter` adapts `fmt::Write` callers that produce
//! arbitrary chunks.

use std::fmt;
use std::sync::Mutex;

use memchr::memchr_iter;

/// Receiver of complete trace lines
pub trait TraceSink: Send + Sync {
    /// Accept one line, without its terminator
    fn line(&self, line: &str);
}

/// Forwards trace lines to the `log` facade at info level
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    target: &'static str,
}

impl LogSink {
    /// Sink logging under the crate's own target
    pub fn new() -> Self {
        LogSink { target: "tixml" }
    }

    /// Sink logging under a caller-chosen target
    pub fn with_target(target: &'static str) -> Self {
        LogSink { target }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for LogSink {
    fn line(&self, line: &str) {
        log::info!(target: self.target, "{}", line);
    }
}

/// Discards every line
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn line(&self, _line: &str) {}
}

/// Keeps lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the lines received so far
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Remove and return the lines received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TraceSink for MemorySink {
    fn line(&self, line: &str) {
        self.lock().push(line.to_string());
    }
}

/// `fmt::Write` adapter that delivers complete lines to a sink
///
/// Text after the last newline is held until more text completes it, or
/// until `finish` (or drop) flushes it as a final line.
pub struct LineWriter<'a> {
    sink: &'a dyn TraceSink,
    pending: String,
}

impl<'a> LineWriter<'a> {
    pub fn new(sink: &'a dyn TraceSink) -> Self {
        LineWriter {
            sink,
            pending: String::new(),
        }
    }

    /// Flush a trailing partial line, if any
    pub fn finish(&mut self) {
        if !self.pending.is_empty() {
            self.sink.line(&self.pending);
            self.pending.clear();
        }
    }
}

impl fmt::Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut from = 0;
        for newline in memchr_iter(b'\n', s.as_bytes()) {
            let chunk = &s[from..newline];
            if self.pending.is_empty() {
                self.sink.line(chunk);
            } else {
                self.pending.push_str(chunk);
                self.sink.line(&self.pending);
                self.pending.clear();
            }
            from = newline + 1;
        }
        self.pending.push_str(&s[from..]);
        Ok(())
    }
}

impl Drop for LineWriter<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
