//! Derivation trace recorder.
//!
//! An append-only log of human-readable lines written by the chainers.
//! It is a pure observer: nothing reads it while chaining.

use serde::{Deserialize, Serialize};

/// Ordered derivation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    lines: Vec<String>,
}

impl Trace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// All lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last recorded line.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Consumes the trace, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
