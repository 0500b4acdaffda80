//! Error types for factchain.
//!
//! All errors are strongly typed using thiserror. Non-derivability and
//! proof cycles are not errors: they are normal negative outcomes.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid input supplied at the engine boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown fact id: {id}")]
    UnknownFact {
        id: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },

    #[error("Unsupported query version '{version}'")]
    UnsupportedVersion {
        version: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Malformed query document: {reason}")]
    MalformedQuery {
        reason: String,
    },
}

/// Failures while running queries on the session runtime.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Session queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Session workers disconnected")]
    Disconnected,
}

/// A problem found while loading a fact or rule source.
///
/// Loading never aborts on these: the offending line (or the whole
/// source, for read errors) is skipped and the problem is reported.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{source_name}:{line}: malformed {kind} record: {text:?}")]
    Format {
        source_name: String,
        line: usize,
        kind: RecordKind,
        text: String,
    },

    #[error("{source_name}:{line}: duplicate fact id '{id}' ignored")]
    DuplicateFact {
        source_name: String,
        line: usize,
        id: String,
    },

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// True for a malformed-line report.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// True for an unreadable source.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// Which kind of record a source line was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `id;name`
    Fact,
    /// `conditions:consequences`
    Rule,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fact => f.write_str("fact"),
            Self::Rule => f.write_str("rule"),
        }
    }
}

/// Top-level error type for factchain.
#[derive(Debug, Error)]
pub enum FactchainError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FactchainError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(e) => matches!(e, ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }),
            Self::Validation(_) | Self::Load(_) | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for factchain operations.
pub type FactchainResult<T> = Result<T, FactchainError>;
