//! Error types for wikimatch-core.
//!
//! Only conditions that must stop a graph build are errors. Lookup misses,
//! redirect loops and ambiguous matches are ordinary return values.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors raised by the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Input data contradicts itself: duplicate canonical title, conflicting
    /// category definition, unknown id in an authoritative table.
    #[error("Data integrity violation: {message}")]
    DataIntegrity { message: String },

    /// A depth-bounded traversal was asked for a bound of zero.
    #[error("Invalid traversal depth {depth}: must be at least 1")]
    InvalidDepth { depth: usize },

    /// A line of a text input could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// An ancestor-table snapshot could not be encoded or decoded.
    #[error("Snapshot error: {message}")]
    Snapshot { message: String },
}

impl MatchError {
    /// Create a data integrity error.
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    /// Create a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a snapshot error.
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Whether this error must abort the current build step.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity { .. })
    }
}
