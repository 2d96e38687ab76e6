//! Error types for export operations.

use std::io;

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised while emitting the fast-import stream.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to the output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Multi-file export encountered a branched revision without
    /// `--skip-branches`.
    #[error("cannot coalesce branched revision {rev} of {file}; rerun with --skip-branches to drop it")]
    BranchedInput {
        /// Logical filename carrying the branch.
        file: String,
        /// Branched revision id.
        rev: String,
    },

    /// A revision reached the exporter without a date, author, or
    /// materialized text.
    #[error("revision {rev} of {file} is incomplete and cannot be exported")]
    IncompleteRevision {
        /// Logical filename.
        file: String,
        /// Offending revision id.
        rev: String,
    },

    /// No revision became eligible during a full export pass, which
    /// only happens when the parent relation is cyclic.
    #[error("revision graph of {file} contains a cycle")]
    Cycle {
        /// Logical filename.
        file: String,
    },
}
