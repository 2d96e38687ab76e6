//! Error types for `,v` parsing and revision reconstruction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::delta::DeltaError;

/// Result type for parser operations.
pub type RcsResult<T> = Result<T, RcsError>;

/// Errors raised while parsing a `,v` file or reconstructing its
/// revisions. All variants are fatal to the file being parsed.
#[derive(Debug, Error)]
pub enum RcsError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A string literal was missing its `@` delimiter or ran past the end
    /// of the file.
    #[error("malformed @-literal at line {line}")]
    MalformedLiteral {
        /// One-based line number of the offending literal.
        line: usize,
    },

    /// An unrecognized construct appeared where a top-level command was
    /// expected.
    #[error("unknown command at line {line}: '{text}'")]
    UnknownCommand {
        /// One-based line number.
        line: usize,
        /// Offending line text.
        text: String,
    },

    /// A `date` header line did not follow the RCS date grammar.
    #[error("malformed date at line {line}: '{text}'")]
    BadDate {
        /// One-based line number.
        line: usize,
        /// Offending line text.
        text: String,
    },

    /// A revision was assigned a second diff base by `next` or
    /// `branches`, indicating a corrupted file.
    #[error("revision {rev} assigned a second diff base")]
    DuplicateDiffBase {
        /// Revision id with the conflicting assignment.
        rev: String,
    },

    /// A delta script could not be parsed or applied.
    #[error("bad diff script at line {line}: {source}")]
    Delta {
        /// One-based line number of the `text` literal.
        line: usize,
        /// Underlying delta failure.
        #[source]
        source: DeltaError,
    },

    /// A revision's diff base was missing or had no materialized text
    /// when replay began.
    #[error("missing diff base for revision {rev}")]
    MissingDiffBase {
        /// Revision whose base could not be found.
        rev: String,
    },

    /// A symbol-only pseudo-revision had no dated descendant to attach
    /// its symbols to.
    #[error("complex branch structure at revision {rev}")]
    ComplexBranch {
        /// Pseudo-revision id.
        rev: String,
    },

    /// The file ended in the middle of a section.
    #[error("unexpected end of file at line {line}")]
    TruncatedFile {
        /// One-based line number of the last line read.
        line: usize,
    },

    /// Keyword expansion through the external `co` tool failed.
    #[error("keyword expansion failed for {} rev {rev}: {reason}", path.display())]
    KeywordExpansion {
        /// The `,v` file handed to `co`.
        path: PathBuf,
        /// Revision being checked out.
        rev: String,
        /// Description of the failure.
        reason: String,
    },
}
