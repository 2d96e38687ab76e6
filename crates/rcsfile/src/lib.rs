#![deny(unsafe_code)]

//! # Overview
//!
//! `rcsfile` parses the classical RCS `,v` format and reconstructs the
//! full text of every revision it stores. The head revision is kept
//! verbatim; every other revision is recovered by replaying RCS
//! line-level edit scripts against its diff base. Symbolic names are
//! carried through, with branch symbols resolved onto their dated
//! descendants after the parse.
//!
//! # Design
//!
//! - [`literal`] implements the `@`-quoted string codec, including the
//!   odd/even trailing-`@` termination rule.
//! - [`parser`] walks the file line by line under an explicit state
//!   stack and produces an [`RcsFile`] revision graph keyed by dotted
//!   revision id.
//! - [`delta`] replays `a`/`d` edit scripts using an empty-slot model so
//!   every command addresses original-base line numbers.
//! - [`symbols`] rewrites symbol-only pseudo-revisions into branch
//!   labels.
//!
//! Revision texts and log messages are byte vectors end to end; nothing
//! in this crate assumes UTF-8 file contents.

pub mod date;
pub mod delta;
pub mod error;
mod lines;
pub mod literal;
pub mod parser;
pub mod revision;
pub mod symbols;

pub use date::parse_date;
pub use delta::{apply_script, DeltaError};
pub use error::{RcsError, RcsResult};
pub use literal::{LiteralDecoder, LiteralError, LiteralStatus};
pub use parser::{parse_bytes, parse_path};
pub use revision::{branch_label, RcsFile, Revision};
pub use symbols::resolve_pseudo_revisions;
