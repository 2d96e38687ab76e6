#![deny(unsafe_code)]

//! # Overview
//!
//! `rcs_export` turns parsed [`RcsFile`](rcsfile::RcsFile) revision
//! graphs into a git fast-import stream. Blobs go out first, in the
//! order revision texts were materialized; commits follow with parents
//! always ahead of children, so every `from :<mark>` reference points
//! backwards into the stream.
//!
//! # Design
//!
//! - [`marks`] numbers blobs and commits; allocation order alone
//!   determines the numbering, keeping reruns byte-identical.
//! - [`stream`] renders the individual record forms into any
//!   [`io::Write`](std::io::Write) target, byte-exactly.
//! - [`single`] exports one file's history, branch labels and all.
//! - [`coalesce`] groups single-file revisions from many files into
//!   multi-file commits under the fuzzy-time heuristic, and
//!   [`multi`] emits the survivors.

pub mod blobs;
pub mod coalesce;
pub mod error;
pub mod marks;
pub mod multi;
pub mod single;
pub mod stream;

pub use blobs::export_blobs;
pub use coalesce::{build_commits, coalesce, Commit, Tree, TreeEntry};
pub use error::{ExportError, ExportResult};
pub use marks::Marks;
pub use multi::export_coalesced;
pub use single::export_file_commits;
pub use stream::StreamWriter;
