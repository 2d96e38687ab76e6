#![deny(unsafe_code)]

//! # Overview
//!
//! `rcs_core` collects the pieces of the `rcs-fast-export` workspace that
//! every other crate needs but none owns: process exit codes, the program
//! version banner, committer identity discovery, authors-map parsing, and
//! the [`ExportOptions`] bundle assembled by the command-line frontend.
//!
//! # Design
//!
//! The crate is deliberately free of I/O beyond reading the authors-map
//! file. Options are an owned value built once by the frontend and passed
//! by reference down the call tree; nothing in the workspace consults
//! global mutable state.

pub mod authors;
pub mod exit_code;
pub mod identity;
pub mod options;
pub mod version;

pub use authors::{AuthorsMap, AuthorsMapError};
pub use exit_code::ExitCode;
pub use identity::Ident;
pub use options::ExportOptions;
