//! Byte-exact writer for fast-import records.
//!
//! The writer renders records into any [`io::Write`] target using `\n`
//! line endings only; the importer consumes raw bytes, so nothing here
//! may pass through locale-dependent text handling. Record ordering is
//! the exporters' contract, not the writer's.

use std::io::{self, Write};

use rcs_core::Ident;

/// Streaming sink rendering fast-import records into a writer.
#[derive(Debug)]
pub struct StreamWriter<W> {
    writer: W,
}

impl<W: Write> StreamWriter<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Emits a `blob` record carrying `data`.
    pub fn blob(&mut self, mark: usize, data: &[u8]) -> io::Result<()> {
        write!(self.writer, "blob\nmark :{mark}\n")?;
        self.data(data)
    }

    /// Emits a `data <len>` header followed by the raw bytes. A newline
    /// terminator is added unless the payload already ends with one.
    pub fn data(&mut self, bytes: &[u8]) -> io::Result<()> {
        write!(self.writer, "data {}\n", bytes.len())?;
        self.writer.write_all(bytes)?;
        if !bytes.ends_with(b"\n") {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Opens a `commit` record on `refs/heads/<branch>`.
    pub fn commit_begin(&mut self, branch: &str, mark: usize) -> io::Result<()> {
        write!(self.writer, "commit refs/heads/{branch}\nmark :{mark}\n")
    }

    /// Emits an `author` or `committer` line with a UTC timestamp.
    pub fn ident_line(&mut self, role: &str, ident: &Ident, epoch: i64) -> io::Result<()> {
        write!(self.writer, "{role} {ident} {epoch} +0000\n")
    }

    /// Emits a `from :<mark>` parent reference.
    pub fn from(&mut self, mark: usize) -> io::Result<()> {
        write!(self.writer, "from :{mark}\n")
    }

    /// Emits an `M <mode> :<blob> <path>` manifest line.
    pub fn file_modify(&mut self, mode: &str, blob: usize, path: &str) -> io::Result<()> {
        write!(self.writer, "M {mode} :{blob} {path}\n")
    }

    /// Emits a `D <path>` manifest line.
    pub fn file_delete(&mut self, path: &str) -> io::Result<()> {
        write!(self.writer, "D {path}\n")
    }

    /// Emits a `reset` record pointing `reference` at `mark`. The
    /// reference is given in full, e.g. `refs/tags/v1`.
    pub fn reset(&mut self, reference: &str, mark: usize) -> io::Result<()> {
        write!(self.writer, "reset {reference}\nfrom :{mark}\n")
    }
}
