//! The `@`-quoted string literal codec of `,v` files.
//!
//! A literal starts with `@` and runs until the first line whose trailing
//! `@` run (immediately before the newline) has odd length; an
//! even-length run is entirely escaped and the literal continues. Inside
//! a literal every `@` is doubled.

use thiserror::Error;

use crate::lines::{split_lines, trim_newline};

/// Errors raised while decoding a literal.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LiteralError {
    /// The first character was not `@`.
    #[error("literal does not start with '@'")]
    MissingDelimiter,
    /// Input ended before a terminating odd-`@` line.
    #[error("literal not terminated before end of input")]
    Unterminated,
}

/// Outcome of feeding one physical line into a [`LiteralDecoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralStatus {
    /// The literal continues on the next line.
    NeedMore,
    /// The terminating line was consumed.
    Done,
}

/// Incremental decoder fed one physical line at a time.
///
/// Lines must include their trailing `\n` so the terminator scan sees the
/// `@` run in end-of-line position; the final line of a file may arrive
/// without one.
#[derive(Debug, Default)]
pub struct LiteralDecoder {
    lines: Vec<Vec<u8>>,
    started: bool,
    done: bool,
}

impl LiteralDecoder {
    /// Creates a decoder expecting the opening `@` on the first line fed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the terminating line has been consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds one physical line.
    pub fn feed(&mut self, line: &[u8]) -> Result<LiteralStatus, LiteralError> {
        debug_assert!(!self.done, "fed a line after the literal terminated");
        let body = if self.started {
            line
        } else {
            self.started = true;
            line.strip_prefix(b"@").ok_or(LiteralError::MissingDelimiter)?
        };

        let content = trim_newline(body);
        let run = trailing_at_run(content);
        if run % 2 == 1 {
            // Terminating line: everything before the final `@` belongs to
            // the literal, without a newline.
            let kept = &content[..content.len() - 1];
            if !kept.is_empty() {
                self.lines.push(unescape(kept));
            }
            self.done = true;
            Ok(LiteralStatus::Done)
        } else {
            self.lines.push(unescape(body));
            Ok(LiteralStatus::NeedMore)
        }
    }

    /// Consumes the decoder, returning the decoded lines. Middle lines
    /// keep their newline; a non-empty final fragment has none.
    pub fn into_lines(self) -> Result<Vec<Vec<u8>>, LiteralError> {
        if self.done {
            Ok(self.lines)
        } else {
            Err(LiteralError::Unterminated)
        }
    }
}

/// Encodes raw bytes as a `,v` literal, delimiters included.
#[must_use]
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.push(b'@');
    for &byte in data {
        out.push(byte);
        if byte == b'@' {
            out.push(b'@');
        }
    }
    out.push(b'@');
    out
}

/// Decodes a complete literal held in memory, returning the raw bytes.
pub fn decode(quoted: &[u8]) -> Result<Vec<u8>, LiteralError> {
    let mut decoder = LiteralDecoder::new();
    for line in split_lines(quoted) {
        if decoder.is_done() {
            break;
        }
        decoder.feed(line)?;
    }
    Ok(decoder.into_lines()?.concat())
}

fn trailing_at_run(content: &[u8]) -> usize {
    content.iter().rev().take_while(|&&b| b == b'@').count()
}

fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut iter = raw.iter();
    while let Some(&byte) = iter.next() {
        out.push(byte);
        if byte == b'@' {
            // Skip the escape double.
            iter.next();
        }
    }
    out
}
