//! RCS delta replay.
//!
//! Every revision except the head is stored as an edit script against its
//! diff base: `a<line> <count>` appends the next `<count>` payload lines
//! after base line `<line>`, `d<line> <count>` deletes `<count>` lines
//! starting at base line `<line>`. Line numbers are 1-based positions in
//! the *original* base, even after earlier commands have logically
//! removed lines.

use thiserror::Error;

use crate::lines::trim_newline;

/// Errors raised while parsing or applying a delta script.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    /// A script line was neither an `a` nor a `d` command.
    #[error("unrecognized diff command '{text}'")]
    BadCommand {
        /// Offending command text.
        text: String,
    },
    /// A command addressed lines outside the base text.
    #[error("diff command '{text}' is out of range for a {base_lines}-line base")]
    OutOfRange {
        /// Offending command text.
        text: String,
        /// Number of lines in the base text.
        base_lines: usize,
    },
    /// The script ended before an `a` command's payload was complete.
    #[error("diff payload truncated: expected {expected} lines, found {found}")]
    TruncatedPayload {
        /// Payload lines announced by the command.
        expected: usize,
        /// Payload lines actually present.
        found: usize,
    },
}

/// Applies an RCS edit script to `base`, producing the new line sequence.
///
/// The base is materialized as one slot per line; `d` empties slots
/// rather than removing them and `a` prepends payload into the slot
/// holding the following base line. Both command kinds thereby address
/// the same original-base coordinates in a single pass, with no offset
/// bookkeeping.
pub fn apply_script(base: &[Vec<u8>], script: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, DeltaError> {
    let mut slots: Vec<Vec<Vec<u8>>> = base.iter().map(|line| vec![line.clone()]).collect();

    let mut index = 0;
    if let Some(first) = script.first() {
        if trim_newline(first).is_empty() {
            tracing::warn!("skipping empty leading line in diff script");
            index = 1;
        }
    }

    while index < script.len() {
        let raw = &script[index];
        index += 1;
        let command = trim_newline(raw);
        let text = || String::from_utf8_lossy(command).into_owned();

        match command.first() {
            Some(b'a') => {
                let (line, count) = parse_operands(&command[1..])
                    .ok_or_else(|| DeltaError::BadCommand { text: text() })?;
                let found = script.len() - index;
                if found < count {
                    return Err(DeltaError::TruncatedPayload {
                        expected: count,
                        found,
                    });
                }
                let payload = &script[index..index + count];
                index += count;

                if line > slots.len() {
                    return Err(DeltaError::OutOfRange {
                        text: text(),
                        base_lines: base.len(),
                    });
                }
                if line == slots.len() {
                    slots.push(Vec::new());
                }
                // Prepend: the slot's own base line follows the payload,
                // keeping it after base line `line` in the flattened output.
                slots[line].splice(0..0, payload.iter().cloned());
            }
            Some(b'd') => {
                let (line, count) = parse_operands(&command[1..])
                    .ok_or_else(|| DeltaError::BadCommand { text: text() })?;
                if line == 0 || count == 0 || line + count - 1 > base.len() {
                    return Err(DeltaError::OutOfRange {
                        text: text(),
                        base_lines: base.len(),
                    });
                }
                for slot in &mut slots[line - 1..line - 1 + count] {
                    slot.clear();
                }
            }
            _ => return Err(DeltaError::BadCommand { text: text() }),
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Parses the `<line> <count>` operand pair. Signed or otherwise
/// malformed numbers fail the parse, which the caller reports as a
/// corrupt script.
fn parse_operands(operands: &[u8]) -> Option<(usize, usize)> {
    let operands = std::str::from_utf8(operands).ok()?;
    let mut parts = operands.split_whitespace();
    let line = parts.next()?.parse().ok()?;
    let count = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((line, count))
}
