//! Line-oriented parser for the `,v` grammar.
//!
//! The parser runs an explicit state stack instead of nested control
//! flow: `ReadLiteral` is pushed by every construct that consumes an
//! `@`-literal (`desc`, `log`, `text`) and pops back to whichever state
//! requested it. Revision headers and revision data share one `Admin`
//! bottom state; a numeric token opens a header block before `desc` has
//! been seen and a data block afterwards.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::date::parse_date;
use crate::delta::apply_script;
use crate::error::{RcsError, RcsResult};
use crate::lines::{split_lines, trim_newline};
use crate::literal::{LiteralDecoder, LiteralStatus};
use crate::revision::{branch_label, RcsFile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Admin,
    Symbols,
    NewRevision,
    Branches,
    Desc,
    RevisionData,
    Log,
    Head,
    Diff,
    ReadLiteral,
    SkippingLines,
}

/// Parses the `,v` file at `path`, exporting it under the logical
/// `name`. The executable bit is taken from the file's permissions.
///
/// With `expand_keywords` the delta replayer is bypassed and every
/// revision text is obtained from an external `co -q -p<rev>` run, so
/// RCS keywords come out expanded exactly as `co` would print them.
pub fn parse_path(
    path: &Path,
    name: impl Into<String>,
    expand_keywords: bool,
) -> RcsResult<RcsFile> {
    let bytes = fs::read(path)?;
    let executable = is_executable(path);
    let mut rcs = Parser::new(name, executable, expand_keywords).run(&bytes)?;
    if expand_keywords {
        expand_with_co(&mut rcs, path)?;
    }
    Ok(rcs)
}

/// Parses a `,v` file already held in memory. Used by tests and by
/// callers that manage their own I/O; keyword expansion is unavailable
/// here because it needs the on-disk file.
pub fn parse_bytes(bytes: &[u8], name: impl Into<String>, executable: bool) -> RcsResult<RcsFile> {
    Parser::new(name, executable, false).run(bytes)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

struct Parser {
    rcs: RcsFile,
    stack: Vec<State>,
    current: Option<String>,
    literal: Option<LiteralDecoder>,
    seen_desc: bool,
    expand_keywords: bool,
    lineno: usize,
}

impl Parser {
    fn new(name: impl Into<String>, executable: bool, expand_keywords: bool) -> Self {
        let mut rcs = RcsFile::new(name);
        rcs.executable = executable;
        Self {
            rcs,
            stack: vec![State::Admin],
            current: None,
            literal: None,
            seen_desc: false,
            expand_keywords,
            lineno: 0,
        }
    }

    fn run(mut self, bytes: &[u8]) -> RcsResult<RcsFile> {
        for line in split_lines(bytes) {
            self.lineno += 1;
            self.feed(line)?;
        }
        self.finish()
    }

    fn top(&self) -> State {
        *self.stack.last().unwrap_or(&State::Admin)
    }

    fn feed(&mut self, line: &[u8]) -> RcsResult<()> {
        match self.top() {
            State::ReadLiteral => self.literal_line(line),
            State::Admin => self.admin_line(line),
            State::Symbols => self.symbols_line(line),
            State::NewRevision => self.header_line(line),
            State::Branches => self.branches_line(line),
            State::RevisionData => self.data_line(line),
            State::SkippingLines => {
                if line.contains(&b';') {
                    self.stack.pop();
                }
                Ok(())
            }
            // These states only ever sit directly beneath ReadLiteral.
            State::Desc | State::Log | State::Head | State::Diff => {
                Err(RcsError::TruncatedFile { line: self.lineno })
            }
        }
    }

    fn admin_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let text = String::from_utf8_lossy(trim_newline(line)).into_owned();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        if is_revision_token(trimmed) {
            self.current = Some(trimmed.to_string());
            self.rcs.revision_mut(trimmed);
            if self.seen_desc {
                self.stack.push(State::RevisionData);
            } else {
                self.stack.push(State::NewRevision);
            }
            return Ok(());
        }

        // `keyword;` forms like `symbols;` carry the terminator with no
        // intervening whitespace.
        let keyword = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(';');
        match keyword {
            "head" => {
                self.rcs.head = keyword_value(trimmed, "head");
                Ok(())
            }
            "branch" => {
                self.rcs.branch = keyword_value(trimmed, "branch");
                Ok(())
            }
            "access" | "locks" => {
                if !trimmed.contains(';') {
                    self.stack.push(State::SkippingLines);
                }
                Ok(())
            }
            "symbols" => {
                let rest = &trimmed["symbols".len()..];
                let terminated = self.symbol_pairs(rest)?;
                if !terminated {
                    self.stack.push(State::Symbols);
                }
                Ok(())
            }
            "comment" => {
                self.rcs.comment = Some(self.inline_literal(line)?);
                Ok(())
            }
            "expand" => {
                self.rcs.expand = Some(self.inline_literal(line)?);
                Ok(())
            }
            "desc" => {
                self.stack.push(State::Desc);
                self.start_literal();
                Ok(())
            }
            _ => self.skip_unknown(trimmed),
        }
    }

    fn symbols_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let text = String::from_utf8_lossy(trim_newline(line)).into_owned();
        if self.symbol_pairs(&text)? {
            self.stack.pop();
        }
        Ok(())
    }

    /// Registers `name:rev` pairs; returns `true` once the terminating
    /// `;` has been seen.
    fn symbol_pairs(&mut self, text: &str) -> RcsResult<bool> {
        for token in text.split_whitespace() {
            let token = token.trim_end_matches(';');
            if token.is_empty() {
                continue;
            }
            let Some((name, rev)) = token.split_once(':') else {
                return Err(RcsError::UnknownCommand {
                    line: self.lineno,
                    text: text.trim().to_string(),
                });
            };
            self.rcs.revision_mut(rev).symbols.insert(name.to_string());
        }
        Ok(text.contains(';'))
    }

    fn header_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let text = String::from_utf8_lossy(trim_newline(line)).into_owned();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let keyword = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(';');
        match keyword {
            "date" => self.date_line(trimmed),
            "branches" => {
                let rest = &trimmed["branches".len()..];
                let terminated = self.branch_heads(rest)?;
                if !terminated {
                    self.stack.push(State::Branches);
                }
                Ok(())
            }
            "next" => {
                self.next_link(keyword_value(trimmed, "next"))?;
                // `next` closes the revision header.
                self.stack.pop();
                Ok(())
            }
            _ => self.skip_unknown(trimmed),
        }
    }

    fn branches_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let text = String::from_utf8_lossy(trim_newline(line)).into_owned();
        if self.branch_heads(&text)? {
            self.stack.pop();
        }
        Ok(())
    }

    /// Processes a `date D; author A; state S;` header line.
    fn date_line(&mut self, text: &str) -> RcsResult<()> {
        let id = self.current_id()?;
        let mut date = None;
        let mut author = None;
        let mut state = None;
        for segment in text.split(';') {
            let segment = segment.trim();
            let Some((key, value)) = segment.split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim();
            match key {
                "date" => {
                    let parsed = parse_date(value).map_err(|_| RcsError::BadDate {
                        line: self.lineno,
                        text: text.to_string(),
                    })?;
                    date = Some(parsed);
                }
                "author" => author = Some(value.to_string()),
                "state" => state = Some(value.to_string()),
                _ => {}
            }
        }
        if date.is_none() {
            return Err(RcsError::BadDate {
                line: self.lineno,
                text: text.to_string(),
            });
        }

        let rev = self.rcs.revision_mut(&id);
        rev.date = date;
        rev.author = author;
        rev.state = state;
        Ok(())
    }

    /// Registers branch-head ids from a `branches` header; returns
    /// `true` once the terminating `;` has been seen.
    fn branch_heads(&mut self, text: &str) -> RcsResult<bool> {
        let parent = self.current_id()?;
        for token in text.split_whitespace() {
            let child = token.trim_end_matches(';');
            if child.is_empty() {
                continue;
            }
            let label = branch_label(child);
            let rev = self.rcs.revision_mut(child);
            if rev.diff_base.is_some() {
                return Err(RcsError::DuplicateDiffBase {
                    rev: child.to_string(),
                });
            }
            rev.diff_base = Some(parent.clone());
            rev.branch = Some(label);
            rev.branch_point = Some(parent.clone());
            self.rcs.revision_mut(&parent).branch_heads.push(child.to_string());
        }
        Ok(text.contains(';'))
    }

    /// Processes `next R;`, chaining the successor on this line of
    /// descent.
    fn next_link(&mut self, successor: Option<String>) -> RcsResult<()> {
        let id = self.current_id()?;
        let Some(successor) = successor else {
            self.rcs.revision_mut(&id).next = None;
            return Ok(());
        };

        let parent_branch = self.rcs.revision_mut(&id).branch.clone();
        self.rcs.revision_mut(&id).next = Some(successor.clone());
        let rev = self.rcs.revision_mut(&successor);
        if rev.diff_base.is_some() {
            return Err(RcsError::DuplicateDiffBase { rev: successor });
        }
        rev.diff_base = Some(id);
        rev.branch = parent_branch;
        Ok(())
    }

    fn data_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let text = String::from_utf8_lossy(trim_newline(line)).into_owned();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        match trimmed {
            "log" => {
                self.stack.push(State::Log);
                self.start_literal();
                Ok(())
            }
            "text" => {
                let id = self.current_id()?;
                if self.rcs.head.as_deref() == Some(id.as_str()) {
                    self.stack.push(State::Head);
                } else {
                    self.stack.push(State::Diff);
                }
                self.start_literal();
                Ok(())
            }
            _ => self.skip_unknown(trimmed),
        }
    }

    fn literal_line(&mut self, line: &[u8]) -> RcsResult<()> {
        let lineno = self.lineno;
        let Some(decoder) = self.literal.as_mut() else {
            return Err(RcsError::TruncatedFile { line: lineno });
        };
        let status = decoder
            .feed(line)
            .map_err(|_| RcsError::MalformedLiteral { line: lineno })?;
        if status != LiteralStatus::Done {
            return Ok(());
        }

        let decoder = self
            .literal
            .take()
            .ok_or(RcsError::TruncatedFile { line: lineno })?;
        let lines = decoder
            .into_lines()
            .map_err(|_| RcsError::MalformedLiteral { line: lineno })?;
        self.stack.pop();

        match self.top() {
            State::Desc => {
                self.rcs.description = lines;
                self.seen_desc = true;
                self.stack.pop();
                Ok(())
            }
            State::Log => {
                let id = self.current_id()?;
                self.rcs.revision_mut(&id).log = lines;
                self.stack.pop();
                Ok(())
            }
            State::Head => {
                let id = self.current_id()?;
                if !self.expand_keywords {
                    self.rcs.revision_mut(&id).text = Some(lines);
                }
                self.rcs.data_order.push(id);
                self.stack.pop();
                self.stack.pop();
                Ok(())
            }
            State::Diff => {
                self.replay(lines)?;
                self.stack.pop();
                self.stack.pop();
                Ok(())
            }
            _ => Err(RcsError::TruncatedFile { line: lineno }),
        }
    }

    /// Reconstructs the current revision's text from its diff base and
    /// the just-decoded edit script.
    fn replay(&mut self, script: Vec<Vec<u8>>) -> RcsResult<()> {
        let id = self.current_id()?;
        if self.expand_keywords {
            self.rcs.data_order.push(id);
            return Ok(());
        }

        let base_id = self
            .rcs
            .revision(&id)
            .and_then(|rev| rev.diff_base.clone())
            .ok_or_else(|| RcsError::MissingDiffBase { rev: id.clone() })?;
        let base = self
            .rcs
            .revision(&base_id)
            .and_then(|rev| rev.text.clone())
            .ok_or_else(|| RcsError::MissingDiffBase { rev: id.clone() })?;

        let text = apply_script(&base, &script).map_err(|source| RcsError::Delta {
            line: self.lineno,
            source,
        })?;
        self.rcs.revision_mut(&id).text = Some(text);
        self.rcs.data_order.push(id);
        Ok(())
    }

    fn start_literal(&mut self) {
        self.stack.push(State::ReadLiteral);
        self.literal = Some(LiteralDecoder::new());
    }

    /// Decodes a one-line `keyword @...@;` literal such as `comment` or
    /// `expand`.
    fn inline_literal(&mut self, line: &[u8]) -> RcsResult<Vec<u8>> {
        let text = trim_newline(line);
        let malformed = RcsError::MalformedLiteral { line: self.lineno };
        let Some(open) = text.iter().position(|&b| b == b'@') else {
            return Err(malformed);
        };
        let Some(close_rel) = text[open + 1..].iter().rposition(|&b| b == b'@') else {
            return Err(malformed);
        };
        let inner = &text[open + 1..open + 1 + close_rel];
        let mut out = Vec::with_capacity(inner.len());
        let mut iter = inner.iter();
        while let Some(&byte) = iter.next() {
            out.push(byte);
            if byte == b'@' {
                iter.next();
            }
        }
        Ok(out)
    }

    fn skip_unknown(&mut self, text: &str) -> RcsResult<()> {
        if text.contains(';') {
            tracing::debug!(line = self.lineno, "skipping unknown keyword: {text}");
            Ok(())
        } else {
            Err(RcsError::UnknownCommand {
                line: self.lineno,
                text: text.to_string(),
            })
        }
    }

    fn current_id(&self) -> RcsResult<String> {
        self.current
            .clone()
            .ok_or(RcsError::TruncatedFile { line: self.lineno })
    }

    fn finish(self) -> RcsResult<RcsFile> {
        if self.literal.is_some() {
            return Err(RcsError::MalformedLiteral { line: self.lineno });
        }
        if self.stack.len() > 1 {
            return Err(RcsError::TruncatedFile { line: self.lineno });
        }
        Ok(self.rcs)
    }
}

fn is_revision_token(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().any(|b| b.is_ascii_digit())
}

/// Extracts the value of a `keyword value;` admin line; `keyword;` and a
/// bare `keyword` yield `None`.
fn keyword_value(text: &str, keyword: &str) -> Option<String> {
    let rest = text[keyword.len()..].trim().trim_end_matches(';').trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Replaces every revision text with the output of `co -q -p<rev>`,
/// expanding RCS keywords the same way a checkout would.
fn expand_with_co(rcs: &mut RcsFile, path: &Path) -> RcsResult<()> {
    for id in rcs.data_order.clone() {
        let output = Command::new("co")
            .arg("-q")
            .arg(format!("-p{id}"))
            .arg(path)
            .output()
            .map_err(|error| {
                let reason = if error.kind() == std::io::ErrorKind::NotFound {
                    "external 'co' binary not found on PATH".to_string()
                } else {
                    error.to_string()
                };
                RcsError::KeywordExpansion {
                    path: path.to_path_buf(),
                    rev: id.clone(),
                    reason,
                }
            })?;
        if !output.status.success() {
            return Err(RcsError::KeywordExpansion {
                path: path.to_path_buf(),
                rev: id.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let text = split_lines(&output.stdout).map(<[u8]>::to_vec).collect();
        rcs.revision_mut(&id).text = Some(text);
    }
    Ok(())
}
