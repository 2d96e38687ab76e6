//! The per-file revision graph produced by the parser.
//!
//! Revisions reference each other by id string rather than by pointer so
//! the graph stays free of ownership cycles; `BTreeMap` keeps every
//! traversal deterministic.

use std::collections::{BTreeMap, BTreeSet};

/// One parsed `,v` file.
#[derive(Clone, Debug, Default)]
pub struct RcsFile {
    /// Logical filename as exported, independent of the on-disk path.
    pub name: String,
    /// Whether the `,v` file carried the executable bit.
    pub executable: bool,
    /// Head revision id from the admin section.
    pub head: Option<String>,
    /// Default branch from the admin section, if any.
    pub branch: Option<String>,
    /// Comment leader from the admin section.
    pub comment: Option<Vec<u8>>,
    /// Keyword expansion mode from the admin section.
    pub expand: Option<Vec<u8>>,
    /// Description literal, one entry per line.
    pub description: Vec<Vec<u8>>,
    /// All revisions, keyed by dotted id.
    pub revisions: BTreeMap<String, Revision>,
    /// Revision ids in the order their text was materialized during the
    /// parse; blob emission follows this order.
    pub data_order: Vec<String>,
}

impl RcsFile {
    /// Creates an empty file record with the given logical name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// File mode string for manifest lines: `755` when executable.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        if self.executable {
            "755"
        } else {
            "644"
        }
    }

    /// Looks up a revision by id.
    #[must_use]
    pub fn revision(&self, id: &str) -> Option<&Revision> {
        self.revisions.get(id)
    }

    /// Returns or creates the revision entry for `id`.
    pub fn revision_mut(&mut self, id: &str) -> &mut Revision {
        self.revisions.entry(id.to_string()).or_default()
    }
}

/// One historical version of a file.
#[derive(Clone, Debug, Default)]
pub struct Revision {
    /// Recorded author login.
    pub author: Option<String>,
    /// Commit time in Unix epoch seconds, UTC.
    pub date: Option<i64>,
    /// RCS state (`Exp`, `dead`, ...).
    pub state: Option<String>,
    /// Decoded log message, one entry per line.
    pub log: Vec<Vec<u8>>,
    /// Reconstructed file content, one entry per line; `None` until the
    /// revision's `text` block has been processed.
    pub text: Option<Vec<Vec<u8>>>,
    /// Branch-head revision ids listed in this revision's `branches`
    /// header.
    pub branch_heads: Vec<String>,
    /// Successor on the same line of descent.
    pub next: Option<String>,
    /// Revision whose text plus this revision's delta yields this
    /// revision's text.
    pub diff_base: Option<String>,
    /// Branch label when this revision lies on a branch; `None` on the
    /// trunk.
    pub branch: Option<String>,
    /// Trunk revision this branch sprouted from.
    pub branch_point: Option<String>,
    /// Branch names attached by symbol resolution; exported as
    /// `refs/heads` resets.
    pub branches: BTreeSet<String>,
    /// Symbolic names attached to this revision; exported as tags.
    pub symbols: BTreeSet<String>,
}

impl Revision {
    /// `true` when the revision's state marks it as deleted.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state.as_deref() == Some("dead")
    }

    /// `true` for ids created solely because a symbol referenced them.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.date.is_none() && self.author.is_none() && !self.symbols.is_empty()
    }

    /// Chronological parent: `next` on the trunk, `diff_base` on a
    /// branch. On the trunk deltas run backwards from the head, so a
    /// trunk revision's `next` is its predecessor in time.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        if self.branch.is_none() {
            self.next.as_deref()
        } else {
            self.diff_base.as_deref()
        }
    }

    /// Log message as a single byte string.
    #[must_use]
    pub fn log_bytes(&self) -> Vec<u8> {
        self.log.concat()
    }

    /// Reconstructed content as a single byte string, if materialized.
    #[must_use]
    pub fn text_bytes(&self) -> Option<Vec<u8>> {
        self.text.as_ref().map(|lines| lines.concat())
    }
}

/// Derives the branch label for a branch-head revision id by replacing
/// the last dotted component with `x`: `1.2.2.1` becomes `1.2.2.x`.
#[must_use]
pub fn branch_label(id: &str) -> String {
    match id.rfind('.') {
        Some(pos) => format!("{}.x", &id[..pos]),
        None => format!("{id}.x"),
    }
}
