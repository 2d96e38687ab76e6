//! Multi-file commit coalescing.
//!
//! Every single-file revision starts as a tentative commit whose date
//! interval is a single instant. Sorted by date, the list is walked from
//! the newest entry backwards; each commit absorbs the later commits
//! that carry the same log, author, and branch and fall inside the fuzz
//! window, as long as doing so cannot reorder any single file's
//! history.

use std::collections::BTreeSet;

use rcs_core::ExportOptions;
use rcsfile::RcsFile;

use crate::error::{ExportError, ExportResult};

/// One file's contribution to a coalesced commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Index of the owning [`RcsFile`] in the driver's file list.
    pub file: usize,
    /// Chosen revision id.
    pub rev: String,
    /// Whether the revision's state was `dead`, turning the manifest
    /// line into a deletion.
    pub dead: bool,
}

/// File set of a coalesced commit, keyed by logical filename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: std::collections::BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Creates a tree holding a single file.
    #[must_use]
    pub fn single(name: impl Into<String>, entry: TreeEntry) -> Self {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert(name.into(), entry);
        Self { entries }
    }

    /// Returns `true` when `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    /// Iterates the filenames in this tree.
    pub fn filenames(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of files in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the tree holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A (possibly coalesced) commit.
#[derive(Clone, Debug)]
pub struct Commit {
    /// Earliest member date.
    pub min_date: i64,
    /// Representative date used for the commit record.
    pub date: i64,
    /// Latest member date.
    pub max_date: i64,
    /// Author login shared by every member.
    pub author: String,
    /// Log message shared by every member.
    pub log: Vec<u8>,
    /// Branch label; always `None` (trunk) by construction, since
    /// branched revisions never reach the coalescer.
    pub branch: Option<String>,
    /// Union of the members' symbols.
    pub symbols: BTreeSet<String>,
    /// Files touched by this commit.
    pub tree: Tree,
}

/// Conflict produced when a merge would put two different texts of the
/// same file into one commit.
#[derive(Debug)]
pub struct MergeConflict {
    /// Filename with diverging revisions.
    pub file: String,
}

impl Commit {
    /// Absorbs `other` into this commit: trees union, the date interval
    /// widens, symbols union.
    ///
    /// A file present on both sides is tolerated only when the two
    /// revisions carry identical text; otherwise the merge fails and
    /// the caller abandons further merging for this commit.
    pub fn try_merge(&mut self, other: &Commit, files: &[RcsFile]) -> Result<(), MergeConflict> {
        for (name, entry) in other.tree.iter() {
            if let Some(existing) = self.tree.entries.get(name) {
                if revision_text(files, existing) == revision_text(files, entry) {
                    tracing::warn!(
                        "coalescing duplicate revisions {} and {} of {name} with identical text",
                        existing.rev,
                        entry.rev
                    );
                    continue;
                }
                return Err(MergeConflict { file: name.clone() });
            }
            self.tree.entries.insert(name.clone(), entry.clone());
        }
        self.min_date = self.min_date.min(other.min_date);
        self.max_date = self.max_date.max(other.max_date);
        self.symbols.extend(other.symbols.iter().cloned());
        Ok(())
    }
}

fn revision_text(files: &[RcsFile], entry: &TreeEntry) -> Option<Vec<u8>> {
    files
        .get(entry.file)
        .and_then(|rcs| rcs.revision(&entry.rev))
        .and_then(|rev| rev.text_bytes())
}

/// Wraps every revision of every file into a tentative single-revision
/// commit, sorted by `(date, symbol count)`.
///
/// Branched revisions cannot join a multi-file export: with
/// `skip_branches` they are dropped with a warning, otherwise the run
/// aborts.
pub fn build_commits(files: &[RcsFile], opts: &ExportOptions) -> ExportResult<Vec<Commit>> {
    let mut commits = Vec::new();
    for (index, rcs) in files.iter().enumerate() {
        for (id, rev) in &rcs.revisions {
            if rev.branch.is_some() {
                if opts.skip_branches {
                    tracing::warn!("skipping branched revision {id} of {}", rcs.name);
                    continue;
                }
                return Err(ExportError::BranchedInput {
                    file: rcs.name.clone(),
                    rev: id.clone(),
                });
            }
            let incomplete = || ExportError::IncompleteRevision {
                file: rcs.name.clone(),
                rev: id.clone(),
            };
            let date = rev.date.ok_or_else(incomplete)?;
            let author = rev.author.clone().ok_or_else(incomplete)?;
            commits.push(Commit {
                min_date: date,
                date,
                max_date: date,
                author,
                log: rev.log_bytes(),
                branch: None,
                symbols: rev.symbols.clone(),
                tree: Tree::single(
                    rcs.name.clone(),
                    TreeEntry {
                        file: index,
                        rev: id.clone(),
                        dead: rev.is_dead(),
                    },
                ),
            });
        }
    }
    // Stable sort; date then symbol count fully determines the order up
    // to insertion order, keeping reruns byte-identical.
    commits.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.symbols.len().cmp(&b.symbols.len()))
    });
    Ok(commits)
}

enum Admission {
    Merge,
    Skip,
    Stop,
}

fn admission(
    target: &Commit,
    candidate: &Commit,
    ofiles: &BTreeSet<String>,
    symbol_check: bool,
) -> Admission {
    // A later revision of a file we already carry would have to become
    // an earlier commit for that file, whatever its metadata; nothing
    // beyond it can merge either.
    if candidate.tree.filenames().any(|name| target.tree.contains(name)) {
        return Admission::Stop;
    }
    if candidate.log != target.log
        || candidate.author != target.author
        || candidate.branch != target.branch
    {
        return Admission::Skip;
    }
    if candidate.tree.filenames().any(|name| ofiles.contains(name)) {
        return Admission::Skip;
    }
    if !symbol_sets_comparable(target, candidate) {
        if symbol_check {
            tracing::warn!(
                "not coalescing: symbol sets differ ({:?} vs {:?})",
                target.symbols,
                candidate.symbols
            );
            return Admission::Skip;
        }
        tracing::debug!(
            "coalescing despite differing symbol sets ({:?} vs {:?})",
            target.symbols,
            candidate.symbols
        );
    }
    Admission::Merge
}

fn symbol_sets_comparable(a: &Commit, b: &Commit) -> bool {
    a.symbols.is_subset(&b.symbols) || b.symbols.is_subset(&a.symbols)
}

/// Coalesces tentative commits under the fuzz windows, returning the
/// surviving commits in date order.
///
/// Pairs where either side carries symbols coalesce under the tag
/// fuzz; pairs of plain commits use the commit fuzz. By default the
/// two windows coincide.
#[must_use]
pub fn coalesce(mut commits: Vec<Commit>, files: &[RcsFile], opts: &ExportOptions) -> Vec<Commit> {
    let fuzz = i64::try_from(opts.fuzz).unwrap_or(i64::MAX);
    let tag_fuzz = i64::try_from(opts.effective_tag_fuzz()).unwrap_or(i64::MAX);
    let horizon = fuzz.max(tag_fuzz);
    let mut i = commits.len();
    while i > 0 {
        i -= 1;

        let mut mergeable = Vec::new();
        let mut ofiles: BTreeSet<String> = BTreeSet::new();
        let mut j = i + 1;
        while j < commits.len() {
            if commits[j].min_date > commits[i].max_date.saturating_add(horizon) {
                break;
            }
            let window = if commits[i].symbols.is_empty() && commits[j].symbols.is_empty() {
                fuzz
            } else {
                tag_fuzz
            };
            let within = commits[j].min_date <= commits[i].max_date.saturating_add(window);
            match admission(&commits[i], &commits[j], &ofiles, opts.symbol_check) {
                Admission::Stop => break,
                Admission::Merge if within => mergeable.push(j),
                // Outside its pair's window, or refused: the files
                // still obstruct later merges.
                Admission::Merge | Admission::Skip => {
                    ofiles.extend(commits[j].tree.filenames().cloned());
                }
            }
            j += 1;
        }

        let mut merged = Vec::new();
        for &j in &mergeable {
            let candidate = commits[j].clone();
            let gap = candidate.min_date.saturating_sub(commits[i].min_date);
            match commits[i].try_merge(&candidate, files) {
                Ok(()) => merged.push(j),
                Err(conflict) => {
                    tracing::warn!(
                        "coalesce conflict on {}: same log, different text, commits {gap}s apart (fuzz {})",
                        conflict.file,
                        opts.fuzz
                    );
                    break;
                }
            }
        }
        for &j in merged.iter().rev() {
            commits.remove(j);
        }
    }
    commits
}
