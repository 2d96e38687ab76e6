//! Single-file commit export.
//!
//! Commits are emitted in an order that respects parent availability:
//! each pass walks the remaining revision ids in ascending string order
//! and emits every revision whose parent has already gone out. The
//! string sort can mis-order siblings with multi-digit components; the
//! retry loop tolerates that by picking them up on a later pass.

use std::collections::BTreeSet;
use std::io::Write;

use rcs_core::{AuthorsMap, ExportOptions, Ident};
use rcsfile::{RcsFile, Revision};

use crate::error::{ExportError, ExportResult};
use crate::marks::{commit_key, Marks};
use crate::stream::StreamWriter;

/// Emits the commits of one file, parents before children. Blobs must
/// already be in the stream.
pub fn export_file_commits<W: Write>(
    rcs: &RcsFile,
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
    authors: &AuthorsMap,
    committer: &Ident,
    opts: &ExportOptions,
) -> ExportResult<()> {
    let mut remaining: BTreeSet<String> = rcs.revisions.keys().cloned().collect();
    let mut exported: BTreeSet<String> = BTreeSet::new();
    let mut warned_logins: BTreeSet<String> = BTreeSet::new();

    while !remaining.is_empty() {
        let mut done_this_pass = Vec::new();
        for id in &remaining {
            let Some(rev) = rcs.revision(id) else {
                continue;
            };
            if let Some(parent) = rev.parent() {
                if rcs.revisions.contains_key(parent) && !exported.contains(parent) {
                    continue;
                }
            }
            emit_commit(rcs, id, rev, marks, out, authors, committer, opts, &mut warned_logins)?;
            exported.insert(id.clone());
            done_this_pass.push(id.clone());
        }
        if done_this_pass.is_empty() {
            return Err(ExportError::Cycle {
                file: rcs.name.clone(),
            });
        }
        for id in done_this_pass {
            remaining.remove(&id);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_commit<W: Write>(
    rcs: &RcsFile,
    id: &str,
    rev: &Revision,
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
    authors: &AuthorsMap,
    committer: &Ident,
    opts: &ExportOptions,
    warned_logins: &mut BTreeSet<String>,
) -> ExportResult<()> {
    let incomplete = || ExportError::IncompleteRevision {
        file: rcs.name.clone(),
        rev: id.to_string(),
    };
    let date = rev.date.ok_or_else(incomplete)?;
    let login = rev.author.as_deref().ok_or_else(incomplete)?;
    if rev.text.is_none() {
        return Err(incomplete());
    }

    if opts.warn_missing_authors
        && !authors.contains(login)
        && warned_logins.insert(login.to_string())
    {
        tracing::warn!("no authors-map entry for '{login}'");
    }
    let author = authors.ident_for(login);
    let committer = if opts.author_is_committer {
        &author
    } else {
        committer
    };

    let branch = rev.branch.as_deref().unwrap_or("master");
    let mark = marks.commit(&commit_key(&rcs.name, id));

    out.commit_begin(branch, mark)?;
    out.ident_line("author", &author, date)?;
    out.ident_line("committer", committer, date)?;

    let mut log = rev.log_bytes();
    if opts.log_filename {
        let mut prefixed = Vec::with_capacity(rcs.name.len() + 2 + log.len());
        prefixed.extend_from_slice(rcs.name.as_bytes());
        prefixed.extend_from_slice(b": ");
        prefixed.append(&mut log);
        log = prefixed;
    }
    out.data(&log)?;

    if let Some(parent) = rev.parent() {
        if rcs.revisions.contains_key(parent) {
            out.from(marks.commit(&commit_key(&rcs.name, parent)))?;
        }
    }
    out.file_modify(rcs.mode(), marks.blob(&rcs.name, id), &rcs.name)?;

    for branch_name in &rev.branches {
        out.reset(&format!("refs/heads/{branch_name}"), mark)?;
    }
    for symbol in &rev.symbols {
        out.reset(&format!("refs/tags/{symbol}"), mark)?;
    }
    if opts.tag_each_rev {
        out.reset(&format!("refs/tags/{id}"), mark)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::export_file_commits;
    use crate::blobs::export_blobs;
    use crate::marks::Marks;
    use crate::stream::StreamWriter;
    use rcs_core::{AuthorsMap, ExportOptions, Ident};
    use rcsfile::{parse_bytes, resolve_pseudo_revisions};

    const LINEAR: &[u8] = b"\
head\t1.2;
access;
symbols
\tv1:1.2;
locks; strict;

1.2
date\t2024.01.02.03.04.05;\tauthor alice;\tstate Exp;
branches;
next\t1.1;

1.1
date\t2024.01.01.00.00.00;\tauthor alice;\tstate Exp;
branches;
next\t;

desc
@@

1.2
log
@second
@
text
@a
b
c
@

1.1
log
@first
@
text
@d2 1
@
";

    fn export(opts: &ExportOptions) -> Vec<u8> {
        let mut rcs = parse_bytes(LINEAR, "file.txt", false).expect("parse");
        resolve_pseudo_revisions(&mut rcs).expect("resolve");
        let mut marks = Marks::new();
        let mut sink = StreamWriter::new(Vec::new());
        export_blobs(&rcs, &mut marks, &mut sink).expect("blobs");
        export_file_commits(
            &rcs,
            &mut marks,
            &mut sink,
            &AuthorsMap::new(),
            &Ident::new("exporter", "exporter@host"),
            opts,
        )
        .expect("commits");
        sink.into_inner()
    }

    #[test]
    fn parents_are_emitted_before_children() {
        let out = export(&ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        let first = text.find("commit refs/heads/master").expect("first commit");
        // 1.1 has no parent and goes first; 1.2 references it.
        let from = text.find("from :").expect("child links parent");
        assert!(from > first);
        assert!(text.contains("from :3\n"));
        assert!(text.contains("mark :4\n"));
    }

    #[test]
    fn blobs_precede_commits_and_reuse_marks() {
        let out = export(&ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        // Head blob first (mark 1), delta blob second (mark 2).
        assert!(text.starts_with("blob\nmark :1\ndata 6\na\nb\nc\n"));
        assert!(text.contains("blob\nmark :2\ndata 4\na\nc\n"));
        // 1.1's commit manifests blob 2, 1.2's manifests blob 1.
        assert!(text.contains("M 644 :2 file.txt\n"));
        assert!(text.contains("M 644 :1 file.txt\n"));
    }

    #[test]
    fn symbols_become_tag_resets() {
        let out = export(&ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");
        assert!(text.contains("reset refs/tags/v1\nfrom :4\n"));
    }

    #[test]
    fn author_lines_use_fallback_identity() {
        let out = export(&ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");
        assert!(text.contains("author alice <> 1704164645 +0000\n"));
        assert!(text.contains("committer exporter <exporter@host> 1704164645 +0000\n"));
    }

    #[test]
    fn author_is_committer_mirrors_the_author() {
        let opts = ExportOptions {
            author_is_committer: true,
            ..ExportOptions::default()
        };
        let out = export(&opts);
        let text = String::from_utf8(out).expect("stream is ASCII here");
        assert!(text.contains("committer alice <> 1704164645 +0000\n"));
        assert!(!text.contains("exporter@host"));
    }

    #[test]
    fn log_filename_prefixes_the_log() {
        let opts = ExportOptions {
            log_filename: true,
            ..ExportOptions::default()
        };
        let out = export(&opts);
        let text = String::from_utf8(out).expect("stream is ASCII here");
        // "file.txt: first\n" is 16 bytes.
        assert!(text.contains("data 16\nfile.txt: first\n"));
    }

    #[test]
    fn tag_each_rev_adds_revision_tags() {
        let opts = ExportOptions {
            tag_each_rev: true,
            ..ExportOptions::default()
        };
        let out = export(&opts);
        let text = String::from_utf8(out).expect("stream is ASCII here");
        assert!(text.contains("reset refs/tags/1.1\nfrom :3\n"));
        assert!(text.contains("reset refs/tags/1.2\nfrom :4\n"));
    }

    #[test]
    fn rerun_is_byte_identical() {
        let opts = ExportOptions::default();
        assert_eq!(export(&opts), export(&opts));
    }
}
