//! Coalesced multi-file commit export.
//!
//! Every surviving commit lands on `refs/heads/master` with no parent
//! reference: multi-file branch reconstruction is out of scope, and the
//! importer chains commits on the same ref implicitly.

use std::collections::BTreeSet;
use std::io::Write;

use rcs_core::{AuthorsMap, ExportOptions, Ident};
use rcsfile::RcsFile;

use crate::coalesce::Commit;
use crate::error::ExportResult;
use crate::marks::Marks;
use crate::stream::StreamWriter;

/// Emits the coalesced commits in order, with their manifests and tag
/// resets. Blobs must already be in the stream.
pub fn export_coalesced<W: Write>(
    commits: &[Commit],
    files: &[RcsFile],
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
    authors: &AuthorsMap,
    committer: &Ident,
    opts: &ExportOptions,
) -> ExportResult<()> {
    let mut warned_logins: BTreeSet<String> = BTreeSet::new();

    for (index, commit) in commits.iter().enumerate() {
        if opts.warn_missing_authors
            && !authors.contains(&commit.author)
            && warned_logins.insert(commit.author.clone())
        {
            tracing::warn!("no authors-map entry for '{}'", commit.author);
        }
        let author = authors.ident_for(&commit.author);
        let committer = if opts.author_is_committer {
            &author
        } else {
            committer
        };

        // Keyed by representative date; the ordinal keeps marks unique
        // when two coalesced commits share a second.
        let mark = marks.commit(&format!("{}#{index}", commit.date));

        out.commit_begin("master", mark)?;
        out.ident_line("author", &author, commit.date)?;
        out.ident_line("committer", committer, commit.date)?;
        out.data(&commit.log)?;

        for (name, entry) in commit.tree.iter() {
            if entry.dead {
                out.file_delete(name)?;
            } else {
                let mode = files.get(entry.file).map_or("644", |rcs| rcs.mode());
                out.file_modify(mode, marks.blob(name, &entry.rev), name)?;
            }
        }

        for symbol in &commit.symbols {
            out.reset(&format!("refs/tags/{symbol}"), mark)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::export_coalesced;
    use crate::blobs::export_blobs;
    use crate::coalesce::{build_commits, coalesce};
    use crate::marks::Marks;
    use crate::stream::StreamWriter;
    use rcs_core::{AuthorsMap, ExportOptions, Ident};
    use rcsfile::{RcsFile, Revision};

    fn file_with_rev(name: &str, id: &str, date: i64, log: &str, dead: bool) -> RcsFile {
        let mut rcs = RcsFile::new(name);
        let rev = Revision {
            author: Some("alice".to_string()),
            date: Some(date),
            state: Some(if dead { "dead" } else { "Exp" }.to_string()),
            log: vec![log.as_bytes().to_vec()],
            text: Some(vec![format!("text of {name}\n").into_bytes()]),
            ..Revision::default()
        };
        rcs.revisions.insert(id.to_string(), rev);
        rcs.data_order.push(id.to_string());
        rcs
    }

    fn export(files: &[RcsFile], opts: &ExportOptions) -> Vec<u8> {
        let mut marks = Marks::new();
        let mut sink = StreamWriter::new(Vec::new());
        for rcs in files {
            export_blobs(rcs, &mut marks, &mut sink).expect("blobs");
        }
        let commits = coalesce(build_commits(files, opts).expect("build"), files, opts);
        export_coalesced(
            &commits,
            files,
            &mut marks,
            &mut sink,
            &AuthorsMap::new(),
            &Ident::new("exporter", ""),
            opts,
        )
        .expect("export");
        sink.into_inner()
    }

    #[test]
    fn merged_commit_lists_both_files() {
        let files = vec![
            file_with_rev("a.txt", "1.1", 1_000, "fix\n", false),
            file_with_rev("b.txt", "1.1", 1_120, "fix\n", false),
        ];
        let out = export(&files, &ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        assert_eq!(text.matches("commit refs/heads/master").count(), 1);
        assert!(text.contains("M 644 :1 a.txt\n"));
        assert!(text.contains("M 644 :2 b.txt\n"));
        assert!(!text.contains("from :"));
    }

    #[test]
    fn dead_revision_becomes_a_deletion() {
        let files = vec![
            file_with_rev("a.txt", "1.1", 1_000, "drop\n", false),
            file_with_rev("b.txt", "1.2", 1_010, "drop\n", true),
        ];
        let out = export(&files, &ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        assert!(text.contains("M 644 :1 a.txt\n"));
        assert!(text.contains("D b.txt\n"));
    }

    #[test]
    fn union_symbols_become_tag_resets() {
        let mut a = file_with_rev("a.txt", "1.1", 1_000, "fix\n", false);
        if let Some(rev) = a.revisions.get_mut("1.1") {
            rev.symbols.insert("v1".to_string());
        }
        let files = vec![a, file_with_rev("b.txt", "1.1", 1_120, "fix\n", false)];
        let out = export(&files, &ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        assert_eq!(text.matches("commit refs/heads/master").count(), 1);
        assert!(text.contains("reset refs/tags/v1\nfrom :3\n"));
    }

    #[test]
    fn separate_commits_are_ordered_by_date() {
        let files = vec![
            file_with_rev("a.txt", "1.1", 2_000, "later\n", false),
            file_with_rev("b.txt", "1.1", 1_000, "earlier\n", false),
        ];
        let out = export(&files, &ExportOptions::default());
        let text = String::from_utf8(out).expect("stream is ASCII here");

        let earlier = text.find("earlier").expect("earlier log");
        let later = text.find("later").expect("later log");
        assert!(earlier < later);
    }
}
