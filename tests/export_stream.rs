//! End-to-end stream tests driving the full exporter in process.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

fn write_rcs(dir: &Path, name: &str, contents: &[u8]) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

fn run(args: &[OsString]) -> (i32, Vec<u8>, Vec<u8>) {
    let mut argv = vec![OsString::from("rcs-fast-export")];
    argv.extend(args.iter().cloned());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = rcs_cli::run(argv, &mut stdout, &mut stderr);
    (status, stdout, stderr)
}

fn run_on_dir(dir: &Path, extra: &[&str]) -> (i32, Vec<u8>, Vec<u8>) {
    let mut args: Vec<OsString> = extra.iter().map(OsString::from).collect();
    args.push(dir.as_os_str().to_os_string());
    run(&args)
}

const SINGLE_REVISION: &[u8] = b"\
head\t1.1;
access;
symbols;
locks; strict;

1.1
date\t2024.01.02.03.04.05;\tauthor alice;\tstate Exp;
branches;
next\t;

desc
@@

1.1
log
@Initial revision
@
text
@hello
@
";

const TWO_REVISIONS: &[u8] = b"\
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

fn coalesce_fixture(date: &str, symbol: Option<&str>) -> Vec<u8> {
    let symbols = match symbol {
        Some(pair) => format!("symbols\n\t{pair};\n"),
        None => "symbols;\n".to_string(),
    };
    format!(
        "head\t1.1;\naccess;\n{symbols}locks; strict;\n\n1.1\ndate\t{date};\tauthor alice;\tstate Exp;\nbranches;\nnext\t;\n\ndesc\n@@\n\n1.1\nlog\n@fix\n@\ntext\n@content\n@\n"
    )
    .into_bytes()
}

#[test]
fn single_revision_single_file_stream_is_exact() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "hello.txt,v", SINGLE_REVISION);

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);

    assert_eq!(status, 0);
    let expected = b"blob\n\
mark :1\n\
data 6\n\
hello\n\
commit refs/heads/master\n\
mark :2\n\
author alice <> 1704164645 +0000\n\
committer alice <> 1704164645 +0000\n\
data 17\n\
Initial revision\n\
M 644 :1 hello.txt\n";
    assert_eq!(stdout, expected.to_vec());
}

#[test]
fn two_linear_revisions_chain_parent_before_child() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "file.txt,v", TWO_REVISIONS);

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    // Head blob first, reconstructed older revision second.
    assert!(text.starts_with("blob\nmark :1\ndata 6\na\nb\nc\n"));
    assert!(text.contains("blob\nmark :2\ndata 4\na\nc\n"));

    // 1.1's commit precedes 1.2's, which links back to it.
    let first_commit = text.find("mark :3").expect("commit for 1.1");
    let second_commit = text.find("mark :4").expect("commit for 1.2");
    assert!(first_commit < second_commit);
    assert!(text.contains("from :3\n"));
    assert!(text.contains("M 644 :2 file.txt\n"));
    assert!(text.contains("M 644 :1 file.txt\n"));
}

#[test]
fn symbol_becomes_a_tag_reset() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "file.txt,v", TWO_REVISIONS);

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    let commit = text.find("mark :4").expect("commit for 1.2");
    let reset = text
        .find("reset refs/tags/v1\nfrom :4\n")
        .expect("tag reset for v1");
    assert!(reset > commit);
}

#[test]
fn matching_commits_coalesce_within_fuzz() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(
        dir.path(),
        "a.txt,v",
        &coalesce_fixture("2024.01.02.03.04.05", None),
    );
    write_rcs(
        dir.path(),
        "b.txt,v",
        &coalesce_fixture("2024.01.02.03.06.05", None),
    );

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    assert_eq!(text.matches("commit refs/heads/master").count(), 1);
    assert!(text.contains("M 644 :1 a.txt\n"));
    assert!(text.contains("M 644 :2 b.txt\n"));
    assert!(!text.contains("from :"));
}

#[test]
fn disagreeing_symbols_block_coalescing_by_default() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(
        dir.path(),
        "a.txt,v",
        &coalesce_fixture("2024.01.02.03.04.05", Some("v1:1.1")),
    );
    write_rcs(
        dir.path(),
        "b.txt,v",
        &coalesce_fixture("2024.01.02.03.06.05", Some("v2:1.1")),
    );

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    assert_eq!(text.matches("commit refs/heads/master").count(), 2);
    assert!(text.contains("reset refs/tags/v1\n"));
    assert!(text.contains("reset refs/tags/v2\n"));
}

#[test]
fn disagreeing_symbols_merge_when_check_disabled() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(
        dir.path(),
        "a.txt,v",
        &coalesce_fixture("2024.01.02.03.04.05", Some("v1:1.1")),
    );
    write_rcs(
        dir.path(),
        "b.txt,v",
        &coalesce_fixture("2024.01.02.03.06.05", Some("v2:1.1")),
    );

    let (status, stdout, _) =
        run_on_dir(dir.path(), &["--author-is-committer", "--no-symbol-check"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    assert_eq!(text.matches("commit refs/heads/master").count(), 1);
    // Both symbols survive as tags on the merged commit.
    assert!(text.contains("reset refs/tags/v1\nfrom :3\n"));
    assert!(text.contains("reset refs/tags/v2\nfrom :3\n"));
}

#[test]
fn odd_at_literal_log_has_exact_data_length() {
    let dir = tempfile::tempdir().expect("temp dir");
    let fixture = b"\
head\t1.1;
access;
symbols;
locks; strict;

1.1
date\t2024.01.02.03.04.05;\tauthor alice;\tstate Exp;
branches;
next\t;

desc
@@

1.1
log
@hello @@ world@
text
@content
@
";
    write_rcs(dir.path(), "file.txt,v", fixture);

    let (status, stdout, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    // "hello @ world" is 13 bytes once unescaped.
    assert!(text.contains("data 13\nhello @ world\n"));
}

#[test]
fn branched_input_aborts_multi_file_export() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "plain.txt,v", &coalesce_fixture("2024.01.02.03.04.05", None));
    write_rcs(dir.path(), "branchy.txt,v", BRANCHED);

    let (status, _, stderr) = run_on_dir(dir.path(), &["--author-is-committer"]);
    assert_eq!(status, 4);
    assert!(String::from_utf8_lossy(&stderr).contains("--skip-branches"));
}

#[test]
fn skip_branches_drops_branched_revisions() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "plain.txt,v", &coalesce_fixture("2024.01.02.03.04.05", None));
    write_rcs(dir.path(), "branchy.txt,v", BRANCHED);

    let (status, stdout, _) =
        run_on_dir(dir.path(), &["--author-is-committer", "--skip-branches"]);
    assert_eq!(status, 0);
    let text = String::from_utf8(stdout).expect("stream is ASCII here");

    // The branch revision's log never reaches a commit.
    assert!(!text.contains("branch work"));
    assert!(text.contains("M 644"));
}

#[test]
fn missing_input_is_partial_but_others_still_export() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(dir.path(), "hello.txt,v", SINGLE_REVISION);

    let mut args: Vec<OsString> = vec![
        OsString::from("--author-is-committer"),
        OsString::from("/definitely/missing/history,v"),
    ];
    args.push(dir.path().as_os_str().to_os_string());
    let (status, stdout, stderr) = run(&args);

    assert_eq!(status, 1);
    assert!(!stdout.is_empty());
    assert!(String::from_utf8_lossy(&stderr).contains("/definitely/missing/history,v"));
    assert!(String::from_utf8_lossy(&stdout).contains("commit refs/heads/master"));
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rcs(
        dir.path(),
        "a.txt,v",
        &coalesce_fixture("2024.01.02.03.04.05", Some("v1:1.1")),
    );
    write_rcs(
        dir.path(),
        "b.txt,v",
        &coalesce_fixture("2024.01.02.03.06.05", None),
    );

    let (status_a, first, _) = run_on_dir(dir.path(), &["--author-is-committer"]);
    let (status_b, second, _) = run_on_dir(dir.path(), &["--author-is-committer"]);

    assert_eq!(status_a, 0);
    assert_eq!(status_a, status_b);
    assert_eq!(first, second);
}

const BRANCHED: &[u8] = b"\
head\t1.2;
access;
symbols;
locks; strict;

1.2
date\t2024.02.01.00.00.00;\tauthor bob;\tstate Exp;
branches
\t1.2.2.1;
next\t1.1;

1.1
date\t2024.01.01.00.00.00;\tauthor bob;\tstate Exp;
branches;
next\t;

1.2.2.1
date\t2024.03.01.00.00.00;\tauthor bob;\tstate Exp;
branches;
next\t;

desc
@@

1.2
log
@trunk two
@
text
@line1
line2
@

1.1
log
@trunk one
@
text
@d2 1
@

1.2.2.1
log
@branch work
@
text
@a2 1
line3
@
";
