//! The export driver: input discovery, parse, blob emission, and the
//! choice between the single-file and coalesced paths.

use std::fs;
use std::io::Write;
use std::path::Path;

use rcs_core::identity::host_identity;
use rcs_core::version::PROGRAM_NAME;
use rcs_core::{AuthorsMap, ExitCode, ExportOptions};
use rcs_export::{
    build_commits, coalesce, export_blobs, export_coalesced, export_file_commits, ExportError,
    Marks, StreamWriter,
};
use rcs_walk::{find_rcs_files, logical_name, IgnoreSet, RcsCandidate};
use rcsfile::{parse_path, resolve_pseudo_revisions, RcsError, RcsFile};

use crate::command::ParsedArgs;

/// Runs one export. The fast-import stream goes to `stdout`;
/// diagnostics go to `stderr`. Returns the process status.
pub(crate) fn run_export<Out, Err>(parsed: &ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let opts = &parsed.options;

    let authors = match &parsed.authors_file {
        Some(path) => match AuthorsMap::load(path) {
            Ok(map) => map,
            Err(error) => {
                let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
                return ExitCode::Syntax.as_i32();
            }
        },
        None => AuthorsMap::new(),
    };

    let ignore = match IgnoreSet::compile(&opts.ignore) {
        Ok(set) => set,
        Err(error) => {
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
            return ExitCode::Syntax.as_i32();
        }
    };

    let mut status = ExitCode::Ok.as_i32();
    let mut candidates: Vec<RcsCandidate> = Vec::new();
    for path in &parsed.paths {
        match fs::metadata(path) {
            Err(error) => {
                let _ = writeln!(stderr, "{PROGRAM_NAME}: {}: {error}", path.display());
                status |= ExitCode::Partial.as_i32();
            }
            Ok(metadata) if metadata.is_dir() => match find_rcs_files(path, &ignore) {
                Ok(found) => candidates.extend(found),
                Err(error) => {
                    let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
                    status |= ExitCode::Partial.as_i32();
                }
            },
            Ok(_) => candidates.push(RcsCandidate {
                logical: logical_name(path),
                path: path.clone(),
            }),
        }
    }
    if candidates.is_empty() {
        return status;
    }

    let mut marks = Marks::new();
    let code = {
        let mut out = StreamWriter::new(&mut *stdout);
        if candidates.len() == 1 {
            single_file(&candidates[0], opts, &authors, &mut marks, &mut out, stderr)
        } else {
            multi_file(&candidates, opts, &authors, &mut marks, &mut out, stderr)
        }
    };
    let _ = stdout.flush();

    match code {
        Some(fatal) => fatal,
        None => status,
    }
}

/// Exports one file's history on its own refs. Returns a fatal exit
/// code, or `None` on success.
fn single_file<W, Err>(
    candidate: &RcsCandidate,
    opts: &ExportOptions,
    authors: &AuthorsMap,
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
    stderr: &mut Err,
) -> Option<i32>
where
    W: Write,
    Err: Write,
{
    let rcs = match parse_and_resolve(candidate, opts) {
        Ok(rcs) => rcs,
        Err(error) => return Some(report_parse_error(&candidate.path, &error, stderr)),
    };
    if let Err(error) = export_blobs(&rcs, marks, out) {
        return Some(report_export_error(&error, stderr));
    }
    let committer = host_identity();
    if let Err(error) = export_file_commits(&rcs, marks, out, authors, &committer, opts) {
        return Some(report_export_error(&error, stderr));
    }
    None
}

/// Parses every file, emits blobs eagerly, then coalesces and exports
/// the multi-file commits. Returns a fatal exit code, or `None`.
fn multi_file<W, Err>(
    candidates: &[RcsCandidate],
    opts: &ExportOptions,
    authors: &AuthorsMap,
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
    stderr: &mut Err,
) -> Option<i32>
where
    W: Write,
    Err: Write,
{
    let mut files: Vec<RcsFile> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let rcs = match parse_and_resolve(candidate, opts) {
            Ok(rcs) => rcs,
            Err(error) => return Some(report_parse_error(&candidate.path, &error, stderr)),
        };
        if let Err(error) = export_blobs(&rcs, marks, out) {
            return Some(report_export_error(&error, stderr));
        }
        files.push(rcs);
    }

    let commits = match build_commits(&files, opts) {
        Ok(commits) => commits,
        Err(error) => return Some(report_export_error(&error, stderr)),
    };
    let commits = coalesce(commits, &files, opts);

    let committer = host_identity();
    if let Err(error) = export_coalesced(&commits, &files, marks, out, authors, &committer, opts) {
        return Some(report_export_error(&error, stderr));
    }
    None
}

fn parse_and_resolve(candidate: &RcsCandidate, opts: &ExportOptions) -> Result<RcsFile, RcsError> {
    let mut rcs = parse_path(
        &candidate.path,
        candidate.logical.clone(),
        opts.expand_keywords,
    )?;
    resolve_pseudo_revisions(&mut rcs)?;
    Ok(rcs)
}

fn report_parse_error<Err: Write>(path: &Path, error: &RcsError, stderr: &mut Err) -> i32 {
    let _ = writeln!(stderr, "{PROGRAM_NAME}: {}: {error}", path.display());
    ExitCode::Protocol.as_i32()
}

fn report_export_error<Err: Write>(error: &ExportError, stderr: &mut Err) -> i32 {
    let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
    match error {
        ExportError::Io(_) => ExitCode::Stream.as_i32(),
        ExportError::BranchedInput { .. } => ExitCode::Unsupported.as_i32(),
        ExportError::IncompleteRevision { .. } | ExportError::Cycle { .. } => {
            ExitCode::Protocol.as_i32()
        }
    }
}
