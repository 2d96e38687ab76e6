#![deny(unsafe_code)]

//! # Overview
//!
//! `rcs_walk` finds RCS `,v` files beneath directory roots. Both layout
//! conventions are recognized: `dir/file,v` next to the working file and
//! `dir/RCS/file,v` in an `RCS` subdirectory. The logical name a file
//! exports under strips the `,v` suffix and any `RCS` path component, so
//! `src/RCS/main.c,v` exports as `src/main.c`.
//!
//! Traversal is depth-first with per-directory sorting, so the
//! candidate list is deterministic for a given tree. Ignore patterns
//! are compiled with [`globset`] and matched against the relative path.

mod error;

pub use error::{WalkError, WalkErrorKind};

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

/// One discovered `,v` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RcsCandidate {
    /// On-disk path of the `,v` file.
    pub path: PathBuf,
    /// Logical filename the history exports under.
    pub logical: String,
}

/// Compiled ignore patterns for a traversal.
#[derive(Clone, Debug)]
pub struct IgnoreSet {
    set: GlobSet,
}

impl IgnoreSet {
    /// Compiles `patterns`; an empty list matches nothing.
    pub fn compile(patterns: &[String]) -> Result<Self, WalkError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|source| WalkError::bad_pattern(pattern.clone(), source))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|source| WalkError::bad_pattern(patterns.join(","), source))?;
        Ok(Self { set })
    }

    fn matches(&self, relative: &Path) -> bool {
        self.set.is_match(relative)
    }
}

/// Walks `root` depth-first and returns every `,v` file found, in
/// deterministic order.
pub fn find_rcs_files(root: &Path, ignore: &IgnoreSet) -> Result<Vec<RcsCandidate>, WalkError> {
    let mut found = Vec::new();
    walk_dir(root, Path::new(""), ignore, &mut found)?;
    Ok(found)
}

fn walk_dir(
    dir: &Path,
    relative: &Path,
    ignore: &IgnoreSet,
    found: &mut Vec<RcsCandidate>,
) -> Result<(), WalkError> {
    tracing::debug!("scanning directory {}", dir.display());
    let reader =
        fs::read_dir(dir).map_err(|source| WalkError::read_dir(dir.to_path_buf(), source))?;

    let mut entries = Vec::new();
    for entry in reader {
        let entry =
            entry.map_err(|source| WalkError::read_dir_entry(dir.to_path_buf(), source))?;
        entries.push(entry.path());
    }
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            tracing::debug!("skipping non-UTF-8 entry in {}", dir.display());
            continue;
        };
        let relative_path = relative.join(name);
        if ignore.matches(&relative_path) {
            tracing::debug!("ignoring {}", relative_path.display());
            continue;
        }

        let metadata = fs::symlink_metadata(&path)
            .map_err(|source| WalkError::metadata(path.clone(), source))?;
        if metadata.is_dir() {
            walk_dir(&path, &relative_path, ignore, found)?;
        } else if metadata.is_file() && name.ends_with(",v") {
            found.push(RcsCandidate {
                logical: logical_name(&relative_path),
                path,
            });
        }
    }
    Ok(())
}

/// Derives the exported filename from a `,v` path: the `,v` suffix goes,
/// as does any `RCS` directory component.
#[must_use]
pub fn logical_name(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        let text = component.as_os_str().to_string_lossy();
        if text == "RCS" {
            continue;
        }
        parts.push(text.into_owned());
    }
    let mut name = parts.join("/");
    if let Some(stripped) = name.strip_suffix(",v") {
        name = stripped.to_string();
    }
    name
}
