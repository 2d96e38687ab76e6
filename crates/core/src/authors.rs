//! Authors-map file parsing.
//!
//! The map file translates RCS login names into full identities, one
//! mapping per line:
//!
//! ```text
//! # comment
//! alice = Alice Example <alice@example.org>
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::identity::Ident;

/// Error raised while loading or parsing an authors-map file.
#[derive(Debug, Error)]
pub enum AuthorsMapError {
    /// The file could not be read.
    #[error("failed to read authors file '{}': {source}", path.display())]
    Read {
        /// Path handed to the loader.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A line did not match `login = Name <email>`.
    #[error("malformed authors entry at line {line}: '{text}'")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Offending line text.
        text: String,
    },
}

/// Mapping from RCS login names to full identities.
#[derive(Clone, Debug, Default)]
pub struct AuthorsMap {
    entries: HashMap<String, Ident>,
}

impl AuthorsMap {
    /// Creates an empty map; every lookup falls back to the login itself.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a map from `path`.
    pub fn load(path: &Path) -> Result<Self, AuthorsMapError> {
        let text = fs::read_to_string(path).map_err(|source| AuthorsMapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses map entries from in-memory text.
    pub fn parse(text: &str) -> Result<Self, AuthorsMapError> {
        let mut entries = HashMap::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (login, ident) =
                parse_entry(line).ok_or_else(|| AuthorsMapError::Malformed {
                    line: index + 1,
                    text: raw.to_string(),
                })?;
            entries.insert(login, ident);
        }
        Ok(Self { entries })
    }

    /// Returns `true` when `login` has an explicit mapping.
    #[must_use]
    pub fn contains(&self, login: &str) -> bool {
        self.entries.contains_key(login)
    }

    /// Resolves `login` to an identity, falling back to `login <>`.
    #[must_use]
    pub fn ident_for(&self, login: &str) -> Ident {
        self.entries
            .get(login)
            .cloned()
            .unwrap_or_else(|| Ident::from_login(login))
    }

    /// Number of explicit mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no mappings were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(line: &str) -> Option<(String, Ident)> {
    let (login, rest) = line.split_once('=')?;
    let login = login.trim();
    let rest = rest.trim();
    if login.is_empty() || login.contains(char::is_whitespace) {
        return None;
    }
    let open = rest.find('<')?;
    let close = rest.rfind('>')?;
    if close < open {
        return None;
    }
    let name = rest[..open].trim();
    let email = rest[open + 1..close].trim();
    if name.is_empty() {
        return None;
    }
    Some((login.to_string(), Ident::new(name, email)))
}

#[cfg(test)]
mod tests {
    use super::{AuthorsMap, AuthorsMapError};
    use std::io::Write;

    #[test]
    fn parses_entries_and_skips_comments() {
        let map = AuthorsMap::parse(
            "# maintainers\n\nalice = Alice Example <alice@example.org>\nbob = Bob <bob@example.org>\n",
        )
        .expect("valid map");

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.ident_for("alice").to_string(),
            "Alice Example <alice@example.org>"
        );
    }

    #[test]
    fn unmapped_login_falls_back_to_login() {
        let map = AuthorsMap::new();
        assert!(!map.contains("carol"));
        assert_eq!(map.ident_for("carol").to_string(), "carol <>");
    }

    #[test]
    fn malformed_entry_reports_line_number() {
        let error = AuthorsMap::parse("alice = Alice Example <alice@example.org>\nbroken line\n")
            .expect_err("second line is malformed");
        match error {
            AuthorsMapError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "alice = Alice Example <alice@example.org>").expect("write");
        let map = AuthorsMap::load(file.path()).expect("load");
        assert!(map.contains("alice"));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = AuthorsMap::load(std::path::Path::new("/definitely/missing/authors"))
            .expect_err("missing file");
        assert!(error.to_string().contains("/definitely/missing/authors"));
    }
}
