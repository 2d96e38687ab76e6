//! The owned options bundle assembled by the command-line frontend.

/// Configuration for one export run.
///
/// Built once by the CLI frontend and passed by reference into the parser
/// and exporters. Defaults match the historical exporter's behaviour.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Time window, in seconds, within which two single-file commits with
    /// matching metadata are considered the same logical commit.
    pub fuzz: u64,
    /// Fuzz window applied when either commit in a coalescing pair
    /// carries symbols; `None` inherits [`ExportOptions::fuzz`].
    pub tag_fuzz: Option<u64>,
    /// Refuse to coalesce commits whose symbol sets are not comparable by
    /// inclusion.
    pub symbol_check: bool,
    /// Emit an additional `reset refs/tags/<rev>` per exported revision.
    pub tag_each_rev: bool,
    /// Prefix each commit log with `<filename>: `.
    pub log_filename: bool,
    /// Use the author identity for the committer field instead of the
    /// host identity.
    pub author_is_committer: bool,
    /// Warn once per RCS login missing from the authors map.
    pub warn_missing_authors: bool,
    /// Silently drop branched revisions during multi-file export instead
    /// of aborting.
    pub skip_branches: bool,
    /// Obtain revision texts by invoking `co -q -p<rev>` so RCS keywords
    /// are expanded, instead of replaying deltas internally.
    pub expand_keywords: bool,
    /// Glob patterns excluded from directory traversal.
    pub ignore: Vec<String>,
    /// Verbosity from repeated `-v` flags.
    pub verbose: u8,
}

impl ExportOptions {
    /// Effective tag fuzz: the explicit value or the commit fuzz. The
    /// coalescer admits symbol-bearing pairs under this window.
    #[must_use]
    pub fn effective_tag_fuzz(&self) -> u64 {
        self.tag_fuzz.unwrap_or(self.fuzz)
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fuzz: 300,
            tag_fuzz: None,
            symbol_check: true,
            tag_each_rev: false,
            log_filename: false,
            author_is_committer: false,
            warn_missing_authors: false,
            skip_branches: false,
            expand_keywords: false,
            ignore: Vec::new(),
            verbose: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExportOptions;

    #[test]
    fn defaults_match_historical_exporter() {
        let opts = ExportOptions::default();
        assert_eq!(opts.fuzz, 300);
        assert!(opts.symbol_check);
        assert!(!opts.skip_branches);
        assert_eq!(opts.effective_tag_fuzz(), 300);
    }

    #[test]
    fn tag_fuzz_overrides_commit_fuzz() {
        let opts = ExportOptions {
            fuzz: 120,
            tag_fuzz: Some(600),
            ..ExportOptions::default()
        };
        assert_eq!(opts.effective_tag_fuzz(), 600);
    }
}
