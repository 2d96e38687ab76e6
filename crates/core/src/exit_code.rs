//! Centralized exit code definitions for the exporter.
//!
//! Every fatal condition in the workspace maps onto one of these codes so
//! the binary, the tests, and scripted callers agree on what a status
//! means. Missing inputs are deliberately non-fatal: their bit is ORed
//! into an otherwise successful run, matching the historical exporter.

use std::fmt;

/// Exit codes returned by an export run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,

    /// One or more input files could not be found or read.
    ///
    /// The remaining inputs are still exported; this bit is ORed into the
    /// final status rather than aborting the run.
    Partial = 1,

    /// A `,v` file violated the RCS grammar (malformed literal, bad date,
    /// corrupt delta script, duplicated diff base, complex branch
    /// structure).
    Protocol = 2,

    /// Writing the fast-import stream failed.
    Stream = 3,

    /// The requested conversion is unsupported, such as coalescing a tree
    /// that contains branched revisions without `--skip-branches`.
    Unsupported = 4,

    /// Command-line usage error.
    Syntax = 10,
}

impl ExitCode {
    /// Returns the numeric value handed to the operating system.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a short human-readable description of the code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            ExitCode::Ok => "success",
            ExitCode::Partial => "some input files were missing or unreadable",
            ExitCode::Protocol => "malformed RCS input",
            ExitCode::Stream => "failed writing the output stream",
            ExitCode::Unsupported => "unsupported conversion",
            ExitCode::Syntax => "usage error",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::ExitCode;

    #[test]
    fn numeric_values_are_stable() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert_eq!(ExitCode::Partial.as_i32(), 1);
        assert_eq!(ExitCode::Protocol.as_i32(), 2);
        assert_eq!(ExitCode::Stream.as_i32(), 3);
        assert_eq!(ExitCode::Unsupported.as_i32(), 4);
        assert_eq!(ExitCode::Syntax.as_i32(), 10);
    }

    #[test]
    fn display_includes_description() {
        let rendered = ExitCode::Protocol.to_string();
        assert!(rendered.starts_with("2"));
        assert!(rendered.contains("malformed"));
    }
}
