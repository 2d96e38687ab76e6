//! Program name and version constants shared by the CLI and the binary.

/// Canonical program name used in usage banners and diagnostics.
pub const PROGRAM_NAME: &str = "rcs-fast-export";

/// Workspace version as recorded in the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Renders the one-line `--version` banner.
#[must_use]
pub fn version_banner() -> String {
    format!("{PROGRAM_NAME} {VERSION}")
}
