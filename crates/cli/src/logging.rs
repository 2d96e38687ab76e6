//! Verbosity-to-tracing bridge.
//!
//! Diagnostics use the standard tracing macros throughout the
//! workspace; the CLI maps repeated `-v` flags onto a maximum level and
//! installs a stderr subscriber. Standard output stays reserved for the
//! fast-import stream.

use tracing::Level;

/// Installs the global stderr subscriber for the given verbosity. Safe
/// to call repeatedly; only the first installation wins, which keeps
/// in-process tests from fighting over the global default.
pub(crate) fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
