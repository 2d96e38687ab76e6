#![deny(unsafe_code)]

//! # Overview
//!
//! `rcs_cli` is the frontend of `rcs-fast-export`: the clap command
//! definition, the translation of arguments into
//! [`ExportOptions`](rcs_core::ExportOptions), and the driver that owns
//! the mark registry and picks between the single-file and coalesced
//! export paths.
//!
//! The binary is a thin shim; [`run`] takes the argument list plus
//! writer handles for stdout and stderr so tests can drive the entire
//! program in process.

mod command;
mod driver;
mod logging;

pub use command::{clap_command, parse_args, ParsedArgs};

use std::ffi::OsString;
use std::io::Write;
use std::process;

use rcs_core::ExitCode;

/// Runs the exporter. The fast-import stream is written to `stdout`,
/// diagnostics to `stderr`; the returned status follows
/// [`ExitCode`](rcs_core::ExitCode).
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let arguments: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            use clap::error::ErrorKind;
            let rendered = error.render().to_string();
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{rendered}");
                    ExitCode::Ok.as_i32()
                }
                _ => {
                    let _ = write!(stderr, "{rendered}");
                    ExitCode::Syntax.as_i32()
                }
            };
        }
    };

    logging::init_tracing(parsed.options.verbose);
    driver::run_export(&parsed, stdout, stderr)
}

/// Maps a status from [`run`] onto a process exit code.
#[must_use]
pub fn exit_code_from(status: i32) -> process::ExitCode {
    if status == 0 {
        process::ExitCode::SUCCESS
    } else {
        process::ExitCode::from(u8::try_from(status).unwrap_or(1))
    }
}
