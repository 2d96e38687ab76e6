//! The clap command definition and its translation into
//! [`ExportOptions`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

use rcs_core::version::{PROGRAM_NAME, VERSION};
use rcs_core::ExportOptions;

/// Result of a successful argument parse.
#[derive(Clone, Debug)]
pub struct ParsedArgs {
    /// Options handed to the parser and exporters.
    pub options: ExportOptions,
    /// Authors-map file, when given.
    pub authors_file: Option<PathBuf>,
    /// `,v` files or directories to export.
    pub paths: Vec<PathBuf>,
}

/// Builds the command-line surface.
#[must_use]
pub fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(VERSION)
        .about("Export RCS ,v revision histories as a git fast-import stream on stdout")
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .num_args(1..)
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help(",v files, or directories containing RCS histories"),
        )
        .arg(
            Arg::new("authors-file")
                .short('A')
                .long("authors-file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Map RCS logins to 'Proper Name <email>' identities"),
        )
        .arg(
            Arg::new("fuzz")
                .long("fuzz")
                .value_name("SECONDS")
                .default_value("300")
                .value_parser(value_parser!(u64))
                .help("Window for coalescing matching commits across files"),
        )
        .arg(
            Arg::new("tag-fuzz")
                .long("tag-fuzz")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Window for tags; defaults to the commit fuzz"),
        )
        .arg(
            Arg::new("no-symbol-check")
                .long("no-symbol-check")
                .action(ArgAction::SetTrue)
                .help("Coalesce commits even when their symbol sets disagree"),
        )
        .arg(
            Arg::new("tag-each-rev")
                .long("tag-each-rev")
                .action(ArgAction::SetTrue)
                .help("Add a refs/tags/<rev> reset for every exported revision"),
        )
        .arg(
            Arg::new("log-filename")
                .long("log-filename")
                .action(ArgAction::SetTrue)
                .help("Prefix each commit log with the filename"),
        )
        .arg(
            Arg::new("author-is-committer")
                .long("author-is-committer")
                .action(ArgAction::SetTrue)
                .help("Use the recorded author as the committer"),
        )
        .arg(
            Arg::new("warn-missing-authors")
                .long("warn-missing-authors")
                .action(ArgAction::SetTrue)
                .help("Warn once per login missing from the authors map"),
        )
        .arg(
            Arg::new("skip-branches")
                .long("skip-branches")
                .action(ArgAction::SetTrue)
                .help("Drop branched revisions during multi-file export instead of aborting"),
        )
        .arg(
            Arg::new("expand-keywords")
                .long("expand-keywords")
                .action(ArgAction::SetTrue)
                .help("Obtain revision texts through 'co' so RCS keywords expand"),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .value_name("PATTERN")
                .action(ArgAction::Append)
                .help("Glob pattern excluded from directory traversal (repeatable)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase diagnostic verbosity on stderr (repeatable)"),
        )
}

/// Parses the argument list into [`ParsedArgs`].
pub fn parse_args<I>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = OsString>,
{
    let mut matches = clap_command().try_get_matches_from(arguments)?;

    let paths = matches
        .remove_many::<PathBuf>("paths")
        .map(Iterator::collect)
        .unwrap_or_default();
    let authors_file = matches.remove_one::<PathBuf>("authors-file");

    let options = ExportOptions {
        fuzz: matches.remove_one::<u64>("fuzz").unwrap_or(300),
        tag_fuzz: matches.remove_one::<u64>("tag-fuzz"),
        symbol_check: !matches.get_flag("no-symbol-check"),
        tag_each_rev: matches.get_flag("tag-each-rev"),
        log_filename: matches.get_flag("log-filename"),
        author_is_committer: matches.get_flag("author-is-committer"),
        warn_missing_authors: matches.get_flag("warn-missing-authors"),
        skip_branches: matches.get_flag("skip-branches"),
        expand_keywords: matches.get_flag("expand-keywords"),
        ignore: matches
            .remove_many::<String>("ignore")
            .map(Iterator::collect)
            .unwrap_or_default(),
        verbose: matches.get_count("verbose"),
    };

    Ok(ParsedArgs {
        options,
        authors_file,
        paths,
    })
}
