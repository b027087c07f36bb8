//! Command-line parsing.

use std::ffi::OsString;
use std::num::NonZeroUsize;

use clap::{Arg, ArgAction, Command, builder::OsStringValueParser, value_parser};
use sha256_batch::{Backend, ParseBackendError};

/// Jobs per engine batch when `--jobs` is not given.
pub const DEFAULT_JOBS: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(jobs) => jobs,
    None => NonZeroUsize::MIN,
};

/// Digest produced for each input.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Plain SHA-256 of the whole input.
    #[default]
    Sha256,
    /// 33-byte VSO content identifier.
    Vso,
}

/// Arguments after parsing.
#[derive(Debug)]
pub struct ParsedArgs {
    /// Digest to compute.
    pub mode: Mode,
    /// Backend requested with `--backend`; `None` means automatic selection.
    pub backend: Option<Backend>,
    /// Jobs per batch, or page slots per VSO hasher.
    pub jobs: NonZeroUsize,
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Print backends and exit.
    pub list_backends: bool,
    /// Input operands; empty means standard input.
    pub inputs: Vec<OsString>,
}

fn parse_backend(value: &str) -> Result<Option<Backend>, ParseBackendError> {
    if value.trim().eq_ignore_ascii_case("auto") {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

/// Builds the `clap` command used for parsing.
pub fn clap_command() -> Command {
    Command::new("batchsum")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Print SHA-256 or VSO content hashes, computed in lane-parallel batches.")
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .value_name("MODE")
                .help("Digest to print.")
                .value_parser(["sha256", "vso"])
                .default_value("sha256"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .short('b')
                .value_name("BACKEND")
                .help("Compression backend: auto, avx2, portable or scalar.")
                .value_parser(parse_backend)
                .default_value("auto"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .value_name("N")
                .help("Inputs hashed per batch (pages per batch in vso mode).")
                .value_parser(value_parser!(NonZeroUsize)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity; RUST_LOG overrides.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("list-backends")
                .long("list-backends")
                .help("List compression backends and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inputs")
                .value_name("FILE")
                .help("Files to hash; '-' or none reads standard input.")
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Append),
        )
}

/// Parses `args` (program name first).
pub fn parse_args<I, T>(args: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut matches = clap_command().try_get_matches_from(args)?;

    let mode = match matches.get_one::<String>("mode").map(String::as_str) {
        Some("vso") => Mode::Vso,
        _ => Mode::Sha256,
    };

    Ok(ParsedArgs {
        mode,
        backend: matches
            .remove_one::<Option<Backend>>("backend")
            .flatten(),
        jobs: matches
            .remove_one::<NonZeroUsize>("jobs")
            .unwrap_or(DEFAULT_JOBS),
        verbosity: matches.get_count("verbose"),
        list_backends: matches.get_flag("list-backends"),
        inputs: matches
            .remove_many::<OsString>("inputs")
            .map(Iterator::collect)
            .unwrap_or_default(),
    })
}
