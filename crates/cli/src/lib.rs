#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the front-end behind the `batchsum` binary. It prints one line
//! per input, `<hex digest>  <name>`, where the digest is either plain SHA-256
//! or a VSO content identifier. SHA-256 inputs are read `--jobs` at a time and
//! hashed through [`sha256_batch::JobArray`]s of similar-sized inputs, each
//! kept under [`ARENA_BUDGET`]; VSO inputs are streamed page by page through a
//! [`vso_hash::Hasher`].
//!
//! # Design
//!
//! [`run`] takes the argument list together with handles for standard output
//! and error so tests can drive it without spawning a process. Backend
//! selection follows `--backend`, then the `SHA256_BATCH_BACKEND` environment
//! variable, then CPU detection.
//!
//! # Errors
//!
//! Argument errors and per-input failures are written to standard error and
//! produce exit code `1`. Inputs after a failed one are still hashed.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(["batchsum", "--list-backends"], &mut stdout, &mut stderr);
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8(stdout).unwrap().contains("scalar"));
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::error::ErrorKind as ClapErrorKind;
use sha256_batch::{Backend, Dispatcher};

mod args;
mod error;
mod hash;
mod logging;

pub use args::{DEFAULT_JOBS, Mode, ParsedArgs, clap_command, parse_args};
pub use error::CliError;
pub use hash::{ARENA_BUDGET, Input, to_hex};

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Runs the front-end and returns the process exit status.
pub fn run<I, T, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(error) => {
            return match error.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{}", error.render());
                    0
                }
                _ => {
                    let _ = write!(stderr, "{}", error.render());
                    1
                }
            };
        }
    };

    logging::init(parsed.verbosity);

    match execute(parsed, stdout, stderr) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(error) => {
            tracing::error!(%error, "aborting");
            let _ = writeln!(stderr, "batchsum: {error}");
            1
        }
    }
}

fn execute<Out, Err>(
    parsed: ParsedArgs,
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<bool, CliError>
where
    Out: Write,
    Err: Write,
{
    let dispatcher = match parsed.backend {
        Some(backend) => Dispatcher::with_backend(backend)?,
        None => *sha256_batch::global(),
    };

    if parsed.list_backends {
        list_backends(&dispatcher, stdout)?;
        return Ok(true);
    }

    let inputs = Input::from_operands(parsed.inputs)?;
    tracing::info!(
        backend = %dispatcher.backend(),
        inputs = inputs.len(),
        jobs = parsed.jobs.get(),
        "hashing"
    );
    let jobs = parsed.jobs.get();
    match parsed.mode {
        Mode::Sha256 => hash::sha256_inputs(&dispatcher, jobs, &inputs, stdout, stderr),
        Mode::Vso => hash::vso_inputs(&dispatcher, jobs, &inputs, stdout, stderr),
    }
}

fn list_backends<Out: Write>(dispatcher: &Dispatcher, stdout: &mut Out) -> Result<(), CliError> {
    for backend in Backend::ALL {
        let status = if backend == dispatcher.backend() {
            "selected"
        } else if backend.is_supported() {
            "supported"
        } else {
            "unsupported"
        };
        writeln!(stdout, "{:<9}{} lanes  {status}", backend.name(), backend.lanes())
            .map_err(CliError::Output)?;
    }
    Ok(())
}

/// Converts a status returned by [`run`] into an [`ExitCode`].
pub fn exit_code_from(status: i32) -> ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    ExitCode::from(u8::try_from(clamped).unwrap_or(u8::MAX))
}
