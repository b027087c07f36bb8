//! Hashing drivers for each output mode.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use sha256_batch::{BatchError, Digest, Dispatcher, JobArray};
use tracing::{debug, info, warn};
use vso_hash::{Hasher, VsoError};

use crate::error::CliError;

/// Where an input's bytes come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// Standard input, printed as `-`.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

impl Input {
    /// Maps operands to inputs; no operands means standard input.
    ///
    /// Standard input can be read once, so `-` may appear at most once.
    pub fn from_operands(operands: Vec<OsString>) -> Result<Vec<Self>, CliError> {
        if operands.is_empty() {
            return Ok(vec![Self::Stdin]);
        }
        let mut stdin_seen = false;
        operands
            .into_iter()
            .map(|operand| {
                if operand != "-" {
                    Ok(Self::File(PathBuf::from(operand)))
                } else if stdin_seen {
                    Err(CliError::StdinRepeated)
                } else {
                    stdin_seen = true;
                    Ok(Self::Stdin)
                }
            })
            .collect()
    }

    /// Name printed next to the digest.
    pub fn display_name(&self) -> String {
        match self {
            Self::Stdin => "-".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn open(&self) -> Result<Box<dyn Read>, CliError> {
        match self {
            Self::Stdin => Ok(Box::new(io::stdin().lock())),
            Self::File(path) => File::open(path)
                .map(|file| Box::new(file) as Box<dyn Read>)
                .map_err(|source| self.read_error(source)),
        }
    }

    fn read_all(&self) -> Result<Vec<u8>, CliError> {
        let mut data = Vec::new();
        self.open()?
            .read_to_end(&mut data)
            .map_err(|source| self.read_error(source))?;
        Ok(data)
    }

    fn read_error(&self, source: io::Error) -> CliError {
        match self {
            Self::Stdin => CliError::Stdin(source),
            Self::File(path) => CliError::Read {
                path: path.clone(),
                source,
            },
        }
    }
}

/// Lower-case hex encoding.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

fn print_line<W: Write>(out: &mut W, digest: &[u8], input: &Input) -> Result<(), CliError> {
    writeln!(out, "{}  {}", to_hex(digest), input.display_name()).map_err(CliError::Output)
}

/// Upper bound on the bytes one job array may reserve.
///
/// Inputs are grouped so `count × capacity` stays below this; an input larger
/// than the budget gets a single-job array of its own.
pub const ARENA_BUDGET: usize = 64 * 1024 * 1024;

/// Prints SHA-256 digests, reading up to `jobs` inputs at a time.
///
/// Inputs that cannot be read or hashed are reported on `stderr` and the rest
/// are still printed; returns whether every input was hashed.
pub fn sha256_inputs<Out, Err>(
    dispatcher: &Dispatcher,
    jobs: usize,
    inputs: &[Input],
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<bool, CliError>
where
    Out: Write,
    Err: Write,
{
    let mut all_ok = true;
    for chunk in inputs.chunks(jobs) {
        let loaded = chunk.iter().map(Input::read_all).collect();
        let outcomes = hash_loaded(loaded, jobs, ARENA_BUDGET, |batch| {
            run_engine(dispatcher, batch)
        });
        all_ok &= report(chunk, outcomes, stdout, stderr)?;
    }
    Ok(all_ok)
}

/// Prints one line per outcome: the digest on `stdout` or the error on `stderr`.
fn report<Out, Err>(
    inputs: &[Input],
    outcomes: Vec<Result<Digest, CliError>>,
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<bool, CliError>
where
    Out: Write,
    Err: Write,
{
    let mut all_ok = true;
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(digest) => print_line(stdout, &digest, input)?,
            Err(error) => {
                all_ok = false;
                let _ = writeln!(stderr, "batchsum: {error}");
            }
        }
    }
    Ok(all_ok)
}

/// Groups input positions into batches of at most `jobs` whose job array
/// (`count × longest`) fits in `budget`.
///
/// Positions are ordered by length so each batch holds inputs of similar
/// size; a single input is always a valid batch.
fn plan_batches(lengths: &[(usize, usize)], jobs: usize, budget: usize) -> Vec<Vec<usize>> {
    let mut sorted = lengths.to_vec();
    sorted.sort_by_key(|&(_, len)| len);

    let mut batches = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for (position, len) in sorted {
        let arena = (current.len() + 1).saturating_mul(len);
        if !current.is_empty() && (current.len() == jobs || arena > budget) {
            batches.push(std::mem::take(&mut current));
        }
        current.push(position);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Hashes the inputs that were read, batch by batch.
///
/// A batch that fails marks only its own inputs as failed. Read failures stay
/// in place, so the result lines up with `loaded`.
fn hash_loaded<F>(
    loaded: Vec<Result<Vec<u8>, CliError>>,
    jobs: usize,
    budget: usize,
    mut run: F,
) -> Vec<Result<Digest, CliError>>
where
    F: FnMut(&[&[u8]]) -> Result<Vec<Digest>, BatchError>,
{
    let lengths: Vec<(usize, usize)> = loaded
        .iter()
        .enumerate()
        .filter_map(|(position, data)| data.as_ref().ok().map(|data| (position, data.len())))
        .collect();

    let mut hashed: Vec<Option<Result<Digest, BatchError>>> = vec![None; loaded.len()];
    for batch in plan_batches(&lengths, jobs.max(1), budget) {
        let messages: Vec<&[u8]> = batch
            .iter()
            .filter_map(|&position| loaded[position].as_ref().ok().map(Vec::as_slice))
            .collect();
        match run(&messages) {
            Ok(digests) => {
                for (&position, digest) in batch.iter().zip(digests) {
                    hashed[position] = Some(Ok(digest));
                }
            }
            Err(error) => {
                warn!(inputs = batch.len(), %error, "batch failed");
                for &position in &batch {
                    hashed[position] = Some(Err(error.clone()));
                }
            }
        }
    }

    loaded
        .into_iter()
        .zip(hashed)
        .enumerate()
        .map(|(position, (data, digest))| {
            data.and_then(|_| match digest {
                Some(result) => result.map_err(CliError::from),
                None => Err(BatchError::DigestUnavailable { index: position }.into()),
            })
        })
        .collect()
}

/// Copies `messages` into a job array sized for the longest and runs it.
fn run_engine(dispatcher: &Dispatcher, messages: &[&[u8]]) -> Result<Vec<Digest>, BatchError> {
    let capacity = messages.iter().map(|data| data.len()).max().unwrap_or(0);
    let mut jobs = JobArray::allocate(messages.len(), capacity)?;
    for (index, data) in messages.iter().enumerate() {
        jobs.init(index, data)?;
    }
    dispatcher.run_batch(&mut jobs, messages.len())?;
    debug!(jobs = messages.len(), capacity, "batch complete");

    (0..messages.len()).map(|index| jobs.digest(index)).collect()
}

/// Prints VSO content identifiers, hashing `parallelism` pages per batch.
pub fn vso_inputs<Out, Err>(
    dispatcher: &Dispatcher,
    parallelism: usize,
    inputs: &[Input],
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<bool, CliError>
where
    Out: Write,
    Err: Write,
{
    let mut hasher = Hasher::with_dispatcher(parallelism, *dispatcher)?;
    let mut all_ok = true;

    for input in inputs {
        let result = input.open().and_then(|reader| {
            hasher.hash(reader).map_err(|error| match error {
                VsoError::Io(source) => input.read_error(source),
                other => CliError::Vso(other),
            })
        });
        match result {
            Ok(id) => {
                info!(input = %input.display_name(), "content hash computed");
                print_line(stdout, &id, input)?;
            }
            Err(error) => {
                all_ok = false;
                let _ = writeln!(stderr, "batchsum: {error}");
            }
        }
    }
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(lengths: &[usize]) -> Vec<Result<Vec<u8>, CliError>> {
        lengths.iter().map(|&len| Ok(vec![len as u8; len])).collect()
    }

    #[test]
    fn operands_map_to_inputs() {
        assert_eq!(Input::from_operands(Vec::new()).unwrap(), [Input::Stdin]);
        assert_eq!(
            Input::from_operands(vec!["-".into(), "a.txt".into()]).unwrap(),
            [Input::Stdin, Input::File(PathBuf::from("a.txt"))]
        );
    }

    #[test]
    fn stdin_operand_accepted_once() {
        let operands = vec!["-".into(), "a.txt".into(), "-".into()];
        assert!(matches!(
            Input::from_operands(operands),
            Err(CliError::StdinRepeated)
        ));
    }

    #[test]
    fn large_input_gets_its_own_batch() {
        let lengths = [(0, 10), (1, 1_000_000), (2, 20), (3, 30)];
        assert_eq!(plan_batches(&lengths, 64, 1000), [vec![0, 2, 3], vec![1]]);
    }

    #[test]
    fn batches_respect_job_limit_and_budget() {
        let lengths: Vec<(usize, usize)> = (0..7).map(|i| (i, 100)).collect();
        assert_eq!(
            plan_batches(&lengths, 3, 10_000),
            [vec![0, 1, 2], vec![3, 4, 5], vec![6]]
        );
        assert_eq!(
            plan_batches(&lengths, 64, 250),
            [vec![0, 1], vec![2, 3], vec![4, 5], vec![6]]
        );
        assert!(plan_batches(&[], 4, 100).is_empty());
    }

    #[test]
    fn arena_never_exceeds_budget_for_multi_input_batches() {
        let lengths: Vec<(usize, usize)> = (0..40).map(|i| (i, (i * 977) % 5000)).collect();
        for batch in plan_batches(&lengths, 8, 12_000) {
            let longest = batch.iter().map(|&i| lengths[i].1).max().unwrap();
            assert!(batch.len() <= 8);
            assert!(batch.len() == 1 || batch.len() * longest <= 12_000);
        }
    }

    #[test]
    fn failed_batch_does_not_stop_later_inputs() {
        let dispatcher = Dispatcher::detect();
        let outcomes = hash_loaded(loaded(&[3, 5000, 4]), 64, 1000, |batch| {
            if batch.iter().any(|data| data.len() == 5000) {
                Err(BatchError::AllocationFailed {
                    count: batch.len(),
                    capacity: 5000,
                })
            } else {
                run_engine(&dispatcher, batch)
            }
        });

        assert_eq!(outcomes.len(), 3);
        assert_eq!(*outcomes[0].as_ref().unwrap(), sha256_batch::digest(&[3; 3]));
        assert!(matches!(
            outcomes[1],
            Err(CliError::Batch(BatchError::AllocationFailed { .. }))
        ));
        assert_eq!(*outcomes[2].as_ref().unwrap(), sha256_batch::digest(&[4; 4]));

        let inputs: Vec<Input> = ["small", "huge", "tiny"]
            .iter()
            .map(|name| Input::File(PathBuf::from(name)))
            .collect();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert!(!report(&inputs, outcomes, &mut out, &mut err).unwrap());
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("  small\n") && out.contains("  tiny\n"));
        assert!(String::from_utf8(err).unwrap().contains("failed to allocate"));
    }

    #[test]
    fn read_failures_keep_their_position() {
        let dispatcher = Dispatcher::detect();
        let mut inputs = loaded(&[1, 2]);
        inputs.insert(1, Err(CliError::Stdin(io::Error::from(io::ErrorKind::BrokenPipe))));
        let outcomes = hash_loaded(inputs, 4, ARENA_BUDGET, |batch| run_engine(&dispatcher, batch));

        assert_eq!(*outcomes[0].as_ref().unwrap(), sha256_batch::digest(&[1]));
        assert!(matches!(outcomes[1], Err(CliError::Stdin(_))));
        assert_eq!(*outcomes[2].as_ref().unwrap(), sha256_batch::digest(&[2, 2]));
    }

    #[test]
    fn hex_is_lower_case() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = [Input::File(dir.path().join("absent"))];
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let ok = sha256_inputs(&Dispatcher::detect(), 4, &inputs, &mut out, &mut err).unwrap();
        assert!(!ok);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("absent"));
    }
}
