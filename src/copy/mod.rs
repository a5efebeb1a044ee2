//! The copy engine.
//!
//! Files are copied with size-adaptive chunked parallelism: small files are
//! streamed in one pass, large files are split into chunks written by a
//! bounded worker pool and merged in index order. Every copy preserves the
//! source metadata, is verified by size and optionally by hash, and cleans
//! up all of its artifacts on every failure path.

mod hash;

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::context::Context;
pub use crate::copy::hash::{HashAlgorithm, UnsupportedAlgorithm};

/// The default chunk size, 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// The default number of copy workers.
pub const DEFAULT_WORKERS: usize = 4;

/// The stream buffer used by workers and the single-pass copy.
const BUF_SIZE: usize = 64 * 1024;

/// The conservative upper bound of chunk files removed during cleanup.
const CLEANUP_CHUNKS: usize = 10;

/// Why a destination failed.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("i/o failure")]
    Io(#[from] io::Error),
    #[error("size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch { expected: u64, found: u64 },
    #[error("hash mismatch: expected {expected}, found {found}")]
    HashMismatch { expected: String, found: String },
}

impl CopyError {
    /// A stable tag for this kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::SizeMismatch { .. } => "size-mismatch",
            Self::HashMismatch { .. } => "hash-mismatch",
        }
    }
}

/// A single copy task: one source, one or more destinations.
#[derive(Debug)]
pub struct CopyTask {
    pub source: PathBuf,
    pub destinations: Vec<PathBuf>,
    pub algorithm: Option<HashAlgorithm>,
    pub chunk_size: u64,
    pub workers: usize,
}

/// The outcome for one destination of a task.
#[derive(Debug)]
pub struct DestinationReport {
    pub destination: PathBuf,
    pub result: Result<(), CopyError>,
}

impl CopyTask {
    pub fn new(source: PathBuf, destinations: Vec<PathBuf>) -> Self {
        Self {
            source,
            destinations,
            algorithm: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn algorithm(mut self, algorithm: Option<HashAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Copy the source to every destination, sequentially and independently:
    /// a failed destination never aborts the others. The task succeeded iff
    /// every report is ok.
    pub fn run(&self, ctx: &Context) -> Vec<DestinationReport> {
        self.destinations
            .iter()
            .map(|destination| {
                status_v!(ctx, "Copying", ctx.pretty_path(destination));
                let result = self.copy_one(destination);
                match &result {
                    Ok(()) => status!(ctx, "Copied", ctx.pretty_path(destination)),
                    Err(err) => warning!(
                        ctx,
                        "Failed",
                        &format!("{}: {err}", destination.display())
                    ),
                }
                DestinationReport {
                    destination: destination.clone(),
                    result,
                }
            })
            .collect()
    }

    fn copy_one(&self, destination: &Path) -> Result<(), CopyError> {
        let expected = self
            .algorithm
            .map(|algorithm| algorithm.hash_file(&self.source))
            .transpose()?;
        self.copy_verified(destination, expected)
    }

    /// Copy to one destination and verify against a precomputed source hash.
    fn copy_verified(
        &self,
        destination: &Path,
        expected: Option<String>,
    ) -> Result<(), CopyError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let metadata = fs::metadata(&self.source)?;
        let size = metadata.len();

        // Everything written so far is removed if any later step fails.
        let mut guard = CleanupGuard::new(destination, self.workers.max(CLEANUP_CHUNKS));

        if size < 2 * self.chunk_size {
            copy_single(&self.source, destination)?;
        } else {
            copy_chunked(&self.source, destination, size, self.chunk_size, self.workers)?;
        }

        copy_metadata(&metadata, destination)?;

        let found = fs::metadata(destination)?.len();
        if found != size {
            return Err(CopyError::SizeMismatch {
                expected: size,
                found,
            });
        }

        if let (Some(algorithm), Some(expected)) = (self.algorithm, expected) {
            let found = algorithm.hash_file(destination)?;
            if found != expected {
                return Err(CopyError::HashMismatch { expected, found });
            }
        }

        guard.disarm();
        Ok(())
    }
}

/// The chunk file written by worker `index` for the given target.
fn chunk_path(target: &Path, index: usize) -> PathBuf {
    let mut path = target.as_os_str().to_os_string();
    path.push(format!(".part{index}"));
    PathBuf::from(path)
}

/// Removes the target and any chunk files when dropped, unless disarmed.
struct CleanupGuard<'a> {
    target: &'a Path,
    chunks: usize,
    armed: bool,
}

impl<'a> CleanupGuard<'a> {
    fn new(target: &'a Path, chunks: usize) -> Self {
        Self {
            target,
            chunks,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for index in 0..self.chunks {
            fs::remove_file(chunk_path(self.target, index)).ok();
        }
        fs::remove_file(self.target).ok();
    }
}

/// Single-pass streaming copy for files below the chunking threshold.
fn copy_single(source: &Path, target: &Path) -> Result<(), CopyError> {
    let mut reader = File::open(source)?;
    let mut writer = File::create(target)?;
    io::copy(&mut reader, &mut writer)?;
    Ok(())
}

/// Chunked parallel copy: split the file into at most `workers` chunks,
/// write each to a sibling temp file concurrently, then merge the temp files
/// into the target in ascending index order.
fn copy_chunked(
    source: &Path,
    target: &Path,
    size: u64,
    chunk_size: u64,
    workers: usize,
) -> Result<(), CopyError> {
    let chunks = compute_chunks(size, chunk_size, workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    pool.install(|| {
        chunks
            .par_iter()
            .enumerate()
            .try_for_each(|(index, &(start, end))| copy_chunk(source, target, index, start, end))
    })?;

    // All chunks must be present before the merge starts.
    for index in 0..chunks.len() {
        let path = chunk_path(target, index);
        if !path.is_file() {
            return Err(CopyError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("chunk file `{}` is missing", path.display()),
            )));
        }
    }

    let mut writer = File::create(target)?;
    for index in 0..chunks.len() {
        let path = chunk_path(target, index);
        let mut reader = File::open(&path)?;
        io::copy(&mut reader, &mut writer)?;
        fs::remove_file(&path)?;
    }
    writer.flush()?;
    Ok(())
}

/// The chunk ranges: `min(workers, ceil(size / chunk_size))` chunks of
/// `size / n` bytes, with the last chunk absorbing the remainder.
fn compute_chunks(size: u64, chunk_size: u64, workers: usize) -> Vec<(u64, u64)> {
    let wanted = (size + chunk_size - 1) / chunk_size;
    let n = (workers as u64).min(wanted).max(1);
    let base = size / n;
    (0..n)
        .map(|i| {
            let start = i * base;
            let end = if i + 1 == n { size } else { (i + 1) * base };
            (start, end)
        })
        .collect()
}

/// Read `end - start` bytes from the source at `start` and stream them into
/// the chunk file for `index`.
fn copy_chunk(
    source: &Path,
    target: &Path,
    index: usize,
    start: u64,
    end: u64,
) -> Result<(), CopyError> {
    let mut reader = File::open(source)?;
    reader.seek(SeekFrom::Start(start))?;
    let mut writer = File::create(chunk_path(target, index))?;

    let mut buf = vec![0u8; BUF_SIZE];
    let mut remaining = end - start;
    while remaining > 0 {
        let want = buf.len().min(remaining as usize);
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            return Err(CopyError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "source file ended before its chunk was read",
            )));
        }
        writer.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    writer.flush()?;
    Ok(())
}

/// Copy the source permissions and timestamps onto the target.
fn copy_metadata(metadata: &fs::Metadata, target: &Path) -> io::Result<()> {
    fs::set_permissions(target, metadata.permissions())?;
    let mtime = filetime::FileTime::from_last_modification_time(metadata);
    let atime = filetime::FileTime::from_last_access_time(metadata);
    filetime::set_file_times(target, atime, mtime)
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
