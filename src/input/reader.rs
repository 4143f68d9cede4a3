//! Reading, validating and deduplicating input lines.
//!
//! # Overview
//!
//! The loader opens the input (plain text or gzip, detected by magic bytes),
//! reads it line by line, validates each batch of lines in parallel and
//! inserts the valid ones into a [`RecordSet`]. Insertion is sequential, so
//! first-arrival order is preserved regardless of how validation is scheduled.
//!
//! # Example
//!
//! ```
//! use linegroup::input::{LoaderConfig, RecordLoader};
//! use std::io::Cursor;
//!
//! let loader = RecordLoader::new(LoaderConfig::default()).unwrap();
//! let data = "\"1\";\"2\"\n\"1\";\"2\"\nbroken\n";
//! let (records, stats) = loader.load_reader(Cursor::new(data)).unwrap();
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(stats.duplicate_lines, 1);
//! assert_eq!(stats.invalid_lines, 1);
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use flate2::bufread::MultiGzDecoder;
use rayon::prelude::*;

use super::{InputError, RecordSet};
use crate::progress::ProgressCallback;
use crate::record::{RecordFormat, RecordValidator};

/// Gzip stream magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default number of lines validated per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

/// Configuration for the record loader.
#[derive(Clone)]
pub struct LoaderConfig {
    /// Record layout used to build the validity predicate.
    pub format: RecordFormat,
    /// Lines per validation batch.
    pub batch_size: usize,
    /// Fail once more than this many unique records have been collected.
    pub max_records: Option<usize>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("format", &self.format)
            .field("batch_size", &self.batch_size)
            .field("max_records", &self.max_records)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            format: RecordFormat::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_records: None,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl LoaderConfig {
    /// Set the record format.
    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the validation batch size (at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the unique record limit.
    #[must_use]
    pub fn with_max_records(mut self, limit: Option<usize>) -> Self {
        self.max_records = limit;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from loading one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Lines read from the input
    pub lines_read: usize,
    /// Lines that passed the validity check (duplicates included)
    pub valid_lines: usize,
    /// Lines rejected by the validity check
    pub invalid_lines: usize,
    /// Lines that were non-UTF-8 (counted as invalid too)
    pub non_utf8_lines: usize,
    /// Valid lines that repeated an earlier record
    pub duplicate_lines: usize,
    /// Unique valid records kept
    pub unique_records: usize,
}

impl LoadStats {
    /// Percentage of read lines that were rejected.
    #[must_use]
    pub fn rejection_rate(&self) -> f64 {
        if self.lines_read == 0 {
            0.0
        } else {
            (self.invalid_lines as f64 / self.lines_read as f64) * 100.0
        }
    }
}

/// Reads records from a path or any buffered reader.
#[derive(Debug)]
pub struct RecordLoader {
    config: LoaderConfig,
    validator: RecordValidator,
}

impl RecordLoader {
    /// Create a loader, compiling the validity predicate.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidPattern`] if the configured field pattern
    /// does not compile.
    pub fn new(config: LoaderConfig) -> Result<Self, InputError> {
        let validator = RecordValidator::new(&config.format)?;
        Ok(Self { config, validator })
    }

    /// Create a loader with default configuration.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the default pattern always compiles.
    pub fn with_defaults() -> Result<Self, InputError> {
        Self::new(LoaderConfig::default())
    }

    /// The validator in use.
    #[must_use]
    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Load unique valid records from a file, decompressing gzip if needed.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the file cannot be opened or read, the
    /// record limit is exceeded, or shutdown is requested.
    pub fn load_path(&self, path: &Path) -> Result<(RecordSet, LoadStats), InputError> {
        let reader = open_input(path)?;
        self.load_reader(reader).map_err(|e| e.with_path(path))
    }

    /// Load unique valid records from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns `InputError` on read failure, when the record limit is
    /// exceeded, or when shutdown is requested.
    pub fn load_reader<R: BufRead>(
        &self,
        mut reader: R,
    ) -> Result<(RecordSet, LoadStats), InputError> {
        let mut records = RecordSet::new();
        let mut stats = LoadStats::default();
        let batch_size = self.config.batch_size.max(1);
        let mut batch: Vec<Option<String>> = Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE));
        let mut buf = Vec::new();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("reading", 0);
        }

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read > 0 {
                batch.push(decode_line(&buf));
            }

            let eof = read == 0;
            if batch.len() >= batch_size || (eof && !batch.is_empty()) {
                if self.config.is_shutdown_requested() {
                    log::debug!("Shutdown requested while reading input");
                    return Err(InputError::Interrupted);
                }
                self.consume_batch(&mut batch, &mut records, &mut stats)?;
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_progress(stats.lines_read, "");
                }
            }

            if eof {
                break;
            }
        }

        stats.unique_records = records.len();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("reading");
        }

        log::debug!(
            "Read {} lines: {} valid, {} invalid, {} duplicates",
            stats.lines_read,
            stats.valid_lines,
            stats.invalid_lines,
            stats.duplicate_lines
        );

        Ok((records, stats))
    }

    fn consume_batch(
        &self,
        batch: &mut Vec<Option<String>>,
        records: &mut RecordSet,
        stats: &mut LoadStats,
    ) -> Result<(), InputError> {
        let validity: Vec<bool> = batch
            .par_iter()
            .map(|line| line.as_deref().is_some_and(|l| self.validator.is_valid(l)))
            .collect();

        for (line, valid) in batch.drain(..).zip(validity) {
            stats.lines_read += 1;
            let Some(line) = line else {
                stats.non_utf8_lines += 1;
                stats.invalid_lines += 1;
                continue;
            };
            if !valid {
                stats.invalid_lines += 1;
                log::trace!("Rejected line {}: {}", stats.lines_read, line);
                continue;
            }
            stats.valid_lines += 1;
            if !records.insert(&line) {
                stats.duplicate_lines += 1;
                continue;
            }
            if let Some(limit) = self.config.max_records {
                if records.len() > limit {
                    return Err(InputError::RecordLimitExceeded { limit });
                }
            }
        }

        Ok(())
    }
}

/// Strip the line terminator and decode as UTF-8.
fn decode_line(buf: &[u8]) -> Option<String> {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8(buf[..end].to_vec()).ok()
}

/// Open `path` for line reading, transparently decompressing gzip.
///
/// # Errors
///
/// Returns [`InputError::NotFound`] if the path does not exist and
/// [`InputError::Io`] for any other failure.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let io_err = |source: io::Error| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    if let Ok(metadata) = file.metadata() {
        log::info!(
            "Reading {} ({})",
            path.display(),
            ByteSize::b(metadata.len())
        );
    }

    let mut reader = BufReader::new(file);
    if is_gzip(&mut reader).map_err(io_err)? {
        log::debug!("Detected gzip stream: {}", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Peek at the first bytes without consuming them.
fn is_gzip<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    let head = reader.fill_buf()?;
    Ok(head.len() >= GZIP_MAGIC.len() && head[..GZIP_MAGIC.len()] == GZIP_MAGIC)
}

/// Default input file name used when none is configured.
#[must_use]
pub fn default_input_path() -> PathBuf {
    PathBuf::from(super::DEFAULT_INPUT_FILE)
}
