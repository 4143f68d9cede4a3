//! Input loading: decompression, line reading, validation and deduplication.
//!
//! This module provides:
//! - [`RecordLoader`]: reads a plain or gzip input and keeps unique valid lines
//! - [`RecordSet`]: the insertion-ordered set of unique records
//! - [`LoadStats`]: counts of read, rejected and duplicate lines

pub mod reader;
pub mod set;

use std::path::{Path, PathBuf};

pub use reader::{default_input_path, open_input, LoadStats, LoaderConfig, RecordLoader};
pub use set::{Record, RecordSet};

/// Input file name used when none is given.
pub const DEFAULT_INPUT_FILE: &str = "lng-4.txt.gz";

/// Errors that can occur while loading records.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    /// Loading was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Loading interrupted by user")]
    Interrupted,

    /// The input file does not exist.
    #[error("Input not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while reading a specific input.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on an anonymous reader.
    #[error("I/O error: {0}")]
    ReadFailed(#[from] std::io::Error),

    /// More unique records than the configured limit.
    #[error("Input holds more than {limit} unique records")]
    RecordLimitExceeded {
        /// The configured limit
        limit: usize,
    },

    /// The configured field pattern is not a valid regular expression.
    #[error("Invalid field pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl InputError {
    /// Attach `path` to an anonymous read failure.
    #[must_use]
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::ReadFailed(source) => Self::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}
