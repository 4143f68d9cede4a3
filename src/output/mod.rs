//! Report rendering for grouping results.
//!
//! [`Report`] ranks groups largest first and assigns display numbers; the
//! formatters render it:
//! - [`text`]: plain `Group <n>` blocks
//! - [`json`]: groups plus a run summary for scripting
//! - [`csv`]: one row per record for spreadsheets
//!
//! # Numbering
//!
//! Display numbers come from the position in the full ranked list, so groups
//! dropped by `min_group_size` still use up a number.
//!
//! # Example
//!
//! ```
//! use linegroup::grouping::{group, GroupingConfig};
//! use linegroup::input::RecordSet;
//! use linegroup::output::{OutputFormat, Report, write_report, RunSummary};
//!
//! let records: RecordSet = ["\"1\";\"2\"", "\"1\";\"3\"", "\"4\""].into_iter().collect();
//! let (groups, _) = group(records, &GroupingConfig::default());
//!
//! let report = Report::new(&groups, 2);
//! let mut out = Vec::new();
//! let emitted = write_report(&report, OutputFormat::Text, &RunSummary::default(), &mut out).unwrap();
//! assert_eq!(emitted, 1);
//! assert_eq!(String::from_utf8(out).unwrap(), "Group 1\n\"1\";\"2\"\n\"1\";\"3\"\n\n");
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::{Group, GroupingStats, Strategy};
use crate::input::LoadStats;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Minimum group size written by default.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;

/// Output path meaning standard output.
pub const STDOUT_PATH: &str = "-";

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output file could not be created.
    #[error("Failed to create {path}: {source}")]
    Create {
        /// Output path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Report format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Group <n>` blocks separated by blank lines
    #[default]
    Text,
    /// JSON document with a summary
    Json,
    /// One CSV row per record
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// A group selected for output with its display number.
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'a> {
    /// 1-based position in the full ranked list
    pub number: usize,
    /// The group
    pub group: &'a Group,
}

/// Groups ranked by size, largest first.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    ranked: Vec<&'a Group>,
    min_group_size: usize,
}

impl<'a> Report<'a> {
    /// Rank `groups` and keep those with at least `min_group_size` members.
    ///
    /// Groups of equal size keep their input order.
    #[must_use]
    pub fn new(groups: &'a [Group], min_group_size: usize) -> Self {
        let mut ranked: Vec<&Group> = groups.iter().collect();
        ranked.sort_by(|a, b| b.len().cmp(&a.len()));
        Self {
            ranked,
            min_group_size,
        }
    }

    /// Emitted groups with their display numbers.
    pub fn entries(&self) -> impl Iterator<Item = ReportEntry<'a>> + '_ {
        self.ranked
            .iter()
            .enumerate()
            .filter(|(_, group)| group.len() >= self.min_group_size)
            .map(|(i, group)| ReportEntry {
                number: i + 1,
                group: *group,
            })
    }

    /// Number of groups that will be emitted.
    #[must_use]
    pub fn emitted_count(&self) -> usize {
        self.entries().count()
    }

    /// Number of groups ranked, emitted or not.
    #[must_use]
    pub fn ranked_count(&self) -> usize {
        self.ranked.len()
    }

    /// The size threshold.
    #[must_use]
    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }
}

/// Run statistics attached to machine-readable reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Input file
    pub input: String,
    /// Matching strategy used
    pub strategy: Strategy,
    /// Lines read from the input
    pub lines_read: usize,
    /// Lines rejected as malformed
    pub invalid_lines: usize,
    /// Valid lines dropped as duplicates
    pub duplicate_lines: usize,
    /// Unique valid records grouped
    pub unique_records: usize,
    /// Groups produced, singletons included
    pub total_groups: usize,
    /// Groups with more than one record
    pub multi_member_groups: usize,
    /// Size of the largest group
    pub largest_group: usize,
    /// Groups written to the report
    pub emitted_groups: usize,
    /// Wall time of the run in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Collect the summary from the load and grouping statistics.
    #[must_use]
    pub fn new(
        input: &Path,
        strategy: Strategy,
        load: &LoadStats,
        grouping: &GroupingStats,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            strategy,
            lines_read: load.lines_read,
            invalid_lines: load.invalid_lines,
            duplicate_lines: load.duplicate_lines,
            unique_records: load.unique_records,
            total_groups: grouping.groups,
            multi_member_groups: grouping.multi_member_groups,
            largest_group: grouping.largest_group,
            emitted_groups: 0,
            duration_ms: 0,
        }
    }
}

/// Render `report` in `format` and return the number of groups written.
///
/// # Errors
///
/// Returns `OutputError` if writing or serialization fails.
pub fn write_report<W: Write>(
    report: &Report<'_>,
    format: OutputFormat,
    summary: &RunSummary,
    writer: W,
) -> Result<usize, OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report).write_to(writer),
        OutputFormat::Json => JsonOutput::new(report, summary).write_to(writer),
        OutputFormat::Csv => CsvOutput::new(report).write_to(writer),
    }
}

/// Open the report destination. `-` is standard output.
///
/// # Errors
///
/// Returns `OutputError::Create` if the file cannot be created.
pub fn open_output(path: &Path) -> Result<Box<dyn Write>, OutputError> {
    if path.as_os_str() == STDOUT_PATH {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(BufWriter::new(file)))
}
