//! JSON report for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00+00:00",
//!   "groups": [
//!     { "number": 1, "size": 3, "records": ["\"1\";\"5\"", "\"1\";\"6\"", "\"2\";\"6\""] }
//!   ],
//!   "summary": {
//!     "input": "lng-4.txt.gz",
//!     "strategy": "first-match",
//!     "lines_read": 4,
//!     "unique_records": 4,
//!     "emitted_groups": 1
//!   }
//! }
//! ```
//!
//! The summary carries every field of [`RunSummary`]; the schema above is
//! abbreviated.

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use super::{OutputError, Report, RunSummary};

/// A single group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup<'a> {
    /// Display number
    pub number: usize,
    /// Member count
    pub size: usize,
    /// Member records
    pub records: Vec<&'a str>,
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// RFC 3339 creation time
    pub generated_at: String,
    /// Emitted groups
    pub groups: Vec<JsonGroup<'a>>,
    /// Run statistics
    pub summary: RunSummary,
}

impl<'a> JsonOutput<'a> {
    /// Build the document from a report and its run summary.
    ///
    /// `summary.emitted_groups` is replaced by the report's emitted count.
    #[must_use]
    pub fn new(report: &Report<'a>, summary: &RunSummary) -> Self {
        let groups: Vec<JsonGroup<'a>> = report
            .entries()
            .map(|entry| JsonGroup {
                number: entry.number,
                size: entry.group.len(),
                records: entry.group.iter().collect(),
            })
            .collect();

        let mut summary = summary.clone();
        summary.emitted_groups = groups.len();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            groups,
            summary,
        }
    }

    /// Pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the document and return the number of groups written.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize, OutputError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(self.groups.len())
    }
}
