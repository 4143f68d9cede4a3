//! CSV report for spreadsheets.
//!
//! One row per record of every emitted group.
//!
//! # Columns
//!
//! - `group`: display number of the group
//! - `size`: member count of the group
//! - `record`: the record line as read

use std::io;

use serde::Serialize;

use super::{OutputError, Report};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group: usize,
    size: usize,
    record: &'a str,
}

/// CSV formatter.
pub struct CsvOutput<'r, 'a> {
    report: &'r Report<'a>,
}

impl<'r, 'a> CsvOutput<'r, 'a> {
    /// Create a CSV formatter over `report`.
    #[must_use]
    pub fn new(report: &'r Report<'a>) -> Self {
        Self { report }
    }

    /// Write the rows and return the number of groups written.
    ///
    /// The header is written even when no group is emitted.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<usize, OutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(["group", "size", "record"])?;

        let mut written = 0;
        for entry in self.report.entries() {
            for record in entry.group.iter() {
                csv_writer.serialize(CsvRow {
                    group: entry.number,
                    size: entry.group.len(),
                    record,
                })?;
            }
            written += 1;
        }

        csv_writer.flush()?;
        Ok(written)
    }
}
