//! Plain text report.
//!
//! Each emitted group is written as a `Group <n>` header line, one record per
//! line, and a blank line:
//!
//! ```text
//! Group 1
//! "1";"5"
//! "1";"6"
//!
//! Group 2
//! ...
//! ```

use std::io::Write;

use super::{OutputError, Report};

/// Text formatter.
pub struct TextOutput<'r, 'a> {
    report: &'r Report<'a>,
}

impl<'r, 'a> TextOutput<'r, 'a> {
    /// Create a text formatter over `report`.
    #[must_use]
    pub fn new(report: &'r Report<'a>) -> Self {
        Self { report }
    }

    /// Write the report and return the number of groups written.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::Io` if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize, OutputError> {
        let mut written = 0;
        for entry in self.report.entries() {
            writeln!(writer, "Group {}", entry.number)?;
            for record in entry.group.iter() {
                writeln!(writer, "{}", record)?;
            }
            writeln!(writer)?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }
}
