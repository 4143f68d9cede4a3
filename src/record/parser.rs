//! Splitting a validated record into field keys.
//!
//! A field key is a `(column, value)` pair. Two records can only be linked
//! through equal values at the same column. Fields equal to the empty marker
//! produce no key at all.

use super::RecordFormat;

/// A non-empty field of a record together with its zero-based column.
///
/// The value borrows from the record and keeps its surrounding quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey<'a> {
    /// Zero-based field position.
    pub column: usize,
    /// Raw field value, quotes included.
    pub value: &'a str,
}

/// Record parser bound to one [`RecordFormat`].
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: char,
    empty_marker: String,
}

impl RecordParser {
    /// Create a parser for the given format.
    #[must_use]
    pub fn new(format: &RecordFormat) -> Self {
        Self {
            delimiter: format.delimiter,
            empty_marker: format.empty_marker.clone(),
        }
    }

    /// Iterate the non-empty field keys of `record` in ascending column order.
    ///
    /// Each column appears at most once. The record is assumed valid; no
    /// unquoting or validation happens here.
    pub fn field_keys<'a>(&'a self, record: &'a str) -> impl Iterator<Item = FieldKey<'a>> + 'a {
        record
            .split(self.delimiter)
            .enumerate()
            .filter(move |(_, value)| *value != self.empty_marker)
            .map(|(column, value)| FieldKey { column, value })
    }

    /// Collect the non-empty field keys of `record`.
    #[must_use]
    pub fn parse<'a>(&'a self, record: &'a str) -> Vec<FieldKey<'a>> {
        self.field_keys(record).collect()
    }

    /// Whether every field of `record` is the empty marker.
    #[must_use]
    pub fn is_blank(&self, record: &str) -> bool {
        self.field_keys(record).next().is_none()
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(&RecordFormat::default())
    }
}
