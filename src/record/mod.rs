//! Record format, validation and field parsing.
//!
//! A record is one input line made of delimiter-separated fields, each field a
//! double-quoted token. This module provides:
//! - [`RecordFormat`]: delimiter, empty-field marker and field pattern
//! - [`validate`]: the per-line validity predicate
//! - [`parser`]: splitting a valid record into its non-empty field keys
//!
//! # Example
//!
//! ```
//! use linegroup::record::{RecordFormat, RecordParser, RecordValidator};
//!
//! let format = RecordFormat::default();
//! let validator = RecordValidator::new(&format).unwrap();
//! assert!(validator.is_valid(r#""1";"";"3""#));
//!
//! let parser = RecordParser::new(&format);
//! let keys: Vec<_> = parser.field_keys(r#""1";"";"3""#).collect();
//! assert_eq!(keys.len(), 2);
//! assert_eq!(keys[1].column, 2);
//! ```

pub mod parser;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use parser::{FieldKey, RecordParser};
pub use validate::RecordValidator;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ';';

/// Default marker for an empty field (two double quotes).
pub const DEFAULT_EMPTY_MARKER: &str = "\"\"";

/// Default pattern for one field: a quoted run of ASCII digits.
pub const DEFAULT_FIELD_PATTERN: &str = "\"[0-9]*\"";

/// Describes how records are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFormat {
    /// Field delimiter.
    pub delimiter: char,
    /// Field value that carries no information and never links records.
    pub empty_marker: String,
    /// Regular expression matching one field (without anchors).
    pub field_pattern: String,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            empty_marker: DEFAULT_EMPTY_MARKER.to_string(),
            field_pattern: DEFAULT_FIELD_PATTERN.to_string(),
        }
    }
}

impl RecordFormat {
    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the empty-field marker.
    #[must_use]
    pub fn with_empty_marker(mut self, marker: impl Into<String>) -> Self {
        self.empty_marker = marker.into();
        self
    }

    /// Set the single-field pattern.
    #[must_use]
    pub fn with_field_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.field_pattern = pattern.into();
        self
    }
}
