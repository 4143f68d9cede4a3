//! Per-line validity check.
//!
//! A line is valid when it consists of one or more fields matching the field
//! pattern, separated by the delimiter, with nothing before or after. With the
//! default format this is `^(?:"[0-9]*";)*"[0-9]*"$`.

use regex::Regex;

use super::RecordFormat;

/// Compiled validity predicate for one [`RecordFormat`].
#[derive(Debug, Clone)]
pub struct RecordValidator {
    regex: Regex,
}

impl RecordValidator {
    /// Compile the validator for `format`.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `format.field_pattern` is not a valid
    /// regular expression.
    pub fn new(format: &RecordFormat) -> Result<Self, regex::Error> {
        let field = &format.field_pattern;
        let delimiter = regex::escape(&format.delimiter.to_string());
        let pattern = format!("^(?:(?:{field}){delimiter})*(?:{field})$");
        log::trace!("Record validity pattern: {}", pattern);
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// Check whether `line` is a structurally valid record.
    #[must_use]
    pub fn is_valid(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// The anchored pattern in use.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}
