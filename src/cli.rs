//! Command-line interface definitions for linegroup.
//!
//! Global options control verbosity, color, error rendering and the config
//! file; subcommands select the operation.
//!
//! # Example
//!
//! ```bash
//! # Group the default input and write the text report
//! linegroup group groups.txt
//!
//! # JSON report on stdout from a specific file
//! linegroup group - --input lng.txt.gz --format json
//!
//! # Only validate the input and print load statistics
//! linegroup -v check --input lng.txt
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigOverrides, RecordOverrides};
use crate::grouping::{RecordOrder, Strategy};
use crate::output::OutputFormat;

/// Group semicolon-delimited records that share a value in the same column.
///
/// Reads a plain or gzip-compressed file, drops malformed and duplicate
/// lines, and writes groups of linked records largest first.
#[derive(Debug, Parser)]
#[command(name = "linegroup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Group the input records and write a report
    Group(GroupArgs),
    /// Load and validate the input without grouping
    Check(CheckArgs),
}

/// Arguments for the group subcommand.
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Report destination, `-` for stdout
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Input file, plain text or gzip [default: lng-4.txt.gz]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Report format [default: text]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// How records linking to several groups are handled [default: first-match]
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Order in which records are grouped [default: arrival]
    #[arg(long, value_enum)]
    pub order: Option<RecordOrder>,

    /// Smallest group written to the report [default: 2]
    #[arg(short = 'm', long, value_name = "N", value_parser = parse_count)]
    pub min_group_size: Option<usize>,

    /// Field delimiter [default: ;]
    #[arg(short, long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Fail if the input holds more unique records than this (e.g. 500K, 2M)
    #[arg(long, value_name = "N", value_parser = parse_count)]
    pub max_records: Option<usize>,

    /// Disable progress indicators
    #[arg(long)]
    pub no_progress: bool,
}

impl GroupArgs {
    /// Flags given on the command line, as a config layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            format: self.format,
            strategy: self.strategy,
            order: self.order,
            min_group_size: self.min_group_size,
            max_records: self.max_records,
            progress: self.no_progress.then_some(false),
            record: RecordOverrides {
                delimiter: self.delimiter,
            },
        }
    }
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Input file, plain text or gzip [default: lng-4.txt.gz]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Field delimiter [default: ;]
    #[arg(short, long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Disable progress indicators
    #[arg(long)]
    pub no_progress: bool,
}

impl CheckArgs {
    /// Flags given on the command line, as a config layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            progress: self.no_progress.then_some(false),
            record: RecordOverrides {
                delimiter: self.delimiter,
            },
            ..ConfigOverrides::default()
        }
    }
}

/// Parse a count with an optional decimal suffix.
///
/// Supports suffixes K, M and G (case-insensitive). Fractions are allowed
/// with a suffix.
///
/// # Examples
///
/// ```
/// use linegroup::cli::parse_count;
///
/// assert_eq!(parse_count("250").unwrap(), 250);
/// assert_eq!(parse_count("500K").unwrap(), 500_000);
/// assert_eq!(parse_count("1.5m").unwrap(), 1_500_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, the number is invalid, or the
/// suffix is unknown.
pub fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Count cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: f64 = match suffix.as_str() {
        "" => {
            return num_str
                .parse()
                .map_err(|_| format!("Invalid number: '{num_str}'"));
        }
        "K" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        _ => return Err(format!("Unknown count suffix: '{suffix}'")),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;
    Ok((num * multiplier).round() as usize)
}

/// Parse a single-character delimiter. `\t` is accepted for a tab.
///
/// # Errors
///
/// Returns an error unless the input is exactly one character.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    if s == "\\t" {
        return Ok('\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("Delimiter must be a single character, got '{s}'")),
    }
}
