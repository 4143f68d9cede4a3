//! Layered application configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <FILE>`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. `LINEGROUP_*` environment variables, `__` separating nested keys
//!    (`LINEGROUP_RECORD__DELIMITER=,`)
//! 4. Command-line flags
//!
//! # Example config file
//!
//! ```toml
//! input = "/data/lng-4.txt.gz"
//! format = "json"
//! strategy = "first-match"
//! order = "arrival"
//! min_group_size = 2
//! progress = true
//!
//! [record]
//! delimiter = ";"
//! empty_marker = '""'
//! field_pattern = '"[0-9]*"'
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::{RecordOrder, Strategy};
use crate::input::reader::DEFAULT_BATCH_SIZE;
use crate::input::DEFAULT_INPUT_FILE;
use crate::output::{OutputFormat, DEFAULT_MIN_GROUP_SIZE};
use crate::record::RecordFormat;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LINEGROUP_";

const TOP_LEVEL_KEYS: &[&str] = &[
    "input",
    "format",
    "strategy",
    "order",
    "min_group_size",
    "max_records",
    "progress",
    "batch_size",
    "record",
];

const RECORD_KEYS: &[&str] = &["delimiter", "empty_marker", "field_pattern"];

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source held a value of the wrong type or malformed TOML.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The delimiter cannot separate quoted fields.
    #[error("Invalid delimiter {0:?}: must not be a quote or line break")]
    InvalidDelimiter(char),

    /// A value is out of range.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file, gzip or plain text
    pub input: PathBuf,
    /// Report format
    pub format: OutputFormat,
    /// Matching strategy
    pub strategy: Strategy,
    /// Record iteration order
    pub order: RecordOrder,
    /// Smallest group written to the report
    pub min_group_size: usize,
    /// Fail when the input holds more unique records than this
    pub max_records: Option<usize>,
    /// Draw progress indicators
    pub progress: bool,
    /// Lines validated per parallel batch
    pub batch_size: usize,
    /// Record layout
    pub record: RecordFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            format: OutputFormat::default(),
            strategy: Strategy::default(),
            order: RecordOrder::default(),
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            max_records: None,
            progress: true,
            batch_size: DEFAULT_BATCH_SIZE,
            record: RecordFormat::default(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers in effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// `--input`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// `--format`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// `--strategy`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// `--order`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<RecordOrder>,
    /// `--min-group-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_group_size: Option<usize>,
    /// `--max-records`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<usize>,
    /// `--no-progress` sets this to `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<bool>,
    /// Nested `[record]` overrides
    pub record: RecordOverrides,
}

/// Command-line overrides for the `[record]` table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordOverrides {
    /// `--delimiter`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Config {
    /// Load the layered configuration.
    ///
    /// `path` names an explicit config file, which must exist. Without it
    /// the platform default is used when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, a value
    /// has the wrong type, or the result fails validation.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(ref file) = file {
            log::debug!("Loading config from {}", file.display());
            let content = fs::read_to_string(file).map_err(|source| ConfigError::Read {
                path: file.clone(),
                source,
            })?;
            for warning in unknown_key_warnings(&content) {
                log::warn!("{}: {}", file.display(), warning);
            }
            figment = figment.merge(Toml::string(&content));
        }

        figment = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides));

        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.record.delimiter;
        if matches!(delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::InvalidDelimiter(delimiter));
        }
        if self.min_group_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_group_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.record.empty_marker.contains(delimiter) {
            return Err(ConfigError::InvalidValue {
                key: "record.empty_marker",
                reason: format!("must not contain the delimiter {:?}", delimiter),
            });
        }
        Ok(())
    }
}

/// Platform config file location, e.g. `~/.config/linegroup/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "linegroup", "linegroup")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Warnings for keys in `content` that no setting reads.
///
/// Malformed TOML yields no warnings here; extraction reports it.
#[must_use]
pub fn unknown_key_warnings(content: &str) -> Vec<String> {
    let Ok(table) = content.parse::<toml::Table>() else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (key, value) in &table {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            warnings.push(unknown_key_message(key, TOP_LEVEL_KEYS));
            continue;
        }
        if key == "record" {
            if let Some(record) = value.as_table() {
                for nested in record.keys() {
                    if !RECORD_KEYS.contains(&nested.as_str()) {
                        warnings.push(unknown_key_message(
                            &format!("record.{}", nested),
                            RECORD_KEYS,
                        ));
                    }
                }
            }
        }
    }
    warnings
}

fn unknown_key_message(key: &str, known: &[&str]) -> String {
    let leaf = key.rsplit('.').next().unwrap_or(key);
    match suggest(leaf, known) {
        Some(candidate) => format!("unknown key `{}`, did you mean `{}`?", key, candidate),
        None => format!("unknown key `{}`", key),
    }
}

/// Closest known key by Jaro-Winkler similarity, if close enough.
fn suggest<'k>(key: &str, known: &[&'k str]) -> Option<&'k str> {
    known
        .iter()
        .map(|candidate| (*candidate, strsim::jaro_winkler(key, candidate)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("lng-4.txt.gz"));
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.strategy, Strategy::FirstMatch);
        assert_eq!(config.min_group_size, 2);
        assert!(config.max_records.is_none());
        assert!(config.progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_round_trip_through_figment() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .extract()
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_layer_and_overrides() {
        let toml = r#"
format = "csv"
min_group_size = 3

[record]
delimiter = ","
"#;
        let overrides = ConfigOverrides {
            min_group_size: Some(5),
            ..ConfigOverrides::default()
        };
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .merge(Serialized::defaults(&overrides))
            .extract()
            .unwrap();

        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.min_group_size, 5);
        assert_eq!(config.record.delimiter, ',');
        assert_eq!(config.record.empty_marker, "\"\"");
    }

    #[test]
    fn test_validate_rejects_quote_delimiter() {
        let mut config = Config::default();
        config.record.delimiter = '"';
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDelimiter('"'))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = Config {
            min_group_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "min_group_size",
                ..
            })
        ));

        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_key_warnings() {
        let warnings = unknown_key_warnings(
            r#"
strategi = "union-find"
colour = true

[record]
delimeter = ","
"#,
        );
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("did you mean `strategy`")));
        assert!(warnings.iter().any(|w| w == "unknown key `colour`"));
        assert!(warnings
            .iter()
            .any(|w| w.contains("`record.delimeter`, did you mean `delimiter`")));
    }

    #[test]
    fn test_unknown_key_warnings_ignores_bad_toml() {
        assert!(unknown_key_warnings("not = = toml").is_empty());
        assert!(unknown_key_warnings("input = \"a.gz\"").is_empty());
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = Config::load(
            Some(Path::new("/definitely/missing/linegroup.toml")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
