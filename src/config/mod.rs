//! Configuration management.
//!
//! Settings come from a TOML file; command-line flags override them.
//!
//! ```toml
//! [retention]
//! hours = 24
//! days = 7
//! weeks = 4
//! months = 12
//! years = 5
//! week_numbering = "iso"   # or "monday" for strftime %W numbering
//!
//! [input]
//! strptime = "%Y-%m-%dT%H:%M:%SUTC"   # omit for fuzzy parsing
//! dayfirst = true
//! sort = false
//!
//! [logging]
//! format = "compact"   # or "pretty", "json"
//! level = "warn"
//! file = "/var/log/datesieve.log"
//! ```

mod retention;

pub use retention::RetentionSettings;

use crate::input::DateParser;
use crate::sieve::RetentionPolicy;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_PATH_ENV: &str = "DATESIEVE_CONFIG_PATH";

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Retention capacities.
    pub retention: Option<RetentionSettings>,
    /// Input parsing.
    pub input: Option<InputSettings>,
    /// Logging.
    pub logging: Option<LoggingSettings>,
}

/// `[input]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSettings {
    /// Strict chrono format; fuzzy parsing when absent.
    pub strptime: Option<String>,
    /// Read ambiguous numeric dates day first (fuzzy parsing only).
    pub dayfirst: Option<bool>,
    /// Buffer and sort all input before sieving.
    pub sort: Option<bool>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// `compact`, `pretty` or `json`.
    pub format: Option<String>,
    /// Level or `EnvFilter` directive, e.g. `info` or `datesieve=debug`.
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Main configuration for datesieve.
#[derive(Debug, Clone, Default)]
pub struct DatesieveConfig {
    /// Retention capacities.
    pub retention: RetentionSettings,
    /// Input parsing.
    pub input: InputSettings,
    /// Logging.
    pub logging: LoggingSettings,
    /// File the configuration was loaded from.
    pub source: Option<PathBuf>,
}

impl DatesieveConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the text is not valid TOML
    /// or contains unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::InvalidConfiguration(format!("config file: {e}")))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let mut config = Self::from_toml_str(&contents).map_err(|e| match e {
            Error::InvalidConfiguration(cause) => {
                Error::InvalidConfiguration(format!("{}: {cause}", path.display()))
            },
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/datesieve/` on macOS)
    /// 2. XDG config dir (`~/.config/datesieve/`)
    ///
    /// Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            base_dirs.config_dir().join("datesieve").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("datesieve")
                .join("config.toml"),
        ];
        candidates
            .iter()
            .find(|path| path.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Loads configuration from `path`, `DATESIEVE_CONFIG_PATH`, or the
    /// default location, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            if !env_path.trim().is_empty() {
                return Self::load_from_file(Path::new(&env_path));
            }
        }
        Self::load_default()
    }

    /// Validated retention policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for negative capacities or an
    /// unknown week numbering.
    pub fn policy(&self) -> Result<RetentionPolicy> {
        self.retention.to_policy()
    }

    /// Date parser selected by the `[input]` section.
    #[must_use]
    pub fn parser(&self) -> DateParser {
        self.input.strptime.as_ref().map_or_else(
            || DateParser::fuzzy(self.input.dayfirst.unwrap_or(true)),
            DateParser::strict,
        )
    }

    /// Whether to sort input before sieving.
    #[must_use]
    pub fn sort(&self) -> bool {
        self.input.sort.unwrap_or(false)
    }

    /// Converts a `ConfigFile` to `DatesieveConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        Self {
            retention: file.retention.unwrap_or_default(),
            input: file.input.unwrap_or_default(),
            logging: file.logging.unwrap_or_default(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sieve::{Granularity, WeekNumbering};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DatesieveConfig::new();
        assert!(config.retention.is_unset());
        assert_eq!(config.parser(), DateParser::fuzzy(true));
        assert!(!config.sort());
        assert!(config.policy().expect("empty policy is valid").is_empty());
    }

    #[test]
    fn test_from_toml_str() {
        let config = DatesieveConfig::from_toml_str(
            r#"
            [retention]
            days = 7
            weeks = 4
            week_numbering = "monday"

            [input]
            strptime = "%Y-%m-%d"
            sort = true

            [logging]
            format = "json"
            level = "debug"
            "#,
        )
        .expect("valid config");

        let policy = config.policy().expect("valid policy");
        assert_eq!(policy.capacity(Granularity::Day), 7);
        assert_eq!(policy.capacity(Granularity::Week), 4);
        assert_eq!(policy.week_numbering(), WeekNumbering::Monday);
        assert_eq!(config.parser(), DateParser::strict("%Y-%m-%d"));
        assert!(config.sort());
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = DatesieveConfig::from_toml_str("[retention]\nday = 1\n").expect_err("typo");
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_capacity_surfaces_from_policy() {
        let config =
            DatesieveConfig::from_toml_str("[retention]\nweeks = -2\n").expect("parses");
        assert!(matches!(config.policy(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[retention]\nyears = 3").expect("write config");

        let config = DatesieveConfig::load_from_file(file.path()).expect("load");
        assert_eq!(config.retention.years, Some(3));
        assert_eq!(config.source.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = DatesieveConfig::load_from_file(Path::new("/nonexistent/datesieve.toml"))
            .expect_err("missing file");
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_load_explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[input]\ndayfirst = false").expect("write config");

        let config = DatesieveConfig::load(Some(file.path())).expect("load");
        assert_eq!(config.parser(), DateParser::fuzzy(false));
    }
}
