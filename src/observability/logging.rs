//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "DATESIEVE_LOG_FORMAT";
/// Environment variable holding the log filter directive.
pub const LOG_LEVEL_ENV: &str = "DATESIEVE_LOG_LEVEL";
/// Environment variable naming a log file.
pub const LOG_FILE_ENV: &str = "DATESIEVE_LOG_FILE";

const DEFAULT_DIRECTIVE: &str = "warn";
const VERBOSE_DIRECTIVE: &str = "datesieve=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Multi-line human-readable output with span context.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub directive: String,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            directive: DEFAULT_DIRECTIVE.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Precedence, lowest first: defaults, config file, `RUST_LOG`,
    /// `DATESIEVE_LOG_*`, then `verbose`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let mut config = Self::default();

        if let Some(settings) = settings {
            if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
                config.format = format;
            }
            if let Some(level) = settings.level.as_deref().filter(|l| !l.trim().is_empty()) {
                config.directive = level.to_string();
            }
            config.file.clone_from(&settings.file);
        }

        apply_env_overrides(&mut config);

        if verbose {
            config.directive = VERBOSE_DIRECTIVE.to_string();
        }
        config
    }
}

fn apply_env_overrides(config: &mut LoggingConfig) {
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    if let Some(directive) = env("RUST_LOG") {
        config.directive = directive;
    }
    if let Some(directive) = env(LOG_LEVEL_ENV) {
        config.directive = directive;
    }
    if let Some(format) = env(LOG_FORMAT_ENV).as_deref().and_then(LogFormat::parse) {
        config.format = format;
    }
    if let Some(file) = env(LOG_FILE_ENV) {
        config.file = Some(PathBuf::from(file));
    }
}
