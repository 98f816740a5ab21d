//! Core configuration.
//!
//! # Responsibility
//! - Load settings from TOML with defaults for every field.
//! - Resolve the database path; an explicit path beats `BIRTHDAY_DB_PATH`.
//!
//! # Invariants
//! - Settings are passed explicitly to services; core never reads them from
//!   process-global state.

use crate::engine::greeting::GreetingTemplate;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the database file when none is configured.
pub const DB_PATH_ENV: &str = "BIRTHDAY_DB_PATH";

const DEFAULT_DB_FILE_NAME: &str = "birthdays.sqlite3";

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Delivery channel used by the daily check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    /// Queue WhatsApp deliveries for the platform shell.
    #[default]
    Whatsapp,
    /// Only write a log line.
    Log,
}

/// Settings injected into the daily check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Greeting for records without a custom message; `{name}` placeholder.
    pub default_greeting: GreetingTemplate,
    pub channel: NotifyChannel,
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file; defaults to the temp dir.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub notify: NotifySettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            notify: NotifySettings::default(),
        }
    }
}

impl CoreConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// - `Io` when the file cannot be read.
    /// - `Parse` when the content is not valid configuration.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Database path: explicit `db_path`, then `BIRTHDAY_DB_PATH`, then the
    /// temp dir.
    pub fn resolve_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        std::env::var(DB_PATH_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|trimmed| !trimmed.is_empty())
            .map_or_else(
                || std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
                PathBuf::from,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, NotifyChannel, DB_PATH_ENV};
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.notify.channel, NotifyChannel::Whatsapp);
    }

    #[test]
    fn notify_section_overrides_greeting_and_channel() {
        let config = CoreConfig::from_toml_str(
            r#"
            log_level = "warn"

            [notify]
            default_greeting = "Feliz cumple, {name}!"
            channel = "log"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.notify.channel, NotifyChannel::Log);
        assert_eq!(
            config.notify.default_greeting.render("Ana"),
            "Feliz cumple, Ana!"
        );
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let err = CoreConfig::from_toml_str("[notify]\nchannel = \"sms\"")
            .expect_err("unknown channel should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    // Only test in this crate that touches `BIRTHDAY_DB_PATH`.
    #[test]
    fn explicit_db_path_beats_env_and_env_beats_temp_dir() {
        std::env::set_var(DB_PATH_ENV, "/tmp/from_env.sqlite3");

        let explicit = CoreConfig {
            db_path: Some(PathBuf::from("/tmp/from_flag.sqlite3")),
            ..CoreConfig::default()
        };
        assert_eq!(
            explicit.resolve_db_path(),
            PathBuf::from("/tmp/from_flag.sqlite3")
        );
        assert_eq!(
            CoreConfig::default().resolve_db_path(),
            PathBuf::from("/tmp/from_env.sqlite3")
        );

        std::env::set_var(DB_PATH_ENV, "   ");
        assert_eq!(
            CoreConfig::default().resolve_db_path(),
            std::env::temp_dir().join("birthdays.sqlite3")
        );
        std::env::remove_var(DB_PATH_ENV);
    }

    #[test]
    fn load_from_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = CoreConfig::load_from_file(&path).expect_err("missing file should fail");
        assert!(err.to_string().contains("missing.toml"));
    }
}
