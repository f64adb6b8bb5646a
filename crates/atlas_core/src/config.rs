//! Runtime configuration resolved from environment variables.
//!
//! Every setting has a default so a bare environment yields a usable
//! configuration. Callers with their own flag parsing (the CLI) override
//! individual fields after resolution.

use crate::logging::{default_log_level, parse_level};
use log::LevelFilter;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ATLAS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ATLAS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ATLAS_LOG_DIR";
pub const ENV_FEEDBACK_ENDPOINT: &str = "ATLAS_FEEDBACK_ENDPOINT";
pub const ENV_STORAGE_QUOTA_BYTES: &str = "ATLAS_STORAGE_QUOTA_BYTES";

const DEFAULT_DB_FILE_NAME: &str = "atlas.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// SQLite file backing the storage port.
    pub db_path: PathBuf,
    pub log_level: LevelFilter,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    /// Clipboard fallback is used when unset.
    pub feedback_endpoint: Option<String>,
    pub storage_quota_bytes: Option<usize>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            feedback_endpoint: None,
            storage_quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidQuota(String),
    InvalidEndpoint(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(value) => {
                write!(f, "{ENV_LOG_LEVEL} is not a supported level: `{value}`")
            }
            Self::InvalidQuota(value) => {
                write!(f, "{ENV_STORAGE_QUOTA_BYTES} must be a byte count: `{value}`")
            }
            Self::InvalidEndpoint(value) => write!(
                f,
                "{ENV_FEEDBACK_ENDPOINT} must be an http(s) URL: `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

impl AtlasConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level =
                parse_level(&level).map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(endpoint) = read(ENV_FEEDBACK_ENDPOINT) {
            config.feedback_endpoint = Some(validate_endpoint(endpoint)?);
        }
        if let Some(quota) = read(ENV_STORAGE_QUOTA_BYTES) {
            let bytes = quota
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidQuota(quota.clone()))?;
            config.storage_quota_bytes = Some(bytes);
        }

        Ok(config)
    }
}

/// Accepts `http://` and `https://` URLs only.
pub fn validate_endpoint(endpoint: String) -> Result<String, ConfigError> {
    let lower = endpoint.to_ascii_lowercase();
    let has_host = |prefix: &str| lower.len() > prefix.len() && lower.starts_with(prefix);
    if has_host("https://") || has_host("http://") {
        Ok(endpoint)
    } else {
        Err(ConfigError::InvalidEndpoint(endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::{AtlasConfig, ConfigError, ENV_FEEDBACK_ENDPOINT, ENV_STORAGE_QUOTA_BYTES};
    use log::LevelFilter;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(pairs: &[(&str, &str)]) -> Result<AtlasConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AtlasConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(resolve(&[]).expect("defaults"), AtlasConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = resolve(&[
            ("ATLAS_DB_PATH", "/tmp/atlas.db"),
            ("ATLAS_LOG_LEVEL", "WARN"),
            ("ATLAS_LOG_DIR", "/var/log/atlas"),
            (ENV_FEEDBACK_ENDPOINT, "https://forms.example.com/f/abc"),
            (ENV_STORAGE_QUOTA_BYTES, "5242880"),
        ])
        .expect("config");

        assert_eq!(config.db_path, PathBuf::from("/tmp/atlas.db"));
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/atlas")));
        assert_eq!(
            config.feedback_endpoint.as_deref(),
            Some("https://forms.example.com/f/abc")
        );
        assert_eq!(config.storage_quota_bytes, Some(5_242_880));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = resolve(&[(ENV_FEEDBACK_ENDPOINT, "   ")]).expect("config");
        assert_eq!(config.feedback_endpoint, None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            resolve(&[(ENV_STORAGE_QUOTA_BYTES, "lots")]),
            Err(ConfigError::InvalidQuota(_))
        ));
        assert!(matches!(
            resolve(&[(ENV_FEEDBACK_ENDPOINT, "ftp://example.com")]),
            Err(ConfigError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            resolve(&[("ATLAS_LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
