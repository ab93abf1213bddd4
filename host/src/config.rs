//! Configuration management for the host.

use std::env;
use std::path::PathBuf;

/// Storage key the browser app persists under.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Directory used when `TODO_DATA_DIR` is not set.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Host configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one `<key>.json` file per storage key
    pub data_dir: PathBuf,
    /// Key the application store opens
    pub storage_key: String,
    /// Maximum size of a persisted blob in bytes, unlimited if `None`
    pub quota_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: None,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("TODO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let storage_key =
            lookup("TODO_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        let quota_bytes = match lookup("TODO_QUOTA_BYTES") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidQuota(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            data_dir,
            storage_key,
            quota_bytes,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid TODO_QUOTA_BYTES value: {0}")]
    InvalidQuota(String),

    #[error("TODO_STORAGE_KEY must not be empty")]
    EmptyStorageKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "todos");
        assert_eq!(config.quota_bytes, None);
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("TODO_DATA_DIR", "/var/lib/todos"),
            ("TODO_STORAGE_KEY", "work"),
            ("TODO_QUOTA_BYTES", "5242880"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/todos"));
        assert_eq!(config.storage_key, "work");
        assert_eq!(config.quota_bytes, Some(5 * 1024 * 1024));
    }

    #[test]
    fn rejects_bad_quota() {
        let err = Config::from_lookup(lookup(&[("TODO_QUOTA_BYTES", "lots")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidQuota("lots".into()));
    }

    #[test]
    fn rejects_blank_key() {
        let err = Config::from_lookup(lookup(&[("TODO_STORAGE_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyStorageKey);
    }
}
