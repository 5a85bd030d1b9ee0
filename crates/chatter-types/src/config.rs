//! Server configuration types for Chatter.
//!
//! `ServerConfig` represents the `config.toml` in the data directory. Every
//! field has a default so a missing or partial file still yields a usable config.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Which persistence backend serves the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Process-local maps; contents are lost on restart.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

/// Top-level configuration loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageBackend,

    /// Overrides the default `sqlite://{data_dir}/chatter.db` location.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Lifetime of issued bearer tokens.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u32,

    /// HMAC signing secret. When absent a key file in the data dir is used.
    #[serde(default)]
    pub token_secret: Option<String>,

    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Accepted range for `token_ttl_days`.
pub const TOKEN_TTL_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=3650;

/// Token lifetime used when none is configured or the configured one is out of range.
pub const DEFAULT_TOKEN_TTL_DAYS: u32 = 7;

fn default_token_ttl_days() -> u32 {
    DEFAULT_TOKEN_TTL_DAYS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageBackend::default(),
            database_url: None,
            token_ttl_days: default_token_ttl_days(),
            token_secret: None,
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.token_ttl_days, 7);
        assert!(config.token_secret.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
port = 8080
storage = "memory"
"#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.token_ttl_days, 7);
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!(
            "SQLite".parse::<StorageBackend>().unwrap(),
            StorageBackend::Sqlite
        );
        assert!(matches!(
            "postgres".parse::<StorageBackend>(),
            Err(ConfigError::UnknownStorage(_))
        ));
    }
}
