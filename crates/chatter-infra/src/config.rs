//! Server configuration loader for Chatter.
//!
//! Reads `config.toml` from the data directory (`~/.chatter/` in production)
//! and deserializes it into [`ServerConfig`]. Falls back to defaults when the
//! file is missing or malformed. Environment variables then override file
//! values.

use std::path::{Path, PathBuf};

use chatter_types::config::{
    DEFAULT_TOKEN_TTL_DAYS, ServerConfig, StorageBackend, TOKEN_TTL_DAYS_RANGE,
};

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHATTER_DATA_DIR` environment variable
/// 2. `~/.chatter`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATTER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatter");
    }

    // Last resort: current directory
    PathBuf::from(".chatter")
}

/// Load server configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ServerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config
///   with out-of-range values replaced by their defaults.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(mut config) => {
            sanitize_config(&mut config);
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServerConfig::default()
        }
    }
}

/// Reset values that parse but cannot be used, logging a warning for each.
pub fn sanitize_config(config: &mut ServerConfig) {
    if !TOKEN_TTL_DAYS_RANGE.contains(&config.token_ttl_days) {
        tracing::warn!(
            token_ttl_days = config.token_ttl_days,
            "token_ttl_days must be within {}..={}, using {DEFAULT_TOKEN_TTL_DAYS}",
            TOKEN_TTL_DAYS_RANGE.start(),
            TOKEN_TTL_DAYS_RANGE.end(),
        );
        config.token_ttl_days = DEFAULT_TOKEN_TTL_DAYS;
    }
}

/// Apply `CHATTER_*` environment overrides from the process environment.
pub fn apply_env_overrides(config: &mut ServerConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from `lookup`.
///
/// Recognized keys: `CHATTER_STORAGE`, `CHATTER_DATABASE_URL`,
/// `CHATTER_TOKEN_SECRET`. An unknown storage name is logged and ignored.
pub fn apply_overrides(config: &mut ServerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(storage) = lookup("CHATTER_STORAGE") {
        match storage.parse::<StorageBackend>() {
            Ok(backend) => config.storage = backend,
            Err(err) => tracing::warn!("Ignoring CHATTER_STORAGE: {err}"),
        }
    }
    if let Some(url) = lookup("CHATTER_DATABASE_URL").filter(|v| !v.is_empty()) {
        config.database_url = Some(url);
    }
    if let Some(secret) = lookup("CHATTER_TOKEN_SECRET").filter(|v| !v.is_empty()) {
        config.token_secret = Some(secret);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_server_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 5000);
        assert_eq!(config.storage, StorageBackend::Sqlite);
    }

    #[tokio::test]
    async fn load_server_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
port = 8080
storage = "memory"
token_ttl_days = 1
cors_origins = ["http://localhost:3000"]
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.token_ttl_days, 1);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[tokio::test]
    async fn load_server_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 5000);
    }

    #[tokio::test]
    async fn load_server_config_out_of_range_ttl_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            "port = 8080\ntoken_ttl_days = 4294967295\n",
        )
        .await
        .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);
    }

    #[test]
    fn sanitize_config_resets_zero_ttl_and_keeps_valid_one() {
        let mut config = ServerConfig {
            token_ttl_days: 0,
            ..ServerConfig::default()
        };
        sanitize_config(&mut config);
        assert_eq!(config.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);

        config.token_ttl_days = 3650;
        sanitize_config(&mut config);
        assert_eq!(config.token_ttl_days, 3650);
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("CHATTER_STORAGE", "memory"),
            ("CHATTER_TOKEN_SECRET", "from-env"),
            ("CHATTER_DATABASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.token_secret.as_deref(), Some("from-env"));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn unknown_storage_override_is_ignored() {
        let mut config = ServerConfig::default();
        apply_overrides(&mut config, |k| {
            (k == "CHATTER_STORAGE").then(|| "postgres".to_string())
        });
        assert_eq!(config.storage, StorageBackend::Sqlite);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("CHATTER_DATA_DIR", "/tmp/test-chatter");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-chatter"));
        unsafe {
            std::env::remove_var("CHATTER_DATA_DIR");
        }
    }
}
