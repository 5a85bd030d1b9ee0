//! Token signing key resolution.
//!
//! The configured secret wins. Otherwise a random 32-byte key is generated on
//! first start and kept hex-encoded in `{data_dir}/token.key`, so tokens
//! survive restarts.

use std::path::Path;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chatter_types::error::ConfigError;

/// Key file name inside the data directory.
pub const TOKEN_KEY_FILE: &str = "token.key";

/// Resolve the HMAC signing key from the configured secret or the key file.
pub async fn resolve_token_key(
    configured: Option<&str>,
    data_dir: &Path,
) -> Result<Vec<u8>, ConfigError> {
    match configured {
        Some(secret) if !secret.trim().is_empty() => Ok(secret.as_bytes().to_vec()),
        _ => load_or_create_key_file(data_dir).await,
    }
}

/// Read `{data_dir}/token.key`, generating it when missing.
pub async fn load_or_create_key_file(data_dir: &Path) -> Result<Vec<u8>, ConfigError> {
    let path = data_dir.join(TOKEN_KEY_FILE);
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let key = hex_decode(content.trim()).map_err(ConfigError::InvalidKey)?;
            if key.len() < 32 {
                return Err(ConfigError::InvalidKey(format!(
                    "{} holds {} bytes, expected 32",
                    path.display(),
                    key.len()
                )));
            }
            Ok(key)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let mut key = [0u8; 32];
            OsRng.fill_bytes(&mut key);

            tokio::fs::create_dir_all(data_dir).await.map_err(io_err)?;
            tokio::fs::write(&path, hex_encode(&key))
                .await
                .map_err(io_err)?;
            restrict_permissions(&path).await.map_err(io_err)?;

            tracing::info!(path = %path.display(), "Generated token signing key");
            Ok(key.to_vec())
        }
        Err(err) => Err(io_err(err)),
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Hex-encode bytes to string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hex-decode a string to bytes.
fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {i}"))
        })
        .collect()
}
