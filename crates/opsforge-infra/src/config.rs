//! Configuration loading.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`GlobalConfig`], falling back to defaults when the file is missing or
//! malformed. `OPSFORGE_*` environment variables override individual
//! fields after the file loads; the Bedrock API key only ever comes from
//! the environment so it never lands in a config file.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use opsforge_types::config::GlobalConfig;

/// Environment variable holding the Bedrock bearer token.
pub const API_KEY_ENV: &str = "AWS_BEDROCK_API_KEY";

/// Load configuration from `{data_dir}/config.toml`, then apply
/// environment overrides.
///
/// - Missing file: defaults.
/// - Unreadable or unparseable file: warning, then defaults.
pub async fn load_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<GlobalConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                GlobalConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    };

    apply_env_overrides(&mut config);
    config
}

fn apply_env_overrides(config: &mut GlobalConfig) {
    if let Ok(host) = std::env::var("OPSFORGE_HOST") {
        config.host = host;
    }
    if let Ok(port) = std::env::var("OPSFORGE_PORT") {
        match port.parse() {
            Ok(port) => config.port = port,
            Err(_) => tracing::warn!(value = %port, "OPSFORGE_PORT is not a valid port, ignoring"),
        }
    }
    if let Ok(model) = std::env::var("OPSFORGE_BEDROCK_MODEL") {
        config.bedrock.model = model;
    }
    if let Ok(region) = std::env::var("OPSFORGE_BEDROCK_REGION") {
        config.bedrock.region = region;
    }
}

/// Resolve the data directory holding `config.toml`.
///
/// `OPSFORGE_DATA_DIR` wins, then `~/.opsforge`, then the current
/// directory as a last resort.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OPSFORGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".opsforge");
    }
    PathBuf::from(".")
}

/// Read the Bedrock bearer token from the environment. `None` means the
/// gateway runs credential-less and every analysis degrades to fallbacks.
pub fn bedrock_api_key() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_sessions, 500);
        assert_eq!(config.bedrock.region, "us-east-1");
    }

    #[tokio::test]
    async fn test_valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
port = 9090
max_sessions = 100

[bedrock]
model = "claude-haiku-4-20250514"
timeout_secs = 10
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.port, 9090);
        assert_eq!(config.max_sessions, 100);
        assert_eq!(config.bedrock.model, "claude-haiku-4-20250514");
        assert_eq!(config.bedrock.timeout_secs, 10);
        // Unspecified fields keep their defaults.
        assert_eq!(config.bedrock.max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_invalid_toml_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.port, 8080);
    }
}
