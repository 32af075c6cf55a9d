//! Configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` by default)
//! into [`ParleyConfig`], then lets environment variables override it.
//! Falls back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use parley_types::config::ParleyConfig;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PARLEY_DATA_DIR` environment variable
/// 2. `~/.parley`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    // Last resort: current directory
    PathBuf::from(".parley")
}

/// Load a `.env` file from the working directory into the process
/// environment, if one exists. Variables already set are kept.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {e}"),
    }
}

/// Load configuration from `{data_dir}/config.toml` plus environment overrides.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: logs a warning, defaults.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config);
    config
}

async fn load_config_file(data_dir: &Path) -> ParleyConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config.toml found at {}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ParleyConfig::default()
        }
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut ParleyConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` to read variables.
///
/// Empty values are ignored. Numeric values that fail to parse are logged
/// and ignored.
fn apply_overrides_from(config: &mut ParleyConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = var("GROQ_API_KEY") {
        config.provider.api_key = Some(key);
    }
    if let Some(model) = var("GROQ_MODEL") {
        config.provider.model = model;
    }
    if let Some(base_url) = var("GROQ_BASE_URL") {
        config.provider.base_url = base_url;
    }
    if let Some(raw) = var("GROQ_MAX_TOKENS") {
        match raw.trim().parse() {
            Ok(max_tokens) => config.provider.max_tokens = max_tokens,
            Err(e) => warn!("Ignoring GROQ_MAX_TOKENS={raw:?}: {e}"),
        }
    }
    if let Some(raw) = var("PORT") {
        match raw.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!("Ignoring PORT={raw:?}: {e}"),
        }
    }
    if let Some(frontend_url) = var("FRONTEND_URL") {
        config.server.frontend_url = frontend_url;
    }
    if let Some(database_url) = var("DATABASE_URL") {
        config.database_url = Some(database_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_config_file_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.provider.max_tokens, 1024);
        assert!(config.database_url.is_none());
    }

    #[tokio::test]
    async fn load_config_file_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
database_url = "sqlite:///var/lib/parley/chat.db"

[provider]
model = "llama-3.1-8b-instant"
max_tokens = 256

[server]
port = 8080
"#,
        )
        .await
        .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.provider.model, "llama-3.1-8b-instant");
        assert_eq!(config.provider.max_tokens, 256);
        assert_eq!(config.provider.secondary_timeout_secs, 20);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.frontend_url, "http://localhost:3000");
        assert_eq!(
            config.database_url.as_deref(),
            Some("sqlite:///var/lib/parley/chat.db")
        );
    }

    #[tokio::test]
    async fn load_config_file_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = ParleyConfig::default();
        apply_overrides_from(
            &mut config,
            lookup(&[
                ("GROQ_API_KEY", "gsk-live"),
                ("GROQ_MODEL", "mixtral-8x7b-32768"),
                ("GROQ_MAX_TOKENS", "512"),
                ("PORT", "5050"),
                ("FRONTEND_URL", "https://chat.example.com"),
                ("DATABASE_URL", "sqlite://chat.db"),
            ]),
        );

        assert_eq!(config.provider.api_key(), Some("gsk-live"));
        assert_eq!(config.provider.model, "mixtral-8x7b-32768");
        assert_eq!(config.provider.max_tokens, 512);
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.frontend_url, "https://chat.example.com");
        assert_eq!(config.database_url.as_deref(), Some("sqlite://chat.db"));
    }

    #[test]
    fn env_overrides_ignore_empty_and_invalid_values() {
        let mut config = ParleyConfig::default();
        apply_overrides_from(
            &mut config,
            lookup(&[("GROQ_API_KEY", ""), ("PORT", "not-a-port"), ("GROQ_MAX_TOKENS", "-1")]),
        );

        assert!(config.provider.api_key().is_none());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.provider.max_tokens, 1024);
    }
}
