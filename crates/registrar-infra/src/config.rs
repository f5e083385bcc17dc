//! Engine configuration loader for Registrar.
//!
//! Reads `config.toml` from the data directory (`~/.registrar/` in production)
//! and deserializes it into [`EngineConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use registrar_types::config::EngineConfig;
use registrar_types::error::ConfigError;

/// Load engine configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`EngineConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_engine_config(data_dir: &Path) -> EngineConfig {
    let config_path = data_dir.join("config.toml");

    match read_engine_config(&config_path).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            EngineConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err} ({}), using defaults", config_path.display());
            EngineConfig::default()
        }
    }
}

/// Read and parse a config file. `Ok(None)` when the file does not exist.
pub async fn read_engine_config(path: &Path) -> Result<Option<EngineConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ConfigError::Io(err.to_string())),
    };

    toml::from_str::<EngineConfig>(&content)
        .map(Some)
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Database URL for `config`: the configured one, else `{data_dir}/registrar.db`.
pub fn resolve_database_url(config: &EngineConfig, data_dir: &Path) -> String {
    match &config.database_url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", data_dir.join("registrar.db").display()),
    }
}
