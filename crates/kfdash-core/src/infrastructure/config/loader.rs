use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use super::interpolation::{
    interpolate_toml,
    InterpolationError,
};
use super::schema::KfdashConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Environment variable interpolation failed: {0}")]
    InterpolationError(#[from] InterpolationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

pub const CONFIG_PATH_ENV: &str = "KFDASH_CONFIG_PATH";

const LOCAL_CONFIG_FILE: &str = "kfdash.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// `KFDASH_CONFIG_PATH`, then the user config dir, then `./kfdash.toml`.
    /// Returns `None` when no candidate exists.
    pub fn discover_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                tracing::debug!("Using config path from {}: {}", CONFIG_PATH_ENV, path);
                return Some(PathBuf::from(path));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("kfdash").join("config.toml");
            if path.exists() {
                tracing::debug!("Using user config path: {}", path.display());
                return Some(path);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Using local config path: {}", local.display());
            return Some(local);
        }

        None
    }

    /// Loads the discovered config, or defaults when there is none.
    /// An explicitly configured path that does not exist is an error.
    pub fn load_default() -> ConfigLoadResult<KfdashConfig> {
        match Self::discover_config_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::info!("No config file found, using defaults");
                Self::finish(KfdashConfig::default())
            }
        }
    }

    pub fn load(path: &Path) -> ConfigLoadResult<KfdashConfig> {
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> ConfigLoadResult<KfdashConfig> {
        let mut value: toml::Value = toml::from_str(content)?;

        interpolate_toml(&mut value)?;

        let config: KfdashConfig = value.try_into().map_err(|e| {
            ConfigLoadError::InvalidConfig(format!("Failed to deserialize config: {}", e))
        })?;

        Self::finish(config)
    }

    fn finish(config: KfdashConfig) -> ConfigLoadResult<KfdashConfig> {
        let validation = config.validate();
        for warning in &validation.warnings {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }
        if !validation.is_ok() {
            let messages: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
            return Err(ConfigLoadError::InvalidConfig(messages.join("; ")));
        }

        tracing::debug!(
            bind_addr = %config.server.bind_addr,
            pipelines_api = config.pipelines.api_url.is_some(),
            "Config validated"
        );

        Ok(config)
    }
}
