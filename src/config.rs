use crate::constants::DEFAULT_API_URL;
use crate::errors::{MedsageError, MedsageResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub log_level: String,
    pub log_dir: String,
    pub response_cache_size: usize,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            response_cache_size: 100,
            history_limit: 100,
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

pub fn initialize_config() -> MedsageResult<()> {
    let config_path = get_config_path()?;
    let mut config = load_or_create(&config_path)?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    *CONFIG.write().unwrap() = config;

    Ok(())
}

fn load_or_create(config_path: &Path) -> MedsageResult<Config> {
    if config_path.exists() {
        let config_str = fs::read_to_string(config_path)
            .map_err(|e| MedsageError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| MedsageError::config_error(format!("Failed to parse config: {}", e)))?;

        return Ok(config);
    }

    let config = Config::default();

    fs::create_dir_all(config_path.parent().unwrap()).map_err(|e| {
        MedsageError::config_error(format!("Failed to create config directory: {}", e))
    })?;

    let config_str = serde_json::to_string_pretty(&config)
        .map_err(|e| MedsageError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(config_path, config_str)
        .map_err(|e| MedsageError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(config)
}

/// Environment wins over the file, so a one-off `MEDSAGE_API_URL=...` run
/// never has to touch the config on disk.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = env::var("MEDSAGE_API_URL") {
        config.api_url = url;
    }
    if let Ok(level) = env::var("MEDSAGE_LOG_LEVEL") {
        config.log_level = level;
    }
}

fn get_config_path() -> MedsageResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| MedsageError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("medsage").join("config.json"))
}

fn validate_config(config: &Config) -> MedsageResult<()> {
    if config.api_url.is_empty() {
        return Err(MedsageError::config_error("API URL is required"));
    }

    if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
        return Err(MedsageError::config_error(
            "API URL must start with http:// or https://",
        ));
    }

    match config.log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => {
            return Err(MedsageError::config_error(format!(
                "Unknown log level: {}",
                other
            )));
        }
    }

    if config.response_cache_size == 0 {
        return Err(MedsageError::config_error(
            "response_cache_size must be greater than 0",
        ));
    }

    if config.history_limit == 0 {
        return Err(MedsageError::config_error(
            "history_limit must be greater than 0",
        ));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG.read().unwrap().clone()
}

pub fn update_config(updated_config: Config) -> MedsageResult<()> {
    validate_config(&updated_config)?;

    let config_path = get_config_path()?;
    let config_str = serde_json::to_string_pretty(&updated_config)
        .map_err(|e| MedsageError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, config_str)
        .map_err(|e| MedsageError::config_error(format!("Failed to write config file: {}", e)))?;

    *CONFIG.write().unwrap() = updated_config;

    Ok(())
}
