use std::fs;
use std::path::Path;

use crate::shared::errors::AppError;
use crate::shared::types::{PoolConfig, PoolsConfig};

/// Config file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load pool definitions from a `.json` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PoolsConfig, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<PoolsConfig, AppError> {
        let config: PoolsConfig = serde_json::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<PoolsConfig, AppError> {
        let config: PoolsConfig = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &PoolsConfig) -> Result<(), AppError> {
        for (name, pool) in &config.pools {
            Self::validate_pool(name, pool)?;
        }
        Ok(())
    }

    fn validate_pool(name: &str, pool: &PoolConfig) -> Result<(), AppError> {
        if !pool.dai.is_finite() || pool.dai < 0.0 {
            return Err(AppError::ConfigError(format!("{}: invalid dai reserve {}", name, pool.dai)));
        }
        if !pool.eth.is_finite() || pool.eth < 0.0 {
            return Err(AppError::ConfigError(format!("{}: invalid eth reserve {}", name, pool.eth)));
        }
        if !(0.0..1.0).contains(&pool.swap_fee) {
            return Err(AppError::ConfigError(format!(
                "{}: swap_fee {} outside [0, 1)",
                name, pool.swap_fee
            )));
        }
        Ok(())
    }
}
