//! Config file loader.

use super::DashboardConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Load config from a TOML file and validate it.
pub fn load_config_from_file(path: &Path) -> Result<DashboardConfig, ConfigError> {
    validate_config_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config: DashboardConfig = toml::from_str(&content)?;
    config.validate()?;

    log::debug!("[Config] Loaded dashboard config from {}", path.display());
    Ok(config)
}

/// Load from `path` when given, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    match path {
        Some(path) => load_config_from_file(path),
        None => Ok(DashboardConfig::default()),
    }
}

/// Validate config path (.toml extension required).
pub fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension() {
        Some(ext) if ext == "toml" => {}
        Some(ext) => {
            return Err(ConfigError::ValidationFailed(format!(
                "Configuration file must have .toml extension, got .{}",
                ext.to_string_lossy()
            )))
        }
        None => {
            return Err(ConfigError::ValidationFailed(
                "Configuration file must have .toml extension".to_string(),
            ))
        }
    }

    Ok(())
}
