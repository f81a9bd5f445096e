pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use types::ReapConfig;

const CONFIG_FILE_NAME: &str = ".kubectl-reap.toml";

/// Get the global config file path (~/.kubectl-reap.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Load configuration from file or use defaults.
///
/// An explicitly given file must exist and parse. The global file is
/// optional; if it cannot be parsed a warning is logged and defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<ReapConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    if let Some(global) = global_config_path()
        && global.exists()
    {
        match read_config(&global) {
            Ok(config) => return Ok(config),
            Err(e) => log::warn!("Ignoring {}: {}", global.display(), e),
        }
    }

    Ok(ReapConfig::default())
}

/// Read and validate a single config file.
pub fn read_config(path: &Path) -> Result<ReapConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&content)?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<ReapConfig> {
    let config: ReapConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    if config.system_namespace.trim().is_empty() {
        return Err(ConfigError::InvalidValue("system_namespace must not be empty".to_string()).into());
    }
    Ok(config)
}
