//! Configuration file I/O operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Config;
use crate::store::write_locked;

const CONFIG_HEADER: &str = "\
# coursetrack configuration
# Remove a key to fall back to its built-in default.

";

impl Config {
    /// Get the global config directory path (~/.coursetrack/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coursetrack")
    }

    /// Get the global config file path (~/.coursetrack/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Write the config as commented TOML, replacing the file atomically
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let content = format!("{}{}", CONFIG_HEADER, body);

        write_locked(path, content.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}
