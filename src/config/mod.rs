//! Configuration loading and management

mod io;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dedup and retention rules
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Where progress is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Initial player setup and control steps
    #[serde(default)]
    pub player: PlayerSettings,
}

/// Rules the watch tracker applies to incoming playback events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Number of calendar days (today included) kept in the daily ledger
    pub retention_days: u32,

    /// Playback fraction a video must exceed to count as watched
    pub completion_threshold: f64,

    /// Smallest position jump counted as organic playback, in seconds
    pub min_tick_delta_secs: f64,

    /// Largest position jump counted as organic playback, in seconds
    pub max_tick_delta_secs: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            retention_days: 7,
            completion_threshold: 0.8,
            min_tick_delta_secs: 1.0,
            max_tick_delta_secs: 5.0,
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Sqlite,
    Json,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,

    /// Database file (sqlite) or directory (json); defaults under `~/.coursetrack/`
    pub path: Option<PathBuf>,

    /// Prepended to every stored key
    pub key_prefix: String,
}

impl StorageConfig {
    pub const DEFAULT_PREFIX: &'static str = "coursetrack";
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            path: None,
            key_prefix: Self::DEFAULT_PREFIX.to_string(),
        }
    }
}

/// How embedded players are prepared when a page loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub default_playback_rate: f64,
    pub default_volume: f64,
    pub autoplay_first_video: bool,

    /// Rates the speed button cycles through
    pub speed_steps: Vec<f64>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_playback_rate: 1.5,
            default_volume: 0.8,
            autoplay_first_video: true,
            speed_steps: vec![1.0, 1.25, 1.5, 2.0],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load an explicit config file, or the global one, or built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let global_path = Self::global_config_path();
        if global_path.exists() {
            return Self::from_file(&global_path);
        }

        tracing::debug!("No config at {}, using defaults", global_path.display());
        Ok(Self::default())
    }
}
