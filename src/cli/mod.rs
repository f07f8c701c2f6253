//! CLI command implementations

pub mod init;
pub mod replay;
pub mod reset;
pub mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use coursetrack::{Config, WatchStateTracker};

/// Load config and open a tracking session for a command
pub fn open_session(config_path: Option<&Path>) -> Result<(Config, WatchStateTracker)> {
    let config = Config::load(config_path)?;
    let tracker = coursetrack::open_tracker(&config).context("Failed to open progress store")?;
    Ok((config, tracker))
}
