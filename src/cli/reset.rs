//! Reset command implementation

use anyhow::{Result, bail};
use std::path::Path;

use super::open_session;

/// Delete all tracked progress
pub fn reset_command(config_path: Option<&Path>, yes: bool) -> Result<()> {
    if !yes {
        bail!("This deletes all watch progress and stats. Re-run with --yes to confirm.");
    }

    let (_, mut tracker) = open_session(config_path)?;
    let removed = tracker.reset()?;
    println!("All progress cleared ({} stored record(s) removed).", removed);
    Ok(())
}
