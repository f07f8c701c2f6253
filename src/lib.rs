//! coursetrack - local watch progress for video course pages
//!
//! Course pages embed a handful of videos and case sections. This crate keeps
//! track of what was watched and viewed, entirely on the local machine:
//!
//! 1. **Tracker**: [`tracker::WatchStateTracker`] consumes playback events
//!    (ticks, completions, case toggles), deduplicates completions per
//!    session and remembers watched items across sessions.
//! 2. **Stats**: [`stats::DailyStatsLedger`] keeps per-day counters for a
//!    rolling week; [`stats::AggregateView`] derives the summaries shown in
//!    the sidebar and the 7-day stats window.
//!
//! Everything is persisted through [`store::PersistentStore`]. Players are
//! only reached through the [`player::PlayerControls`] trait.

pub mod config;
pub mod page;
pub mod player;
pub mod stats;
pub mod store;
pub mod tracker;

use std::sync::Arc;

use anyhow::Result;

pub use config::Config;
pub use stats::{AggregateView, DailyRecord, DailyStatsLedger, PageCompletion, WeeklyRollup};
pub use store::PersistentStore;
pub use tracker::{CompletionOutcome, WatchStateTracker};

/// Open the configured store and start a tracking session on the local clock
pub fn open_tracker(config: &Config) -> Result<WatchStateTracker> {
    let store = PersistentStore::open(&config.storage)?;
    Ok(WatchStateTracker::open(
        store,
        Arc::new(stats::SystemClock),
        config.tracking.clone(),
    ))
}
