//! Study statistics
//!
//! Per-day counters live in the [`DailyStatsLedger`], pruned to a rolling
//! window of calendar days. [`AggregateView`] derives the summaries the UI
//! shows from the ledger and the tracker's watch state.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌──────────────────┐
//! │ WatchStateTracker │────▶│ DailyStatsLedger │
//! └─────────┬─────────┘     └────────┬─────────┘
//!           │                        │
//!           └───────────┬────────────┘
//!                       ▼
//!               PersistentStore
//! ```

mod ledger;
mod models;
mod queries;
mod time_bucket;

pub use ledger::{DailyStatsLedger, MAX_CREDITED_SECS, WEEK_DAYS};
pub use models::{DailyRecord, DayStats, PageCompletion, VideoRuntimeStats, WeeklyRollup};
pub use queries::AggregateView;
pub use time_bucket::{Clock, FixedClock, SystemClock, day_key, parse_day_key, weekday_short};
