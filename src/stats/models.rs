//! Data models for progress tracking
//!
//! These structures are what gets persisted (`DailyRecord`,
//! `VideoRuntimeStats`) and what the aggregate views hand back.

use serde::{Deserialize, Serialize};

/// Counters for one calendar day
///
/// Records written before a counter existed decode with that counter at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyRecord {
    /// Completions counted today (once per video per session)
    pub videos_watched: u64,
    /// Whole seconds of video duration credited by those completions
    pub total_time_watched: u64,
    /// Videos completed for the first time ever
    pub unique_videos_watched: u64,
    /// Cases marked as viewed
    pub cases_viewed: u64,
}

/// A ledger day tagged for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: String,     // YYYY-MM-DD
    pub day_name: String, // Mon, Tue, ...
    #[serde(flatten)]
    pub record: DailyRecord,
}

/// Fine-grained counters for one video
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoRuntimeStats {
    /// Completions across all sessions, one per session at most
    pub watch_count: u64,
    /// Seconds of organic playback observed
    pub time_spent: f64,
    /// Position from the most recent tick
    pub last_position: f64,
}

/// "X of Y watched/viewed" for the items on one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCompletion {
    pub videos_watched: usize,
    pub videos_total: usize,
    pub cases_viewed: usize,
    pub cases_total: usize,
}

impl PageCompletion {
    pub fn all_videos_watched(&self) -> bool {
        self.videos_total > 0 && self.videos_watched == self.videos_total
    }
}

/// Seven-day totals plus the per-day series for charting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRollup {
    pub days: Vec<DayStats>,
    pub total_videos: u64,
    pub total_unique_videos: u64,
    pub total_time_watched: u64,
    pub total_cases_viewed: u64,
}

impl WeeklyRollup {
    /// Average completions per day across the whole window
    pub fn avg_videos_per_day(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        self.total_videos as f64 / self.days.len() as f64
    }

    /// Largest single-day completion count, never below 1 so bars can divide by it
    pub fn chart_scale(&self) -> u64 {
        self.days
            .iter()
            .map(|d| d.record.videos_watched)
            .max()
            .unwrap_or(0)
            .max(1)
    }
}
