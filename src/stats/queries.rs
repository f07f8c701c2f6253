//! Read-only summaries over the ledger and watch state
//!
//! Nothing here mutates or prunes; every call derives its answer from the
//! current in-memory state.

use std::collections::BTreeMap;

use super::ledger::DailyStatsLedger;
use super::models::{DailyRecord, PageCompletion, VideoRuntimeStats, WeeklyRollup};
use crate::tracker::WatchedSet;

/// Query interface handed out by the tracker
#[derive(Debug, Clone, Copy)]
pub struct AggregateView<'a> {
    ledger: &'a DailyStatsLedger,
    watched_videos: &'a WatchedSet,
    viewed_cases: &'a WatchedSet,
    video_stats: &'a BTreeMap<String, VideoRuntimeStats>,
}

impl<'a> AggregateView<'a> {
    pub fn new(
        ledger: &'a DailyStatsLedger,
        watched_videos: &'a WatchedSet,
        viewed_cases: &'a WatchedSet,
        video_stats: &'a BTreeMap<String, VideoRuntimeStats>,
    ) -> Self {
        Self {
            ledger,
            watched_videos,
            viewed_cases,
            video_stats,
        }
    }

    /// Today's counters or zeros
    pub fn today_summary(&self) -> DailyRecord {
        self.ledger.today()
    }

    /// How many of the page's videos and cases are already done
    pub fn page_completion<V, C>(&self, page_video_ids: &[V], page_case_ids: &[C]) -> PageCompletion
    where
        V: AsRef<str>,
        C: AsRef<str>,
    {
        PageCompletion {
            videos_watched: self.watched_videos.count_present(page_video_ids),
            videos_total: page_video_ids.len(),
            cases_viewed: self.viewed_cases.count_present(page_case_ids),
            cases_total: page_case_ids.len(),
        }
    }

    /// Totals over the last seven days plus the daily series
    pub fn seven_day_rollup(&self) -> WeeklyRollup {
        let days = self.ledger.last_7_days();
        let mut rollup = WeeklyRollup::default();
        for day in &days {
            let record = &day.record;
            rollup.total_videos = rollup.total_videos.saturating_add(record.videos_watched);
            rollup.total_unique_videos = rollup
                .total_unique_videos
                .saturating_add(record.unique_videos_watched);
            rollup.total_time_watched = rollup
                .total_time_watched
                .saturating_add(record.total_time_watched);
            rollup.total_cases_viewed = rollup.total_cases_viewed.saturating_add(record.cases_viewed);
        }
        rollup.days = days;
        rollup
    }

    pub fn is_video_watched(&self, video_id: &str) -> bool {
        self.watched_videos.contains(video_id)
    }

    pub fn is_case_viewed(&self, case_id: &str) -> bool {
        self.viewed_cases.contains(case_id)
    }

    /// Seconds of organic playback seen for one video
    pub fn video_time_spent(&self, video_id: &str) -> f64 {
        self.video_stats
            .get(video_id.trim())
            .map(|s| s.time_spent)
            .unwrap_or(0.0)
    }

    /// Seconds of organic playback across every tracked video
    pub fn total_time_spent(&self) -> f64 {
        self.video_stats.values().map(|s| s.time_spent).sum()
    }

    /// Videos ordered by time spent, most first
    pub fn top_videos_by_time(&self, limit: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .video_stats
            .iter()
            .filter(|(_, s)| s.time_spent > 0.0)
            .map(|(id, s)| (id.clone(), s.time_spent))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}
