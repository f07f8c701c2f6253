//! Watch state tracker
//!
//! Owns the watched/viewed sets, the per-video runtime counters and the
//! session dedup set, and decides when a playback event counts toward the
//! daily ledger. One tracker is built per page session from what the store
//! holds; nothing here is global.
//!
//! # Event rules
//!
//! - **position tick**: a jump of 1–5 seconds since the previous tick is
//!   organic playback and is added to the video's time spent. Anything else
//!   (pause, seek, scrub) only moves the recorded position.
//! - **completion threshold crossed**: counted at most once per video per
//!   session. Every counted completion bumps the ledger; only the first one
//!   ever marks the video watched and bumps the unique counter.
//! - **case toggled**: flips membership; only the "into viewed" direction is
//!   counted in the ledger.

mod watched_set;

pub use watched_set::WatchedSet;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::stats::{AggregateView, Clock, DailyStatsLedger, VideoRuntimeStats};
use crate::store::{PersistentStore, StoreError, StoreKey};

/// What a completion event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// No usable identifier
    Ignored,
    /// Fraction did not exceed the completion threshold
    BelowThreshold,
    /// Already counted during this session
    AlreadyCounted,
    /// Counted toward today's stats; `first_time` when the video had never
    /// been watched before
    Counted { first_time: bool },
}

impl CompletionOutcome {
    pub fn is_first_time(&self) -> bool {
        matches!(self, Self::Counted { first_time: true })
    }

    pub fn was_counted(&self) -> bool {
        matches!(self, Self::Counted { .. })
    }
}

pub struct WatchStateTracker {
    session_id: Uuid,
    store: PersistentStore,
    settings: TrackingConfig,
    ledger: DailyStatsLedger,
    watched_videos: WatchedSet,
    viewed_cases: WatchedSet,
    video_stats: BTreeMap<String, VideoRuntimeStats>,
    session_completed: HashSet<String>,
    durations: HashMap<String, f64>,
}

impl std::fmt::Debug for WatchStateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchStateTracker")
            .field("session_id", &self.session_id)
            .field("watched_videos", &self.watched_videos.len())
            .field("viewed_cases", &self.viewed_cases.len())
            .field("session_completed", &self.session_completed.len())
            .finish()
    }
}

impl WatchStateTracker {
    /// Start a session from persisted state
    pub fn open(store: PersistentStore, clock: Arc<dyn Clock>, settings: TrackingConfig) -> Self {
        let ledger = DailyStatsLedger::load(store.clone(), clock, settings.retention_days);
        let watched_videos = WatchedSet::load(&store, StoreKey::WatchedVideos);
        let viewed_cases = WatchedSet::load(&store, StoreKey::ViewedCases);
        let video_stats = store.read(StoreKey::VideoStats, BTreeMap::new());

        let tracker = Self {
            session_id: Uuid::new_v4(),
            store,
            settings,
            ledger,
            watched_videos,
            viewed_cases,
            video_stats,
            session_completed: HashSet::new(),
            durations: HashMap::new(),
        };
        tracing::info!(
            session = %tracker.session_id,
            "Tracking session started ({} watched videos, {} viewed cases)",
            tracker.watched_videos.len(),
            tracker.viewed_cases.len()
        );
        tracker
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn settings(&self) -> &TrackingConfig {
        &self.settings
    }

    /// Register a video found on the page, with its duration if already known
    ///
    /// Returns `false` (and tracks nothing) when the id is blank.
    pub fn video_identified(&mut self, video_id: &str, duration_secs: Option<f64>) -> bool {
        let Some(video_id) = usable_id(video_id) else {
            tracing::debug!(session = %self.session_id, "Skipping video without identifier");
            return false;
        };
        if let Some(secs) = duration_secs {
            self.set_duration(video_id, secs);
        }
        true
    }

    /// Remember a video's duration for crediting completions
    pub fn set_duration(&mut self, video_id: &str, duration_secs: f64) {
        let Some(video_id) = usable_id(video_id) else {
            return;
        };
        if duration_secs.is_finite() && duration_secs > 0.0 {
            self.durations.insert(video_id.to_string(), duration_secs);
        }
    }

    pub fn duration(&self, video_id: &str) -> Option<f64> {
        self.durations.get(video_id.trim()).copied()
    }

    /// Apply a time-position tick
    ///
    /// Returns the seconds credited to time spent (0 when the jump was outside
    /// the organic band), or `None` when the tick was unusable.
    pub fn position_tick(&mut self, video_id: &str, position_secs: f64) -> Option<f64> {
        let video_id = usable_id(video_id)?;
        if !position_secs.is_finite() {
            return None;
        }

        let (min, max) = (self.settings.min_tick_delta_secs, self.settings.max_tick_delta_secs);
        let stats = self.video_stats.entry(video_id.to_string()).or_default();
        let delta = (position_secs - stats.last_position).abs();
        let credited = if (min..=max).contains(&delta) { delta } else { 0.0 };

        stats.time_spent += credited;
        stats.last_position = position_secs;
        self.persist_video_stats();
        Some(credited)
    }

    /// Apply a completion signal for a video
    pub fn completion_threshold_crossed(
        &mut self,
        video_id: &str,
        fraction_complete: f64,
    ) -> CompletionOutcome {
        let Some(video_id) = usable_id(video_id) else {
            return CompletionOutcome::Ignored;
        };
        // NaN compares false, so it lands here too
        if !(fraction_complete > self.settings.completion_threshold) {
            return CompletionOutcome::BelowThreshold;
        }
        if !self.session_completed.insert(video_id.to_string()) {
            return CompletionOutcome::AlreadyCounted;
        }

        let stats = self.video_stats.entry(video_id.to_string()).or_default();
        stats.watch_count = stats.watch_count.saturating_add(1);
        self.persist_video_stats();

        let duration = self.durations.get(video_id).copied().unwrap_or(0.0);
        self.ledger.increment_video_watch(duration);

        let first_time = self.watched_videos.insert(video_id);
        if first_time {
            if let Err(e) = self.watched_videos.persist(&self.store) {
                tracing::warn!(session = %self.session_id, "Failed to persist watched videos: {}", e);
            }
            self.ledger.increment_unique_video();
        }

        tracing::info!(
            session = %self.session_id,
            video_id,
            first_time,
            "Video completion counted ({:.0}s)",
            duration
        );
        CompletionOutcome::Counted { first_time }
    }

    /// Flip a case's viewed state, returning the new state
    ///
    /// Marking a case viewed counts toward today's stats; unmarking does not
    /// take it back.
    pub fn toggle_case_viewed(&mut self, case_id: &str) -> Option<bool> {
        let Some(case_id) = usable_id(case_id) else {
            tracing::debug!(session = %self.session_id, "Skipping case without identifier");
            return None;
        };

        let viewed = self.viewed_cases.toggle(case_id);
        if let Err(e) = self.viewed_cases.persist(&self.store) {
            tracing::warn!(session = %self.session_id, "Failed to persist viewed cases: {}", e);
        }
        if viewed {
            self.ledger.increment_case_viewed();
        }
        tracing::debug!(session = %self.session_id, case_id, viewed, "Case toggled");
        Some(viewed)
    }

    pub fn is_video_watched(&self, video_id: &str) -> bool {
        self.watched_videos.contains(video_id)
    }

    pub fn is_case_viewed(&self, case_id: &str) -> bool {
        self.viewed_cases.contains(case_id)
    }

    pub fn video_stats(&self, video_id: &str) -> Option<&VideoRuntimeStats> {
        self.video_stats.get(video_id.trim())
    }

    pub fn ledger(&self) -> &DailyStatsLedger {
        &self.ledger
    }

    pub fn watched_videos(&self) -> &WatchedSet {
        &self.watched_videos
    }

    pub fn viewed_cases(&self) -> &WatchedSet {
        &self.viewed_cases
    }

    /// Read-only summaries over the current state
    pub fn view(&self) -> AggregateView<'_> {
        AggregateView::new(
            &self.ledger,
            &self.watched_videos,
            &self.viewed_cases,
            &self.video_stats,
        )
    }

    /// Forget everything, persisted and in memory
    ///
    /// Returns how many stored records were removed.
    pub fn reset(&mut self) -> Result<usize, StoreError> {
        let removed = self.store.clear()?;
        self.ledger.clear();
        self.watched_videos.clear();
        self.viewed_cases.clear();
        self.video_stats.clear();
        self.session_completed.clear();
        tracing::info!(session = %self.session_id, removed, "Tracking state reset");
        Ok(removed)
    }

    fn persist_video_stats(&self) {
        if let Err(e) = self.store.write(StoreKey::VideoStats, &self.video_stats) {
            tracing::warn!(session = %self.session_id, "Failed to persist video stats: {}", e);
        }
    }
}

fn usable_id(id: &str) -> Option<&str> {
    let id = id.trim();
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DailyRecord, FixedClock};
    use chrono::NaiveDate;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 7, 25).unwrap()))
    }

    fn tracker(store: &PersistentStore) -> WatchStateTracker {
        WatchStateTracker::open(store.clone(), clock(), TrackingConfig::default())
    }

    #[test]
    fn test_position_ticks_filter_jumps() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);

        // 0 -> 10 is a jump, then 2, 1, and a 27 second seek
        for pos in [10.0, 12.0, 13.0, 40.0] {
            t.position_tick("123", pos);
        }

        let stats = t.video_stats("123").unwrap();
        assert!((stats.time_spent - 3.0).abs() < 1e-9);
        assert!((stats.last_position - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_tick_counts_backward_small_jumps() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.position_tick("v", 20.0);
        assert_eq!(t.position_tick("v", 17.0), Some(3.0));
        assert_eq!(t.position_tick("v", 17.5), Some(0.0));
    }

    #[test]
    fn test_position_tick_band_is_inclusive() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        assert_eq!(t.position_tick("v", 1.0), Some(1.0));
        assert_eq!(t.position_tick("v", 6.0), Some(5.0));
        assert_eq!(t.position_tick("v", 11.01), Some(0.0));
    }

    #[test]
    fn test_position_tick_rejects_unusable_input() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        assert_eq!(t.position_tick("", 3.0), None);
        assert_eq!(t.position_tick("v", f64::NAN), None);
        assert!(t.video_stats("v").is_none());
    }

    #[test]
    fn test_completion_counts_once_per_session() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.video_identified("123", Some(120.0));

        assert_eq!(
            t.completion_threshold_crossed("123", 0.85),
            CompletionOutcome::Counted { first_time: true }
        );
        assert_eq!(
            t.completion_threshold_crossed("123", 0.9),
            CompletionOutcome::AlreadyCounted
        );
        assert_eq!(
            t.completion_threshold_crossed("123", 1.0),
            CompletionOutcome::AlreadyCounted
        );

        let today = t.ledger().today();
        assert_eq!(today.videos_watched, 1);
        assert_eq!(today.total_time_watched, 120);
        assert_eq!(today.unique_videos_watched, 1);
        assert_eq!(t.video_stats("123").unwrap().watch_count, 1);
    }

    #[test]
    fn test_completion_threshold_is_strict() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        assert_eq!(
            t.completion_threshold_crossed("123", 0.8),
            CompletionOutcome::BelowThreshold
        );
        assert_eq!(
            t.completion_threshold_crossed("123", f64::NAN),
            CompletionOutcome::BelowThreshold
        );
        assert_eq!(t.ledger().today().videos_watched, 0);
        assert!(!t.is_video_watched("123"));
    }

    #[test]
    fn test_completion_without_duration_credits_zero_time() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.completion_threshold_crossed("9", 0.95);
        assert_eq!(t.ledger().today().videos_watched, 1);
        assert_eq!(t.ledger().today().total_time_watched, 0);
    }

    #[test]
    fn test_late_duration_is_used() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.video_identified("9", None);
        t.set_duration("9", 61.7);
        t.completion_threshold_crossed("9", 0.95);
        assert_eq!(t.ledger().today().total_time_watched, 61);
    }

    #[test]
    fn test_blank_ids_never_tracked() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        assert!(!t.video_identified("  ", Some(10.0)));
        assert_eq!(t.completion_threshold_crossed("", 0.99), CompletionOutcome::Ignored);
        assert_eq!(t.toggle_case_viewed(" "), None);
        assert!(t.watched_videos().is_empty());
        assert!(t.viewed_cases().is_empty());
        assert_eq!(t.ledger().today(), DailyRecord::default());
    }

    #[test]
    fn test_case_toggle_is_asymmetric() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);

        assert_eq!(t.toggle_case_viewed("case-1"), Some(true));
        assert_eq!(t.toggle_case_viewed("case-1"), Some(false));
        assert_eq!(t.toggle_case_viewed("case-1"), Some(true));

        assert_eq!(t.ledger().today().cases_viewed, 2);
        assert!(t.is_case_viewed("case-1"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.completion_threshold_crossed("1", 0.9);
        t.toggle_case_viewed("c");
        assert_eq!(t.reset().unwrap(), 4);

        assert!(!t.is_video_watched("1"));
        assert!(!t.is_case_viewed("c"));
        assert_eq!(t.ledger().today(), DailyRecord::default());

        let fresh = tracker(&store);
        assert!(fresh.watched_videos().is_empty());
        assert!(fresh.ledger().records().is_empty());
    }

    #[test]
    fn test_padded_ids_read_back() {
        let store = PersistentStore::in_memory();
        let mut t = tracker(&store);
        t.video_identified(" 7 ", Some(60.0));
        t.position_tick(" 7 ", 2.0);
        t.completion_threshold_crossed("7", 0.9);
        t.toggle_case_viewed(" c ");

        assert!(t.is_case_viewed(" c "));
        assert!(t.is_video_watched(" 7"));
        assert_eq!(t.duration("7 "), Some(60.0));
        assert_eq!(t.video_stats(" 7 ").map(|s| s.watch_count), Some(1));

        let view = t.view();
        assert!(view.is_case_viewed(" c "));
        assert!((view.video_time_spent(" 7") - 2.0).abs() < 1e-9);
        let page = view.page_completion(&[" 7 ", "8"], &[" c "]);
        assert_eq!(page.videos_watched, 1);
        assert_eq!(page.cases_viewed, 1);
    }

    #[test]
    fn test_completion_on_saturated_day_does_not_panic() {
        let store = PersistentStore::in_memory();
        let mut days = std::collections::BTreeMap::new();
        days.insert(
            "2024-07-25".to_string(),
            DailyRecord {
                videos_watched: u64::MAX,
                ..DailyRecord::default()
            },
        );
        store.write(StoreKey::DailyStats, &days).unwrap();

        let mut t = tracker(&store);
        t.video_identified("x", Some(1e30));
        assert!(t.completion_threshold_crossed("x", 0.9).was_counted());

        let today = t.ledger().today();
        assert_eq!(today.videos_watched, u64::MAX);
        assert_eq!(today.total_time_watched, crate::stats::MAX_CREDITED_SECS);
    }
}
