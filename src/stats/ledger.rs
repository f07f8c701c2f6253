//! Daily stats ledger - per-day counters on a rolling window
//!
//! Every mutation prunes days that fell out of the retention window and then
//! writes the whole ledger back, so the persisted map never grows unbounded.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::models::{DailyRecord, DayStats};
use super::time_bucket::{Clock, day_key, trailing_days, weekday_short};
use crate::store::{PersistentStore, StoreKey};

/// Days shown in the stats window
pub const WEEK_DAYS: u32 = 7;

/// Most seconds a single completion can credit
pub const MAX_CREDITED_SECS: u64 = 24 * 60 * 60;

pub struct DailyStatsLedger {
    store: PersistentStore,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    days: BTreeMap<String, DailyRecord>,
}

impl std::fmt::Debug for DailyStatsLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyStatsLedger")
            .field("retention_days", &self.retention_days)
            .field("days", &self.days)
            .finish()
    }
}

impl DailyStatsLedger {
    /// Load the ledger and prune it to the retention window
    pub fn load(store: PersistentStore, clock: Arc<dyn Clock>, retention_days: u32) -> Self {
        let days = store.read(StoreKey::DailyStats, BTreeMap::new());
        let mut ledger = Self {
            store,
            clock,
            retention_days: retention_days.max(1),
            days,
        };

        let removed = ledger.prune(ledger.retention_days);
        if removed > 0 {
            tracing::debug!("Pruned {} expired day(s) from the ledger", removed);
            ledger.persist();
        }
        ledger
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Key of the current local day
    pub fn today_key(&self) -> String {
        day_key(self.clock.today())
    }

    /// Count one completed video, crediting its whole duration
    ///
    /// Unknown, negative or non-finite durations credit zero seconds, and
    /// anything past [`MAX_CREDITED_SECS`] is clamped. Counters saturate.
    pub fn increment_video_watch(&mut self, duration_secs: f64) {
        let credited = whole_seconds(duration_secs);
        let today = self.today_mut();
        today.videos_watched = today.videos_watched.saturating_add(1);
        today.total_time_watched = today.total_time_watched.saturating_add(credited);
        self.commit();
    }

    pub fn increment_unique_video(&mut self) {
        let today = self.today_mut();
        today.unique_videos_watched = today.unique_videos_watched.saturating_add(1);
        self.commit();
    }

    /// There is deliberately no matching decrement.
    pub fn increment_case_viewed(&mut self) {
        let today = self.today_mut();
        today.cases_viewed = today.cases_viewed.saturating_add(1);
        self.commit();
    }

    /// Drop every entry that is not today or one of the previous
    /// `retention_days - 1` days. Returns how many entries were removed.
    pub fn prune(&mut self, retention_days: u32) -> usize {
        let keep: HashSet<String> = trailing_days(self.clock.today(), retention_days.max(1))
            .into_iter()
            .map(day_key)
            .collect();

        let before = self.days.len();
        self.days.retain(|key, _| keep.contains(key));
        before - self.days.len()
    }

    /// Stored record for a day key
    pub fn record(&self, key: &str) -> Option<&DailyRecord> {
        self.days.get(key)
    }

    /// Today's counters, zeros if nothing happened yet
    pub fn today(&self) -> DailyRecord {
        self.days.get(&self.today_key()).copied().unwrap_or_default()
    }

    pub fn records(&self) -> &BTreeMap<String, DailyRecord> {
        &self.days
    }

    /// The last `count` days ending today, oldest first, zero-filled
    pub fn last_n_days(&self, count: u32) -> Vec<DayStats> {
        trailing_days(self.clock.today(), count)
            .into_iter()
            .map(|date| {
                let key = day_key(date);
                let record = self.days.get(&key).copied().unwrap_or_default();
                DayStats {
                    date: key,
                    day_name: weekday_short(date),
                    record,
                }
            })
            .collect()
    }

    pub fn last_7_days(&self) -> Vec<DayStats> {
        self.last_n_days(WEEK_DAYS)
    }

    /// Forget every day
    pub fn clear(&mut self) {
        self.days.clear();
        self.persist();
    }

    fn today_mut(&mut self) -> &mut DailyRecord {
        let key = self.today_key();
        self.days.entry(key).or_default()
    }

    fn commit(&mut self) {
        self.prune(self.retention_days);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.write(StoreKey::DailyStats, &self.days) {
            tracing::warn!("Failed to persist daily stats: {}", e);
        }
    }
}

fn whole_seconds(duration_secs: f64) -> u64 {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        (duration_secs.floor() as u64).min(MAX_CREDITED_SECS)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::time_bucket::FixedClock;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 25).unwrap()
    }

    fn ledger_at(store: &PersistentStore, date: NaiveDate) -> DailyStatsLedger {
        DailyStatsLedger::load(store.clone(), Arc::new(FixedClock::new(date)), 7)
    }

    #[test]
    fn test_increment_video_watch_floors_duration() {
        let store = PersistentStore::in_memory();
        let mut ledger = ledger_at(&store, today());

        ledger.increment_video_watch(120.9);
        ledger.increment_video_watch(f64::NAN);
        ledger.increment_video_watch(-4.0);

        let record = ledger.today();
        assert_eq!(record.videos_watched, 3);
        assert_eq!(record.total_time_watched, 120);
    }

    #[test]
    fn test_counters_are_independent() {
        let store = PersistentStore::in_memory();
        let mut ledger = ledger_at(&store, today());

        ledger.increment_unique_video();
        ledger.increment_case_viewed();
        ledger.increment_case_viewed();

        let record = ledger.today();
        assert_eq!(record.videos_watched, 0);
        assert_eq!(record.unique_videos_watched, 1);
        assert_eq!(record.cases_viewed, 2);
    }

    #[test]
    fn test_prune_keeps_seven_most_recent_days() {
        let store = PersistentStore::in_memory();
        let mut seeded = BTreeMap::new();
        for back in 0..10u64 {
            let date = today().checked_sub_days(chrono::Days::new(back)).unwrap();
            seeded.insert(
                day_key(date),
                DailyRecord {
                    videos_watched: back + 1,
                    ..Default::default()
                },
            );
        }
        store.write(StoreKey::DailyStats, &seeded).unwrap();

        let mut ledger = DailyStatsLedger::load(
            store.clone(),
            Arc::new(FixedClock::new(today())),
            // Load with a wide window so the explicit prune does the work
            30,
        );
        assert_eq!(ledger.records().len(), 10);

        let removed = ledger.prune(7);
        assert_eq!(removed, 3);

        let keys: Vec<&String> = ledger.records().keys().collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(keys.first().unwrap().as_str(), "2024-07-19");
        assert_eq!(keys.last().unwrap().as_str(), "2024-07-25");
    }

    #[test]
    fn test_load_prunes_and_persists() {
        let store = PersistentStore::in_memory();
        let mut seeded = BTreeMap::new();
        seeded.insert("2020-01-01".to_string(), DailyRecord::default());
        seeded.insert("not-a-date".to_string(), DailyRecord::default());
        seeded.insert("2024-07-24".to_string(), DailyRecord::default());
        store.write(StoreKey::DailyStats, &seeded).unwrap();

        let ledger = ledger_at(&store, today());
        assert_eq!(ledger.records().len(), 1);

        let persisted: BTreeMap<String, DailyRecord> =
            store.read(StoreKey::DailyStats, BTreeMap::new());
        assert_eq!(persisted.keys().collect::<Vec<_>>(), vec!["2024-07-24"]);
    }

    #[test]
    fn test_prune_zero_retention_keeps_today() {
        let store = PersistentStore::in_memory();
        let mut ledger = ledger_at(&store, today());
        ledger.increment_case_viewed();

        ledger.prune(0);
        assert_eq!(ledger.today().cases_viewed, 1);
    }

    #[test]
    fn test_mutation_drops_days_that_aged_out() {
        let store = PersistentStore::in_memory();
        let clock = Arc::new(FixedClock::new(today()));
        let mut ledger = DailyStatsLedger::load(store.clone(), clock.clone(), 7);
        ledger.increment_video_watch(60.0);

        clock.set(today().checked_add_days(chrono::Days::new(7)).unwrap());
        ledger.increment_video_watch(30.0);

        assert_eq!(ledger.records().len(), 1);
        assert_eq!(ledger.today().total_time_watched, 30);
    }

    #[test]
    fn test_day_rollover_writes_new_key() {
        let store = PersistentStore::in_memory();
        let clock = Arc::new(FixedClock::new(today()));
        let mut ledger = DailyStatsLedger::load(store.clone(), clock.clone(), 7);
        ledger.increment_video_watch(10.0);

        clock.set(today().succ_opt().unwrap());
        ledger.increment_video_watch(20.0);

        assert_eq!(ledger.record("2024-07-25").unwrap().total_time_watched, 10);
        assert_eq!(ledger.record("2024-07-26").unwrap().total_time_watched, 20);
    }

    #[test]
    fn test_last_7_days_zero_fills_and_orders() {
        let store = PersistentStore::in_memory();
        let clock = Arc::new(FixedClock::new(today()));
        let mut ledger = DailyStatsLedger::load(store.clone(), clock.clone(), 7);

        clock.set(NaiveDate::from_ymd_opt(2024, 7, 22).unwrap());
        ledger.increment_video_watch(90.0);
        clock.set(today());
        ledger.increment_video_watch(45.0);

        let week = ledger.last_7_days();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, "2024-07-19");
        assert_eq!(week[0].day_name, "Fri");
        assert_eq!(week[3].date, "2024-07-22");
        assert_eq!(week[3].record.total_time_watched, 90);
        assert_eq!(week[6].date, "2024-07-25");
        assert_eq!(week[6].record.total_time_watched, 45);
        assert_eq!(week[1].record, DailyRecord::default());
    }

    #[test]
    fn test_last_7_days_does_not_mutate() {
        let store = PersistentStore::in_memory();
        let ledger = ledger_at(&store, today());
        let _ = ledger.last_7_days();
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn test_ledger_roundtrip_through_store() {
        let store = PersistentStore::in_memory();
        let mut ledger = ledger_at(&store, today());
        ledger.increment_video_watch(120.0);
        ledger.increment_unique_video();
        ledger.increment_case_viewed();

        let reloaded = ledger_at(&store, today());
        assert_eq!(reloaded.records(), ledger.records());
    }

    #[test]
    fn test_absurd_duration_is_clamped() {
        let store = PersistentStore::in_memory();
        let clock = Arc::new(FixedClock::new(today()));
        let mut ledger = DailyStatsLedger::load(store, clock, 7);

        ledger.increment_video_watch(1e30);
        ledger.increment_video_watch(1e30);
        assert_eq!(ledger.today().videos_watched, 2);
        assert_eq!(ledger.today().total_time_watched, 2 * MAX_CREDITED_SECS);
    }

    #[test]
    fn test_counters_saturate_instead_of_overflowing() {
        let store = PersistentStore::in_memory();
        let mut seeded = BTreeMap::new();
        seeded.insert(
            day_key(today()),
            DailyRecord {
                videos_watched: u64::MAX,
                total_time_watched: u64::MAX - 1,
                unique_videos_watched: u64::MAX,
                cases_viewed: u64::MAX,
            },
        );
        store.write(StoreKey::DailyStats, &seeded).unwrap();

        let clock = Arc::new(FixedClock::new(today()));
        let mut ledger = DailyStatsLedger::load(store, clock, 7);
        ledger.increment_video_watch(120.0);
        ledger.increment_unique_video();
        ledger.increment_case_viewed();

        let record = ledger.today();
        assert_eq!(record.videos_watched, u64::MAX);
        assert_eq!(record.total_time_watched, u64::MAX);
        assert_eq!(record.unique_videos_watched, u64::MAX);
        assert_eq!(record.cases_viewed, u64::MAX);
    }
}
