//! Shared test utilities for tracker integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use coursetrack::config::TrackingConfig;
use coursetrack::stats::FixedClock;
use coursetrack::{PersistentStore, WatchStateTracker};

/// The date every test pretends is today
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 25).expect("valid date")
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(test_today()))
}

/// Simulates a page load: a fresh tracker over whatever the store holds
pub fn page_load(store: &PersistentStore) -> WatchStateTracker {
    WatchStateTracker::open(store.clone(), fixed_clock(), TrackingConfig::default())
}
