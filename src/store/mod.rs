//! Persistent key-value store for tracking state
//!
//! Everything the tracker remembers between page loads lives under four keys:
//!
//! ```text
//! <prefix>-watched-videos   ["123", "456"]
//! <prefix>-viewed-cases     ["case-7"]
//! <prefix>-daily-stats      {"2024-07-25": {"videosWatched": 2, ...}}
//! <prefix>-video-stats      {"123": {"watchCount": 1, ...}}
//! ```
//!
//! Reads never fail the caller: a missing key, an unavailable backend or a
//! malformed payload all decode to the supplied default.

mod backend;
mod file;
mod sqlite;

pub use backend::{KvBackend, MemoryBackend};
pub use file::JsonFileBackend;
pub(crate) use file::write_locked;
pub use sqlite::SqliteBackend;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{Config, StorageBackendKind, StorageConfig};

/// Error type for storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// The records the tracker persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    WatchedVideos,
    ViewedCases,
    DailyStats,
    VideoStats,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        Self::WatchedVideos,
        Self::ViewedCases,
        Self::DailyStats,
        Self::VideoStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WatchedVideos => "watched-videos",
            Self::ViewedCases => "viewed-cases",
            Self::DailyStats => "daily-stats",
            Self::VideoStats => "video-stats",
        }
    }
}

/// Typed JSON wrapper over a [`KvBackend`]
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KvBackend>,
    prefix: String,
}

impl fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("backend", &self.backend.name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KvBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// Ephemeral store, nothing survives the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), StorageConfig::DEFAULT_PREFIX)
    }

    /// Open the backend selected in the storage config
    ///
    /// Default locations live under `~/.coursetrack/`.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let backend: Arc<dyn KvBackend> = match config.backend {
            StorageBackendKind::Sqlite => {
                let path = config
                    .path
                    .clone()
                    .unwrap_or_else(|| Config::global_config_dir().join("progress.db"));
                Arc::new(SqliteBackend::open(&path)?)
            }
            StorageBackendKind::Json => {
                let dir = config
                    .path
                    .clone()
                    .unwrap_or_else(|| Config::global_config_dir().join("progress"));
                Arc::new(JsonFileBackend::open(&dir)?)
            }
            StorageBackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        tracing::debug!("Opened {} progress store", backend.name());
        Ok(Self::new(backend, config.key_prefix.clone()))
    }

    fn full_key(&self, key: StoreKey) -> String {
        format!("{}-{}", self.prefix, key.as_str())
    }

    /// Read and decode a value, falling back to `default` on any failure
    pub fn read<T: DeserializeOwned>(&self, key: StoreKey, default: T) -> T {
        let full_key = self.full_key(key);
        let raw = match self.backend.get(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!("Failed to read '{}', using default: {}", full_key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Discarding malformed '{}': {}", full_key, e);
                default
            }
        }
    }

    /// Encode and store a value, replacing whatever was there
    pub fn write<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let full_key = self.full_key(key);
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: full_key.clone(),
            source,
        })?;
        self.backend.put(&full_key, &raw)
    }

    /// Records currently present under this store's prefix
    pub fn stored_keys(&self) -> Result<Vec<StoreKey>, StoreError> {
        let present = self.backend.keys()?;
        Ok(StoreKey::ALL
            .into_iter()
            .filter(|key| present.contains(&self.full_key(*key)))
            .collect())
    }

    /// Remove every tracked record, returning how many existed
    pub fn clear(&self) -> Result<usize, StoreError> {
        let present = self.stored_keys()?;
        for key in &present {
            self.backend.remove(&self.full_key(*key))?;
        }
        Ok(present.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct BrokenBackend;

    impl KvBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn keys(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_read_missing_key_returns_default() {
        let store = PersistentStore::in_memory();
        let ids: Vec<String> = store.read(StoreKey::WatchedVideos, vec!["x".to_string()]);
        assert_eq!(ids, vec!["x".to_string()]);
    }

    #[test]
    fn test_write_then_read() {
        let store = PersistentStore::in_memory();
        let mut map = BTreeMap::new();
        map.insert("123".to_string(), 4u64);
        store.write(StoreKey::VideoStats, &map).unwrap();

        let back: BTreeMap<String, u64> = store.read(StoreKey::VideoStats, BTreeMap::new());
        assert_eq!(back, map);
    }

    #[test]
    fn test_malformed_payload_reads_as_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put("coursetrack-daily-stats", "{not json").unwrap();
        let store = PersistentStore::new(backend, "coursetrack");

        let days: BTreeMap<String, u64> = store.read(StoreKey::DailyStats, BTreeMap::new());
        assert!(days.is_empty());
    }

    #[test]
    fn test_wrong_shape_reads_as_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put("coursetrack-watched-videos", r#"{"a": 1}"#).unwrap();
        let store = PersistentStore::new(backend, "coursetrack");

        let ids: Vec<String> = store.read(StoreKey::WatchedVideos, Vec::new());
        assert!(ids.is_empty());
    }

    #[test]
    fn test_unavailable_backend_never_fails_reads() {
        let store = PersistentStore::new(Arc::new(BrokenBackend), "coursetrack");
        let ids: Vec<String> = store.read(StoreKey::ViewedCases, Vec::new());
        assert!(ids.is_empty());
        assert!(store.write(StoreKey::ViewedCases, &ids).is_err());
        assert!(store.clear().is_err());
    }

    #[test]
    fn test_stored_keys_ignore_other_prefixes() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        backend.put("other-daily-stats", "{}").unwrap();
        let store = PersistentStore::new(backend.clone(), "coursetrack");
        store.write(StoreKey::DailyStats, &BTreeMap::<String, u64>::new()).unwrap();

        assert_eq!(store.stored_keys().unwrap(), vec![StoreKey::DailyStats]);
        assert_eq!(store.clear().unwrap(), 1);
        assert_eq!(backend.keys().unwrap(), vec!["other-daily-stats".to_string()]);
    }

    #[test]
    fn test_prefix_isolates_stores() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        let a = PersistentStore::new(backend.clone(), "a");
        let b = PersistentStore::new(backend, "b");

        a.write(StoreKey::WatchedVideos, &["1"]).unwrap();
        let from_b: Vec<String> = b.read(StoreKey::WatchedVideos, Vec::new());
        assert!(from_b.is_empty());
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let store = PersistentStore::in_memory();
        store.write(StoreKey::WatchedVideos, &["1"]).unwrap();
        store.write(StoreKey::ViewedCases, &["c"]).unwrap();
        assert_eq!(
            store.stored_keys().unwrap(),
            vec![StoreKey::WatchedVideos, StoreKey::ViewedCases]
        );
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.stored_keys().unwrap().is_empty());

        let ids: Vec<String> = store.read(StoreKey::WatchedVideos, Vec::new());
        let cases: Vec<String> = store.read(StoreKey::ViewedCases, Vec::new());
        assert!(ids.is_empty());
        assert!(cases.is_empty());
    }
}
