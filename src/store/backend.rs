//! Raw string key-value backends

use std::collections::HashMap;
use std::sync::Mutex;

use super::StoreError;

/// Durable (or not) string storage keyed by name
///
/// Implementations must tolerate being called from a single thread in a
/// tight loop; no cross-process coordination is expected of them.
pub trait KvBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Fetch the raw value, `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every stored key, sorted
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-process backend used for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.entries()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
