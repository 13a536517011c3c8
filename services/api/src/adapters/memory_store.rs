//! services/api/src/adapters/memory_store.rs
//!
//! In-process implementations of the `KeyValueStore` port.

use reading_list_core::ports::{KeyValueStore, PortError, PortResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| PortError::Unexpected(format!("store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Stands in for an environment that has no storage at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> PortResult<Option<String>> {
        Err(PortError::StorageUnavailable("no storage in this environment".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
        Err(PortError::StorageUnavailable("no storage in this environment".to_string()))
    }

    fn remove(&self, _key: &str) -> PortResult<()> {
        Err(PortError::StorageUnavailable("no storage in this environment".to_string()))
    }

    fn clear(&self) -> PortResult<()> {
        Err(PortError::StorageUnavailable("no storage in this environment".to_string()))
    }
}
