//! In-memory key-value store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::persistence::{KeyValueStore, StorageError};

#[derive(Debug, Default)]
struct MemoryStoreState {
    entries: HashMap<String, String>,
    failing: bool,
}

/// Process-local store. Clones share the same entries, which is how tests
/// simulate a restart: drop the storefront, keep a handle, start a new one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryStoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn insert(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    /// Read a raw value.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Make every subsequent get/set fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.lock();
        if state.failing {
            return Err(StorageError::Backend("memory store failing".to_string()));
        }
        Ok(state.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.failing {
            return Err(StorageError::Backend("memory store failing".to_string()));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
