use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::app::{AppError, Result};
use crate::store::KeyValueStore;

/// Session-scoped store. Contents are gone when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| AppError::Other(format!("Session store poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
