use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::Store;
use crate::error::StoreError;

/// In-process store. Write failures can be switched on to exercise
/// rollback paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_key: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key`.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes to one key fail. `None` clears it.
    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.fail_key.lock().unwrap_or_else(PoisonError::into_inner) = key.map(str::to_string);
    }

    fn should_fail(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
            || self
                .fail_key
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_deref()
                == Some(key)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.should_fail(key) {
            return Err(StoreError::Unavailable(format!("write to '{key}' rejected")));
        }
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.should_fail(key) {
            return Err(StoreError::Unavailable(format!("remove of '{key}' rejected")));
        }
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("tasks").unwrap(), None);

        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));

        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn targeted_failure_only_hits_one_key() {
        let store = MemoryStore::new();
        store.fail_writes_to(Some("questions"));

        assert!(store.set("tasks", "[]").is_ok());
        assert!(store.set("questions", "[]").is_err());

        store.fail_writes_to(None);
        assert!(store.set("questions", "[]").is_ok());
    }
}
