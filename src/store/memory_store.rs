use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStorage;

/// Process-local storage. Nothing is written anywhere.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| "memory store mutex poisoned".to_string())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "memory store mutex poisoned".to_string())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "memory store mutex poisoned".to_string())?;
        entries.remove(key);
        Ok(())
    }

    fn get_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("access_token").unwrap(), None);

        store.set("access_token", "abc").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("abc"));

        store.set("access_token", "def").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("def"));

        store.remove("access_token").unwrap();
        assert_eq!(store.get("access_token").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nope").is_ok());
    }
}
