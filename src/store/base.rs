use std::sync::Arc;

use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::StorageConfig;

/// Durable string key/value storage backing the session.
///
/// Writes are plain overwrites, so callers may repeat them freely.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
    fn get_name(&self) -> &str;
}

/// Creates a concrete storage backend based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn KeyValueStorage>, String> {
    match config {
        StorageConfig::Memory => {
            info!("Session storage is in-memory; credentials will not survive a restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageConfig::File(file_config) => {
            let store = FileStore::open(&file_config.path)?;
            info!("Session storage backed by file '{}'.", file_config.path);
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileStorageConfig;

    #[test]
    fn test_create_memory_storage() {
        let storage = create_storage(&StorageConfig::Memory).expect("memory storage");
        assert_eq!(storage.get_name(), "memory");
    }

    #[test]
    fn test_create_file_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let storage = create_storage(&StorageConfig::File(FileStorageConfig {
            path: path.to_string_lossy().into_owned(),
        }))
        .expect("file storage");

        storage.set("k", "v").expect("set");
        assert_eq!(storage.get_name(), "file");
        assert!(path.exists());
    }
}
