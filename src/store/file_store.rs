use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::KeyValueStorage;

/// Storage kept as one flat JSON object on disk.
///
/// The whole document is cached in memory and rewritten on every change,
/// going through a sibling temp file so a crash never leaves half a document.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens (or lazily creates) the document at `path`. A document that does
    /// not parse is moved aside rather than failing the open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        quarantine(&path, &e.to_string());
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!(
            "Opened file store '{}' with {} entries",
            path.display(),
            entries.len()
        );

        Ok(FileStore {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    format!("Failed to create directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| format!("Failed to serialize session document: {}", e))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized)
            .map_err(|e| format!("Failed to write '{}': {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| format!("Failed to replace '{}': {}", self.path.display(), e))
    }
}

/// Renames an unreadable document to `*.corrupt`; the session starts empty.
fn quarantine(path: &Path, reason: &str) {
    let aside = path.with_extension("corrupt");
    match fs::rename(path, &aside) {
        Ok(()) => warn!(
            "Session document '{}' is not valid ({}), moved to '{}' and starting empty",
            path.display(),
            reason,
            aside.display()
        ),
        Err(e) => warn!(
            "Session document '{}' is not valid ({}) and could not be moved aside: {}",
            path.display(),
            reason,
            e
        ),
    }
}

impl KeyValueStorage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| "file store mutex poisoned".to_string())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "file store mutex poisoned".to_string())?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "file store mutex poisoned".to_string())?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }

    fn get_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).expect("open");
        store.set("access_token", "abc").unwrap();
        store.set("refresh_token", "xyz").unwrap();
        store.remove("refresh_token").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("refresh_token").unwrap(), None);
    }

    #[test]
    fn test_empty_file_reads_as_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).expect("open");
        assert_eq!(store.get("user").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_is_moved_aside() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path).expect("corrupt file still opens");
        assert_eq!(store.get("access_token").unwrap(), None);
        assert_eq!(
            fs::read_to_string(path.with_extension("corrupt")).unwrap(),
            "{not json"
        );

        store.set("access_token", "abc").unwrap();
        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_non_string_values_are_treated_as_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"access_token": 42}"#).unwrap();

        let store = FileStore::open(&path).expect("open");
        assert_eq!(store.get("access_token").unwrap(), None);
    }
}
