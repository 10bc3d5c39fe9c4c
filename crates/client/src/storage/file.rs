//! File-backed key-value store.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStore;

/// [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// The whole map is rewritten on every mutation, which is fine for the
/// handful of small keys this client stores. A corrupt or missing file loads
/// as an empty store; write failures are logged and swallowed so storage can
/// never fail a caller.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or create) a store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created. An
    /// unreadable or corrupt file is not an error; it loads as empty.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "store file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "store file unreadable, starting empty");
                HashMap::new()
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        let raw = match serde_json::to_string_pretty(entries) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize store file");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            tracing::error!(path = %self.path.display(), error = %err, "failed to write store file");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("k", "v");
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{broken").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("k").is_none());

        // A write repairs the file.
        store.set("k", "v");
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v");
        store.remove("k");

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get("k").is_none());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/state.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v");
        assert!(path.exists());
    }
}
