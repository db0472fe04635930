//! Key-value backends for persisted state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde_json::Value;

use crate::PersistError;

/// Where persisted state lives. Calls are synchronous: they run inside
/// a [`StateTap`](campus_core::StateTap).
pub trait StateStorage: Send + Sync + 'static {
    fn load(&self, key: &str) -> Result<Option<Value>, PersistError>;

    fn save(&self, key: &str, value: &Value) -> Result<(), PersistError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// Process-local storage, mostly for tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: DashMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, PersistError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), PersistError> {
        self.entries.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash never leaves a half-written file behind.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `persist:root` is stored as `persist_root.json`.
    pub fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, PersistError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("campus-persist-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_storage_round_trip_and_remove() {
        let dir = scratch_dir();
        let storage = FileStorage::new(&dir);

        assert_eq!(storage.load("persist:root").unwrap(), None);
        storage.save("persist:root", &json!({ "auth": { "token": "t" } })).unwrap();

        assert!(dir.join("persist_root.json").exists());
        assert_eq!(
            storage.load("persist:root").unwrap(),
            Some(json!({ "auth": { "token": "t" } }))
        );

        storage.remove("persist:root").unwrap();
        storage.remove("persist:root").unwrap();
        assert_eq!(storage.load("persist:root").unwrap(), None);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_storage_reports_corrupt_file() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        let storage = FileStorage::new(&dir);
        fs::write(storage.path("persist:root"), b"{ not json").unwrap();

        assert!(matches!(storage.load("persist:root"), Err(PersistError::Serde(_))));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.save("k", &json!(1)).unwrap();
        assert_eq!(storage.load("k").unwrap(), Some(json!(1)));
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }
}
