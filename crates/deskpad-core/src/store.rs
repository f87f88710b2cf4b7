//! Key-value persistence for tasks, notes and the API credential.
//!
//! Values are stored as strings under fixed keys. Collections are JSON
//! encoded; the credential is stored raw.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::notes::Note;
use crate::tasks::Task;

pub const TASKS_KEY: &str = "todos";
pub const NOTES_KEY: &str = "notes";
pub const CREDENTIAL_KEY: &str = "geminiApiKey";

const STORAGE_FILE_NAME: &str = "storage.json";

/// A flat string-to-string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole file is rewritten on every `set`/`remove`. Writes go to a
/// sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens (or lazily creates) `storage.json` inside `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        Self::open_file(dir.join(STORAGE_FILE_NAME))
    }

    pub fn open_file(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read store file {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("store file {} is not a JSON object", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("event=store_open path={} keys={}", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed access to the three well-known keys.
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        self.load_collection(TASKS_KEY)
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) -> Result<()> {
        self.save_collection(TASKS_KEY, tasks)
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        self.load_collection(NOTES_KEY)
    }

    pub fn save_notes(&mut self, notes: &[Note]) -> Result<()> {
        self.save_collection(NOTES_KEY, notes)
    }

    pub fn load_credential(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .filter(|key| !key.is_empty()))
    }

    pub fn save_credential(&mut self, credential: &str) -> Result<()> {
        self.store.set(CREDENTIAL_KEY, credential)
    }

    /// Decodes a stored array record by record. Records that do not decode
    /// are skipped with a warning; the rest are kept.
    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        // A literal `null` is what an unset slot looks like after a JS round trip.
        let records = match serde_json::from_str::<Option<Vec<Value>>>(&raw) {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                warn!("event=store_decode_failed key={} error={}", key, err);
                return Ok(Vec::new());
            }
        };

        let total = records.len();
        let items: Vec<T> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!("event=store_record_skipped key={} index={} error={}", key, index, err);
                    None
                }
            })
            .collect();

        if items.len() < total {
            warn!("event=store_partial_load key={} kept={} total={}", key, items.len(), total);
        }
        Ok(items)
    }

    fn save_collection<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let encoded = serde_json::to_string(items)?;
        self.store.set(key, &encoded)?;
        debug!("event=store_write key={} count={}", key, items.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_load_empty() {
        let storage = Storage::new(MemoryStore::new());
        assert!(storage.load_tasks().unwrap().is_empty());
        assert!(storage.load_notes().unwrap().is_empty());
        assert_eq!(storage.load_credential().unwrap(), None);
    }

    #[test]
    fn test_corrupt_collection_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(TASKS_KEY, "{not json").unwrap();
        store.set(NOTES_KEY, "null").unwrap();
        let storage = Storage::new(store);
        assert!(storage.load_tasks().unwrap().is_empty());
        assert!(storage.load_notes().unwrap().is_empty());
    }

    #[test]
    fn test_credential_is_stored_raw() {
        let mut storage = Storage::new(MemoryStore::new());
        storage.save_credential("abc123").unwrap();
        assert_eq!(
            storage.inner().get(CREDENTIAL_KEY).unwrap().as_deref(),
            Some("abc123")
        );
        assert_eq!(storage.load_credential().unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bad_records_are_skipped_not_the_whole_list() {
        let mut store = MemoryStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"text":"Keep me","completed":true,"date":"2024-01-05T10:00:00.000Z"},
                    {"text":"legacy","completed":false},
                    {"completed":false},
                    42]"#,
            )
            .unwrap();
        let storage = Storage::new(store);
        let tasks = storage.load_tasks().unwrap();
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Keep me", "legacy"]);
        assert!(tasks[0].completed);
    }

    #[test]
    fn test_legacy_task_records_get_ids() {
        let mut store = MemoryStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"text":"Buy milk","completed":false,"date":"2024-01-05T10:00:00.000Z"}]"#,
            )
            .unwrap();
        let storage = Storage::new(store);
        let tasks = storage.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert!(!tasks[0].id.is_nil());
    }
}
