//! Saved deals and profiles
//!
//! The engine never persists anything. Callers that want to keep named
//! deals or input profiles inject a `RecordStore`: an in-process
//! `MemoryStore`, or a `JsonFileStore` keeping one JSON document per record
//! kind under a data directory.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{DealProfile, DealSnapshot};

/// Anything a `RecordStore` can keep
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection name, also the JSON file stem
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Record for DealSnapshot {
    const KIND: &'static str = "deals";

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for DealProfile {
    const KIND: &'static str = "profiles";

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Key-value storage of records by id
pub trait RecordStore<T: Record>: Send + Sync {
    /// Insert, or replace the record with the same id
    fn save(&self, record: T) -> Result<(), StoreError>;

    fn load(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// All records, newest first
    fn list(&self) -> Result<Vec<T>, StoreError>;

    /// Returns whether a record was removed
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Most recent record with exactly this name
    fn find_by_name(&self, name: &str) -> Result<Option<T>, StoreError> {
        Ok(self.list()?.into_iter().find(|r| r.name() == name))
    }
}

fn newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// Records kept in process memory
pub struct MemoryStore<T: Record> {
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    fn save(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.insert(record.id(), record);
        Ok(())
    }

    fn load(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<T> = records.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(records.remove(&id).is_some())
    }
}

/// Records kept as a pretty-printed JSON array in `<data_dir>/<KIND>.json`.
///
/// The whole document is rewritten on every mutation. A missing file reads
/// as an empty store, and the data directory is only created by the first
/// write.
pub struct JsonFileStore<T: Record> {
    path: PathBuf,
    lock: RwLock<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileStore<T> {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(format!("{}.json", T::KIND));
        debug!(path = %path.display(), "json store opened");
        Self {
            path,
            lock: RwLock::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn write_all(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    fn save(&self, record: T) -> Result<(), StoreError> {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_all()?;
        let id = record.id();
        match records.iter_mut().find(|r| r.id() == id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_all(&records)?;
        info!(kind = T::KIND, %id, total = records.len(), "record saved");
        Ok(())
    }

    fn load(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_all()?.into_iter().find(|r| r.id() == id))
    }

    fn list(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_all()?;
        newest_first(&mut records);
        Ok(records)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        info!(kind = T::KIND, %id, "record deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DealInputs, SharingModel};
    use chrono::Duration;

    fn temp_data_dir(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "jusur_persistence_{}_{}",
            test_name,
            Uuid::new_v4()
        ))
    }

    fn snapshot(name: &str, age_minutes: i64) -> DealSnapshot {
        let inputs = DealInputs {
            buy_price: 1_000_000.0,
            sell_price: 1_300_000.0,
            ..Default::default()
        };
        let mut s = DealSnapshot::new(name, SharingModel::Progressive, inputs);
        s.created_at -= Duration::minutes(age_minutes);
        s
    }

    fn exercise_store(store: &dyn RecordStore<DealSnapshot>) {
        let older = snapshot("older", 10);
        let newer = snapshot("newer", 1);
        store.save(older.clone()).unwrap();
        store.save(newer.clone()).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);

        assert_eq!(store.load(older.id).unwrap(), Some(older.clone()));
        assert_eq!(store.find_by_name("newer").unwrap().map(|s| s.id), Some(newer.id));
        assert!(store.find_by_name("missing").unwrap().is_none());

        let mut renamed = older.clone();
        renamed.name = "renamed".to_string();
        store.save(renamed).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.load(older.id).unwrap().unwrap().name, "renamed");

        assert!(store.delete(older.id).unwrap());
        assert!(!store.delete(older.id).unwrap());
        assert_eq!(store.load(older.id).unwrap(), None);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn memory_store_behaves_like_a_store() {
        exercise_store(&MemoryStore::<DealSnapshot>::new());
    }

    #[test]
    fn json_store_behaves_like_a_store() {
        let data_dir = temp_data_dir("contract");
        let store = JsonFileStore::<DealSnapshot>::new(&data_dir);
        exercise_store(&store);
        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn json_store_survives_reopen() {
        let data_dir = temp_data_dir("reopen");
        let saved = snapshot("villa", 0);
        {
            let store = JsonFileStore::<DealSnapshot>::new(&data_dir);
            store.save(saved.clone()).unwrap();
        }

        let store = JsonFileStore::<DealSnapshot>::new(&data_dir);
        assert_eq!(store.path(), data_dir.join("deals.json"));
        let loaded = store.load(saved.id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.results, crate::engine::derive(saved.model, &saved.inputs));

        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn json_store_missing_or_empty_file_is_empty() {
        let data_dir = temp_data_dir("empty");
        let store = JsonFileStore::<DealProfile>::new(&data_dir);
        assert!(store.list().unwrap().is_empty());

        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("profiles.json"), "").unwrap();
        assert!(store.list().unwrap().is_empty());

        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn data_dir_is_created_on_first_write() {
        let data_dir = temp_data_dir("lazy");
        let store = JsonFileStore::<DealSnapshot>::new(&data_dir);
        assert!(!data_dir.exists());

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.load(Uuid::new_v4()).unwrap(), None);
        assert!(!store.delete(Uuid::new_v4()).unwrap());
        assert!(!data_dir.exists());

        store.save(snapshot("first", 0)).unwrap();
        assert!(store.path().exists());

        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn json_store_reports_corrupt_documents() {
        let data_dir = temp_data_dir("corrupt");
        let store = JsonFileStore::<DealProfile>::new(&data_dir);
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("profiles.json"), "{ not json").unwrap();
        assert!(matches!(store.list(), Err(StoreError::Json(_))));

        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn profiles_and_deals_use_separate_documents() {
        let data_dir = temp_data_dir("kinds");
        let deals = JsonFileStore::<DealSnapshot>::new(&data_dir);
        let profiles = JsonFileStore::<DealProfile>::new(&data_dir);

        deals.save(snapshot("deal", 0)).unwrap();
        profiles
            .save(DealProfile::new(
                "preset",
                SharingModel::Flat,
                DealInputs::default(),
            ))
            .unwrap();

        assert_eq!(deals.list().unwrap().len(), 1);
        assert_eq!(profiles.list().unwrap()[0].name, "preset");
        assert!(data_dir.join("profiles.json").exists());

        let _ = fs::remove_dir_all(&data_dir);
    }
}
