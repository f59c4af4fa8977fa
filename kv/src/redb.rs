//! Redb-backed persistent key-value store.

use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::{KVError, KVResult, KVStore};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

fn storage(e: impl Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// A [`KVStore`] persisted in a single redb file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Opens or creates a store at `path`. Parent directories must exist.
    pub fn open<P: AsRef<Path>>(path: P) -> KVResult<Self> {
        let db = Database::create(path).map_err(storage)?;

        let tx = db.begin_write().map_err(storage)?;
        tx.open_table(TABLE).map_err(storage)?;
        tx.commit().map_err(storage)?;

        Ok(Self { db })
    }

    fn write<F>(&self, f: F) -> KVResult<()>
    where
        F: FnOnce(&mut redb::Table<'_, &'static str, &'static [u8]>) -> Result<(), redb::StorageError>,
    {
        let tx = self.db.begin_write().map_err(storage)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            f(&mut table).map_err(storage)?;
        }
        tx.commit().map_err(storage)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;
        let value = table.get(key).map_err(storage)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> KVResult<()> {
        self.write(|table| table.insert(key, value).map(|_| ()))
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        self.write(|table| table.remove(key).map(|_| ()))
    }

    fn scan(&self, prefix: &str) -> KVResult<Vec<(String, Vec<u8>)>> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        for item in table.range(prefix..).map_err(storage)? {
            let (key, value) = item.map_err(storage)?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_string(), value.value().to_vec()));
        }
        Ok(results)
    }
}
