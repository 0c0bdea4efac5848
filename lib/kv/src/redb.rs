use std::fmt::Display;
use std::path::Path;

use redb::{Database, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("fieldops");

fn storage(e: impl Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// KVStore backed by redb — a pure-Rust embedded key-value database.
/// One database file per server context; session cookies and form
/// drafts live here.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a database file at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage)?;

        // Create the table up front so first reads find it.
        let txn = db.begin_write().map_err(storage)?;
        txn.open_table(TABLE).map_err(storage)?;
        txn.commit().map_err(storage)?;

        Ok(Self { db })
    }

    fn with_table<R>(
        &self,
        op: impl FnOnce(&mut redb::Table<&str, &[u8]>) -> Result<R, KVError>,
    ) -> Result<R, KVError> {
        let txn = self.db.begin_write().map_err(storage)?;
        let result = {
            let mut table = txn.open_table(TABLE).map_err(storage)?;
            op(&mut table)?
        };
        txn.commit().map_err(storage)?;
        Ok(result)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(TABLE).map_err(storage)?;
        let value = table.get(key).map_err(storage)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.with_table(|table| {
            table.insert(key, value).map_err(storage)?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.with_table(|table| {
            table.remove(key).map_err(storage)?;
            Ok(())
        })
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        for entry in table.range(prefix..).map_err(storage)? {
            let (key, value) = entry.map_err(storage)?;
            let key = key.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, value.value().to_vec()));
        }
        Ok(results)
    }
}
