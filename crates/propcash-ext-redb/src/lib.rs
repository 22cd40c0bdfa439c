//! # Propcash Ext Redb
//!
//! Embedded storage for the Propcash pipeline using redb.
//!
//! Each logical table maps to one redb table keyed by
//! `(version key, sequence)` with the row stored as JSON. Sequence numbers
//! keep insertion order inside a partition. A replace deletes the partition
//! and inserts the new rows in the same write transaction, so readers see
//! either the old partition or the new one.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;
use tracing::debug;

use propcash_core::types::LogicalTable;
use propcash_traits::error::TraitError;
use propcash_traits::storage::{
    StoredRow, TableStore, VersionFilter, VersionKey, WriteMode, WriteSummary,
};

type RowTable = TableDefinition<'static, (&'static str, u64), &'static [u8]>;

fn definition(table: LogicalTable) -> RowTable {
    TableDefinition::new(table.name())
}

fn db_err(e: impl std::fmt::Display) -> TraitError {
    TraitError::DatabaseError(e.to_string())
}

/// Redb-backed [`TableStore`].
#[derive(Clone)]
pub struct RedbTableStore {
    db: Arc<Database>,
}

impl RedbTableStore {
    /// Wraps an open database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Opens (or creates) a database file.
    ///
    /// redb holds an exclusive lock on the file, so a second process
    /// opening the same path gets `TraitError::Busy`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let db = Database::create(path).map_err(|e| match e {
            redb::DatabaseError::DatabaseAlreadyOpen => {
                TraitError::Busy("database already open".to_string())
            }
            redb::DatabaseError::Storage(redb::StorageError::Io(io)) => io.into(),
            other => db_err(other),
        })?;
        Ok(Self::new(Arc::new(db)))
    }

    /// Creates a database held entirely in memory.
    pub fn in_memory() -> Result<Self, TraitError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(db_err)?;
        Ok(Self::new(Arc::new(db)))
    }
}

#[async_trait]
impl TableStore for RedbTableStore {
    async fn versions(&self, table: LogicalTable) -> Result<Vec<VersionKey>, TraitError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;

        let table = match read_txn.open_table(definition(table)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(vec![]),
            Err(e) => return Err(db_err(e)),
        };

        let mut versions = BTreeSet::new();
        for result in table.iter().map_err(db_err)? {
            let (key, _) = result.map_err(db_err)?;
            let (version, _) = key.value();
            if !versions.contains(version) {
                versions.insert(version.to_string());
            }
        }
        Ok(versions.into_iter().map(VersionKey::new).collect())
    }

    async fn read(
        &self,
        table: LogicalTable,
        filter: &VersionFilter,
    ) -> Result<Vec<StoredRow>, TraitError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;

        let handle = match read_txn.open_table(definition(table)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(vec![]),
            Err(e) => return Err(db_err(e)),
        };

        let mut rows = Vec::new();
        for result in handle.iter().map_err(db_err)? {
            let (key, value) = result.map_err(db_err)?;
            let (version, _) = key.value();
            let version = VersionKey::new(version);
            if !filter.matches(&version) {
                continue;
            }
            let data: Value = serde_json::from_slice(value.value())
                .map_err(|e| TraitError::ParseError(e.to_string()))?;
            rows.push(StoredRow { version, data });
        }
        debug!(table = %table, rows = rows.len(), "read rows");
        Ok(rows)
    }

    async fn write(
        &self,
        table: LogicalTable,
        version: &VersionKey,
        rows: Vec<Value>,
        mode: WriteMode,
    ) -> Result<WriteSummary, TraitError> {
        let payloads = rows
            .iter()
            .map(|row| {
                serde_json::to_vec(row).map_err(|e| TraitError::SerializationError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let key = version.as_str();
        let write_txn = self.db.begin_write().map_err(db_err)?;
        let summary = {
            let mut handle = write_txn.open_table(definition(table)).map_err(db_err)?;

            let existing: Vec<u64> = handle
                .range((key, 0u64)..=(key, u64::MAX))
                .map_err(db_err)?
                .map(|r| r.map(|(k, _)| k.value().1))
                .collect::<Result<_, _>>()
                .map_err(db_err)?;

            let (replaced, mut next) = match mode {
                WriteMode::Replace => {
                    for seq in &existing {
                        handle.remove((key, *seq)).map_err(db_err)?;
                    }
                    (existing.len(), 0)
                }
                WriteMode::Append => (0, existing.last().map_or(0, |s| s + 1)),
            };

            for payload in &payloads {
                handle
                    .insert((key, next), payload.as_slice())
                    .map_err(db_err)?;
                next += 1;
            }

            WriteSummary {
                written: payloads.len(),
                replaced,
            }
        };
        write_txn.commit().map_err(db_err)?;

        debug!(
            table = %table,
            version = %version,
            written = summary.written,
            replaced = summary.replaced,
            ?mode,
            "wrote partition"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(s: &str) -> VersionKey {
        VersionKey::new(s)
    }

    #[tokio::test]
    async fn test_empty_table_reads_empty() {
        let store = RedbTableStore::in_memory().unwrap();
        assert!(store
            .versions(LogicalTable::Dv01ResultSeries)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .read(LogicalTable::Dv01ResultSeries, &VersionFilter::All)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_replace_only_touches_its_partition() {
        let store = RedbTableStore::in_memory().unwrap();
        let table = LogicalTable::AdjustedCashflowLedger;
        store
            .write(table, &v("2025-03-31"), vec![json!({"a": 1})], WriteMode::Append)
            .await
            .unwrap();
        store
            .write(
                table,
                &v("2025-06-30"),
                vec![json!({"a": 2}), json!({"a": 3})],
                WriteMode::Append,
            )
            .await
            .unwrap();
        let summary = store
            .write(table, &v("2025-06-30"), vec![json!({"a": 4})], WriteMode::Replace)
            .await
            .unwrap();
        assert_eq!(summary, WriteSummary { written: 1, replaced: 2 });

        let rows = store.read(table, &VersionFilter::All).await.unwrap();
        let values: Vec<_> = rows.iter().map(|r| r.data["a"].clone()).collect();
        assert_eq!(values, vec![json!(1), json!(4)]);
        assert_eq!(
            store.versions(table).await.unwrap(),
            vec![v("2025-03-31"), v("2025-06-30")]
        );
    }

    #[tokio::test]
    async fn test_append_keeps_order() {
        let store = RedbTableStore::in_memory().unwrap();
        let table = LogicalTable::RiskFreeCurve;
        for i in 0..3 {
            store
                .write(table, &v("2025-01-01"), vec![json!({"i": i})], WriteMode::Append)
                .await
                .unwrap();
        }
        let rows = store
            .read(table, &VersionFilter::Exact(v("2025-01-01")))
            .await
            .unwrap();
        let values: Vec<_> = rows.iter().map(|r| r.data["i"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_unversioned_partition() {
        let store = RedbTableStore::in_memory().unwrap();
        let table = LogicalTable::ChargeTypeMapping;
        store
            .write(
                table,
                &VersionKey::unversioned(),
                vec![json!({"TenantCharge": "RNT", "PropertyCharge": "BaseRent"})],
                WriteMode::Replace,
            )
            .await
            .unwrap();
        let rows = store.read(table, &VersionFilter::All).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].version.is_unversioned());
    }

    #[tokio::test]
    async fn test_file_backed_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("propcash.redb");
        {
            let store = RedbTableStore::open(&path).unwrap();
            store
                .write(
                    LogicalTable::Dv01ResultSeries,
                    &v("2025-06-30"),
                    vec![json!({"Sensitivity": 1.5})],
                    WriteMode::Replace,
                )
                .await
                .unwrap();
        }
        let store = RedbTableStore::open(&path).unwrap();
        let rows = store
            .read(LogicalTable::Dv01ResultSeries, &VersionFilter::All)
            .await
            .unwrap();
        assert_eq!(rows[0].data["Sensitivity"], json!(1.5));
    }
}
