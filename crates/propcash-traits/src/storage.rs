//! Versioned tabular storage.
//!
//! Every logical table is split into version partitions. A partition is
//! addressed by a [`VersionKey`] (an ISO date for versioned tables, the
//! empty key for reference tables). Writers either replace a partition
//! wholesale or append to it.
//!
//! Storage implementations are EXTENSIONS (e.g. redb).

use std::fmt;

use async_trait::async_trait;
use propcash_core::types::{Date, LogicalTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TraitError;

// =============================================================================
// VERSION KEYS
// =============================================================================

/// Partition key of a stored row.
///
/// Date keys render as `YYYY-MM-DD`, so string order is date order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionKey(String);

impl VersionKey {
    /// Creates a key from raw text.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key used by unversioned reference tables.
    #[must_use]
    pub fn unversioned() -> Self {
        Self(String::new())
    }

    /// Whether this is the unversioned key.
    #[must_use]
    pub fn is_unversioned(&self) -> bool {
        self.0.is_empty()
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as a date, when it is one.
    #[must_use]
    pub fn to_date(&self) -> Option<Date> {
        Date::parse(&self.0).ok()
    }
}

impl From<Date> for VersionKey {
    fn from(date: Date) -> Self {
        Self(date.to_string())
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unversioned() {
            f.write_str("(unversioned)")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Which partitions a read covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionFilter {
    /// Every partition.
    All,
    /// One partition.
    Exact(VersionKey),
    /// Partitions strictly before a key.
    Before(VersionKey),
    /// Partitions on or before a key.
    OnOrBefore(VersionKey),
}

impl VersionFilter {
    /// Whether a partition is selected.
    #[must_use]
    pub fn matches(&self, version: &VersionKey) -> bool {
        match self {
            VersionFilter::All => true,
            VersionFilter::Exact(v) => version == v,
            VersionFilter::Before(v) => version < v,
            VersionFilter::OnOrBefore(v) => version <= v,
        }
    }
}

/// How a write treats an existing partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Drop the partition's rows, then insert.
    Replace,
    /// Keep existing rows and add.
    Append,
}

/// A row read from a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Partition the row lives in.
    pub version: VersionKey,
    /// Row content as a JSON object.
    pub data: Value,
}

/// Counts from a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rows inserted.
    pub written: usize,
    /// Existing rows removed by a replace.
    pub replaced: usize,
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Versioned tabular store.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Distinct partitions of a table, ascending.
    async fn versions(&self, table: LogicalTable) -> Result<Vec<VersionKey>, TraitError>;

    /// Rows from the selected partitions, in partition then insertion order.
    async fn read(
        &self,
        table: LogicalTable,
        filter: &VersionFilter,
    ) -> Result<Vec<StoredRow>, TraitError>;

    /// Writes rows to one partition atomically.
    async fn write(
        &self,
        table: LogicalTable,
        version: &VersionKey,
        rows: Vec<Value>,
        mode: WriteMode,
    ) -> Result<WriteSummary, TraitError>;
}
