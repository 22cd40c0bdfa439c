//! Versioned ledger writer.
//!
//! `upsert` replaces a version partition when it already exists and appends
//! otherwise, so re-running a version supersedes its rows and leaves every
//! other version untouched. The choice is made by the store inside the
//! write itself: a replace of an absent partition is an append.

use std::collections::HashSet;

use propcash_traits::{TableRecord, VersionKey, WriteMode, WriteSummary};
use serde::Serialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::repository::Repository;

/// Result of one upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Mode chosen for the write.
    pub mode: WriteMode,
    /// Store counts.
    pub summary: WriteSummary,
}

/// Idempotent writer over a [`Repository`].
#[derive(Debug, Clone)]
pub struct VersionedWriter {
    repo: Repository,
}

impl VersionedWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Writes `records` as the complete content of partition `version`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::VersionMismatch` if a record belongs to another
    /// partition; storage failures surface after retries.
    pub async fn upsert<T: TableRecord>(
        &self,
        version: &VersionKey,
        records: &[T],
    ) -> EngineResult<UpsertOutcome> {
        if let Some(stray) = records.iter().map(|r| r.version()).find(|v| v != version) {
            return Err(EngineError::VersionMismatch {
                table: T::TABLE.name().to_string(),
                expected: version.to_string(),
                found: stray.to_string(),
            });
        }

        let summary = self
            .repo
            .write(version, records, WriteMode::Replace)
            .await?;
        let mode = if summary.replaced > 0 {
            WriteMode::Replace
        } else {
            WriteMode::Append
        };
        info!(
            table = %T::TABLE,
            %version,
            ?mode,
            written = summary.written,
            replaced = summary.replaced,
            "upserted version"
        );
        Ok(UpsertOutcome { mode, summary })
    }
}

/// Drops rows equal to an earlier row, keeping first occurrences in order.
/// Returns the kept rows and the number removed.
///
/// # Errors
///
/// Fails only if a row cannot be serialized.
pub fn dedup_rows<T: Serialize>(rows: Vec<T>) -> EngineResult<(Vec<T>, usize)> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    let mut removed = 0;
    for row in rows {
        let fingerprint = serde_json::to_string(&row)
            .map_err(|e| propcash_traits::TraitError::SerializationError(e.to_string()))?;
        if seen.insert(fingerprint) {
            kept.push(row);
        } else {
            removed += 1;
        }
    }
    Ok((kept, removed))
}
