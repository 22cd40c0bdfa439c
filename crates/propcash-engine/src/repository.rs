//! Typed access to the versioned store.
//!
//! Every store call runs under the configured deadline and is retried while
//! it fails transiently. Rows read back are normalised through the schema
//! registry before being decoded into their record type.

use std::sync::Arc;
use std::time::Duration;

use propcash_core::schema::SchemaRegistry;
use propcash_core::types::{Date, LogicalTable};
use propcash_traits::{
    StoredRow, TableRecord, TableStore, TraitError, VersionFilter, VersionKey, WriteMode,
    WriteSummary,
};
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::lock::RunLock;
use crate::runtime::{with_deadline, RetryConfig};

/// Store handle shared by the pipeline stages.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TableStore>,
    schemas: SchemaRegistry,
    io_timeout: Duration,
    retry: RetryConfig,
    lock: RunLock,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("io_timeout", &self.io_timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Creates a repository over a store.
    #[must_use]
    pub fn new(
        store: Arc<dyn TableStore>,
        schemas: SchemaRegistry,
        io_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        let lock = RunLock::for_store(&store);
        Self {
            store,
            schemas,
            io_timeout,
            retry,
            lock,
        }
    }

    /// Creates a repository with the standard schemas and the configured
    /// deadline and retry policy.
    #[must_use]
    pub fn from_config(store: Arc<dyn TableStore>, config: &EngineConfig) -> Self {
        Self::new(
            store,
            SchemaRegistry::standard(),
            config.io_timeout(),
            config.retry.clone(),
        )
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    /// The run lock of the underlying store.
    #[must_use]
    pub fn run_lock(&self) -> &RunLock {
        &self.lock
    }

    /// Partitions of a table, ascending.
    pub async fn versions(&self, table: LogicalTable) -> EngineResult<Vec<VersionKey>> {
        let limit = self.io_timeout;
        let versions = self
            .retry
            .execute(
                || with_deadline(limit, self.store.versions(table)),
                TraitError::is_transient,
            )
            .await?;
        Ok(versions)
    }

    /// Partitions of a table that are dates, ascending.
    pub async fn version_dates(&self, table: LogicalTable) -> EngineResult<Vec<Date>> {
        Ok(self
            .versions(table)
            .await?
            .iter()
            .filter_map(VersionKey::to_date)
            .collect())
    }

    async fn read_raw(
        &self,
        table: LogicalTable,
        filter: &VersionFilter,
    ) -> EngineResult<Vec<StoredRow>> {
        let limit = self.io_timeout;
        let rows = self
            .retry
            .execute(
                || with_deadline(limit, self.store.read(table, filter)),
                TraitError::is_transient,
            )
            .await?;
        Ok(rows)
    }

    /// Loads and decodes the rows of `T`'s table selected by `filter`.
    ///
    /// # Errors
    ///
    /// Storage failures surface after retries; a row that fails schema
    /// normalisation or decoding fails the load.
    pub async fn load<T: TableRecord>(&self, filter: VersionFilter) -> EngineResult<Vec<T>> {
        let rows = self.read_raw(T::TABLE, &filter).await?;
        let records = rows
            .into_iter()
            .map(|row| self.decode::<T>(row.data))
            .collect::<EngineResult<Vec<T>>>()?;
        debug!(table = %T::TABLE, ?filter, rows = records.len(), "loaded rows");
        Ok(records)
    }

    fn decode<T: TableRecord>(&self, data: Value) -> EngineResult<T> {
        let normalized = self.schemas.normalize(T::TABLE, data)?;
        serde_json::from_value(normalized).map_err(|e| EngineError::Decode {
            table: T::TABLE.name().to_string(),
            reason: e.to_string(),
        })
    }

    /// Writes records to one partition.
    pub async fn write<T: TableRecord>(
        &self,
        version: &VersionKey,
        records: &[T],
        mode: WriteMode,
    ) -> EngineResult<WriteSummary> {
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|e| TraitError::SerializationError(e.to_string()))?;
        let limit = self.io_timeout;
        let summary = self
            .retry
            .execute(
                || with_deadline(limit, self.store.write(T::TABLE, version, rows.clone(), mode)),
                TraitError::is_transient,
            )
            .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propcash_core::types::{ChargeTypeMapping, TenancyCashflow, ValuationMetric};
    use propcash_ext_redb::RedbTableStore;
    use serde_json::json;

    fn repo() -> Repository {
        let store = Arc::new(RedbTableStore::in_memory().unwrap());
        Repository::new(
            store,
            SchemaRegistry::standard(),
            Duration::from_secs(5),
            RetryConfig::no_retry(),
        )
    }

    #[tokio::test]
    async fn test_load_normalises_raw_rows() {
        let repo = repo();
        let raw = json!({
            "PropertyID": " P001 ",
            "PropertyCode": "1,001",
            "PropertyName": "Harbour Plaza ",
            "CashflowType": "RNT",
            "CreditRating": "AA",
            "CashFlowDate": "31/07/2025",
            "EffectiveDate": "2025-06-01",
            "Amount": "12,500.50",
            "ContractedOrSpeculative": "Contractual"
        });
        repo.store()
            .write(
                LogicalTable::TenancyCashflowLedger,
                &VersionKey::new("2025-06-01"),
                vec![raw],
                WriteMode::Append,
            )
            .await
            .unwrap();

        let rows: Vec<TenancyCashflow> = repo.load(VersionFilter::All).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].property.property_id, "P001");
        assert_eq!(rows[0].property.property_code, 1001);
        assert_eq!(rows[0].amount, 12_500.5);
        assert_eq!(rows[0].cash_flow_date, Date::from_ymd(2025, 7, 31).unwrap());
    }

    #[tokio::test]
    async fn test_null_rating_and_region_load_as_none() {
        let repo = repo();
        let tenancy = json!({
            "PropertyID": "P001",
            "PropertyCode": 1001,
            "PropertyName": "Harbour Plaza",
            "CashflowType": "RNT",
            "CreditRating": null,
            "CashFlowDate": "2025-07-31",
            "EffectiveDate": "2025-06-01",
            "Amount": 100.0,
            "ContractedOrSpeculative": "Contractual"
        });
        let metric = json!({
            "Asset": "Harbour Plaza Sydney",
            "Region": null,
            "OwnershipInterest": 0.5,
            "DiscountRate": 0.05,
            "ValuationDate": "2025-03-31"
        });
        repo.store()
            .write(
                LogicalTable::TenancyCashflowLedger,
                &VersionKey::new("2025-06-01"),
                vec![tenancy],
                WriteMode::Append,
            )
            .await
            .unwrap();
        repo.store()
            .write(
                LogicalTable::ValuationMetricsSummary,
                &VersionKey::new("2025-03-31"),
                vec![metric],
                WriteMode::Append,
            )
            .await
            .unwrap();

        let rows: Vec<TenancyCashflow> = repo.load(VersionFilter::All).await.unwrap();
        assert_eq!(rows[0].credit_rating, None);
        let metrics: Vec<ValuationMetric> = repo.load(VersionFilter::All).await.unwrap();
        assert_eq!(metrics[0].region, None);
        assert_eq!(metrics[0].discount_rate, Some(0.05));
    }

    #[tokio::test]
    async fn test_bad_row_fails_load() {
        let repo = repo();
        repo.store()
            .write(
                LogicalTable::ChargeTypeMapping,
                &VersionKey::unversioned(),
                vec![json!({ "TenantCharge": "RNT" })],
                WriteMode::Append,
            )
            .await
            .unwrap();
        let err = repo
            .load::<ChargeTypeMapping>(VersionFilter::All)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Schema(_) | EngineError::Decode { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_write_then_versions() {
        let repo = repo();
        let mapping = ChargeTypeMapping {
            tenant_charge: "RNT".into(),
            property_charge: "BaseRent".into(),
        };
        let summary = repo
            .write(&VersionKey::unversioned(), &[mapping.clone()], WriteMode::Append)
            .await
            .unwrap();
        assert_eq!(summary.written, 1);
        let versions = repo.versions(LogicalTable::ChargeTypeMapping).await.unwrap();
        assert_eq!(versions, vec![VersionKey::unversioned()]);
        assert!(repo
            .version_dates(LogicalTable::ChargeTypeMapping)
            .await
            .unwrap()
            .is_empty());
        let back: Vec<ChargeTypeMapping> = repo.load(VersionFilter::All).await.unwrap();
        assert_eq!(back, vec![mapping]);
    }
}
