//! End-to-end run for one as-at date.
//!
//! ```text
//! ledger version ─► consolidate ─► apportion OpEx ─► ContractedCashflowLedger
//!                                                        │
//!      profiles + benchmarks ─► margin ─► ownership ─► AdjustedCashflowLedger
//!                                                        │
//!                          zero curves ─► DV01 ─► DV01ResultSeries
//! ```
//!
//! All reference data is loaded and checked before the first write, so a
//! structural failure leaves the store unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use propcash_core::types::{
    AdjustedCashflow, BenchmarkQuote, CashflowRecord, ChargeTypeMapping, CurveQuote, Date,
    Dv01Result, LogicalTable, PropertyCashflow, PropertyKey, PropertyNameMapping,
    TenancyCashflow, ValuationMetric,
};
use propcash_curves::{BenchmarkRates, CurveSet};
use propcash_ledger::{
    apportion, ledger_version, scale_by_ownership, ChargeMap, Consolidator, DiscountProfiles,
    MarginAdjuster,
};
use propcash_risk::Dv01Engine;
use propcash_traits::{TableStore, VersionFilter, VersionKey, WriteMode};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::repository::Repository;
use crate::writer::{dedup_rows, VersionedWriter};

// =============================================================================
// RUN REPORT
// =============================================================================

/// What a run did, including every row-level anomaly it absorbed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unique run id.
    pub run_id: Uuid,
    /// Run date.
    pub as_at: Date,
    /// Ledger version consolidated.
    pub ledger_version: Date,
    /// Valuation snapshot used for discount rates.
    pub valuation_date: Date,
    /// Detailed curve snapshot, if any.
    pub curve_date: Option<Date>,
    /// Raw tenancy rows read.
    pub tenancy_rows: usize,
    /// Speculative tenancy rows dropped.
    pub speculative_rows: usize,
    /// Tenancy rows dropped for an unmapped charge code.
    pub unmapped_charge_rows: usize,
    /// The unmapped charge codes.
    pub unmapped_charge_codes: Vec<String>,
    /// Rows in the contracted ledger.
    pub contracted_rows: usize,
    /// Synthetic operating-expense rows injected.
    pub apportioned_rows: usize,
    /// Injected rows whose factors were missing (amount 0).
    pub incomplete_apportionments: usize,
    /// Whether apportionment was skipped because OpEx rows already existed.
    pub apportionment_skipped: bool,
    /// `DmAdj` rows emitted.
    pub dm_adj_rows: usize,
    /// Whether `DmAdj` emission was skipped by the guard.
    pub dm_adj_skipped: bool,
    /// Rows dropped for falling before the as-at date.
    pub past_rows_dropped: usize,
    /// Properties with no discount profile.
    pub unmapped_properties: Vec<PropertyKey>,
    /// Adjusted rows with zero ownership.
    pub zero_ownership_rows: usize,
    /// Duplicate adjusted rows removed before writing.
    pub duplicate_rows_removed: usize,
    /// Rows in the adjusted ledger.
    pub adjusted_rows: usize,
    /// Rows excluded from DV01 for lack of a curve rate.
    pub missing_rate_rows: usize,
    /// How the contracted ledger partition was written.
    pub contracted_write: WriteMode,
    /// How the adjusted ledger partition was written.
    pub adjusted_write: WriteMode,
    /// How the DV01 partition was written.
    pub dv01_write: WriteMode,
    /// Per-property sensitivity.
    pub dv01: Vec<Dv01Result>,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// Finish time.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Sum of all property sensitivities.
    #[must_use]
    pub fn total_dv01(&self) -> f64 {
        self.dv01.iter().map(|r| r.sensitivity).sum()
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// The consolidation, adjustment and DV01 pipeline over one store.
#[derive(Debug, Clone)]
pub struct Pipeline {
    repo: Repository,
    writer: VersionedWriter,
    config: EngineConfig,
}

impl Pipeline {
    /// Creates a pipeline over an injected store.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if `config` fails validation.
    pub fn new(store: Arc<dyn TableStore>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let repo = Repository::from_config(store, &config);
        Ok(Self::with_repository(repo, config))
    }

    /// Creates a pipeline over an existing repository.
    #[must_use]
    pub fn with_repository(repo: Repository, config: EngineConfig) -> Self {
        Self {
            writer: VersionedWriter::new(repo.clone()),
            repo,
            config,
        }
    }

    /// The repository used by the pipeline.
    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs every stage for `as_at` (strictly `YYYY-MM-DD`) and persists the
    /// contracted, adjusted and DV01 outputs.
    ///
    /// # Errors
    ///
    /// - `MalformedAsAtDate` if `as_at` is not a strict ISO date
    /// - `MissingLedgerVersion` if no ledger version precedes `as_at`
    /// - `MissingReferenceData` if the charge mapping is empty or no
    ///   valuation snapshot precedes `as_at`
    /// - `Storage`, `Schema` or `Decode` for store and row failures
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run(&self, as_at: &str) -> EngineResult<RunReport> {
        let started_at = Utc::now();
        let as_at = Date::parse(as_at).map_err(|e| EngineError::malformed_as_at(as_at, e))?;
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let _guard = self.repo.run_lock().acquire(as_at).await;
        info!(%as_at, "starting run");

        // ---- reference data --------------------------------------------------
        let ledger = ledger_version(
            self.repo
                .version_dates(LogicalTable::TenancyCashflowLedger)
                .await?,
            as_at,
        )?;

        let mappings: Vec<ChargeTypeMapping> = self.repo.load(VersionFilter::All).await?;
        let charges = ChargeMap::from_rows(&mappings)?;

        let metrics: Vec<ValuationMetric> = self
            .repo
            .load(VersionFilter::Before(VersionKey::from(as_at)))
            .await?;
        let names: Vec<PropertyNameMapping> = self.repo.load(VersionFilter::All).await?;
        let profiles = DiscountProfiles::build(&metrics, &names, as_at)?;
        let valuation_date = profiles.valuation_date();

        let quotes: Vec<BenchmarkQuote> = self
            .repo
            .load(VersionFilter::Before(VersionKey::from(valuation_date)))
            .await?;
        let curve_quotes: Vec<CurveQuote> = self
            .repo
            .load(VersionFilter::OnOrBefore(VersionKey::from(as_at)))
            .await?;

        let ledger_key = VersionKey::from(ledger);
        let tenancy: Vec<TenancyCashflow> =
            self.repo.load(VersionFilter::Exact(ledger_key.clone())).await?;
        let property: Vec<PropertyCashflow> =
            self.repo.load(VersionFilter::Exact(ledger_key.clone())).await?;
        info!(%ledger, %valuation_date, tenancy = tenancy.len(), "loaded inputs");

        // ---- contracted ledger -----------------------------------------------
        let consolidation = Consolidator::new(charges).consolidate(&tenancy, &property);
        let summary = consolidation.summary;
        let apportionment = apportion(consolidation.records, &consolidation.totals);
        let contracted_write = self.writer.upsert(&ledger_key, &apportionment.records).await?;

        let contracted: Vec<CashflowRecord> =
            self.repo.load(VersionFilter::Exact(ledger_key)).await?;

        // ---- adjusted ledger -------------------------------------------------
        let benchmarks =
            BenchmarkRates::select(&quotes, valuation_date, &self.config.benchmark_identifiers);
        if benchmarks.is_empty() {
            warn!(%valuation_date, "no benchmark rates, discount margins default to 0");
        }
        let margin = MarginAdjuster::new(
            profiles,
            benchmarks,
            self.config.region_aliases.clone(),
            self.config.year_basis,
            as_at,
        )
        .apply(contracted);
        let ownership = scale_by_ownership(margin.rows);
        let (adjusted, duplicate_rows_removed): (Vec<AdjustedCashflow>, usize) =
            dedup_rows(ownership.rows)?;
        let adjusted_write = self
            .writer
            .upsert(&VersionKey::from(as_at), &adjusted)
            .await?;

        // ---- DV01 ------------------------------------------------------------
        let curves =
            CurveSet::from_quotes(&curve_quotes, as_at, self.config.region_aliases.clone());
        let dv01 = Dv01Engine::new(self.config.dv01_shock_bps).compute(&adjusted, &curves, as_at);
        let dv01_write = self
            .writer
            .upsert(&VersionKey::from(as_at), &dv01.results)
            .await?;

        let report = RunReport {
            run_id,
            as_at,
            ledger_version: ledger,
            valuation_date,
            curve_date: curves.as_of(),
            tenancy_rows: summary.tenancy_rows,
            speculative_rows: summary.speculative_rows,
            unmapped_charge_rows: summary.unmapped_rows,
            unmapped_charge_codes: summary.unmapped_codes.into_iter().collect(),
            contracted_rows: apportionment.records.len(),
            apportioned_rows: apportionment.diagnostics.len(),
            incomplete_apportionments: apportionment.incomplete(),
            apportionment_skipped: apportionment.skipped,
            dm_adj_rows: margin.emitted,
            dm_adj_skipped: margin.guard_skipped,
            past_rows_dropped: margin.dropped_past,
            unmapped_properties: margin.unmapped.into_iter().collect(),
            zero_ownership_rows: ownership.zero_ownership_rows,
            duplicate_rows_removed,
            adjusted_rows: adjusted.len(),
            missing_rate_rows: dv01.missing_rate_rows,
            contracted_write: contracted_write.mode,
            adjusted_write: adjusted_write.mode,
            dv01_write: dv01_write.mode,
            dv01: dv01.results,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            properties = report.dv01.len(),
            total_dv01 = report.total_dv01(),
            adjusted_rows = report.adjusted_rows,
            "run complete"
        );
        Ok(report)
    }

    /// DV01 results persisted for `as_at`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedAsAtDate` for a bad date, or storage failures.
    pub async fn dv01_for(&self, as_at: &str) -> EngineResult<Vec<Dv01Result>> {
        let as_at = Date::parse(as_at).map_err(|e| EngineError::malformed_as_at(as_at, e))?;
        self.repo
            .load(VersionFilter::Exact(VersionKey::from(as_at)))
            .await
    }

    /// Stored versions of a table.
    ///
    /// # Errors
    ///
    /// Storage failures after retries.
    pub async fn versions(&self, table: LogicalTable) -> EngineResult<Vec<VersionKey>> {
        self.repo.versions(table).await
    }
}
