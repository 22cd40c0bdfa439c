//! Row types for every logical table.
//!
//! Field names serialize in the PascalCase form used by the stored tables
//! (`PropertyID`, `CashFlowDate`, `CLCAmount`, ...).

use serde::{Deserialize, Serialize};

use super::{ChargeType, CreditRating, Date, PropertyKey};

// =============================================================================
// RAW LEDGERS
// =============================================================================

/// Tenancy-level cashflow row from the raw ledger extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenancyCashflow {
    /// Owning property.
    #[serde(flatten)]
    pub property: PropertyKey,
    /// Tenant charge code (mapped to a property charge type).
    pub cashflow_type: String,
    /// Raw tenant credit rating; unset ratings are null.
    pub credit_rating: Option<String>,
    /// Date the cashflow falls due.
    pub cash_flow_date: Date,
    /// Ledger version.
    pub effective_date: Date,
    /// Cashflow amount.
    pub amount: f64,
    /// `Contractual` or `Speculative`.
    pub contracted_or_speculative: String,
}

impl TenancyCashflow {
    /// Whether the row is contracted (as opposed to speculative) income.
    #[must_use]
    pub fn is_contractual(&self) -> bool {
        self.contracted_or_speculative.trim() == "Contractual"
    }
}

/// Property-level cashflow row; holds property-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyCashflow {
    /// Owning property.
    #[serde(flatten)]
    pub property: PropertyKey,
    /// Property charge type name.
    pub cashflow_type: String,
    /// Date the cashflow falls due.
    pub cash_flow_effective_date: Date,
    /// Ledger version.
    pub effective_date: Date,
    /// Cashflow amount.
    pub amount: f64,
    /// `Contracted` or `Total` flag text.
    pub contracted_or_total: String,
}

impl PropertyCashflow {
    /// Whether the row belongs to the property-wide totals.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.contracted_or_total.contains("Total")
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Maps a tenant charge code to a property charge type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChargeTypeMapping {
    /// Tenant-level charge code.
    pub tenant_charge: String,
    /// Property-level charge type.
    pub property_charge: String,
}

/// Links the valuation-metrics asset name to the ledger property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyNameMapping {
    /// Property name in the cashflow ledger.
    pub mri_property_name: String,
    /// Property code in the cashflow ledger.
    pub mri_property_code: i64,
    /// Asset name in the valuation metrics summary.
    pub metrics_property_name: String,
}

/// One asset's row in a valuation metrics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValuationMetric {
    /// Asset name as used by the valuers.
    pub asset: String,
    /// Region code (e.g. `AUS`, `JAP`).
    pub region: Option<String>,
    /// Consolidated ownership interest (0..=1).
    pub ownership_interest: Option<f64>,
    /// Valuation discount rate.
    pub discount_rate: Option<f64>,
    /// Snapshot date.
    pub valuation_date: Date,
}

/// Coarse risk-free benchmark observation (one identifier, one date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BenchmarkQuote {
    /// Observation date.
    pub date: Date,
    /// Benchmark instrument identifier.
    pub identifier: String,
    /// Observed yield.
    #[serde(rename = "Yield")]
    pub rate: f64,
}

/// Detailed curve observation used for term-structure construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurveQuote {
    /// Observation date.
    pub date: Date,
    /// Instrument mnemonic carrying the tenor (e.g. `AUDSwap10Y`).
    pub mnemonic: String,
    /// Opening rate.
    pub open: f64,
    /// Last rate.
    pub last: f64,
    /// Curve currency.
    pub base_ccy: String,
}

impl CurveQuote {
    /// Mid of open and last.
    #[must_use]
    pub fn mid(&self) -> f64 {
        0.5 * (self.open + self.last)
    }
}

// =============================================================================
// DERIVED LEDGERS
// =============================================================================

/// Grouping key of a canonical ledger row.
pub type LedgerKey = (PropertyKey, ChargeType, CreditRating, Date, Date);

/// Canonical contracted ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CashflowRecord {
    /// Owning property.
    #[serde(flatten)]
    pub property: PropertyKey,
    /// Canonical charge type.
    pub charge_type: ChargeType,
    /// Normalised tenant credit rating.
    pub credit_rating: CreditRating,
    /// Date the cashflow falls due.
    pub cash_flow_date: Date,
    /// Ledger version.
    pub effective_date: Date,
    /// Summed amount.
    pub amount: f64,
}

impl CashflowRecord {
    /// The uniqueness key of the row.
    #[must_use]
    pub fn key(&self) -> LedgerKey {
        (
            self.property.clone(),
            self.charge_type,
            self.credit_rating.clone(),
            self.cash_flow_date,
            self.effective_date,
        )
    }
}

/// Margin-adjusted, ownership-scaled ledger row for one as-at run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdjustedCashflow {
    /// The underlying ledger row (amount is the `DmAdj` amount on adjustment rows).
    #[serde(flatten)]
    pub record: CashflowRecord,
    /// Valuation region, when the property is mapped.
    pub region: Option<String>,
    /// Valuation discount rate, when available.
    pub discount_rate: Option<f64>,
    /// Regional risk-free benchmark rate, when available.
    pub risk_free_rate: Option<f64>,
    /// Discount rate less risk-free rate (0 when either is missing).
    pub discount_margin: f64,
    /// Ownership interest applied (0 when unmapped).
    pub ownership_interest: f64,
    /// Years from as-at date to cashflow date, floored at 0.
    pub time_diff: f64,
    /// Forward-value margin correction of this row (0 on `DmAdj` rows).
    pub dm_adj_amount: f64,
    /// Amount scaled by ownership interest.
    #[serde(rename = "CLCAmount")]
    pub clc_amount: f64,
    /// Run date.
    pub as_at_date: Date,
}

impl AdjustedCashflow {
    /// Wraps a ledger row for a run, with every derived field at its default.
    #[must_use]
    pub fn unadjusted(record: CashflowRecord, as_at_date: Date) -> Self {
        Self {
            record,
            region: None,
            discount_rate: None,
            risk_free_rate: None,
            discount_margin: 0.0,
            ownership_interest: 0.0,
            time_diff: 0.0,
            dm_adj_amount: 0.0,
            clc_amount: 0.0,
            as_at_date,
        }
    }

    /// Whether this row is a discount-margin adjustment leg.
    #[must_use]
    pub fn is_dm_adjustment(&self) -> bool {
        self.record.charge_type.dm_adjusted
    }
}

/// Per-property DV01 for one as-at run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dv01Result {
    /// Property.
    #[serde(flatten)]
    pub property: PropertyKey,
    /// Present-value change for the configured parallel shock.
    pub sensitivity: f64,
    /// Rows that could not be priced because no curve rate was available.
    pub missing_rate_rows: u32,
    /// Run date.
    pub as_at_date: Date,
}
