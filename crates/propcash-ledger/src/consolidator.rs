//! Cashflow consolidation.
//!
//! Raw tenancy rows are filtered to contracted income, mapped onto the four
//! canonical charge buckets and summed per grouping key. Property-level
//! rows flagged as totals are summed separately and feed the apportioner.

use std::collections::{BTreeMap, BTreeSet};

use propcash_core::types::{
    CashflowRecord, ChargeKind, ChargeType, ChargeTypeMapping, CreditRating, Date, LedgerKey,
    PropertyCashflow, PropertyKey, TenancyCashflow,
};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};

/// The ledger version for a run: the latest effective date strictly before
/// `as_at`.
///
/// # Errors
///
/// Returns `LedgerError::MissingLedgerVersion` if no such date exists.
pub fn ledger_version<I>(effective_dates: I, as_at: Date) -> LedgerResult<Date>
where
    I: IntoIterator<Item = Date>,
{
    effective_dates
        .into_iter()
        .filter(|d| *d < as_at)
        .max()
        .ok_or(LedgerError::MissingLedgerVersion { as_at })
}

/// Tenant charge code to property charge type lookup.
#[derive(Debug, Clone)]
pub struct ChargeMap {
    map: BTreeMap<String, String>,
}

impl ChargeMap {
    /// Builds the lookup. For a repeated tenant code the first row wins.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingReferenceData` if `rows` is empty.
    pub fn from_rows(rows: &[ChargeTypeMapping]) -> LedgerResult<Self> {
        if rows.is_empty() {
            return Err(LedgerError::missing_reference_data(
                "ChargeTypeMapping is empty",
            ));
        }
        let mut map = BTreeMap::new();
        for row in rows {
            map.entry(row.tenant_charge.trim().to_string())
                .or_insert_with(|| row.property_charge.trim().to_string());
        }
        Ok(Self { map })
    }

    /// Property charge type for a tenant code.
    #[must_use]
    pub fn lookup(&self, tenant_charge: &str) -> Option<&str> {
        self.map.get(tenant_charge.trim()).map(String::as_str)
    }

    /// Number of mapped tenant codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Summed property-level total for one cashflow type and date.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTotal {
    /// Property.
    pub property: PropertyKey,
    /// Property charge type name as stored.
    pub cashflow_type: String,
    /// Cashflow date.
    pub cash_flow_date: Date,
    /// Ledger version.
    pub effective_date: Date,
    /// Summed amount.
    pub amount: f64,
}

impl PropertyTotal {
    /// Canonical bucket of the total, if it is one.
    #[must_use]
    pub fn kind(&self) -> Option<ChargeKind> {
        self.cashflow_type.parse().ok()
    }
}

/// Counts reported by a consolidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    /// Tenancy rows read.
    pub tenancy_rows: usize,
    /// Tenancy rows dropped as speculative.
    pub speculative_rows: usize,
    /// Contractual rows dropped because their charge code is unmapped.
    pub unmapped_rows: usize,
    /// Distinct unmapped charge codes.
    pub unmapped_codes: BTreeSet<String>,
    /// Contractual rows mapped to a charge outside the canonical buckets.
    pub non_canonical_rows: usize,
    /// Canonical ledger rows produced.
    pub records: usize,
    /// Property totals produced.
    pub property_totals: usize,
}

/// Output of [`Consolidator::consolidate`].
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    /// Canonical grouped ledger, ordered by key.
    pub records: Vec<CashflowRecord>,
    /// Property-level totals, ordered by property, type and date.
    pub totals: Vec<PropertyTotal>,
    /// Counts.
    pub summary: ConsolidationSummary,
}

/// Groups raw tenancy and property rows into the canonical ledger.
#[derive(Debug, Clone)]
pub struct Consolidator {
    charges: ChargeMap,
}

impl Consolidator {
    /// Creates a consolidator over a charge mapping.
    #[must_use]
    pub fn new(charges: ChargeMap) -> Self {
        Self { charges }
    }

    /// Consolidates one ledger version.
    #[must_use]
    pub fn consolidate(
        &self,
        tenancy: &[TenancyCashflow],
        property: &[PropertyCashflow],
    ) -> Consolidation {
        let mut summary = ConsolidationSummary {
            tenancy_rows: tenancy.len(),
            ..ConsolidationSummary::default()
        };

        let mut grouped: BTreeMap<LedgerKey, f64> = BTreeMap::new();
        for row in tenancy {
            if !row.is_contractual() {
                summary.speculative_rows += 1;
                continue;
            }
            let code = row.cashflow_type.trim();
            let Some(property_charge) = self.charges.lookup(code) else {
                if summary.unmapped_codes.insert(code.to_string()) {
                    warn!(charge = %code, "dropping rows with unmapped charge code");
                }
                summary.unmapped_rows += 1;
                continue;
            };
            let Ok(kind) = property_charge.parse::<ChargeKind>() else {
                debug!(charge = %code, mapped = %property_charge, "dropping non-canonical charge");
                summary.non_canonical_rows += 1;
                continue;
            };
            let key = (
                row.property.clone(),
                ChargeType::new(kind),
                CreditRating::normalized(row.credit_rating.as_deref().unwrap_or_default()),
                row.cash_flow_date,
                row.effective_date,
            );
            *grouped.entry(key).or_insert(0.0) += row.amount;
        }

        let records: Vec<CashflowRecord> = grouped
            .into_iter()
            .map(|(key, amount)| {
                let (property, charge_type, credit_rating, cash_flow_date, effective_date) = key;
                CashflowRecord {
                    property,
                    charge_type,
                    credit_rating,
                    cash_flow_date,
                    effective_date,
                    amount,
                }
            })
            .collect();

        let totals = property_totals(property);

        summary.records = records.len();
        summary.property_totals = totals.len();
        info!(
            tenancy_rows = summary.tenancy_rows,
            records = summary.records,
            unmapped_rows = summary.unmapped_rows,
            property_totals = summary.property_totals,
            "consolidated ledger"
        );

        Consolidation {
            records,
            totals,
            summary,
        }
    }
}

/// Sums property rows flagged as totals by property, type, date and version.
#[must_use]
pub fn property_totals(rows: &[PropertyCashflow]) -> Vec<PropertyTotal> {
    let mut grouped: BTreeMap<(PropertyKey, String, Date, Date), f64> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.is_total()) {
        let key = (
            row.property.clone(),
            row.cashflow_type.trim().to_string(),
            row.cash_flow_effective_date,
            row.effective_date,
        );
        *grouped.entry(key).or_insert(0.0) += row.amount;
    }
    grouped
        .into_iter()
        .map(
            |((property, cashflow_type, cash_flow_date, effective_date), amount)| PropertyTotal {
                property,
                cashflow_type,
                cash_flow_date,
                effective_date,
                amount,
            },
        )
        .collect()
}
