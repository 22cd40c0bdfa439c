//! Logical table catalogue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Every table the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogicalTable {
    /// Raw tenancy-level cashflows, versioned by `EffectiveDate`.
    TenancyCashflowLedger,
    /// Raw property-level cashflows, versioned by `EffectiveDate`.
    PropertyCashflowLedger,
    /// Tenant charge code to property charge type mapping.
    ChargeTypeMapping,
    /// Coarse benchmark yields, versioned by observation date.
    RiskFreeCurve,
    /// Detailed curve quotes, versioned by observation date.
    RiskFreeCurveDetailed,
    /// Valuation metrics snapshots, versioned by `ValuationDate`.
    ValuationMetricsSummary,
    /// Ledger property to valuation asset mapping.
    PropertyNameMapping,
    /// Canonical contracted ledger, versioned by `EffectiveDate`.
    ContractedCashflowLedger,
    /// Margin-adjusted ledger, versioned by `AsAtDate`.
    AdjustedCashflowLedger,
    /// DV01 time series, versioned by `AsAtDate`.
    Dv01ResultSeries,
}

impl LogicalTable {
    /// All logical tables.
    pub const ALL: [LogicalTable; 10] = [
        LogicalTable::TenancyCashflowLedger,
        LogicalTable::PropertyCashflowLedger,
        LogicalTable::ChargeTypeMapping,
        LogicalTable::RiskFreeCurve,
        LogicalTable::RiskFreeCurveDetailed,
        LogicalTable::ValuationMetricsSummary,
        LogicalTable::PropertyNameMapping,
        LogicalTable::ContractedCashflowLedger,
        LogicalTable::AdjustedCashflowLedger,
        LogicalTable::Dv01ResultSeries,
    ];

    /// Stable storage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTable::TenancyCashflowLedger => "TenancyCashflowLedger",
            LogicalTable::PropertyCashflowLedger => "PropertyCashflowLedger",
            LogicalTable::ChargeTypeMapping => "ChargeTypeMapping",
            LogicalTable::RiskFreeCurve => "RiskFreeCurve",
            LogicalTable::RiskFreeCurveDetailed => "RiskFreeCurveDetailed",
            LogicalTable::ValuationMetricsSummary => "ValuationMetricsSummary",
            LogicalTable::PropertyNameMapping => "PropertyNameMapping",
            LogicalTable::ContractedCashflowLedger => "ContractedCashflowLedger",
            LogicalTable::AdjustedCashflowLedger => "AdjustedCashflowLedger",
            LogicalTable::Dv01ResultSeries => "DV01ResultSeries",
        }
    }

    /// The field holding the version key, or `None` for unversioned
    /// reference tables.
    #[must_use]
    pub fn version_field(&self) -> Option<&'static str> {
        match self {
            LogicalTable::TenancyCashflowLedger
            | LogicalTable::PropertyCashflowLedger
            | LogicalTable::ContractedCashflowLedger => Some("EffectiveDate"),
            LogicalTable::RiskFreeCurve | LogicalTable::RiskFreeCurveDetailed => Some("Date"),
            LogicalTable::ValuationMetricsSummary => Some("ValuationDate"),
            LogicalTable::AdjustedCashflowLedger | LogicalTable::Dv01ResultSeries => {
                Some("AsAtDate")
            }
            LogicalTable::ChargeTypeMapping | LogicalTable::PropertyNameMapping => None,
        }
    }
}

impl fmt::Display for LogicalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalTable::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownTable { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for table in LogicalTable::ALL {
            assert_eq!(table.name().parse::<LogicalTable>().unwrap(), table);
        }
        assert_eq!(
            "dv01resultseries".parse::<LogicalTable>().unwrap(),
            LogicalTable::Dv01ResultSeries
        );
        assert!("SwapRates".parse::<LogicalTable>().is_err());
    }

    #[test]
    fn test_reference_tables_unversioned() {
        assert!(LogicalTable::ChargeTypeMapping.version_field().is_none());
        assert!(LogicalTable::PropertyNameMapping.version_field().is_none());
        assert_eq!(
            LogicalTable::AdjustedCashflowLedger.version_field(),
            Some("AsAtDate")
        );
    }
}
