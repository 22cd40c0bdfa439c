//! Binding of record types to logical tables.

use propcash_core::types::{
    AdjustedCashflow, BenchmarkQuote, CashflowRecord, ChargeTypeMapping, CurveQuote, Dv01Result,
    LogicalTable, PropertyCashflow, PropertyNameMapping, TenancyCashflow, ValuationMetric,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::VersionKey;

/// A record type stored in one logical table.
pub trait TableRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The table holding this record type.
    const TABLE: LogicalTable;

    /// Partition this record belongs to.
    fn version(&self) -> VersionKey;
}

macro_rules! table_record {
    ($ty:ty, $table:ident, unversioned) => {
        impl TableRecord for $ty {
            const TABLE: LogicalTable = LogicalTable::$table;

            fn version(&self) -> VersionKey {
                VersionKey::unversioned()
            }
        }
    };
    ($ty:ty, $table:ident, $field:ident) => {
        impl TableRecord for $ty {
            const TABLE: LogicalTable = LogicalTable::$table;

            fn version(&self) -> VersionKey {
                VersionKey::from(self.$field)
            }
        }
    };
}

table_record!(TenancyCashflow, TenancyCashflowLedger, effective_date);
table_record!(PropertyCashflow, PropertyCashflowLedger, effective_date);
table_record!(ChargeTypeMapping, ChargeTypeMapping, unversioned);
table_record!(BenchmarkQuote, RiskFreeCurve, date);
table_record!(CurveQuote, RiskFreeCurveDetailed, date);
table_record!(ValuationMetric, ValuationMetricsSummary, valuation_date);
table_record!(PropertyNameMapping, PropertyNameMapping, unversioned);
table_record!(CashflowRecord, ContractedCashflowLedger, effective_date);
table_record!(AdjustedCashflow, AdjustedCashflowLedger, as_at_date);
table_record!(Dv01Result, Dv01ResultSeries, as_at_date);

#[cfg(test)]
mod tests {
    use super::*;
    use propcash_core::types::{Date, PropertyKey};

    #[test]
    fn test_versions_follow_table_version_field() {
        let as_at = Date::from_ymd(2025, 6, 30).unwrap();
        let result = Dv01Result {
            property: PropertyKey::new("P001", 1001, "Harbour Plaza"),
            sensitivity: 12.5,
            missing_rate_rows: 0,
            as_at_date: as_at,
        };
        assert_eq!(result.version(), VersionKey::from(as_at));
        assert_eq!(Dv01Result::TABLE, LogicalTable::Dv01ResultSeries);
        assert_eq!(
            Dv01Result::TABLE.version_field(),
            Some("AsAtDate")
        );

        let mapping = ChargeTypeMapping {
            tenant_charge: "RNT".into(),
            property_charge: "BaseRent".into(),
        };
        assert!(mapping.version().is_unversioned());
    }

    #[test]
    fn test_serialized_version_field_matches_key() {
        let quote = BenchmarkQuote {
            date: Date::from_ymd(2025, 3, 28).unwrap(),
            identifier: "ADSWAP10 Curncy".into(),
            rate: 0.041,
        };
        let json = serde_json::to_value(&quote).unwrap();
        let field = BenchmarkQuote::TABLE.version_field().unwrap();
        assert_eq!(json[field].as_str(), Some(quote.version().as_str()));
    }
}
