//! Domain types shared by every Propcash crate.

mod charge;
mod date;
mod property;
mod rating;
mod records;
mod table;

pub use charge::{ChargeKind, ChargeType, DM_ADJ_SUFFIX};
pub use date::Date;
pub use property::PropertyKey;
pub use rating::CreditRating;
pub use records::{
    AdjustedCashflow, BenchmarkQuote, CashflowRecord, ChargeTypeMapping, CurveQuote, Dv01Result,
    LedgerKey, PropertyCashflow, PropertyNameMapping, TenancyCashflow, ValuationMetric,
};
pub use table::LogicalTable;
