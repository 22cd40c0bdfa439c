//! # Propcash Core
//!
//! Core types for the Propcash contracted-cashflow and rate-risk workspace.
//!
//! - **Types**: `Date`, `PropertyKey`, `ChargeType`, `CreditRating` and the
//!   row types of every logical table
//! - **Day count**: the year basis used for time-to-cashflow
//! - **Schema**: the versioned registry that normalises stored rows
//!
//! ## Example
//!
//! ```rust
//! use propcash_core::prelude::*;
//!
//! let as_at = Date::parse("2025-06-30").unwrap();
//! let flow = Date::parse("2027-06-30").unwrap();
//! let t = YearBasis::default().time_to(as_at, flow);
//! assert!(t > 1.99 && t < 2.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod daycount;
pub mod error;
pub mod schema;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycount::{YearBasis, ACTUAL_365_2475};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::schema::{SchemaRegistry, SCHEMA_VERSION};
    pub use crate::types::{
        AdjustedCashflow, BenchmarkQuote, CashflowRecord, ChargeKind, ChargeType,
        ChargeTypeMapping, CreditRating, CurveQuote, Date, Dv01Result, LogicalTable,
        PropertyCashflow, PropertyKey, PropertyNameMapping, TenancyCashflow, ValuationMetric,
        DM_ADJ_SUFFIX,
    };
}

pub use error::{CoreError, CoreResult};
