//! # Propcash Ledger
//!
//! The stages that turn raw tenancy and property ledgers into the adjusted,
//! ownership-scaled ledger:
//!
//! 1. [`consolidator`]: contracted rows grouped into the four charge buckets
//! 2. [`apportioner`]: property operating expenses split across rating buckets
//! 3. [`margin`]: discount margin over the risk-free rate and `DmAdj` rows
//! 4. [`ownership`]: consolidated (CLC) amounts
//!
//! Every stage is a pure function of its inputs. Idempotency guards are
//! checked before anything is added.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

pub mod apportioner;
pub mod consolidator;
pub mod error;
pub mod margin;
pub mod ownership;
pub mod profiles;

pub use apportioner::{apportion, Apportionment, ApportionmentRow};
pub use consolidator::{
    ledger_version, property_totals, ChargeMap, Consolidation, ConsolidationSummary,
    Consolidator, PropertyTotal,
};
pub use error::{LedgerError, LedgerResult};
pub use margin::{dm_adjustment, MarginAdjuster, MarginOutcome};
pub use ownership::{scale_by_ownership, OwnershipOutcome};
pub use profiles::{DiscountProfile, DiscountProfiles};
