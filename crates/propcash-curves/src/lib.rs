//! # Propcash Curves
//!
//! Risk-free rate inputs for the Propcash pipeline:
//!
//! - **Tenor parsing** from detailed curve instrument mnemonics
//! - **Region aliases** mapping valuation regions onto curve buckets
//! - **Zero curves** with linear interpolation and flat extrapolation
//! - **Benchmark rates**: the coarse per-bucket yield used for discount
//!   margins
//!
//! ## Example
//!
//! ```rust
//! use propcash_curves::prelude::*;
//! use propcash_core::types::{CurveQuote, Date};
//!
//! let as_at = Date::parse("2025-06-30").unwrap();
//! let quote = |mnemonic: &str, rate: f64| CurveQuote {
//!     date: as_at,
//!     mnemonic: mnemonic.into(),
//!     open: rate,
//!     last: rate,
//!     base_ccy: "AUD".into(),
//! };
//! let quotes = vec![quote("AUDSwap1Y", 0.01), quote("AUDSwap5Y", 0.02)];
//! let curves = CurveSet::from_quotes(&quotes, as_at, RegionAliases::default());
//! let r = curves.rate("AUS", 3.0).unwrap();
//! assert!((r - 0.015).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

pub mod benchmark;
pub mod error;
pub mod interpolation;
pub mod region;
pub mod tenor;
pub mod term_structure;

pub use benchmark::{BenchmarkRate, BenchmarkRates};
pub use error::{CurveError, CurveResult};
pub use interpolation::LinearInterpolator;
pub use region::RegionAliases;
pub use tenor::parse_tenor;
pub use term_structure::{CurvePoint, CurveSet, RateLookup, ZeroCurve};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::benchmark::BenchmarkRates;
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::interpolation::LinearInterpolator;
    pub use crate::region::RegionAliases;
    pub use crate::term_structure::{CurveSet, RateLookup, ZeroCurve};
}
