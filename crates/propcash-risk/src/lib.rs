//! # Propcash Risk
//!
//! Interest-rate sensitivity of the adjusted ledger: per-property DV01
//! under a parallel shock of the regional zero curve.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dv01;

pub use dv01::{row_sensitivity, Dv01Engine, Dv01Outcome, ONE_BP};
