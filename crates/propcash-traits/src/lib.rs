//! # Propcash Traits
//!
//! Storage trait definitions for the Propcash pipeline.
//!
//! This crate contains ONLY trait definitions and the types they exchange.
//! Backends live in extension crates (`propcash-ext-redb`).
//!
//! ## Module Structure
//!
//! - [`storage`]: the [`TableStore`] trait, version keys and write modes
//! - [`records`]: which record type lives in which logical table
//! - [`error`]: [`TraitError`] and its transient/permanent split

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod records;
pub mod storage;

pub use error::TraitError;
pub use records::TableRecord;
pub use storage::{StoredRow, TableStore, VersionFilter, VersionKey, WriteMode, WriteSummary};
