//! Property identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifying triple every ledger row carries.
///
/// Ordering is by ID, then code, then name, which gives grouped outputs a
/// stable order independent of input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyKey {
    /// Ledger system property identifier.
    #[serde(rename = "PropertyID")]
    pub property_id: String,
    /// Numeric property code used by the name-mapping reference.
    #[serde(rename = "PropertyCode")]
    pub property_code: i64,
    /// Ledger system property name.
    #[serde(rename = "PropertyName")]
    pub property_name: String,
}

impl PropertyKey {
    /// Creates a new property key.
    pub fn new(
        property_id: impl Into<String>,
        property_code: i64,
        property_name: impl Into<String>,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            property_code,
            property_name: property_name.into(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.property_name, self.property_id, self.property_code)
    }
}
