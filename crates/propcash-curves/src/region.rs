//! Region codes to curve buckets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps region codes used by valuers (`AUS`, `JAP`) and currency codes onto
/// curve buckets (`AUD`, `JPY`).
///
/// Lookup is case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionAliases(BTreeMap<String, String>);

impl RegionAliases {
    /// An empty alias table.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds (or replaces) an alias.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.0
            .insert(alias.into().trim().to_ascii_uppercase(), bucket.into());
        self
    }

    /// Resolves a region or currency code to its curve bucket.
    #[must_use]
    pub fn resolve(&self, region: &str) -> Option<&str> {
        let region = region.trim();
        self.0
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(region))
            .map(|(_, bucket)| bucket.as_str())
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RegionAliases {
    fn default() -> Self {
        Self::empty()
            .with("AUS", "AUD")
            .with("AUD", "AUD")
            .with("JAP", "JPY")
            .with("JPY", "JPY")
    }
}
