//! Tenant credit ratings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker token that identifies an unset rating in the source ledger.
const UNSET_MARKER: char = '0';

/// Tenant credit rating as carried on ledger rows.
///
/// Ratings are free text in the source system. Any value containing the
/// unset marker collapses to [`CreditRating::NOT_RATED`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditRating(String);

impl CreditRating {
    /// Sentinel for "Not Rated".
    pub const NOT_RATED: &'static str = "NR";

    /// Builds a rating, normalising unset values to the not-rated sentinel.
    pub fn normalized(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains(UNSET_MARKER) {
            Self::not_rated()
        } else {
            Self(raw.to_string())
        }
    }

    /// The not-rated sentinel.
    #[must_use]
    pub fn not_rated() -> Self {
        Self(Self::NOT_RATED.to_string())
    }

    /// Whether this is the not-rated sentinel.
    #[must_use]
    pub fn is_not_rated(&self) -> bool {
        self.0 == Self::NOT_RATED
    }

    /// The rating text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
