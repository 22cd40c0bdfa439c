//! Charge types.
//!
//! A ledger row belongs to exactly one canonical bucket. Rows produced by the
//! discount-margin adjuster carry the same bucket with the `DmAdj` suffix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Suffix marking a discount-margin adjustment row.
pub const DM_ADJ_SUFFIX: &str = "DmAdj";

/// Canonical charge buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChargeKind {
    /// Contracted base rent.
    BaseRent,
    /// Rent-free incentives (usually negative).
    FreeRent,
    /// Outgoings recovered from tenants.
    Recovery,
    /// Property operating expenses.
    OperatingExpenses,
}

impl ChargeKind {
    /// All canonical buckets.
    pub const ALL: [ChargeKind; 4] = [
        ChargeKind::BaseRent,
        ChargeKind::FreeRent,
        ChargeKind::Recovery,
        ChargeKind::OperatingExpenses,
    ];

    /// The stored name of the bucket.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::BaseRent => "BaseRent",
            ChargeKind::FreeRent => "FreeRent",
            ChargeKind::Recovery => "Recovery",
            ChargeKind::OperatingExpenses => "OperatingExpenses",
        }
    }

    /// True for the rent buckets that feed the apportionment basis.
    #[must_use]
    pub fn is_rent(&self) -> bool {
        matches!(self, ChargeKind::BaseRent | ChargeKind::FreeRent)
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChargeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| CoreError::unknown_charge_type(s))
    }
}

/// A charge type as stored on a ledger row: a bucket, optionally marked as
/// the discount-margin adjustment leg of that bucket.
///
/// ```rust
/// use propcash_core::types::{ChargeKind, ChargeType};
///
/// let adj: ChargeType = "BaseRentDmAdj".parse().unwrap();
/// assert_eq!(adj.kind, ChargeKind::BaseRent);
/// assert!(adj.dm_adjusted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChargeType {
    /// The canonical bucket.
    pub kind: ChargeKind,
    /// Whether this is the `DmAdj` leg.
    pub dm_adjusted: bool,
}

impl ChargeType {
    /// A plain (unadjusted) charge type.
    #[must_use]
    pub fn new(kind: ChargeKind) -> Self {
        Self {
            kind,
            dm_adjusted: false,
        }
    }

    /// The `DmAdj` counterpart of this charge type.
    #[must_use]
    pub fn dm_adjusted(self) -> Self {
        Self {
            kind: self.kind,
            dm_adjusted: true,
        }
    }
}

impl From<ChargeKind> for ChargeType {
    fn from(kind: ChargeKind) -> Self {
        ChargeType::new(kind)
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dm_adjusted {
            write!(f, "{}{}", self.kind, DM_ADJ_SUFFIX)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl FromStr for ChargeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_suffix(DM_ADJ_SUFFIX) {
            Some(base) => Ok(ChargeType::new(base.parse()?).dm_adjusted()),
            None => Ok(ChargeType::new(s.parse()?)),
        }
    }
}

impl Serialize for ChargeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChargeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in ChargeKind::ALL {
            let plain = ChargeType::new(kind);
            assert_eq!(plain.to_string().parse::<ChargeType>().unwrap(), plain);
            let adj = plain.dm_adjusted();
            assert!(adj.to_string().ends_with(DM_ADJ_SUFFIX));
            assert_eq!(adj.to_string().parse::<ChargeType>().unwrap(), adj);
        }
    }

    #[test]
    fn test_unknown_charge() {
        assert!("Parking".parse::<ChargeType>().is_err());
        assert!("ParkingDmAdj".parse::<ChargeType>().is_err());
    }

    #[test]
    fn test_rent_buckets() {
        assert!(ChargeKind::BaseRent.is_rent());
        assert!(ChargeKind::FreeRent.is_rent());
        assert!(!ChargeKind::Recovery.is_rent());
        assert!(!ChargeKind::OperatingExpenses.is_rent());
    }
}
