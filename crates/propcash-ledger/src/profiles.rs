//! Discount profiles: per-property valuation inputs.

use std::collections::BTreeMap;

use propcash_core::types::{Date, PropertyKey, PropertyNameMapping, ValuationMetric};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};

/// Valuation inputs for one ledger property.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountProfile {
    /// Valuation region code, if the snapshot carries one.
    pub region: Option<String>,
    /// Valuation discount rate.
    pub discount_rate: Option<f64>,
    /// Consolidated ownership interest.
    pub ownership_interest: Option<f64>,
    /// Snapshot date.
    pub valuation_date: Date,
}

/// Discount profiles from the latest valuation snapshot, keyed by ledger
/// property name and code.
#[derive(Debug, Clone)]
pub struct DiscountProfiles {
    valuation_date: Date,
    profiles: BTreeMap<(String, i64), DiscountProfile>,
}

impl DiscountProfiles {
    /// Builds profiles from the latest snapshot strictly before `as_at`.
    ///
    /// Metrics rows are linked to ledger properties through the name
    /// mapping on `Asset = MetricsPropertyName`. Rows with no mapping are
    /// ignored; a property mapped more than once keeps its first row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingReferenceData` if no snapshot precedes
    /// `as_at`.
    pub fn build(
        metrics: &[ValuationMetric],
        mappings: &[PropertyNameMapping],
        as_at: Date,
    ) -> LedgerResult<Self> {
        let valuation_date = metrics
            .iter()
            .map(|m| m.valuation_date)
            .filter(|d| *d < as_at)
            .max()
            .ok_or_else(|| {
                LedgerError::missing_reference_data(format!(
                    "no valuation snapshot before {as_at}"
                ))
            })?;

        let mut profiles = BTreeMap::new();
        for metric in metrics.iter().filter(|m| m.valuation_date == valuation_date) {
            let asset = metric.asset.trim();
            let mut matched = false;
            for mapping in mappings
                .iter()
                .filter(|m| m.metrics_property_name.trim() == asset)
            {
                matched = true;
                profiles
                    .entry((
                        mapping.mri_property_name.trim().to_string(),
                        mapping.mri_property_code,
                    ))
                    .or_insert_with(|| DiscountProfile {
                        region: metric
                            .region
                            .as_deref()
                            .map(str::trim)
                            .filter(|r| !r.is_empty())
                            .map(str::to_string),
                        discount_rate: metric.discount_rate,
                        ownership_interest: metric.ownership_interest,
                        valuation_date,
                    });
            }
            if !matched {
                debug!(%asset, "valuation asset has no ledger mapping");
            }
        }

        info!(%valuation_date, properties = profiles.len(), "loaded discount profiles");
        Ok(Self {
            valuation_date,
            profiles,
        })
    }

    /// Date of the snapshot in use.
    #[must_use]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Profile for a ledger property.
    #[must_use]
    pub fn get(&self, property: &PropertyKey) -> Option<&DiscountProfile> {
        self.profiles.get(&(
            property.property_name.trim().to_string(),
            property.property_code,
        ))
    }

    /// Number of mapped properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no property is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
