//! Discount-margin adjustment.
//!
//! Each cashflow is valued at the property's discount rate rather than the
//! risk-free rate. The difference is carried as a parallel `DmAdj` row:
//!
//! ```text
//! DiscountMargin = DiscountRate - RiskFreeRate
//! TimeDiff       = max(0, days(AsAtDate -> CashFlowDate) / 365.2475)
//! DmAdjAmount    = Amount * (exp(-DiscountMargin * TimeDiff) - 1)
//! ```

use std::collections::BTreeSet;

use propcash_core::daycount::YearBasis;
use propcash_core::types::{AdjustedCashflow, CashflowRecord, Date, PropertyKey};
use propcash_curves::{BenchmarkRates, RegionAliases};
use tracing::{debug, info};

use crate::profiles::DiscountProfiles;

/// Forward-value correction of `amount` for a margin over `t` years.
#[must_use]
pub fn dm_adjustment(amount: f64, discount_margin: f64, t: f64) -> f64 {
    amount * ((-discount_margin * t).exp() - 1.0)
}

/// Output of [`MarginAdjuster::apply`].
#[derive(Debug, Clone, Default)]
pub struct MarginOutcome {
    /// Adjusted rows on or after the as-at date, ordered by ledger key.
    pub rows: Vec<AdjustedCashflow>,
    /// `DmAdj` rows emitted.
    pub emitted: usize,
    /// True when the input already held `DmAdj` rows and none were emitted.
    pub guard_skipped: bool,
    /// Rows dropped because they fall before the as-at date.
    pub dropped_past: usize,
    /// Properties with no discount profile.
    pub unmapped: BTreeSet<PropertyKey>,
}

/// Computes discount margins and emits `DmAdj` rows for one as-at run.
#[derive(Debug, Clone)]
pub struct MarginAdjuster {
    profiles: DiscountProfiles,
    benchmarks: BenchmarkRates,
    aliases: RegionAliases,
    basis: YearBasis,
    as_at: Date,
}

impl MarginAdjuster {
    /// Creates an adjuster.
    #[must_use]
    pub fn new(
        profiles: DiscountProfiles,
        benchmarks: BenchmarkRates,
        aliases: RegionAliases,
        basis: YearBasis,
        as_at: Date,
    ) -> Self {
        Self {
            profiles,
            benchmarks,
            aliases,
            basis,
            as_at,
        }
    }

    /// The run date.
    #[must_use]
    pub fn as_at(&self) -> Date {
        self.as_at
    }

    fn adjust_row(
        &self,
        record: CashflowRecord,
        unmapped: &mut BTreeSet<PropertyKey>,
    ) -> AdjustedCashflow {
        let mut row = AdjustedCashflow::unadjusted(record, self.as_at);
        match self.profiles.get(&row.record.property) {
            Some(profile) => {
                row.region = profile.region.clone();
                row.discount_rate = profile.discount_rate;
                row.ownership_interest = profile.ownership_interest.unwrap_or(0.0);
                row.risk_free_rate = profile
                    .region
                    .as_deref()
                    .and_then(|region| self.benchmarks.for_region(region, &self.aliases));
            }
            None => {
                unmapped.insert(row.record.property.clone());
            }
        }
        row.discount_margin = match (row.discount_rate, row.risk_free_rate) {
            (Some(rate), Some(rfr)) => rate - rfr,
            _ => 0.0,
        };
        row.time_diff = self.basis.time_to(self.as_at, row.record.cash_flow_date);
        if !row.is_dm_adjustment() {
            row.dm_adj_amount =
                dm_adjustment(row.record.amount, row.discount_margin, row.time_diff);
        }
        row
    }

    /// Adjusts a contracted ledger.
    ///
    /// `DmAdj` rows are emitted only when the input holds none, so applying
    /// the adjuster to its own output adds nothing.
    #[must_use]
    pub fn apply(&self, records: Vec<CashflowRecord>) -> MarginOutcome {
        let guard_skipped = records.iter().any(|r| r.charge_type.dm_adjusted);
        let mut unmapped = BTreeSet::new();

        let mut rows: Vec<AdjustedCashflow> = records
            .into_iter()
            .map(|r| self.adjust_row(r, &mut unmapped))
            .collect();

        let mut emitted = 0;
        if guard_skipped {
            info!("DmAdj rows already present, skipping emission");
        } else {
            let adjustments: Vec<AdjustedCashflow> = rows
                .iter()
                .filter(|r| r.dm_adj_amount != 0.0)
                .map(|r| {
                    let mut adj = r.clone();
                    adj.record.charge_type = r.record.charge_type.dm_adjusted();
                    adj.record.amount = r.dm_adj_amount;
                    adj.dm_adj_amount = 0.0;
                    adj
                })
                .collect();
            emitted = adjustments.len();
            rows.extend(adjustments);
        }

        let before = rows.len();
        rows.retain(|r| r.record.cash_flow_date >= self.as_at);
        let dropped_past = before - rows.len();
        rows.sort_by_key(|r| r.record.key());

        for property in &unmapped {
            debug!(%property, "no discount profile, ownership set to 0");
        }
        info!(
            rows = rows.len(),
            emitted,
            dropped_past,
            unmapped = unmapped.len(),
            "applied discount margins"
        );

        MarginOutcome {
            rows,
            emitted,
            guard_skipped,
            dropped_past,
            unmapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use propcash_core::types::{
        BenchmarkQuote, ChargeKind, ChargeType, CreditRating, PropertyNameMapping,
        ValuationMetric,
    };
    use std::collections::BTreeMap;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn mapped() -> PropertyKey {
        PropertyKey::new("P001", 1001, "Harbour Plaza")
    }

    fn record(property: PropertyKey, date: &str, amount: f64) -> CashflowRecord {
        CashflowRecord {
            property,
            charge_type: ChargeType::new(ChargeKind::BaseRent),
            credit_rating: CreditRating::normalized("AA"),
            cash_flow_date: d(date),
            effective_date: d("2025-06-01"),
            amount,
        }
    }

    fn adjuster() -> MarginAdjuster {
        adjuster_in(Some("AUS"))
    }

    fn adjuster_in(region: Option<&str>) -> MarginAdjuster {
        let as_at = d("2025-06-30");
        let metrics = vec![ValuationMetric {
            asset: "Harbour Plaza Sydney".into(),
            region: region.map(str::to_string),
            ownership_interest: Some(0.5),
            discount_rate: Some(0.05),
            valuation_date: d("2025-03-31"),
        }];
        let mappings = vec![PropertyNameMapping {
            mri_property_name: "Harbour Plaza".into(),
            mri_property_code: 1001,
            metrics_property_name: "Harbour Plaza Sydney".into(),
        }];
        let profiles = DiscountProfiles::build(&metrics, &mappings, as_at).unwrap();
        let quotes = vec![BenchmarkQuote {
            date: d("2025-03-28"),
            identifier: "ADSWAP10 Curncy".into(),
            rate: 0.04,
        }];
        let ids = BTreeMap::from([("AUD".to_string(), "ADSWAP10 Curncy".to_string())]);
        let benchmarks = BenchmarkRates::select(&quotes, profiles.valuation_date(), &ids);
        MarginAdjuster::new(
            profiles,
            benchmarks,
            RegionAliases::default(),
            YearBasis::default(),
            as_at,
        )
    }

    #[test]
    fn test_dm_adjustment_scenario() {
        assert_relative_eq!(dm_adjustment(1000.0, 0.01, 2.0), -19.801_326_693, epsilon = 1e-6);
        assert_eq!(dm_adjustment(1000.0, 0.0, 2.0), 0.0);
        assert_eq!(dm_adjustment(1000.0, 0.01, 0.0), 0.0);
    }

    #[test]
    fn test_emits_dm_adj_rows() {
        let out = adjuster().apply(vec![record(mapped(), "2027-06-30", 1000.0)]);
        assert_eq!(out.emitted, 1);
        assert_eq!(out.rows.len(), 2);
        let original = &out.rows[0];
        let adj = &out.rows[1];
        assert!(!original.is_dm_adjustment());
        assert!(adj.is_dm_adjustment());
        assert_relative_eq!(original.discount_margin, 0.01, epsilon = 1e-12);
        assert_eq!(original.risk_free_rate, Some(0.04));
        assert_eq!(original.region.as_deref(), Some("AUS"));
        assert_eq!(original.ownership_interest, 0.5);
        let expected = dm_adjustment(1000.0, 0.01, original.time_diff);
        assert_relative_eq!(original.dm_adj_amount, expected);
        assert_relative_eq!(adj.record.amount, expected);
        assert_eq!(adj.dm_adj_amount, 0.0);
    }

    #[test]
    fn test_missing_region_has_no_risk_free_rate() {
        let out = adjuster_in(None).apply(vec![record(mapped(), "2027-06-30", 1000.0)]);
        assert_eq!(out.emitted, 0);
        assert_eq!(out.rows.len(), 1);
        let row = &out.rows[0];
        assert_eq!(row.region, None);
        assert_eq!(row.risk_free_rate, None);
        assert_eq!(row.discount_margin, 0.0);
        assert_eq!(row.ownership_interest, 0.5);
        assert!(out.unmapped.is_empty());
    }

    #[test]
    fn test_unmapped_property_keeps_row_without_margin() {
        let other = PropertyKey::new("P002", 2002, "Bayside");
        let out = adjuster().apply(vec![record(other.clone(), "2027-06-30", 1000.0)]);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.emitted, 0);
        assert_eq!(out.rows[0].discount_margin, 0.0);
        assert_eq!(out.rows[0].ownership_interest, 0.0);
        assert!(out.unmapped.contains(&other));
    }

    #[test]
    fn test_drops_past_rows_and_clamps_time() {
        let out = adjuster().apply(vec![
            record(mapped(), "2025-01-31", 1000.0),
            record(mapped(), "2025-06-30", 1000.0),
        ]);
        assert_eq!(out.dropped_past, 1);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].time_diff, 0.0);
        assert!(out.rows.iter().all(|r| r.time_diff >= 0.0));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let adjuster = adjuster();
        let first = adjuster.apply(vec![record(mapped(), "2027-06-30", 1000.0)]);
        let again: Vec<CashflowRecord> = first.rows.iter().map(|r| r.record.clone()).collect();
        let second = adjuster.apply(again);
        assert!(second.guard_skipped);
        assert_eq!(second.emitted, 0);
        assert_eq!(second.rows, first.rows);
    }
}
