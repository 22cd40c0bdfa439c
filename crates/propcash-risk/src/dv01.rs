//! DV01 from the adjusted ledger.
//!
//! ## Formula
//!
//! ```text
//! CLCDmAdj  = CLCAmount * (exp(-DiscountMargin * T) - 1)
//! CLCNet    = CLCAmount + CLCDmAdj
//! Base      = CLCNet * exp(-rfr * T)
//! Shocked   = CLCNet * exp(-(rfr + shock) * T)
//! DV01      = Base - Shocked
//! ```
//!
//! `rfr` is the regional zero rate interpolated at `T`. `DmAdj` rows carry
//! zero sensitivity because the margin leg is rebuilt from the original
//! row on the CLC basis.

use std::collections::BTreeMap;

use propcash_core::types::{AdjustedCashflow, Date, Dv01Result, PropertyKey};
use propcash_curves::RateLookup;
use tracing::{info, warn};

/// One basis point as a rate.
pub const ONE_BP: f64 = 0.0001;

/// Sensitivity of a single row.
///
/// # Example
///
/// ```rust
/// use propcash_risk::dv01::row_sensitivity;
///
/// let dv01 = row_sensitivity(1_000_000.0, 0.0, 5.0, 0.03, 0.0001);
/// assert!(dv01 > 0.0);
/// ```
#[must_use]
pub fn row_sensitivity(clc_amount: f64, discount_margin: f64, t: f64, rfr: f64, shock: f64) -> f64 {
    let clc_dm_adj = clc_amount * ((-discount_margin * t).exp() - 1.0);
    let net = clc_amount + clc_dm_adj;
    let base = net * (-rfr * t).exp();
    let shocked = net * (-(rfr + shock) * t).exp();
    base - shocked
}

/// Output of [`Dv01Engine::compute`].
#[derive(Debug, Clone, Default)]
pub struct Dv01Outcome {
    /// One result per property with rows, ordered by property name.
    pub results: Vec<Dv01Result>,
    /// Rows across all properties that had no curve rate.
    pub missing_rate_rows: usize,
}

/// Parallel-shock DV01 engine.
#[derive(Debug, Clone, Copy)]
pub struct Dv01Engine {
    shock: f64,
}

impl Dv01Engine {
    /// Engine with a shock of `shock_bps` basis points.
    #[must_use]
    pub fn new(shock_bps: f64) -> Self {
        Self {
            shock: shock_bps * ONE_BP,
        }
    }

    /// Shock size as a rate.
    #[must_use]
    pub fn shock(&self) -> f64 {
        self.shock
    }

    /// Aggregates sensitivity per property for one run.
    pub fn compute<R: RateLookup + ?Sized>(
        &self,
        rows: &[AdjustedCashflow],
        curves: &R,
        as_at: Date,
    ) -> Dv01Outcome {
        let mut totals: BTreeMap<PropertyKey, (f64, u32)> = BTreeMap::new();
        for row in rows {
            let entry = totals.entry(row.record.property.clone()).or_insert((0.0, 0));
            if row.is_dm_adjustment() {
                continue;
            }
            let rate = row
                .region
                .as_deref()
                .and_then(|region| curves.rate(region, row.time_diff));
            match rate {
                Some(rfr) => {
                    entry.0 += row_sensitivity(
                        row.clc_amount,
                        row.discount_margin,
                        row.time_diff,
                        rfr,
                        self.shock,
                    );
                }
                None => entry.1 += 1,
            }
        }

        let mut results: Vec<Dv01Result> = totals
            .into_iter()
            .map(|(property, (sensitivity, missing_rate_rows))| Dv01Result {
                property,
                sensitivity,
                missing_rate_rows,
                as_at_date: as_at,
            })
            .collect();
        results.sort_by(|a, b| {
            a.property
                .property_name
                .cmp(&b.property.property_name)
                .then_with(|| a.property.cmp(&b.property))
        });

        let missing_rate_rows = results.iter().map(|r| r.missing_rate_rows as usize).sum();
        if missing_rate_rows > 0 {
            warn!(missing_rate_rows, "rows without a curve rate excluded from DV01");
        }
        info!(properties = results.len(), %as_at, "computed DV01");
        Dv01Outcome {
            results,
            missing_rate_rows,
        }
    }
}

impl Default for Dv01Engine {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use propcash_core::types::{CashflowRecord, ChargeKind, ChargeType, CreditRating};
    use proptest::prelude::*;

    struct Flat(f64);

    impl RateLookup for Flat {
        fn rate(&self, region: &str, _t: f64) -> Option<f64> {
            (region == "AUS").then_some(self.0)
        }
    }

    fn as_at() -> Date {
        Date::from_ymd(2025, 6, 30).unwrap()
    }

    fn row(
        name: &str,
        region: Option<&str>,
        clc: f64,
        t: f64,
        dm_adjusted: bool,
    ) -> AdjustedCashflow {
        let mut charge_type = ChargeType::new(ChargeKind::BaseRent);
        if dm_adjusted {
            charge_type = charge_type.dm_adjusted();
        }
        let record = CashflowRecord {
            property: PropertyKey::new(format!("ID-{name}"), 1, name),
            charge_type,
            credit_rating: CreditRating::normalized("A"),
            cash_flow_date: Date::from_ymd(2030, 6, 30).unwrap(),
            effective_date: Date::from_ymd(2025, 6, 1).unwrap(),
            amount: clc,
        };
        let mut row = AdjustedCashflow::unadjusted(record, as_at());
        row.region = region.map(str::to_string);
        row.clc_amount = clc;
        row.time_diff = t;
        row.discount_margin = 0.01;
        row
    }

    #[test]
    fn test_positive_for_positive_cashflow() {
        let dv01 = row_sensitivity(1_000_000.0, 0.0, 5.0, 0.03, ONE_BP);
        let expected = 1_000_000.0 * ((-0.15f64).exp() - (-0.1505f64).exp());
        assert!(dv01 > 0.0);
        assert_relative_eq!(dv01, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_margin_leg_on_clc_basis() {
        let with_margin = row_sensitivity(1000.0, 0.01, 2.0, 0.03, ONE_BP);
        let net = 1000.0 * (-0.02f64).exp();
        let expected = net * ((-0.06f64).exp() - (-0.0602f64).exp());
        assert_relative_eq!(with_margin, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregates_sorted_by_name() {
        let rows = vec![
            row("Zeta", Some("AUS"), 100.0, 5.0, false),
            row("Alpha", Some("AUS"), 100.0, 5.0, false),
            row("Alpha", Some("AUS"), 100.0, 5.0, false),
            row("Alpha", Some("AUS"), -3.0, 5.0, true),
        ];
        let out = Dv01Engine::default().compute(&rows, &Flat(0.03), as_at());
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.results[0].property.property_name, "Alpha");
        assert_relative_eq!(
            out.results[0].sensitivity,
            2.0 * out.results[1].sensitivity,
            epsilon = 1e-12
        );
        assert_eq!(out.results[0].as_at_date, as_at());
    }

    #[test]
    fn test_missing_rate_counted() {
        let rows = vec![
            row("Alpha", Some("NZL"), 100.0, 5.0, false),
            row("Alpha", None, 100.0, 5.0, false),
            row("Alpha", Some("AUS"), 100.0, 5.0, false),
        ];
        let out = Dv01Engine::default().compute(&rows, &Flat(0.03), as_at());
        assert_eq!(out.missing_rate_rows, 2);
        assert_eq!(out.results[0].missing_rate_rows, 2);
        assert!(out.results[0].sensitivity > 0.0);
    }

    #[test]
    fn test_empty_ledger_has_no_results() {
        let out = Dv01Engine::default().compute(&[], &Flat(0.03), as_at());
        assert!(out.results.is_empty());
    }

    #[test]
    fn test_shock_size() {
        assert_relative_eq!(Dv01Engine::new(1.0).shock(), 0.0001);
        assert_relative_eq!(Dv01Engine::new(25.0).shock(), 0.0025);
    }

    proptest! {
        #[test]
        fn prop_positive_cashflows_have_positive_dv01(
            clc in 1.0f64..1e8,
            t in 0.01f64..30.0,
            rfr in -0.01f64..0.10,
        ) {
            prop_assert!(row_sensitivity(clc, 0.0, t, rfr, ONE_BP) > 0.0);
        }
    }
}
