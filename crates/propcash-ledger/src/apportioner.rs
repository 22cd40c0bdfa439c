//! Operating-expense apportionment.
//!
//! Operating expenses only exist as a property-wide total. The total is
//! scaled to the contracted share of rent and then split across the
//! BaseRent credit-rating buckets in proportion to each bucket's rent.
//!
//! # Formulas
//!
//! ```text
//! ScalingFactor       = contracted (BaseRent + FreeRent) / total (BaseRent + FreeRent)
//! ScaledOpEx          = PropertyOpEx * ScalingFactor
//! CreditRatingPortion = bucket BaseRent / contracted BaseRent
//! ApportionedOpEx     = CreditRatingPortion * ScaledOpEx
//! ```
//!
//! All groups are per (property, cashflow date, ledger version).

use std::collections::BTreeMap;

use propcash_core::types::{
    CashflowRecord, ChargeKind, ChargeType, CreditRating, Date, LedgerKey, PropertyKey,
};
use tracing::{info, warn};

use crate::consolidator::PropertyTotal;

type GroupKey = (PropertyKey, Date, Date);

/// Factors behind one synthetic operating-expense row.
#[derive(Debug, Clone, PartialEq)]
pub struct ApportionmentRow {
    /// Property.
    pub property: PropertyKey,
    /// Cashflow date.
    pub cash_flow_date: Date,
    /// Ledger version.
    pub effective_date: Date,
    /// Credit-rating bucket.
    pub credit_rating: CreditRating,
    /// Contracted share of rent; `None` when no property rent total exists.
    pub scaling_factor: Option<f64>,
    /// Bucket share of contracted BaseRent; `None` when that total is zero.
    pub portion: Option<f64>,
    /// Scaled property operating expense; `None` when either input is missing.
    pub scaled_opex: Option<f64>,
    /// Amount written to the ledger.
    pub amount: f64,
}

impl ApportionmentRow {
    /// Whether every factor was available.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.portion.is_some() && self.scaled_opex.is_some()
    }
}

/// Output of [`apportion`].
#[derive(Debug, Clone, Default)]
pub struct Apportionment {
    /// Ledger with synthetic OperatingExpenses rows merged in.
    pub records: Vec<CashflowRecord>,
    /// One entry per synthetic row.
    pub diagnostics: Vec<ApportionmentRow>,
    /// True when the ledger already held OperatingExpenses rows.
    pub skipped: bool,
}

impl Apportionment {
    /// Synthetic rows whose amount fell back to zero.
    #[must_use]
    pub fn incomplete(&self) -> usize {
        self.diagnostics.iter().filter(|r| !r.is_complete()).count()
    }
}

fn group_key(record: &CashflowRecord) -> GroupKey {
    (
        record.property.clone(),
        record.cash_flow_date,
        record.effective_date,
    )
}

fn is_plain(record: &CashflowRecord, kind: ChargeKind) -> bool {
    record.charge_type == ChargeType::new(kind)
}

/// Injects apportioned operating-expense rows into a consolidated ledger.
///
/// No-op (with `skipped` set) when OperatingExpenses rows already exist.
#[must_use]
pub fn apportion(records: Vec<CashflowRecord>, totals: &[PropertyTotal]) -> Apportionment {
    if records
        .iter()
        .any(|r| is_plain(r, ChargeKind::OperatingExpenses))
    {
        info!("operating expenses already present, skipping apportionment");
        return Apportionment {
            records,
            diagnostics: Vec::new(),
            skipped: true,
        };
    }

    let mut contracted_rent: BTreeMap<GroupKey, f64> = BTreeMap::new();
    let mut contracted_base: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for record in &records {
        if record.charge_type.dm_adjusted || !record.charge_type.kind.is_rent() {
            continue;
        }
        *contracted_rent.entry(group_key(record)).or_insert(0.0) += record.amount;
        if record.charge_type.kind == ChargeKind::BaseRent {
            *contracted_base.entry(group_key(record)).or_insert(0.0) += record.amount;
        }
    }

    let mut total_rent: BTreeMap<GroupKey, f64> = BTreeMap::new();
    let mut total_opex: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for total in totals {
        let key = (
            total.property.clone(),
            total.cash_flow_date,
            total.effective_date,
        );
        match total.kind() {
            Some(kind) if kind.is_rent() => *total_rent.entry(key).or_insert(0.0) += total.amount,
            Some(ChargeKind::OperatingExpenses) => {
                *total_opex.entry(key).or_insert(0.0) += total.amount;
            }
            _ => {}
        }
    }

    let scaling: BTreeMap<GroupKey, f64> = contracted_rent
        .iter()
        .filter_map(|(key, contracted)| {
            let total = total_rent.get(key)?;
            if *total == 0.0 {
                warn!(property = %key.0, date = %key.1, "zero total rent, scaling factor set to 0");
                Some((key.clone(), 0.0))
            } else {
                Some((key.clone(), contracted / total))
            }
        })
        .collect();

    let mut diagnostics = Vec::new();
    let mut synthetic = Vec::new();
    for record in records
        .iter()
        .filter(|r| is_plain(r, ChargeKind::BaseRent))
    {
        let key = group_key(record);
        let portion = contracted_base
            .get(&key)
            .filter(|base| **base != 0.0)
            .map(|base| record.amount / base);
        let scaling_factor = scaling.get(&key).copied();
        let scaled_opex = total_opex
            .get(&key)
            .zip(scaling_factor)
            .map(|(opex, factor)| opex * factor);
        let amount = portion
            .zip(scaled_opex)
            .map_or(0.0, |(portion, scaled)| portion * scaled);

        let row = ApportionmentRow {
            property: record.property.clone(),
            cash_flow_date: record.cash_flow_date,
            effective_date: record.effective_date,
            credit_rating: record.credit_rating.clone(),
            scaling_factor,
            portion,
            scaled_opex,
            amount,
        };
        if !row.is_complete() {
            warn!(
                property = %row.property,
                date = %row.cash_flow_date,
                rating = %row.credit_rating,
                portion = ?row.portion,
                scaling_factor = ?row.scaling_factor,
                scaled_opex = ?row.scaled_opex,
                "apportionment factor missing, operating expense set to 0"
            );
        }
        synthetic.push(CashflowRecord {
            charge_type: ChargeType::new(ChargeKind::OperatingExpenses),
            amount,
            ..record.clone()
        });
        diagnostics.push(row);
    }

    let mut merged: BTreeMap<LedgerKey, CashflowRecord> = BTreeMap::new();
    for record in records.into_iter().chain(synthetic) {
        merged
            .entry(record.key())
            .and_modify(|existing| existing.amount += record.amount)
            .or_insert(record);
    }

    let out = Apportionment {
        records: merged.into_values().collect(),
        diagnostics,
        skipped: false,
    };
    info!(
        injected = out.diagnostics.len(),
        incomplete = out.incomplete(),
        "apportioned operating expenses"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn prop() -> PropertyKey {
        PropertyKey::new("P001", 1001, "Harbour Plaza")
    }

    fn record(kind: ChargeKind, rating: &str, amount: f64) -> CashflowRecord {
        CashflowRecord {
            property: prop(),
            charge_type: ChargeType::new(kind),
            credit_rating: CreditRating::normalized(rating),
            cash_flow_date: d("2025-07-31"),
            effective_date: d("2025-06-01"),
            amount,
        }
    }

    fn total(kind: &str, amount: f64) -> PropertyTotal {
        PropertyTotal {
            property: prop(),
            cashflow_type: kind.to_string(),
            cash_flow_date: d("2025-07-31"),
            effective_date: d("2025-06-01"),
            amount,
        }
    }

    fn opex_rows(out: &Apportionment) -> Vec<&CashflowRecord> {
        out.records
            .iter()
            .filter(|r| r.charge_type.kind == ChargeKind::OperatingExpenses)
            .collect()
    }

    #[test]
    fn test_scaling_scenario() {
        let records = vec![record(ChargeKind::BaseRent, "AA", 80.0)];
        let totals = vec![total("BaseRent", 100.0), total("OperatingExpenses", 50.0)];
        let out = apportion(records, &totals);
        assert!(!out.skipped);
        let diag = &out.diagnostics[0];
        assert_relative_eq!(diag.scaling_factor.unwrap(), 0.8);
        assert_relative_eq!(diag.scaled_opex.unwrap(), 40.0);
        let opex = opex_rows(&out);
        assert_eq!(opex.len(), 1);
        assert_relative_eq!(opex[0].amount, 40.0);
    }

    #[test]
    fn test_split_across_ratings() {
        let records = vec![
            record(ChargeKind::BaseRent, "AA", 60.0),
            record(ChargeKind::BaseRent, "BBB", 20.0),
            record(ChargeKind::FreeRent, "AA", -10.0),
        ];
        // contracted rent 70, total rent 140 -> scaling 0.5; opex 200 -> 100
        let totals = vec![
            total("BaseRent", 150.0),
            total("FreeRent", -10.0),
            total("OperatingExpenses", 200.0),
        ];
        let out = apportion(records, &totals);
        let opex = opex_rows(&out);
        assert_eq!(opex.len(), 2);
        let aa = opex.iter().find(|r| r.credit_rating.as_str() == "AA").unwrap();
        let bbb = opex.iter().find(|r| r.credit_rating.as_str() == "BBB").unwrap();
        assert_relative_eq!(aa.amount, 75.0, epsilon = 1e-9);
        assert_relative_eq!(bbb.amount, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_total_rent_discards_opex() {
        let records = vec![record(ChargeKind::BaseRent, "AA", 80.0)];
        let totals = vec![
            total("BaseRent", 10.0),
            total("FreeRent", -10.0),
            total("OperatingExpenses", 50.0),
        ];
        let out = apportion(records, &totals);
        assert_eq!(out.diagnostics[0].scaling_factor, Some(0.0));
        assert_eq!(opex_rows(&out)[0].amount, 0.0);
        assert_eq!(out.incomplete(), 0);
    }

    #[test]
    fn test_missing_factors_give_zero_and_diagnostic() {
        let records = vec![
            record(ChargeKind::BaseRent, "AA", 50.0),
            record(ChargeKind::BaseRent, "BBB", -50.0),
        ];
        let out = apportion(records, &[total("BaseRent", 100.0)]);
        assert_eq!(out.diagnostics.len(), 2);
        assert!(out.diagnostics.iter().all(|r| r.portion.is_none()));
        assert_eq!(out.incomplete(), 2);
        assert!(opex_rows(&out).iter().all(|r| r.amount == 0.0));
    }

    #[test]
    fn test_existing_opex_skips() {
        let records = vec![
            record(ChargeKind::BaseRent, "AA", 80.0),
            record(ChargeKind::OperatingExpenses, "AA", 5.0),
        ];
        let out = apportion(records.clone(), &[total("OperatingExpenses", 50.0)]);
        assert!(out.skipped);
        assert_eq!(out.records, records);
    }

    proptest! {
        #[test]
        fn prop_portions_sum_to_one(amounts in prop::collection::vec(1.0f64..1e6, 1..6)) {
            let ratings = ["AAA", "AA", "A", "BBB", "BB", "B"];
            let records: Vec<_> = amounts
                .iter()
                .zip(ratings)
                .map(|(a, r)| record(ChargeKind::BaseRent, r, *a))
                .collect();
            let totals = [total("BaseRent", 1e7), total("OperatingExpenses", 1.0)];
            let out = apportion(records, &totals);
            let sum: f64 = out.diagnostics.iter().filter_map(|r| r.portion).sum();
            prop_assert!((sum - 1.0).abs() < 1e-6);
        }
    }
}
