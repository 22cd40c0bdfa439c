//! Coarse benchmark rates: one instrument yield per curve bucket.

use std::collections::BTreeMap;

use propcash_core::types::{BenchmarkQuote, Date};
use tracing::warn;

use crate::region::RegionAliases;

/// The observation selected for a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRate {
    /// Instrument identifier.
    pub identifier: String,
    /// Observation date.
    pub date: Date,
    /// Observed yield.
    pub rate: f64,
}

/// Latest benchmark yield per curve bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkRates {
    rates: BTreeMap<String, BenchmarkRate>,
}

impl BenchmarkRates {
    /// Selects, for each bucket's identifier, the latest observation strictly
    /// before `before`. On a tie the first observation wins.
    ///
    /// `identifiers` maps bucket (e.g. `AUD`) to instrument identifier
    /// (e.g. `ADSWAP10 Curncy`).
    pub fn select(
        quotes: &[BenchmarkQuote],
        before: Date,
        identifiers: &BTreeMap<String, String>,
    ) -> Self {
        let mut rates = BTreeMap::new();
        for (bucket, identifier) in identifiers {
            let latest = quotes
                .iter()
                .filter(|q| q.identifier.trim() == identifier.trim() && q.date < before)
                .fold(None::<&BenchmarkQuote>, |best, q| match best {
                    Some(b) if b.date >= q.date => Some(b),
                    _ => Some(q),
                });
            match latest {
                Some(q) => {
                    rates.insert(
                        bucket.clone(),
                        BenchmarkRate {
                            identifier: identifier.clone(),
                            date: q.date,
                            rate: q.rate,
                        },
                    );
                }
                None => warn!(%bucket, %identifier, %before, "no benchmark observation"),
            }
        }
        Self { rates }
    }

    /// Rate for a bucket.
    #[must_use]
    pub fn rate(&self, bucket: &str) -> Option<f64> {
        self.rates.get(bucket).map(|r| r.rate)
    }

    /// Rate for a region code, resolved through `aliases`.
    #[must_use]
    pub fn for_region(&self, region: &str, aliases: &RegionAliases) -> Option<f64> {
        self.rate(aliases.resolve(region)?)
    }

    /// Selected observation for a bucket.
    #[must_use]
    pub fn get(&self, bucket: &str) -> Option<&BenchmarkRate> {
        self.rates.get(bucket)
    }

    /// Number of buckets with a rate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether no bucket has a rate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
