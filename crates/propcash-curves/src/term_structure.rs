//! Per-bucket zero curves built from a detailed curve snapshot.

use std::collections::BTreeMap;

use propcash_core::types::{CurveQuote, Date};
use tracing::{debug, warn};

use crate::error::CurveResult;
use crate::interpolation::LinearInterpolator;
use crate::region::RegionAliases;
use crate::tenor::parse_tenor;

/// Lookup of a risk-free rate for a region and horizon.
pub trait RateLookup {
    /// Rate for `region` at `t` years, or `None` when the region has no curve.
    fn rate(&self, region: &str, t: f64) -> Option<f64>;
}

/// A single pillar of a zero curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Tenor in years.
    pub tenor: f64,
    /// Mid rate.
    pub rate: f64,
}

/// Zero curve for one bucket on one snapshot date.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCurve {
    bucket: String,
    as_of: Date,
    interpolator: LinearInterpolator,
}

impl ZeroCurve {
    /// Builds a curve from pillars. Pillars are sorted by tenor and, for
    /// equal tenors, the first one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable pillar remains.
    pub fn from_points(
        bucket: impl Into<String>,
        as_of: Date,
        mut points: Vec<CurvePoint>,
    ) -> CurveResult<Self> {
        points.sort_by(|a, b| a.tenor.total_cmp(&b.tenor));
        points.dedup_by(|later, first| later.tenor == first.tenor);
        let (tenors, rates): (Vec<f64>, Vec<f64>) =
            points.iter().map(|p| (p.tenor, p.rate)).unzip();
        Ok(Self {
            bucket: bucket.into(),
            as_of,
            interpolator: LinearInterpolator::new(tenors, rates)?,
        })
    }

    /// Curve bucket (e.g. `AUD`).
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Snapshot date.
    #[must_use]
    pub fn as_of(&self) -> Date {
        self.as_of
    }

    /// Interpolated rate at `t` years.
    #[must_use]
    pub fn rate(&self, t: f64) -> f64 {
        self.interpolator.rate(t)
    }

    /// Underlying interpolator.
    #[must_use]
    pub fn interpolator(&self) -> &LinearInterpolator {
        &self.interpolator
    }
}

/// All bucket curves for one snapshot, plus the alias table used to find
/// them.
#[derive(Debug, Clone)]
pub struct CurveSet {
    as_of: Option<Date>,
    curves: BTreeMap<String, ZeroCurve>,
    aliases: RegionAliases,
}

impl CurveSet {
    /// An empty set; every lookup returns `None`.
    #[must_use]
    pub fn empty(aliases: RegionAliases) -> Self {
        Self {
            as_of: None,
            curves: BTreeMap::new(),
            aliases,
        }
    }

    /// Builds curves from the latest snapshot on or before `as_at`.
    ///
    /// Each quote contributes its mid rate. Quotes whose mnemonic carries no
    /// tenor are skipped. A bucket whose points cannot form a curve is left
    /// out, so lookups for it return `None`.
    pub fn from_quotes(quotes: &[CurveQuote], as_at: Date, aliases: RegionAliases) -> Self {
        let Some(snapshot) = quotes.iter().map(|q| q.date).filter(|d| *d <= as_at).max() else {
            warn!(%as_at, "no detailed curve snapshot on or before as-at date");
            return Self::empty(aliases);
        };

        let mut points: BTreeMap<String, Vec<CurvePoint>> = BTreeMap::new();
        for quote in quotes.iter().filter(|q| q.date == snapshot) {
            let tenor = match parse_tenor(&quote.mnemonic) {
                Ok(t) => t,
                Err(e) => {
                    warn!(mnemonic = %quote.mnemonic, error = %e, "skipping curve quote");
                    continue;
                }
            };
            let bucket = aliases
                .resolve(&quote.base_ccy)
                .map_or_else(|| quote.base_ccy.trim().to_ascii_uppercase(), str::to_string);
            points.entry(bucket).or_default().push(CurvePoint {
                tenor,
                rate: quote.mid(),
            });
        }

        let mut curves = BTreeMap::new();
        for (bucket, pts) in points {
            match ZeroCurve::from_points(bucket.clone(), snapshot, pts) {
                Ok(curve) => {
                    debug!(
                        %bucket,
                        pillars = curve.interpolator().tenors().len(),
                        "built zero curve"
                    );
                    curves.insert(bucket, curve);
                }
                Err(e) => warn!(%bucket, error = %e, "dropping unusable curve"),
            }
        }

        Self {
            as_of: Some(snapshot),
            curves,
            aliases,
        }
    }

    /// Snapshot date, if any snapshot was found.
    #[must_use]
    pub fn as_of(&self) -> Option<Date> {
        self.as_of
    }

    /// Curve for a bucket name.
    #[must_use]
    pub fn curve(&self, bucket: &str) -> Option<&ZeroCurve> {
        self.curves.get(bucket)
    }

    /// Bucket names with a curve.
    pub fn buckets(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }
}

impl RateLookup for CurveSet {
    fn rate(&self, region: &str, t: f64) -> Option<f64> {
        let bucket = self.aliases.resolve(region)?;
        self.curves.get(bucket).map(|c| c.rate(t))
    }
}
