//! Linear interpolation with flat extrapolation.

use crate::error::{CurveError, CurveResult};

/// Linear interpolation between tenor points, flat beyond either end.
///
/// # Example
///
/// ```rust
/// use propcash_curves::interpolation::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(vec![1.0, 5.0], vec![0.01, 0.02]).unwrap();
/// assert!((interp.rate(3.0) - 0.015).abs() < 1e-12);
/// assert_eq!(interp.rate(0.5), 0.01);
/// assert_eq!(interp.rate(30.0), 0.02);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    tenors: Vec<f64>,
    rates: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points, the lengths differ, a value
    /// is not finite, or tenors are not strictly increasing.
    pub fn new(tenors: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        if tenors.is_empty() {
            return Err(CurveError::insufficient_points(1, 0));
        }
        if tenors.len() != rates.len() {
            return Err(CurveError::invalid_point(format!(
                "tenors ({}) and rates ({}) must have same length",
                tenors.len(),
                rates.len()
            )));
        }
        if let Some(bad) = tenors.iter().chain(&rates).find(|v| !v.is_finite()) {
            return Err(CurveError::invalid_point(format!("non-finite value {bad}")));
        }
        for i in 1..tenors.len() {
            if tenors[i] <= tenors[i - 1] {
                return Err(CurveError::non_monotonic_tenors(
                    i,
                    tenors[i - 1],
                    tenors[i],
                ));
            }
        }
        Ok(Self { tenors, rates })
    }

    /// Shortest tenor.
    #[must_use]
    pub fn min_tenor(&self) -> f64 {
        self.tenors[0]
    }

    /// Longest tenor.
    #[must_use]
    pub fn max_tenor(&self) -> f64 {
        self.tenors[self.tenors.len() - 1]
    }

    /// Tenor points.
    #[must_use]
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Segment index and weight of the upper point for a tenor strictly
    /// inside the curve and not on a pillar.
    #[must_use]
    pub fn weight(&self, t: f64) -> Option<(usize, f64)> {
        if !(t > self.min_tenor() && t < self.max_tenor()) {
            return None;
        }
        let upper = self.tenors.partition_point(|&x| x < t);
        if self.tenors[upper] == t {
            return None;
        }
        let lower = upper - 1;
        let w = (t - self.tenors[lower]) / (self.tenors[upper] - self.tenors[lower]);
        Some((lower, w))
    }

    /// Interpolated rate at tenor `t` (years).
    #[must_use]
    pub fn rate(&self, t: f64) -> f64 {
        if t <= self.min_tenor() {
            return self.rates[0];
        }
        if t >= self.max_tenor() {
            return self.rates[self.rates.len() - 1];
        }
        match self.weight(t) {
            Some((lower, w)) => self.rates[lower + 1] * w + self.rates[lower] * (1.0 - w),
            None => {
                let idx = self.tenors.partition_point(|&x| x < t);
                self.rates[idx]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn curve() -> LinearInterpolator {
        LinearInterpolator::new(vec![0.25, 1.0, 5.0, 10.0], vec![0.035, 0.01, 0.02, 0.03]).unwrap()
    }

    #[test]
    fn test_midpoint() {
        let interp = LinearInterpolator::new(vec![1.0, 5.0], vec![0.01, 0.02]).unwrap();
        assert_relative_eq!(interp.rate(3.0), 0.015, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_pillars() {
        let c = curve();
        assert_eq!(c.rate(0.25), 0.035);
        assert_eq!(c.rate(1.0), 0.01);
        assert_eq!(c.rate(5.0), 0.02);
        assert_eq!(c.rate(10.0), 0.03);
    }

    #[test]
    fn test_flat_extrapolation() {
        let c = curve();
        assert_eq!(c.rate(0.0), 0.035);
        assert_eq!(c.rate(40.0), 0.03);
    }

    #[test]
    fn test_single_point_is_flat() {
        let c = LinearInterpolator::new(vec![2.0], vec![0.04]).unwrap();
        assert_eq!(c.rate(0.0), 0.04);
        assert_eq!(c.rate(2.0), 0.04);
        assert_eq!(c.rate(9.0), 0.04);
        assert!(c.weight(1.0).is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(LinearInterpolator::new(vec![], vec![]).is_err());
        assert!(LinearInterpolator::new(vec![1.0, 2.0], vec![0.01]).is_err());
        assert!(LinearInterpolator::new(vec![2.0, 1.0], vec![0.01, 0.02]).is_err());
        assert!(LinearInterpolator::new(vec![1.0, 1.0], vec![0.01, 0.02]).is_err());
        assert!(LinearInterpolator::new(vec![1.0, 2.0], vec![f64::NAN, 0.02]).is_err());
    }

    proptest! {
        #[test]
        fn prop_weight_in_unit_interval(t in 0.2501f64..9.9999) {
            let c = curve();
            if let Some((lower, w)) = c.weight(t) {
                prop_assert!((0.0..=1.0).contains(&w));
                prop_assert!(c.tenors()[lower] < t && t < c.tenors()[lower + 1]);
            }
        }

        #[test]
        fn prop_rate_within_segment_bounds(t in 0.0f64..20.0) {
            let c = curve();
            let r = c.rate(t);
            prop_assert!((0.01..=0.035).contains(&r));
        }
    }
}
