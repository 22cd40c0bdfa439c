//! Year-fraction basis for time-to-cashflow calculations.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Mean Gregorian year length including leap-year drift.
pub const ACTUAL_365_2475: f64 = 365.2475;

/// Actual days divided by a fixed year length.
///
/// # Formula
///
/// $$\text{Year Fraction} = \frac{\text{Actual Days}}{\text{Days Per Year}}$$
///
/// The default basis is [`ACTUAL_365_2475`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearBasis {
    days_per_year: f64,
}

impl YearBasis {
    /// Creates a basis with the given year length.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `days_per_year` is not a positive
    /// finite number.
    pub fn new(days_per_year: f64) -> CoreResult<Self> {
        if !days_per_year.is_finite() || days_per_year <= 0.0 {
            return Err(CoreError::invalid_input(format!(
                "year basis must be positive, got {days_per_year}"
            )));
        }
        Ok(Self { days_per_year })
    }

    /// Days in one year.
    #[must_use]
    pub fn days_per_year(&self) -> f64 {
        self.days_per_year
    }

    /// Signed year fraction from `start` to `end`.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        start.days_until(end) as f64 / self.days_per_year
    }

    /// Years from `as_at` to `flow`, clamped at zero for flows on or before
    /// the as-at date.
    #[must_use]
    pub fn time_to(&self, as_at: Date, flow: Date) -> f64 {
        self.year_fraction(as_at, flow).max(0.0)
    }
}

impl Default for YearBasis {
    fn default() -> Self {
        Self {
            days_per_year: ACTUAL_365_2475,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_default_basis() {
        let basis = YearBasis::default();
        let a = Date::from_ymd(2025, 1, 1).unwrap();
        let b = Date::from_ymd(2026, 1, 1).unwrap();
        assert_relative_eq!(basis.year_fraction(a, b), 365.0 / 365.2475, epsilon = 1e-12);
    }

    #[test]
    fn test_time_to_clamps() {
        let basis = YearBasis::default();
        let as_at = Date::from_ymd(2025, 6, 30).unwrap();
        let past = Date::from_ymd(2025, 1, 1).unwrap();
        assert_eq!(basis.time_to(as_at, past), 0.0);
        assert_eq!(basis.time_to(as_at, as_at), 0.0);
    }

    #[test]
    fn test_rejects_bad_basis() {
        assert!(YearBasis::new(0.0).is_err());
        assert!(YearBasis::new(-365.0).is_err());
        assert!(YearBasis::new(f64::NAN).is_err());
        assert!(YearBasis::new(360.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_time_to_never_negative(offset in -20_000i64..20_000) {
            let basis = YearBasis::default();
            let as_at = Date::from_ymd(2025, 6, 30).unwrap();
            let flow = Date::from(
                as_at.as_naive_date() + chrono::Duration::days(offset),
            );
            prop_assert!(basis.time_to(as_at, flow) >= 0.0);
        }
    }
}
