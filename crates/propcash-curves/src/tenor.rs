//! Tenor extraction from curve instrument mnemonics.
//!
//! Mnemonics embed the tenor after an instrument marker, e.g. `AUDSwap10Y`,
//! `AUDBILL3M`, `JPY_OIS_ON`, `AUD_OIS_2W`. Markers are matched
//! case-insensitively.

use crate::error::{CurveError, CurveResult};

const MARKERS: [&str; 3] = ["SWAP", "BILL", "_OIS_"];

/// Overnight tenor in years.
pub const OVERNIGHT: f64 = 1.0 / 365.0;

/// Parses the tenor, in years, encoded in an instrument mnemonic.
///
/// | Suffix | Years |
/// |--------|-------|
/// | `nM`   | n / 12 |
/// | `nY`   | n |
/// | `ON`   | 1 / 365 |
/// | `nW`   | n / 52 |
///
/// # Errors
///
/// Returns `CurveError::UnparseableTenor` if no marker is present or the
/// remainder is not a recognised period.
///
/// # Example
///
/// ```rust
/// use propcash_curves::tenor::parse_tenor;
///
/// assert_eq!(parse_tenor("AUDSwap10Y").unwrap(), 10.0);
/// assert_eq!(parse_tenor("AUDBILL3M").unwrap(), 0.25);
/// ```
pub fn parse_tenor(mnemonic: &str) -> CurveResult<f64> {
    let upper = mnemonic.to_ascii_uppercase();
    let period = MARKERS
        .iter()
        .find_map(|marker| upper.find(marker).map(|pos| &upper[pos + marker.len()..]))
        .map(str::trim)
        .ok_or_else(|| CurveError::unparseable_tenor(mnemonic))?;

    if period.starts_with("ON") {
        return Ok(OVERNIGHT);
    }

    let digits_end = period
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| CurveError::unparseable_tenor(mnemonic))?;
    let count: f64 = period[..digits_end]
        .parse()
        .map_err(|_| CurveError::unparseable_tenor(mnemonic))?;

    match period[digits_end..].chars().next() {
        Some('M') => Ok(count / 12.0),
        Some('Y') => Ok(count),
        Some('W') => Ok(count / 52.0),
        _ => Err(CurveError::unparseable_tenor(mnemonic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_swap_tenors() {
        assert_eq!(parse_tenor("AUDSwap10Y").unwrap(), 10.0);
        assert_eq!(parse_tenor("JPYSWAP 30Y").unwrap(), 30.0);
        assert_relative_eq!(parse_tenor("AUDSwap18M").unwrap(), 1.5);
    }

    #[test]
    fn test_bill_and_ois_tenors() {
        assert_relative_eq!(parse_tenor("AUDBILL3M").unwrap(), 0.25);
        assert_relative_eq!(parse_tenor("audbill6m").unwrap(), 0.5);
        assert_relative_eq!(parse_tenor("JPY_OIS_ON").unwrap(), 1.0 / 365.0);
        assert_relative_eq!(parse_tenor("AUD_OIS_2W").unwrap(), 2.0 / 52.0);
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_tenor("AUDCASH").is_err());
        assert!(parse_tenor("AUDSwap").is_err());
        assert!(parse_tenor("AUDSwapXY").is_err());
        assert!(parse_tenor("AUDSwap10Q").is_err());
    }
}
