//! Ownership scaling.

use propcash_core::types::AdjustedCashflow;
use tracing::info;

/// Output of [`scale_by_ownership`].
#[derive(Debug, Clone, Default)]
pub struct OwnershipOutcome {
    /// Rows with `CLCAmount` populated.
    pub rows: Vec<AdjustedCashflow>,
    /// Rows whose ownership interest is zero (typically unmapped properties).
    pub zero_ownership_rows: usize,
}

/// Sets `CLCAmount = Amount * OwnershipInterest` on every row, original and
/// `DmAdj` alike.
#[must_use]
pub fn scale_by_ownership(mut rows: Vec<AdjustedCashflow>) -> OwnershipOutcome {
    let mut zero_ownership_rows = 0;
    for row in &mut rows {
        if row.ownership_interest == 0.0 {
            zero_ownership_rows += 1;
        }
        row.clc_amount = row.record.amount * row.ownership_interest;
    }
    info!(rows = rows.len(), zero_ownership_rows, "scaled by ownership");
    OwnershipOutcome {
        rows,
        zero_ownership_rows,
    }
}
