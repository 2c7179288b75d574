//! Breadth engine: three independent series families over one price matrix.
//!
//! - SMA breadth: percent of priced tickers above their own moving average
//! - High/low: new 52-week highs and lows, and their difference
//! - Advance–decline: daily advancers, decliners and the cumulative AD line
//!
//! The families share nothing but the input matrix and run in parallel.

pub mod advance_decline;
pub mod high_low;
pub mod sma_breadth;

pub use advance_decline::advance_decline;
pub use high_low::high_low;
pub use sma_breadth::sma_breadth;

use crate::domain::{PriceMatrix, SeriesTable};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreadthError {
    #[error("at least one moving-average period is required")]
    NoPeriods,

    #[error("moving-average period must be at least 1")]
    ZeroPeriod,

    #[error("duplicate moving-average period {0}")]
    DuplicatePeriod(usize),

    #[error("high/low window must be at least 1")]
    ZeroWindow,

    #[error("smoothing window must be at least 1")]
    ZeroSmoothingWindow,
}

/// Raw, full-history output of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct BreadthOutput {
    pub sma: SeriesTable,
    pub high_low: SeriesTable,
    pub advance_decline: SeriesTable,
}

#[derive(Debug, Clone)]
pub struct BreadthEngine {
    periods: Vec<usize>,
    high_low_window: usize,
}

impl BreadthEngine {
    pub fn new(periods: Vec<usize>, high_low_window: usize) -> Result<Self, BreadthError> {
        if periods.is_empty() {
            return Err(BreadthError::NoPeriods);
        }
        if periods.contains(&0) {
            return Err(BreadthError::ZeroPeriod);
        }
        for (i, p) in periods.iter().enumerate() {
            if periods[..i].contains(p) {
                return Err(BreadthError::DuplicatePeriod(*p));
            }
        }
        if high_low_window == 0 {
            return Err(BreadthError::ZeroWindow);
        }
        Ok(Self {
            periods,
            high_low_window,
        })
    }

    /// Periods 20/60/120/200 and a 252-row high/low window.
    pub fn standard() -> Self {
        Self {
            periods: vec![20, 60, 120, 200],
            high_low_window: high_low::DEFAULT_WINDOW,
        }
    }

    pub fn periods(&self) -> &[usize] {
        &self.periods
    }

    pub fn high_low_window(&self) -> usize {
        self.high_low_window
    }

    /// Compute all three families. An empty matrix yields zero-row tables
    /// that still carry their column names.
    pub fn compute(&self, matrix: &PriceMatrix) -> BreadthOutput {
        debug!(
            rows = matrix.row_count(),
            tickers = matrix.ticker_count(),
            "computing breadth"
        );

        let (sma, (high_low, advance_decline)) = rayon::join(
            || sma_breadth(matrix, &self.periods),
            || {
                rayon::join(
                    || high_low(matrix, self.high_low_window),
                    || advance_decline(matrix),
                )
            },
        );

        BreadthOutput {
            sma,
            high_low,
            advance_decline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(BreadthEngine::new(vec![], 252).unwrap_err(), BreadthError::NoPeriods);
        assert_eq!(
            BreadthEngine::new(vec![20, 0], 252).unwrap_err(),
            BreadthError::ZeroPeriod
        );
        assert_eq!(
            BreadthEngine::new(vec![20, 60, 20], 252).unwrap_err(),
            BreadthError::DuplicatePeriod(20)
        );
        assert_eq!(
            BreadthEngine::new(vec![20], 0).unwrap_err(),
            BreadthError::ZeroWindow
        );
    }

    #[test]
    fn empty_matrix_gives_empty_tables_with_columns() {
        let out = BreadthEngine::standard().compute(&PriceMatrix::empty());
        assert!(out.sma.is_empty());
        assert!(out.high_low.is_empty());
        assert!(out.advance_decline.is_empty());
        assert_eq!(
            out.sma.column_names(),
            vec!["above_20", "above_60", "above_120", "above_200"]
        );
        assert_eq!(out.high_low.column_names(), vec!["new_highs", "new_lows", "net"]);
        assert_eq!(
            out.advance_decline.column_names(),
            vec!["advances", "declines", "net_advances", "ad_line"]
        );
    }
}
