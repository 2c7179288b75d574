//! Percentage of constituents trading above their own simple moving average.
//!
//! For each date, the denominator is the number of tickers with a price that
//! date. A ticker that is priced but has not yet accumulated `period`
//! consecutive observations has an undefined mean: it counts in the
//! denominator and never in the numerator.

use crate::domain::{PriceMatrix, SeriesTable};
use crate::indicators::{RollingIndicator, Sma};
use rayon::prelude::*;

/// Column name for the breadth series of one period.
pub fn column_name(period: usize) -> String {
    format!("above_{period}")
}

/// Percent of priced tickers whose close is strictly above their `period` SMA.
///
/// NaN where no ticker has a price (zero denominator).
pub fn percent_above(matrix: &PriceMatrix, period: usize) -> Vec<f64> {
    let sma = Sma::new(period);
    let rows = matrix.row_count();

    let above = matrix
        .columns()
        .par_iter()
        .map(|closes| {
            let means = sma.compute(closes);
            closes
                .iter()
                .zip(&means)
                .map(|(close, mean)| usize::from(close > mean))
                .collect::<Vec<_>>()
        })
        .reduce(
            || vec![0usize; rows],
            |mut acc, flags| {
                acc.iter_mut().zip(&flags).for_each(|(a, f)| *a += f);
                acc
            },
        );

    above
        .iter()
        .zip(matrix.counts_with_data())
        .map(|(&above, with_data)| {
            if with_data == 0 {
                f64::NAN
            } else {
                100.0 * above as f64 / with_data as f64
            }
        })
        .collect()
}

/// One `above_{p}` column per period, in the order given.
pub fn sma_breadth(matrix: &PriceMatrix, periods: &[usize]) -> SeriesTable {
    periods.iter().fold(
        SeriesTable::new("breadth_sma", matrix.dates().to_vec()),
        |table, &period| table.with_column(column_name(period), percent_above(matrix, period)),
    )
}
