//! 52-week new highs and new lows.
//!
//! A ticker makes a new high on a date when its close equals its own trailing
//! rolling max over `window` trading rows, including that date. The rolling
//! extreme is one of the window's own values, so exact equality is the test.

use crate::domain::{PriceMatrix, SeriesTable};
use crate::indicators::{RollingExtreme, RollingIndicator};
use rayon::prelude::*;

pub const NEW_HIGHS: &str = "new_highs";
pub const NEW_LOWS: &str = "new_lows";
pub const NET: &str = "net";

/// Trading rows in 52 weeks.
pub const DEFAULT_WINDOW: usize = 252;

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    highs: usize,
    lows: usize,
}

fn count_extremes(matrix: &PriceMatrix, window: usize) -> Vec<Counts> {
    let rolling_max = RollingExtreme::max(window);
    let rolling_min = RollingExtreme::min(window);
    let rows = matrix.row_count();

    matrix
        .columns()
        .par_iter()
        .map(|closes| {
            let highs = rolling_max.compute(closes);
            let lows = rolling_min.compute(closes);
            closes
                .iter()
                .zip(highs.iter().zip(&lows))
                .map(|(close, (high, low))| Counts {
                    highs: usize::from(close == high),
                    lows: usize::from(close == low),
                })
                .collect::<Vec<_>>()
        })
        .reduce(
            || vec![Counts::default(); rows],
            |mut acc, column| {
                for (a, c) in acc.iter_mut().zip(&column) {
                    a.highs += c.highs;
                    a.lows += c.lows;
                }
                acc
            },
        )
}

/// `new_highs`, `new_lows` and `net = new_highs - new_lows` per date.
pub fn high_low(matrix: &PriceMatrix, window: usize) -> SeriesTable {
    let counts = count_extremes(matrix, window);
    let highs: Vec<f64> = counts.iter().map(|c| c.highs as f64).collect();
    let lows: Vec<f64> = counts.iter().map(|c| c.lows as f64).collect();
    let net = highs.iter().zip(&lows).map(|(h, l)| h - l).collect();

    SeriesTable::new("high_low_52w", matrix.dates().to_vec())
        .with_column(NEW_HIGHS, highs)
        .with_column(NEW_LOWS, lows)
        .with_column(NET, net)
}
