//! Advance–decline counts and the cumulative AD line.
//!
//! The daily change of a ticker is its close minus the previous row's close.
//! If either is missing the change is undefined and the ticker counts toward
//! neither side. The AD line is accumulated over the full history; callers
//! window it afterwards.

use crate::domain::{PriceMatrix, SeriesTable};
use rayon::prelude::*;

pub const ADVANCES: &str = "advances";
pub const DECLINES: &str = "declines";
pub const NET_ADVANCES: &str = "net_advances";
pub const AD_LINE: &str = "ad_line";

/// Per-row (advances, declines) across all tickers.
fn count_moves(matrix: &PriceMatrix) -> Vec<(usize, usize)> {
    let rows = matrix.row_count();

    matrix
        .columns()
        .par_iter()
        .map(|closes| {
            let mut moves = vec![(0usize, 0usize); rows];
            for (i, pair) in closes.windows(2).enumerate() {
                let change = pair[1] - pair[0];
                if change > 0.0 {
                    moves[i + 1].0 = 1;
                } else if change < 0.0 {
                    moves[i + 1].1 = 1;
                }
            }
            moves
        })
        .reduce(
            || vec![(0, 0); rows],
            |mut acc, column| {
                for (a, c) in acc.iter_mut().zip(&column) {
                    a.0 += c.0;
                    a.1 += c.1;
                }
                acc
            },
        )
}

/// `advances`, `declines`, `net_advances` and the running `ad_line`.
pub fn advance_decline(matrix: &PriceMatrix) -> SeriesTable {
    let moves = count_moves(matrix);
    let advances: Vec<f64> = moves.iter().map(|m| m.0 as f64).collect();
    let declines: Vec<f64> = moves.iter().map(|m| m.1 as f64).collect();
    let net: Vec<f64> = advances.iter().zip(&declines).map(|(a, d)| a - d).collect();

    let ad_line = net
        .iter()
        .scan(0.0, |running, n| {
            *running += n;
            Some(*running)
        })
        .collect();

    SeriesTable::new("advance_decline", matrix.dates().to_vec())
        .with_column(ADVANCES, advances)
        .with_column(DECLINES, declines)
        .with_column(NET_ADVANCES, net)
        .with_column(AD_LINE, ad_line)
}
