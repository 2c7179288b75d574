//! Multi-ticker time alignment.
//!
//! Given closing prices for many tickers, align them to a common timeline:
//! the union of every ticker's dates. Missing cells get strict NaN (no
//! forward-fill of price data).

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::{MatrixError, PriceMatrix, PriceSeries};

/// Build a price matrix from per-ticker series (an outer join on date).
///
/// Tickers become columns in sorted order so the matrix, and anything
/// derived from it, is independent of the order series were fetched in.
/// Series are validated first; the first malformed one aborts the build.
/// A series with no points is dropped: a ticker without prices is never a
/// column.
pub fn build_price_matrix(series: Vec<PriceSeries>) -> Result<PriceMatrix, MatrixError> {
    let series: Vec<PriceSeries> = series.into_iter().filter(|s| !s.is_empty()).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(series.len());
    for s in &series {
        if !seen.insert(s.ticker.as_str()) {
            return Err(MatrixError::DuplicateTicker(s.ticker.clone()));
        }
        s.validate()?;
    }

    // Collect the union of all dates
    let mut all_dates = BTreeSet::new();
    for s in &series {
        for point in &s.points {
            all_dates.insert(point.date);
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();
    let row_of: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut ordered: Vec<PriceSeries> = series;
    ordered.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let mut tickers = Vec::with_capacity(ordered.len());
    let mut columns = Vec::with_capacity(ordered.len());
    for s in ordered {
        let mut column = vec![f64::NAN; dates.len()];
        for point in &s.points {
            column[row_of[&point.date]] = point.close;
        }
        tickers.push(s.ticker);
        columns.push(column);
    }

    Ok(PriceMatrix::from_columns(dates, tickers, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn d(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    fn series(ticker: &str, points: &[(&str, f64)]) -> PriceSeries {
        PriceSeries::new(
            ticker,
            points
                .iter()
                .map(|(date, close)| PricePoint::new(d(date), *close))
                .collect(),
        )
    }

    #[test]
    fn align_fills_missing_with_nan() {
        let matrix = build_price_matrix(vec![
            series(
                "SPY",
                &[("2024-01-02", 100.0), ("2024-01-03", 101.0), ("2024-01-04", 102.0)],
            ),
            // QQQ missing 2024-01-03
            series("QQQ", &[("2024-01-02", 200.0), ("2024-01-04", 202.0)]),
        ])
        .unwrap();

        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.tickers(), &["QQQ".to_string(), "SPY".to_string()]);
        assert_eq!(matrix.column("SPY").unwrap()[1], 101.0);
        assert!(matrix.column("QQQ").unwrap()[1].is_nan());
    }

    #[test]
    fn rows_are_union_not_intersection() {
        let matrix = build_price_matrix(vec![
            series("A", &[("2024-01-02", 1.0), ("2024-01-03", 1.0)]),
            series("B", &[("2024-01-04", 2.0), ("2024-01-05", 2.0)]),
        ])
        .unwrap();
        assert_eq!(matrix.row_count(), 4);
        assert_eq!(matrix.counts_with_data(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn empty_input_builds_empty_matrix() {
        let matrix = build_price_matrix(Vec::new()).unwrap();
        assert!(matrix.is_empty());
        assert_eq!(matrix.row_count(), 0);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let err = build_price_matrix(vec![series(
            "A",
            &[("2024-01-02", 1.0), ("2024-01-02", 2.0)],
        )])
        .unwrap_err();
        assert!(matches!(err, MatrixError::DuplicateDate { .. }));
        assert!(err.to_string().contains("'A'"));
    }

    #[test]
    fn empty_series_is_not_a_column() {
        let matrix = build_price_matrix(vec![
            series("A", &[("2024-01-02", 1.0)]),
            PriceSeries::new("EMPTY", vec![]),
        ])
        .unwrap();
        assert_eq!(matrix.ticker_count(), 1);
        assert!(matrix.column("EMPTY").is_none());
        assert_eq!(
            matrix.dataset_hash(),
            build_price_matrix(vec![series("A", &[("2024-01-02", 1.0)])])
                .unwrap()
                .dataset_hash()
        );
    }

    #[test]
    fn duplicate_ticker_is_rejected() {
        let err = build_price_matrix(vec![
            series("A", &[("2024-01-02", 1.0)]),
            series("A", &[("2024-01-03", 1.0)]),
        ])
        .unwrap_err();
        assert_eq!(err, MatrixError::DuplicateTicker("A".into()));
    }

    #[test]
    fn input_order_does_not_change_matrix() {
        let a = series("A", &[("2024-01-02", 1.0), ("2024-01-03", 2.0)]);
        let b = series("B", &[("2024-01-03", 5.0)]);
        let m1 = build_price_matrix(vec![a.clone(), b.clone()]).unwrap();
        let m2 = build_price_matrix(vec![b, a]).unwrap();
        assert_eq!(m1.dataset_hash(), m2.dataset_hash());
    }
}
