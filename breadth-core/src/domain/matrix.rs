//! PriceMatrix: closing prices keyed by (date, ticker).
//!
//! Rows are the union of every constituent's dates, sorted ascending.
//! Columns are tickers. A missing cell (not yet listed, delisted, or a gap)
//! is strict NaN; there is no forward-fill.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    /// One column per ticker, each the same length as `dates`.
    columns: Vec<Vec<f64>>,
}

impl PriceMatrix {
    /// Assemble a matrix from already-aligned columns.
    ///
    /// Panics if a column's length differs from the date axis; the builder in
    /// `data::align` is the intended constructor.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        assert_eq!(tickers.len(), columns.len(), "one column per ticker");
        for column in &columns {
            assert_eq!(column.len(), dates.len(), "column length must match date axis");
        }
        Self {
            dates,
            tickers,
            columns,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() || self.dates.is_empty()
    }

    /// Number of tickers with a price on each date.
    ///
    /// This is the denominator for every per-date breadth ratio.
    pub fn counts_with_data(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.dates.len()];
        for column in &self.columns {
            for (count, value) in counts.iter_mut().zip(column) {
                if !value.is_nan() {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Deterministic BLAKE3 hash over dates, tickers and every cell.
    ///
    /// Tickers are already in sorted order, so the hash does not depend on
    /// the order the provider returned them in.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for date in &self.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for (ticker, column) in self.tickers.iter().zip(&self.columns) {
            hasher.update(ticker.as_bytes());
            for value in column {
                hasher.update(&value.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> PriceMatrix {
        PriceMatrix::from_columns(
            vec![d(2), d(3), d(4)],
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0, 3.0], vec![f64::NAN, 5.0, f64::NAN]],
        )
    }

    #[test]
    fn counts_skip_missing_cells() {
        assert_eq!(sample().counts_with_data(), vec![1, 2, 1]);
    }

    #[test]
    fn column_lookup_by_ticker() {
        let m = sample();
        assert_eq!(m.column("A"), Some(&[1.0, 2.0, 3.0][..]));
        assert!(m.column("Z").is_none());
    }

    #[test]
    fn empty_matrix_reports_empty() {
        let m = PriceMatrix::empty();
        assert!(m.is_empty());
        assert!(m.counts_with_data().is_empty());
    }

    #[test]
    fn dataset_hash_is_stable() {
        assert_eq!(sample().dataset_hash(), sample().dataset_hash());
        let other = PriceMatrix::from_columns(
            vec![d(2), d(3), d(4)],
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0, 3.5], vec![f64::NAN, 5.0, f64::NAN]],
        );
        assert_ne!(sample().dataset_hash(), other.dataset_hash());
    }

    #[test]
    #[should_panic(expected = "column length must match date axis")]
    fn mismatched_column_panics() {
        PriceMatrix::from_columns(vec![d(2)], vec!["A".into()], vec![vec![1.0, 2.0]]);
    }
}
