//! CSV-directory price provider.
//!
//! Reads `{dir}/{TICKER}.csv` with a `date,close` header. Extra columns are
//! ignored, so exports from most charting tools work as-is. This is the
//! offline input path.

use super::provider::{DataError, DataSource, PriceProvider};
use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    close: Option<f64>,
}

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }
}

impl PriceProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    /// Rows are returned in file order. Rows with an empty close are skipped;
    /// duplicate or unsorted dates are left for the matrix builder to reject.
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            });
        }

        let csv_err = |reason: String| DataError::Csv {
            ticker: ticker.to_string(),
            reason,
        };

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| csv_err(format!("open {}: {e}", path.display())))?;

        let mut points = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| csv_err(format!("row {}: {e}", line + 2)))?;
            if row.date < start || row.date > end {
                continue;
            }
            if let Some(close) = row.close {
                points.push(PricePoint::new(row.date, close));
            }
        }

        if points.is_empty() {
            return Err(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            });
        }

        Ok(PriceSeries::new(ticker, points))
    }
}
