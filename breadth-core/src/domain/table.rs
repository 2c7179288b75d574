//! SeriesTable: a date-indexed table of named numeric columns.
//!
//! Every engine output, smoothed companion and persisted snapshot is a
//! `SeriesTable`. Undefined values (warmup, zero denominator) are NaN.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::{RollingIndicator, Sma};

/// A named column of values aligned to the table's date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    name: String,
    dates: Vec<NaiveDate>,
    columns: Vec<SeriesColumn>,
}

impl SeriesTable {
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            dates,
            columns: Vec::new(),
        }
    }

    /// Append a column. Panics if its length differs from the date index.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        let name = name.into();
        assert_eq!(
            values.len(),
            self.dates.len(),
            "column '{name}' length must match the date index"
        );
        self.columns.push(SeriesColumn { name, values });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rename the table, keeping its contents.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Keep only the named columns, in the order given. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> SeriesTable {
        let mut out = SeriesTable::new(self.name.clone(), self.dates.clone());
        for name in names {
            if let Some(values) = self.column(name) {
                out = out.with_column(*name, values.to_vec());
            }
        }
        out
    }

    /// Trailing simple moving average of every column, over the full index.
    pub fn rolling_mean(&self, window: usize) -> SeriesTable {
        let sma = Sma::new(window);
        let mut out = SeriesTable::new(self.name.clone(), self.dates.clone());
        for column in &self.columns {
            out = out.with_column(column.name.clone(), sma.compute(&column.values));
        }
        out
    }

    /// Rows with `date >= start`. Dates are ascending, so this is a suffix.
    pub fn since(&self, start: NaiveDate) -> SeriesTable {
        let first = self.dates.partition_point(|d| *d < start);
        SeriesTable {
            name: self.name.clone(),
            dates: self.dates[first..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| SeriesColumn {
                    name: c.name.clone(),
                    values: c.values[first..].to_vec(),
                })
                .collect(),
        }
    }

    /// The most recent row as (date, [(column, value)]).
    pub fn latest_row(&self) -> Option<(NaiveDate, Vec<(&str, f64)>)> {
        let last = self.dates.len().checked_sub(1)?;
        let values = self
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.values[last]))
            .collect();
        Some((self.dates[last], values))
    }

    /// (date, value) pairs for one column, skipping undefined values.
    pub fn points(&self, name: &str) -> Vec<(NaiveDate, f64)> {
        self.column(name)
            .map(|values| {
                self.dates
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| !v.is_nan())
                    .map(|(d, v)| (*d, *v))
                    .collect()
            })
            .unwrap_or_default()
    }
}
