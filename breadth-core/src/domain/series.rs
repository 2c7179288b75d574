//! PriceSeries: one ticker's daily closing prices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single (date, close) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices for one ticker, ordered by date.
///
/// Produced by a price provider and never mutated afterwards. A ticker whose
/// fetch failed is simply not represented; there is no "all missing" series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

/// Reasons a series (or a set of series) cannot enter the price matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("malformed series for '{ticker}': duplicate date {date}")]
    DuplicateDate { ticker: String, date: NaiveDate },

    #[error("malformed series for '{ticker}': {date} follows {previous} (dates must increase)")]
    UnsortedDates {
        ticker: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("malformed series for '{ticker}': non-finite close on {date}")]
    NonFiniteClose { ticker: String, date: NaiveDate },

    #[error("ticker '{0}' supplied more than once")]
    DuplicateTicker(String),
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Check the well-formedness the matrix builder relies on: strictly
    /// increasing dates and finite closes.
    pub fn validate(&self) -> Result<(), MatrixError> {
        let mut previous: Option<NaiveDate> = None;
        for point in &self.points {
            if !point.close.is_finite() {
                return Err(MatrixError::NonFiniteClose {
                    ticker: self.ticker.clone(),
                    date: point.date,
                });
            }
            if let Some(prev) = previous {
                if point.date == prev {
                    return Err(MatrixError::DuplicateDate {
                        ticker: self.ticker.clone(),
                        date: point.date,
                    });
                }
                if point.date < prev {
                    return Err(MatrixError::UnsortedDates {
                        ticker: self.ticker.clone(),
                        previous: prev,
                        date: point.date,
                    });
                }
            }
            previous = Some(point.date);
        }
        Ok(())
    }

    /// Sort by date and keep the last observation for any repeated date.
    ///
    /// Providers call this before handing a series to the core.
    pub fn normalized(mut self) -> Self {
        self.points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(self.points.len());
        for point in self.points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        self.points = deduped;
        self
    }
}
