//! Synthetic price provider for demos and tests.
//!
//! Produces a deterministic random walk per ticker, seeded from a BLAKE3
//! hash of the ticker, over weekdays only. Each ticker is "listed" a
//! different number of days after `start` so the union calendar and the
//! per-date denominators are exercised. Results built on synthetic data are
//! tagged as such in the run manifest.

use super::provider::{DataError, DataSource, PriceProvider};
use crate::domain::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Largest listing delay, in calendar days after `start`.
    max_listing_delay: i64,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self {
            max_listing_delay: 120,
        }
    }

    pub fn with_max_listing_delay(mut self, days: i64) -> Self {
        self.max_listing_delay = days.max(0);
        self
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let delay = if self.max_listing_delay > 0 {
            rng.gen_range(0..=self.max_listing_delay)
        } else {
            0
        };
        let mut current = start + chrono::Duration::days(delay);
        let mut price: f64 = rng.gen_range(5_000.0..100_000.0_f64).round();
        let drift: f64 = rng.gen_range(-0.0004..0.0008);

        let mut points = Vec::new();
        while current <= end {
            let weekday = current.weekday();
            if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
                // Prices are rounded to whole units, so flat days occur naturally.
                let daily_return: f64 = drift + rng.gen_range(-0.025..0.025);
                price = (price * (1.0 + daily_return)).round().max(1.0);
                points.push(PricePoint::new(current, price));
            }
            current += chrono::Duration::days(1);
        }

        if points.is_empty() {
            return Err(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            });
        }

        Ok(PriceSeries::new(ticker, points))
    }
}
