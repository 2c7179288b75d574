//! Simple Moving Average (SMA).
//!
//! Mean of the trailing `period` values, including the current one.
//! Lookback: period - 1 (first valid value at index period-1).

use super::RollingIndicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl RollingIndicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        // Index of the most recent NaN seen so far; a window is defined only
        // when it starts after that index.
        let mut last_nan: Option<usize> = None;
        for (i, value) in values.iter().enumerate() {
            if value.is_nan() {
                last_nan = Some(i);
            }
            if i + 1 < self.period {
                continue;
            }
            let start = i + 1 - self.period;
            if last_nan.is_some_and(|j| j >= start) {
                continue;
            }
            // Each window is summed directly rather than rolled forward, so a
            // run of equal prices yields a mean exactly equal to the price.
            let sum: f64 = values[start..=i].iter().sum();
            result[i] = sum / self.period as f64;
        }

        result
    }
}
