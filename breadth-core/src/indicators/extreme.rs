//! Rolling extreme: highest or lowest value over a trailing window.
//!
//! Produces one series per instance:
//! - Max: max(values[t-period+1..=t])
//! - Min: min(values[t-period+1..=t])
//!
//! The result is always one of the window's own values, so an exact `==`
//! against the current value is a valid "is today the extreme" test.
//!
//! Lookback: period - 1.

use super::RollingIndicator;

/// Which extreme of the window to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

#[derive(Debug, Clone)]
pub struct RollingExtreme {
    period: usize,
    extreme: Extreme,
    name: String,
}

impl RollingExtreme {
    pub fn max(period: usize) -> Self {
        assert!(period >= 1, "rolling max period must be >= 1");
        Self {
            period,
            extreme: Extreme::Max,
            name: format!("rolling_max_{period}"),
        }
    }

    pub fn min(period: usize) -> Self {
        assert!(period >= 1, "rolling min period must be >= 1");
        Self {
            period,
            extreme: Extreme::Min,
            name: format!("rolling_min_{period}"),
        }
    }
}

impl RollingIndicator for RollingExtreme {
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

        for i in (self.period - 1)..n {
            let window = &values[(i + 1 - self.period)..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            result[i] = match self.extreme {
                Extreme::Max => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Extreme::Min => window.iter().copied().fold(f64::INFINITY, f64::min),
            };
        }

        result
    }
}
