//! Per-ticker fetching for a universe.
//!
//! Fetches fan out on a private rayon pool. Each ticker yields its own
//! result: successes become price series keyed by the universe ticker,
//! failures are recorded in a `FetchReport` and never reach the core.

use breadth_core::data::{DownloadProgress, PriceProvider, Universe};
use breadth_core::domain::PriceSeries;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build fetch thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub ticker: String,
    pub reason: String,
}

/// Outcome of fetching a universe, in universe order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub requested: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Fetch every ticker of `universe` in `[start, end]`.
///
/// Returned series carry the universe ticker, not the provider symbol.
pub fn fetch_universe(
    provider: &dyn PriceProvider,
    universe: &Universe,
    start: NaiveDate,
    end: NaiveDate,
    parallelism: usize,
    progress: &dyn DownloadProgress,
) -> Result<(Vec<PriceSeries>, FetchReport), FetchError> {
    let total = universe.tickers.len();
    info!(
        market = %universe.market,
        provider = provider.name(),
        tickers = total,
        %start,
        %end,
        "fetching prices"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism.max(1))
        .build()?;

    let results: Vec<Result<PriceSeries, String>> = pool.install(|| {
        universe
            .tickers
            .par_iter()
            .enumerate()
            .map(|(index, ticker)| {
                progress.on_start(ticker, index, total);
                let result = if provider.is_available() {
                    match provider.fetch(&universe.provider_symbol(ticker), start, end) {
                        Ok(s) if s.is_empty() => Err(format!("no prices between {start} and {end}")),
                        Ok(s) => Ok(PriceSeries::new(ticker.clone(), s.points)),
                        Err(e) => Err(e.to_string()),
                    }
                } else {
                    Err(format!("provider {} unavailable", provider.name()))
                };
                let status = result.as_ref().map(|_| ()).map_err(|e| e.clone());
                progress.on_complete(ticker, index, total, &status);
                result
            })
            .collect()
    });

    let mut series = Vec::with_capacity(results.len());
    let mut report = FetchReport {
        requested: total,
        ..FetchReport::default()
    };
    for (ticker, result) in universe.tickers.iter().zip(results) {
        match result {
            Ok(s) => {
                report.succeeded.push(ticker.clone());
                series.push(s);
            }
            Err(reason) => report.failed.push(FetchFailure {
                ticker: ticker.clone(),
                reason,
            }),
        }
    }

    progress.on_batch_complete(report.success_count(), report.failure_count(), total);
    Ok((series, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadth_core::data::{DataError, DataSource, SilentProgress};
    use breadth_core::domain::PricePoint;

    /// Provider that knows only symbols ending in ".OK", and answers
    /// symbols ending in ".EMPTY" with a series that has no points.
    struct Picky;

    impl PriceProvider for Picky {
        fn name(&self) -> &str {
            "picky"
        }

        fn source(&self) -> DataSource {
            DataSource::Synthetic
        }

        fn fetch(
            &self,
            ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, DataError> {
            if ticker.ends_with(".OK") {
                Ok(PriceSeries::new(ticker, vec![PricePoint::new(start, 1.0)]))
            } else if ticker.ends_with(".EMPTY") {
                Ok(PriceSeries::new(ticker, vec![]))
            } else {
                Err(DataError::TickerNotFound {
                    ticker: ticker.to_string(),
                })
            }
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn splits_successes_and_failures_in_universe_order() {
        let universe = Universe {
            market: "TEST".into(),
            symbol_suffix: Some(".OK".into()),
            tickers: vec!["B".into(), "A".into()],
        };
        let (series, report) =
            fetch_universe(&Picky, &universe, d(2), d(5), 2, &SilentProgress).unwrap();

        assert_eq!(report.requested, 2);
        assert_eq!(report.succeeded, vec!["B", "A"]);
        assert!(report.failed.is_empty());
        // Series carry the universe ticker, not the provider symbol.
        assert_eq!(series[0].ticker, "B");
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let universe = Universe {
            market: "TEST".into(),
            symbol_suffix: None,
            tickers: vec!["X".into(), "Y.OK".into()],
        };
        let (series, report) =
            fetch_universe(&Picky, &universe, d(2), d(5), 1, &SilentProgress).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].ticker, "X");
        assert!(report.failed[0].reason.contains("not found"));
    }

    #[test]
    fn empty_series_is_a_failure() {
        let universe = Universe {
            market: "TEST".into(),
            symbol_suffix: None,
            tickers: vec!["Y.OK".into(), "Z.EMPTY".into()],
        };
        let (series, report) =
            fetch_universe(&Picky, &universe, d(2), d(5), 2, &SilentProgress).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(report.succeeded, vec!["Y.OK"]);
        assert_eq!(report.failed[0].ticker, "Z.EMPTY");
        assert!(report.failed[0].reason.contains("no prices"));
    }
}
