//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, a
//! directory of CSV files, synthetic data) so the runner can swap
//! implementations and tests can run offline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

/// Structured error types for per-ticker fetches.
///
/// These never reach the breadth engine: the fetch adapter records them in
/// a report and drops the ticker.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("csv error for '{ticker}': {reason}")]
    Csv { ticker: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for price providers.
///
/// Implementations return one ticker's closing prices over a date range.
/// They are shared across the fetch thread pool, hence `Send + Sync`.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Which `DataSource` tag series from this provider carry.
    fn source(&self) -> DataSource;

    /// Fetch daily closes for a ticker over `[start, end]`.
    ///
    /// Network providers return a sorted series free of duplicate dates.
    /// File-backed providers pass rows through as stored; an unsorted or
    /// duplicated file is rejected later by `build_price_matrix`.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Progress callback for multi-ticker operations.
pub trait DownloadProgress: Send + Sync {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker fetch completes.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<(), String>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that logs through `tracing`.
pub struct TracingProgress;

impl DownloadProgress for TracingProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] fetching {ticker}", index + 1, total);
    }

    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<(), String>) {
        match result {
            Ok(()) => tracing::debug!("[{}/{}] ok: {ticker}", index + 1, total),
            Err(e) => tracing::warn!("[{}/{}] dropping {ticker}: {e}", index + 1, total),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!("download complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that does nothing; used by tests and library callers.
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _ticker: &str, _index: usize, _total: usize, _result: &Result<(), String>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
