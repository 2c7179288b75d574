//! Breadth Runner: pipeline orchestration around `breadth-core`.
//!
//! This crate provides:
//! - TOML pipeline configuration with validation
//! - Parallel per-ticker fetching with a failure report
//! - CSV/Parquet snapshots written atomically
//! - Plotly HTML charts behind a renderer trait
//! - An optional LLM narrative behind a summarizer trait
//! - The run manifest and the `run_pipeline` entry point

pub mod chart;
pub mod config;
pub mod fetch;
pub mod manifest;
pub mod runner;
pub mod snapshot;
pub mod summary;

pub use chart::{breadth_charts, Chart, ChartError, ChartRenderer, PlotlyHtmlRenderer};
pub use config::{ConfigError, PipelineConfig, ProviderKind};
pub use fetch::{fetch_universe, FetchError, FetchFailure, FetchReport};
pub use manifest::{RunManifest, MANIFEST_FILE};
pub use runner::{
    build_provider, compute_breadth, resolve_universe, run_pipeline, Collaborators, RunError,
    RunSummary, SUMMARY_FILE,
};
pub use snapshot::{SnapshotError, SnapshotFormat, SnapshotWriter};
pub use summary::{NarrativeSummarizer, NoopSummarizer, OpenAiSummarizer, SummaryError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn collaborators_are_send_sync() {
        assert_send::<PlotlyHtmlRenderer>();
        assert_sync::<PlotlyHtmlRenderer>();
        assert_send::<OpenAiSummarizer>();
        assert_sync::<OpenAiSummarizer>();
        assert_send::<NoopSummarizer>();
        assert_sync::<NoopSummarizer>();
    }

    #[test]
    fn reports_are_send_sync() {
        assert_send::<FetchReport>();
        assert_sync::<FetchReport>();
        assert_send::<RunManifest>();
        assert_sync::<RunManifest>();
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }
}
