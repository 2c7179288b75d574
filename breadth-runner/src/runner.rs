//! Pipeline runner: fetch, align, compute, window, persist, render, narrate.
//!
//! Two entry points:
//! - `run_pipeline()`: the full run, from a universe to files on disk. Used by the CLI.
//! - `compute_breadth()`: already-fetched series to processed tables, no I/O.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use breadth_core::data::{
    build_price_matrix, CircuitBreaker, CsvDirProvider, DataError, DownloadProgress,
    PriceProvider, SyntheticProvider, Universe, UniverseError, YahooProvider,
};
use breadth_core::domain::{MatrixError, PriceMatrix, PriceSeries};
use breadth_core::{BreadthEngine, BreadthError, PostProcessor, ProcessedBreadth};

use crate::chart::{breadth_charts, ChartRenderer};
use crate::config::{ConfigError, PipelineConfig, ProviderKind};
use crate::fetch::{fetch_universe, FetchError};
use crate::manifest::{RunManifest, SCHEMA_VERSION};
use crate::snapshot::{SnapshotError, SnapshotWriter};
use crate::summary::{latest_rows, NarrativeSummarizer};

pub const SUMMARY_FILE: &str = "summary.md";

/// Errors that abort a run. Chart and summary failures are not among them.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),
    #[error("provider error: {0}")]
    Provider(#[from] DataError),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MatrixError),
    #[error("engine error: {0}")]
    Engine(#[from] BreadthError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// The external collaborators a run talks to.
pub struct Collaborators<'a> {
    pub provider: &'a dyn PriceProvider,
    pub renderer: Option<&'a dyn ChartRenderer>,
    pub summarizer: &'a dyn NarrativeSummarizer,
    pub progress: &'a dyn DownloadProgress,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub manifest: RunManifest,
    pub output_dir: PathBuf,
    pub processed: ProcessedBreadth,
}

/// Universe named by the config: the file if one is set, else the built-in
/// universe for the market.
pub fn resolve_universe(config: &PipelineConfig) -> Result<Universe, UniverseError> {
    match &config.pipeline.universe_file {
        Some(path) => Universe::from_file(path),
        None => Universe::builtin(&config.pipeline.market),
    }
}

/// Price provider named by the config.
pub fn build_provider(config: &PipelineConfig) -> Result<Box<dyn PriceProvider>, RunError> {
    let provider: Box<dyn PriceProvider> = match config.provider.kind {
        ProviderKind::Yahoo => Box::new(YahooProvider::new(Arc::new(
            CircuitBreaker::default_provider(),
        ))?),
        ProviderKind::CsvDir => {
            let dir = config
                .provider
                .csv_dir
                .clone()
                .ok_or(ConfigError::MissingCsvDir)?;
            Box::new(CsvDirProvider::new(dir))
        }
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new()),
    };
    Ok(provider)
}

/// Align, compute and window already-fetched series.
pub fn compute_breadth(
    config: &PipelineConfig,
    series: Vec<PriceSeries>,
) -> Result<(PriceMatrix, ProcessedBreadth), RunError> {
    let p = &config.pipeline;
    let matrix = build_price_matrix(series)?;
    let engine = BreadthEngine::new(p.ma_periods.clone(), p.high_low_window)?;
    let raw = engine.compute(&matrix);
    let processed = PostProcessor::new(p.smoothing_window, p.display_start)?.process(&raw);
    Ok((matrix, processed))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn render_charts(
    renderer: &dyn ChartRenderer,
    config: &PipelineConfig,
    market: &str,
    processed: &ProcessedBreadth,
) -> Vec<String> {
    let p = &config.pipeline;
    let charts = breadth_charts(
        market,
        processed,
        &p.ma_periods,
        p.smoothing_window,
        p.display_start,
    );
    let mut written = Vec::with_capacity(charts.len());
    for chart in &charts {
        match renderer.render(chart, &config.output.dir) {
            Ok(path) => written.push(file_name(&path)),
            Err(e) => warn!(
                chart = %chart.file_name,
                renderer = renderer.name(),
                "chart failed: {e}"
            ),
        }
    }
    written
}

fn write_summary(
    summarizer: &dyn NarrativeSummarizer,
    market: &str,
    processed: &ProcessedBreadth,
    dir: &Path,
) -> Option<String> {
    let latest = latest_rows(processed);
    let text = match summarizer.summarize(market, &latest) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!(summarizer = summarizer.name(), "summary failed: {e}");
            return None;
        }
    };

    let heading = match processed.sma.raw.dates().last() {
        Some(date) => format!("# {market} market breadth, {date}\n\n"),
        None => format!("# {market} market breadth\n\n"),
    };
    let path = dir.join(SUMMARY_FILE);
    match std::fs::write(&path, format!("{heading}{}\n", text.trim_end())) {
        Ok(()) => Some(SUMMARY_FILE.to_string()),
        Err(e) => {
            warn!(path = %path.display(), "could not write summary: {e}");
            None
        }
    }
}

/// Run the whole pipeline for `universe`, fetching through `end`.
pub fn run_pipeline(
    config: &PipelineConfig,
    universe: &Universe,
    end: NaiveDate,
    with: &Collaborators<'_>,
) -> Result<RunSummary, RunError> {
    config.validate()?;
    let p = &config.pipeline;

    let (series, fetch) = fetch_universe(
        with.provider,
        universe,
        p.history_start,
        end,
        config.provider.parallelism,
        with.progress,
    )?;
    if fetch.success_count() == 0 && fetch.requested > 0 {
        warn!(requested = fetch.requested, "no ticker fetched; outputs will be empty");
    }

    let (matrix, processed) = compute_breadth(config, series)?;
    info!(
        tickers = matrix.ticker_count(),
        rows = matrix.row_count(),
        displayed = processed.row_count(),
        "breadth computed"
    );

    let writer = SnapshotWriter::new(&config.output.dir, config.output.format);
    let snapshots = writer.write_all(&processed)?;

    let charts = match with.renderer {
        Some(renderer) if config.output.charts => {
            render_charts(renderer, config, &universe.market, &processed)
        }
        _ => Vec::new(),
    };

    let summary = write_summary(with.summarizer, &universe.market, &processed, writer.dir());

    let mut effective = config.clone();
    effective.pipeline.end = Some(end);
    let dates = processed.sma.raw.dates();
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        market: universe.market.clone(),
        config: effective,
        provider: with.provider.name().to_string(),
        data_source: with.provider.source(),
        dataset_hash: matrix.dataset_hash(),
        ticker_count: matrix.ticker_count(),
        rows_total: matrix.row_count(),
        rows_displayed: processed.row_count(),
        first_displayed: dates.first().copied(),
        last_displayed: dates.last().copied(),
        fetch,
        snapshots: snapshots.iter().map(|path| file_name(path)).collect(),
        charts,
        summary,
    };
    manifest.write(writer.dir())?;

    info!(
        dir = %writer.dir().display(),
        snapshots = manifest.snapshots.len(),
        charts = manifest.charts.len(),
        "run complete"
    );

    Ok(RunSummary {
        manifest,
        output_dir: writer.dir().to_path_buf(),
        processed,
    })
}
