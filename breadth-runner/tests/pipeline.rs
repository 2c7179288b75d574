//! End-to-end pipeline runs against offline providers.

use breadth_core::data::{CsvDirProvider, SilentProgress, SyntheticProvider, Universe};
use breadth_runner::summary::latest_rows;
use breadth_runner::{
    run_pipeline, Collaborators, NarrativeSummarizer, NoopSummarizer, PipelineConfig,
    PlotlyHtmlRenderer, RunManifest, SnapshotFormat, SummaryError, MANIFEST_FILE, SUMMARY_FILE,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

// ── Helpers ──────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.pipeline.market = "TEST".into();
    config.pipeline.history_start = d(2022, 1, 1);
    config.pipeline.display_start = d(2023, 6, 1);
    config.output.dir = dir.to_path_buf();
    config.provider.parallelism = 2;
    config
}

fn universe(tickers: &[&str]) -> Universe {
    Universe {
        market: "TEST".into(),
        symbol_suffix: None,
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
    }
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

const SNAPSHOTS: [&str; 5] = [
    "breadth_sma.csv",
    "breadth_sma_smoothed.csv",
    "high_low_52w.csv",
    "advance_decline.csv",
    "advance_decline_smoothed.csv",
];

struct Fixed(&'static str);

impl NarrativeSummarizer for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn summarize(&self, _market: &str, latest: &Value) -> Result<Option<String>, SummaryError> {
        assert!(latest.get("breadth_sma").is_some());
        Ok(Some(self.0.to_string()))
    }
}

struct Failing;

impl NarrativeSummarizer for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn summarize(&self, _market: &str, _latest: &Value) -> Result<Option<String>, SummaryError> {
        Err(SummaryError::Request("connection refused".into()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn synthetic_run_writes_snapshots_charts_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let renderer = PlotlyHtmlRenderer::new();
    let with = Collaborators {
        provider: &provider,
        renderer: Some(&renderer),
        summarizer: &NoopSummarizer,
        progress: &SilentProgress,
    };

    let run = run_pipeline(
        &config(dir.path()),
        &universe(&["AAA", "BBB", "CCC", "DDD"]),
        d(2023, 12, 31),
        &with,
    )
    .unwrap();

    for name in SNAPSHOTS {
        assert!(dir.path().join(name).exists(), "missing {name}");
    }
    for name in ["breadth_20.html", "breadth_200.html", "high_low_52w.html", "ad_line.html"] {
        assert!(dir.path().join(name).exists(), "missing {name}");
    }
    assert!(!dir.path().join(SUMMARY_FILE).exists());

    let manifest = RunManifest::from_json(&read(dir.path(), MANIFEST_FILE)).unwrap();
    assert_eq!(manifest, run.manifest);
    assert_eq!(manifest.ticker_count, 4);
    assert_eq!(manifest.fetch.success_count(), 4);
    assert_eq!(manifest.snapshots, SNAPSHOTS.to_vec());
    assert_eq!(manifest.charts.len(), 6);
    assert_eq!(manifest.config.pipeline.end, Some(d(2023, 12, 31)));
    assert!(manifest.first_displayed.unwrap() >= d(2023, 6, 1));
    assert!(manifest.rows_displayed < manifest.rows_total);

    let sma = read(dir.path(), "breadth_sma.csv");
    assert!(sma.starts_with("date,above_20,above_60,above_120,above_200\n"));
}

#[test]
fn rerun_on_identical_input_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &NoopSummarizer,
        progress: &SilentProgress,
    };
    let cfg = config(dir.path());
    let u = universe(&["AAA", "BBB", "CCC"]);

    run_pipeline(&cfg, &u, d(2023, 12, 31), &with).unwrap();
    let first: Vec<String> = SNAPSHOTS
        .iter()
        .chain([MANIFEST_FILE].iter())
        .map(|n| read(dir.path(), n))
        .collect();

    run_pipeline(&cfg, &u, d(2023, 12, 31), &with).unwrap();
    let second: Vec<String> = SNAPSHOTS
        .iter()
        .chain([MANIFEST_FILE].iter())
        .map(|n| read(dir.path(), n))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn empty_universe_yields_empty_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &NoopSummarizer,
        progress: &SilentProgress,
    };

    let run = run_pipeline(&config(dir.path()), &universe(&[]), d(2023, 12, 31), &with).unwrap();
    assert_eq!(run.manifest.rows_total, 0);
    assert_eq!(read(dir.path(), "high_low_52w.csv"), "date,new_highs,new_lows,net\n");
}

#[test]
fn failed_tickers_are_dropped_and_reported() {
    let prices = tempfile::tempdir().unwrap();
    let mut csv = String::from("date,close\n");
    let mut day = d(2023, 1, 2);
    for i in 0..300 {
        csv.push_str(&format!("{day},{}\n", 100 + i));
        day += chrono::Duration::days(1);
    }
    std::fs::write(prices.path().join("GOOD.csv"), csv).unwrap();

    let out = tempfile::tempdir().unwrap();
    let provider = CsvDirProvider::new(prices.path());
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &NoopSummarizer,
        progress: &SilentProgress,
    };
    let mut cfg = config(out.path());
    cfg.pipeline.history_start = d(2023, 1, 1);
    cfg.pipeline.display_start = d(2023, 10, 1);

    let run = run_pipeline(&cfg, &universe(&["GOOD", "GONE"]), d(2023, 12, 31), &with).unwrap();
    assert_eq!(run.manifest.ticker_count, 1);
    assert_eq!(run.manifest.fetch.succeeded, vec!["GOOD"]);
    assert_eq!(run.manifest.fetch.failed[0].ticker, "GONE");

    // One steadily rising ticker: every displayed row is a new high.
    let latest = latest_rows(&run.processed);
    assert_eq!(latest["high_low_52w"]["new_highs"], 1.0);
    assert_eq!(latest["breadth_sma"]["above_200"], 100.0);
}

#[test]
fn summary_is_written_when_produced() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let summarizer = Fixed("Breadth is broadening.");
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &summarizer,
        progress: &SilentProgress,
    };

    let run = run_pipeline(&config(dir.path()), &universe(&["AAA"]), d(2023, 12, 31), &with)
        .unwrap();
    assert_eq!(run.manifest.summary.as_deref(), Some(SUMMARY_FILE));
    let text = read(dir.path(), SUMMARY_FILE);
    assert!(text.starts_with("# TEST market breadth, 2023-12-29"));
    assert!(text.contains("Breadth is broadening."));
}

#[test]
fn summarizer_failure_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &Failing,
        progress: &SilentProgress,
    };

    let run = run_pipeline(&config(dir.path()), &universe(&["AAA"]), d(2023, 12, 31), &with)
        .unwrap();
    assert!(run.manifest.summary.is_none());
    assert!(dir.path().join("breadth_sma.csv").exists());
}

#[test]
fn parquet_format_writes_parquet_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SyntheticProvider::new();
    let with = Collaborators {
        provider: &provider,
        renderer: None,
        summarizer: &NoopSummarizer,
        progress: &SilentProgress,
    };
    let mut cfg = config(dir.path());
    cfg.output.format = SnapshotFormat::Parquet;

    let run = run_pipeline(&cfg, &universe(&["AAA", "BBB"]), d(2023, 12, 31), &with).unwrap();
    assert!(run.manifest.snapshots.iter().all(|s| s.ends_with(".parquet")));
    assert!(dir.path().join("advance_decline.parquet").exists());
}
