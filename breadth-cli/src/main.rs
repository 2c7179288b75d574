//! Breadth CLI: pipeline runs, universe listing, config scaffolding.
//!
//! Commands:
//! - `run`: fetch a universe, compute breadth, write snapshots/charts/manifest
//! - `universe`: print the resolved universe as TOML
//! - `init-config`: print a default pipeline config as TOML

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use breadth_core::data::{TracingProgress, Universe};
use breadth_runner::config::SummarySection;
use breadth_runner::{
    build_provider, resolve_universe, run_pipeline, Collaborators, NarrativeSummarizer,
    NoopSummarizer, OpenAiSummarizer, PipelineConfig, PlotlyHtmlRenderer, ProviderKind,
    RunSummary,
};

#[derive(Parser)]
#[command(
    name = "breadth",
    about = "Market breadth pipeline: SMA breadth, 52-week highs/lows, advance-decline line"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Yahoo,
    Csv,
    Synthetic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Yahoo => ProviderKind::Yahoo,
            ProviderArg::Csv => ProviderKind::CsvDir,
            ProviderArg::Synthetic => ProviderKind::Synthetic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, compute breadth and write snapshots, charts and a manifest.
    Run {
        /// Path to a TOML pipeline config. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Market name for the built-in universe (KOSPI, US).
        #[arg(long)]
        market: Option<String>,

        /// Path to a TOML universe file; overrides --market.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// First date fetched (YYYY-MM-DD).
        #[arg(long)]
        history_start: Option<String>,

        /// First date kept in outputs (YYYY-MM-DD).
        #[arg(long)]
        display_start: Option<String>,

        /// Last date fetched (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Output directory for snapshots, charts and the manifest.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Price source.
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,

        /// Directory of `{TICKER}.csv` files (with --provider csv).
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Skip chart rendering.
        #[arg(long, default_value_t = false)]
        no_charts: bool,

        /// Request a narrative summary (needs the configured API key variable).
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    /// Print the resolved universe as TOML.
    Universe {
        /// Market name (KOSPI, US).
        #[arg(long, default_value = "KOSPI")]
        market: String,
    },
    /// Print a default pipeline config as TOML.
    InitConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            market,
            universe,
            history_start,
            display_start,
            end,
            output_dir,
            provider,
            csv_dir,
            no_charts,
            summary,
        } => {
            let mut cfg = match config {
                Some(path) => PipelineConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            let p = &mut cfg.pipeline;
            if let Some(market) = market {
                p.market = market;
            }
            if universe.is_some() {
                p.universe_file = universe;
            }
            if let Some(s) = history_start {
                p.history_start = parse_date("--history-start", &s)?;
            }
            if let Some(s) = display_start {
                p.display_start = parse_date("--display-start", &s)?;
            }
            if let Some(s) = end {
                p.end = Some(parse_date("--end", &s)?);
            }
            if let Some(dir) = output_dir {
                cfg.output.dir = dir;
            }
            if let Some(kind) = provider {
                cfg.provider.kind = kind.into();
            }
            if csv_dir.is_some() {
                cfg.provider.csv_dir = csv_dir;
            }
            if no_charts {
                cfg.output.charts = false;
            }
            if summary {
                cfg.summary.enabled = true;
            }
            run_cmd(&cfg)
        }
        Commands::Universe { market } => {
            let universe = Universe::builtin(&market)?;
            print!("{}", universe.to_toml()?);
            Ok(())
        }
        Commands::InitConfig => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breadth=info,breadth_core=info,breadth_runner=info".into()),
        )
        .init();
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{flag} expects YYYY-MM-DD, got {value:?}"))
}

/// The configured HTTP summarizer, or `None`. A summarizer that cannot be
/// built is logged and skipped so the run still completes.
fn build_summarizer(section: &SummarySection) -> Option<OpenAiSummarizer> {
    OpenAiSummarizer::from_config(section).unwrap_or_else(|e| {
        warn!("summary disabled: {e}");
        None
    })
}

fn run_cmd(cfg: &PipelineConfig) -> Result<()> {
    let universe = resolve_universe(cfg).context("resolving universe")?;
    let provider = build_provider(cfg).context("building price provider")?;
    let end = cfg
        .pipeline
        .end
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let renderer = PlotlyHtmlRenderer::new();
    let openai = build_summarizer(&cfg.summary);
    let summarizer: &dyn NarrativeSummarizer = match &openai {
        Some(s) => s,
        None => &NoopSummarizer,
    };

    let with = Collaborators {
        provider: provider.as_ref(),
        renderer: Some(&renderer),
        summarizer,
        progress: &TracingProgress,
    };

    let run = run_pipeline(cfg, &universe, end, &with)
        .with_context(|| format!("breadth run for {}", universe.market))?;
    print_summary(&run);
    Ok(())
}

fn print_summary(run: &RunSummary) {
    let m = &run.manifest;
    println!("Market:     {}", m.market);
    println!(
        "Tickers:    {} of {} fetched",
        m.fetch.success_count(),
        m.fetch.requested
    );
    for failure in &m.fetch.failed {
        println!("  failed {}: {}", failure.ticker, failure.reason);
    }
    match (m.first_displayed, m.last_displayed) {
        (Some(first), Some(last)) => println!(
            "Window:     {first} .. {last} ({} of {} rows)",
            m.rows_displayed, m.rows_total
        ),
        _ => println!("Window:     empty ({} rows in history)", m.rows_total),
    }
    println!("Dataset:    {}", m.dataset_hash);
    println!(
        "Written:    {} snapshots, {} charts{}",
        m.snapshots.len(),
        m.charts.len(),
        if m.summary.is_some() { ", summary" } else { "" }
    );
    println!("Output dir: {}", run.output_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn provider_arg_maps_to_kind() {
        assert_eq!(ProviderKind::from(ProviderArg::Csv), ProviderKind::CsvDir);
        assert_eq!(
            ProviderKind::from(ProviderArg::Synthetic),
            ProviderKind::Synthetic
        );
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(parse_date("--end", "2024/01/01").is_err());
        assert_eq!(
            parse_date("--end", "2024-01-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn summarizer_without_key_is_skipped() {
        let section = SummarySection {
            enabled: true,
            api_key_env: "BREADTH_CLI_TEST_KEY_NEVER_SET".into(),
            ..SummarySection::default()
        };
        assert!(build_summarizer(&section).is_none());
        assert!(build_summarizer(&SummarySection::default()).is_none());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "breadth",
            "run",
            "--market",
            "US",
            "--provider",
            "csv",
            "--csv-dir",
            "prices",
            "--no-charts",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run {
                no_charts: true,
                provider: Some(ProviderArg::Csv),
                ..
            }
        ));
    }
}
