//! Serializable pipeline configuration.
//!
//! Loaded from TOML; every field has a default so a partial file (or none
//! at all) is valid. CLI flags override individual fields after loading.

use breadth_core::breadth::high_low;
use breadth_core::postprocess::DEFAULT_SMOOTHING_WINDOW;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::snapshot::SnapshotFormat;

/// Trading days per calendar year, used to estimate warmup from dates.
const TRADING_DAYS_PER_YEAR: i64 = 252;
const CALENDAR_DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error("ma_periods must not be empty")]
    NoPeriods,

    #[error("{name} must be at least 1")]
    ZeroWindow { name: &'static str },

    #[error("display_start {display_start} is before history_start {history_start}")]
    DisplayBeforeHistory {
        history_start: NaiveDate,
        display_start: NaiveDate,
    },

    #[error("end {end} is before display_start {display_start}")]
    EndBeforeDisplay {
        display_start: NaiveDate,
        end: NaiveDate,
    },

    #[error("provider kind csv_dir requires provider.csv_dir")]
    MissingCsvDir,
}

/// Where prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    CsvDir,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// Market name; resolves a built-in universe unless `universe_file` is set.
    pub market: String,
    pub universe_file: Option<PathBuf>,
    /// First date fetched. Rolling windows warm up on the rows before
    /// `display_start`.
    pub history_start: NaiveDate,
    pub display_start: NaiveDate,
    /// Last date fetched; today when absent.
    pub end: Option<NaiveDate>,
    pub ma_periods: Vec<usize>,
    pub smoothing_window: usize,
    pub high_low_window: usize,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            market: "KOSPI".into(),
            universe_file: None,
            history_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            display_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end: None,
            ma_periods: vec![20, 60, 120, 200],
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            high_low_window: high_low::DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub format: SnapshotFormat,
    pub charts: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            format: SnapshotFormat::Csv,
            charts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub kind: ProviderKind,
    pub csv_dir: Option<PathBuf>,
    /// Concurrent fetches.
    pub parallelism: usize,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            csv_dir: None,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySection {
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub output: OutputSection,
    pub provider: ProviderSection,
    pub summary: SummarySection,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Rows a window needs before the display start for every series to be
    /// defined there.
    pub fn required_warmup(&self) -> usize {
        let longest = self.pipeline.ma_periods.iter().copied().max().unwrap_or(0);
        longest.max(self.pipeline.high_low_window)
    }

    /// Approximate trading days between `history_start` and `display_start`.
    pub fn estimated_warmup(&self) -> i64 {
        let calendar = (self.pipeline.display_start - self.pipeline.history_start).num_days();
        calendar * TRADING_DAYS_PER_YEAR / CALENDAR_DAYS_PER_YEAR
    }

    /// Reject unusable settings; warn when the warmup looks too short.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.ma_periods.is_empty() {
            return Err(ConfigError::NoPeriods);
        }
        if p.ma_periods.contains(&0) {
            return Err(ConfigError::ZeroWindow { name: "ma_periods" });
        }
        if p.smoothing_window == 0 {
            return Err(ConfigError::ZeroWindow {
                name: "smoothing_window",
            });
        }
        if p.high_low_window == 0 {
            return Err(ConfigError::ZeroWindow {
                name: "high_low_window",
            });
        }
        if self.provider.parallelism == 0 {
            return Err(ConfigError::ZeroWindow {
                name: "provider.parallelism",
            });
        }
        if p.display_start < p.history_start {
            return Err(ConfigError::DisplayBeforeHistory {
                history_start: p.history_start,
                display_start: p.display_start,
            });
        }
        if let Some(end) = p.end {
            if end < p.display_start {
                return Err(ConfigError::EndBeforeDisplay {
                    display_start: p.display_start,
                    end,
                });
            }
        }
        if self.provider.kind == ProviderKind::CsvDir && self.provider.csv_dir.is_none() {
            return Err(ConfigError::MissingCsvDir);
        }

        let warmup = self.estimated_warmup();
        let required = self.required_warmup();
        if warmup < required as i64 {
            warn!(
                estimated = warmup,
                required,
                "history_start leaves too little warmup; early display rows will be partial"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn defaults_match_the_kospi_setup() {
        let c = PipelineConfig::default();
        assert_eq!(c.pipeline.market, "KOSPI");
        assert_eq!(c.pipeline.history_start, d(2010, 1, 1));
        assert_eq!(c.pipeline.display_start, d(2024, 1, 1));
        assert_eq!(c.pipeline.ma_periods, vec![20, 60, 120, 200]);
        assert_eq!(c.output.dir, PathBuf::from("docs"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = PipelineConfig::from_toml(
            r#"
            [pipeline]
            market = "US"
            display_start = "2023-06-01"

            [output]
            format = "parquet"
            "#,
        )
        .unwrap();
        assert_eq!(c.pipeline.market, "US");
        assert_eq!(c.pipeline.display_start, d(2023, 6, 1));
        assert_eq!(c.pipeline.smoothing_window, 21);
        assert_eq!(c.output.format, SnapshotFormat::Parquet);
        assert!(c.output.charts);
        assert_eq!(c.provider.kind, ProviderKind::Yahoo);
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = PipelineConfig::default();
        c.pipeline.end = Some(d(2024, 12, 31));
        c.provider.kind = ProviderKind::CsvDir;
        c.provider.csv_dir = Some(PathBuf::from("prices"));
        let parsed = PipelineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn rejects_empty_periods_and_zero_windows() {
        let mut c = PipelineConfig::default();
        c.pipeline.ma_periods.clear();
        assert!(matches!(c.validate(), Err(ConfigError::NoPeriods)));

        let mut c = PipelineConfig::default();
        c.pipeline.smoothing_window = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ZeroWindow {
                name: "smoothing_window"
            })
        ));
    }

    #[test]
    fn rejects_display_before_history() {
        let mut c = PipelineConfig::default();
        c.pipeline.display_start = d(2009, 1, 1);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::DisplayBeforeHistory { .. })
        ));
    }

    #[test]
    fn csv_provider_needs_a_directory() {
        let mut c = PipelineConfig::default();
        c.provider.kind = ProviderKind::CsvDir;
        assert!(matches!(c.validate(), Err(ConfigError::MissingCsvDir)));
    }

    #[test]
    fn short_warmup_is_only_a_warning() {
        let mut c = PipelineConfig::default();
        c.pipeline.history_start = d(2023, 10, 1);
        assert!(c.estimated_warmup() < c.required_warmup() as i64);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn warmup_estimate_uses_trading_days() {
        let mut c = PipelineConfig::default();
        c.pipeline.history_start = d(2023, 1, 1);
        c.pipeline.display_start = d(2024, 1, 1);
        assert_eq!(c.estimated_warmup(), 252);
        assert_eq!(c.required_warmup(), 252);
    }
}
