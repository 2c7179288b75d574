//! Run manifest: what a run consumed and what it wrote.
//!
//! Carries no wall-clock timestamp, so two runs over identical input write
//! identical manifests.

use breadth_core::data::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::PipelineConfig;
use crate::fetch::FetchReport;
use crate::snapshot::{write_atomic, SnapshotError};

/// Current schema version for `manifest.json`.
pub const SCHEMA_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub market: String,
    /// Effective config, with the fetch end date resolved.
    pub config: PipelineConfig,
    pub provider: String,
    pub data_source: DataSource,
    /// BLAKE3 over the aligned price matrix.
    pub dataset_hash: String,
    pub ticker_count: usize,
    /// Rows in the full-history matrix.
    pub rows_total: usize,
    /// Rows inside the display window.
    pub rows_displayed: usize,
    pub first_displayed: Option<NaiveDate>,
    pub last_displayed: Option<NaiveDate>,
    pub fetch: FetchReport,
    /// File names relative to the output directory.
    pub snapshots: Vec<String>,
    pub charts: Vec<String>,
    pub summary: Option<String>,
}

impl RunManifest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn write(&self, dir: &Path) -> Result<(), SnapshotError> {
        let path = dir.join(MANIFEST_FILE);
        let json = self.to_json().map_err(|e| SnapshotError::Encode {
            table: MANIFEST_FILE.to_string(),
            reason: e.to_string(),
        })?;
        write_atomic(&path, |file| {
            std::io::Write::write_all(file, json.as_bytes()).map_err(|e| e.to_string())
        })
    }
}
