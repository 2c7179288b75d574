//! Snapshot export (CSV/Parquet).
//!
//! One file per table, named after the table. Each write goes to a sibling
//! `.tmp` file that is renamed over the target, so an interrupted run leaves
//! the previous snapshot in place. Undefined values are written as empty
//! CSV fields or Parquet nulls.

use breadth_core::domain::SeriesTable;
use breadth_core::ProcessedBreadth;
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, DataType, ParquetWriter, PolarsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("create output dir {path}: {reason}")]
    CreateDir { path: String, reason: String },

    #[error("encode {table}: {reason}")]
    Encode { table: String, reason: String },

    #[error("write {path}: {reason}")]
    Write { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotFormat {
    #[default]
    Csv,
    Parquet,
}

impl SnapshotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Csv => "csv",
            SnapshotFormat::Parquet => "parquet",
        }
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Render a table as CSV: a `date` column followed by the table's columns.
pub fn table_to_csv(table: &SeriesTable) -> Result<Vec<u8>, SnapshotError> {
    let encode_err = |e: csv::Error| SnapshotError::Encode {
        table: table.name().to_string(),
        reason: e.to_string(),
    };

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date"];
    header.extend(table.column_names());
    wtr.write_record(&header).map_err(encode_err)?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.to_string());
        record.extend(table.columns().iter().map(|c| format_value(c.values[row])));
        wtr.write_record(&record).map_err(encode_err)?;
    }

    wtr.into_inner().map_err(|e| SnapshotError::Encode {
        table: table.name().to_string(),
        reason: e.to_string(),
    })
}

fn table_to_dataframe(table: &SeriesTable) -> Result<DataFrame, SnapshotError> {
    let encode_err = |e: PolarsError| SnapshotError::Encode {
        table: table.name().to_string(),
        reason: e.to_string(),
    };

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let dates: Vec<i32> = table
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = vec![Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(encode_err)?];
    for column in table.columns() {
        let values: Vec<Option<f64>> = column
            .values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        columns.push(Column::new(column.name.as_str().into(), values));
    }
    DataFrame::new(columns).map_err(encode_err)
}

/// Write through a temp file and rename into place.
pub(crate) fn write_atomic(
    path: &Path,
    write: impl FnOnce(&mut fs::File) -> Result<(), String>,
) -> Result<(), SnapshotError> {
    let write_err = |reason: String| SnapshotError::Write {
        path: path.display().to_string(),
        reason,
    };
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or_default()
    ));

    let mut file = fs::File::create(&tmp_path).map_err(|e| write_err(e.to_string()))?;
    if let Err(reason) = write(&mut file).and_then(|()| file.sync_all().map_err(|e| e.to_string()))
    {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(reason));
    }
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        write_err(format!("atomic rename failed: {e}"))
    })
}

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    format: SnapshotFormat,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, table: &SeriesTable) -> PathBuf {
        self.dir
            .join(format!("{}.{}", table.name(), self.format.extension()))
    }

    /// Write one table, replacing any previous snapshot of the same name.
    pub fn write(&self, table: &SeriesTable) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::CreateDir {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let path = self.path_for(table);
        match self.format {
            SnapshotFormat::Csv => {
                let bytes = table_to_csv(table)?;
                write_atomic(&path, |file| {
                    std::io::Write::write_all(file, &bytes).map_err(|e| e.to_string())
                })?;
            }
            SnapshotFormat::Parquet => {
                let mut df = table_to_dataframe(table)?;
                write_atomic(&path, |file| {
                    ParquetWriter::new(file)
                        .finish(&mut df)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })?;
            }
        }
        debug!(path = %path.display(), rows = table.len(), "wrote snapshot");
        Ok(path)
    }

    /// Write every table of a processed run, in snapshot order.
    pub fn write_all(&self, processed: &ProcessedBreadth) -> Result<Vec<PathBuf>, SnapshotError> {
        processed
            .tables()
            .into_iter()
            .map(|table| self.write(table))
            .collect()
    }
}
