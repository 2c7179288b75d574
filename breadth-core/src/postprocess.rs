//! Smoothing and display windowing of the raw breadth tables.
//!
//! Order matters: the trailing mean runs over the full history first, then
//! every raw and smoothed table is cut to `date >= display_start`. Smoothed
//! values at the start of the display window therefore use pre-window rows.

use crate::breadth::advance_decline::AD_LINE;
use crate::breadth::{BreadthError, BreadthOutput};
use crate::domain::SeriesTable;
use chrono::NaiveDate;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 21;

/// Raw table of one family plus its smoothed companion, if the family has one.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyTables {
    pub raw: SeriesTable,
    pub smoothed: Option<SeriesTable>,
}

impl FamilyTables {
    fn since(&self, start: NaiveDate) -> Self {
        Self {
            raw: self.raw.since(start),
            smoothed: self.smoothed.as_ref().map(|t| t.since(start)),
        }
    }
}

/// Display-ready output of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBreadth {
    pub sma: FamilyTables,
    pub high_low: FamilyTables,
    pub advance_decline: FamilyTables,
}

impl ProcessedBreadth {
    /// Every table that is written as a snapshot, raw before smoothed.
    pub fn tables(&self) -> Vec<&SeriesTable> {
        [&self.sma, &self.high_low, &self.advance_decline]
            .into_iter()
            .flat_map(|f| std::iter::once(&f.raw).chain(f.smoothed.as_ref()))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.sma.raw.len()
    }
}

#[derive(Debug, Clone)]
pub struct PostProcessor {
    smoothing_window: usize,
    display_start: NaiveDate,
}

impl PostProcessor {
    pub fn new(smoothing_window: usize, display_start: NaiveDate) -> Result<Self, BreadthError> {
        if smoothing_window == 0 {
            return Err(BreadthError::ZeroSmoothingWindow);
        }
        Ok(Self {
            smoothing_window,
            display_start,
        })
    }

    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    pub fn display_start(&self) -> NaiveDate {
        self.display_start
    }

    /// Smooth SMA breadth (every column) and the AD line, then window all tables.
    pub fn process(&self, output: &BreadthOutput) -> ProcessedBreadth {
        let sma = FamilyTables {
            raw: output.sma.clone(),
            smoothed: Some(
                output
                    .sma
                    .rolling_mean(self.smoothing_window)
                    .renamed("breadth_sma_smoothed"),
            ),
        };

        let high_low = FamilyTables {
            raw: output.high_low.clone(),
            smoothed: None,
        };

        let advance_decline = FamilyTables {
            raw: output.advance_decline.clone(),
            smoothed: Some(
                output
                    .advance_decline
                    .select(&[AD_LINE])
                    .rolling_mean(self.smoothing_window)
                    .renamed("advance_decline_smoothed"),
            ),
        };

        ProcessedBreadth {
            sma: sma.since(self.display_start),
            high_low: high_low.since(self.display_start),
            advance_decline: advance_decline.since(self.display_start),
        }
    }
}
