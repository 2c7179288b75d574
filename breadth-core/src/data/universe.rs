//! Universe configuration: the constituent list for one market.
//!
//! A universe is a TOML file naming the market, an optional provider symbol
//! suffix (KOSPI codes trade as `005930.KS` on Yahoo), and the member
//! tickers. Built-in universes cover the markets the CLI knows by name.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse universe TOML: {0}")]
    Parse(String),

    #[error("serialize universe: {0}")]
    Serialize(String),

    #[error("unknown market '{0}' (built-in: KOSPI, US); pass --universe FILE")]
    UnknownMarket(String),

    #[error("ticker '{0}' listed more than once")]
    DuplicateTicker(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub market: String,
    /// Appended to each ticker when asking the price provider, e.g. ".KS".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_suffix: Option<String>,
    pub tickers: Vec<String>,
}

const KOSPI_TICKERS: &[&str] = &[
    "005930", "000660", "373220", "207940", "005380", "000270", "068270", "005490", "035420",
    "051910", "006400", "105560", "055550", "012330", "028260", "003670", "035720", "066570",
    "032830", "086790", "096770", "034730", "015760", "017670", "003550", "018260", "011200",
    "033780", "010130", "009150", "316140", "024110", "000810", "030200", "011170", "010950",
    "034020", "012450", "047050", "009540", "042660", "329180", "267250", "000100", "161390",
    "021240", "036570", "011780", "004020", "097950",
];

const US_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "AVGO", "CRM", "ADBE", "ORCL", "JNJ", "UNH",
    "PFE", "ABBV", "MRK", "LLY", "TMO", "ABT", "JPM", "BAC", "WFC", "GS", "MS", "BLK", "SCHW", "C",
    "AXP", "V", "XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "WMT", "PG", "KO", "PEP",
    "COST", "HD", "MCD", "NKE", "SBUX", "TGT",
];

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|e| UniverseError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string. A ticker listed twice is an error.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Self =
            toml::from_str(content).map_err(|e| UniverseError::Parse(e.to_string()))?;
        universe.check_unique()?;
        Ok(universe)
    }

    fn check_unique(&self) -> Result<(), UniverseError> {
        let mut seen = HashSet::with_capacity(self.tickers.len());
        for ticker in &self.tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(UniverseError::DuplicateTicker(ticker.clone()));
            }
        }
        Ok(())
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        toml::to_string_pretty(self).map_err(|e| UniverseError::Serialize(e.to_string()))
    }

    /// Built-in universe for a market name (case-insensitive).
    pub fn builtin(market: &str) -> Result<Self, UniverseError> {
        let (market, suffix, tickers) = match market.to_ascii_uppercase().as_str() {
            "KOSPI" => ("KOSPI", Some(".KS"), KOSPI_TICKERS),
            "US" => ("US", None, US_TICKERS),
            _ => return Err(UniverseError::UnknownMarket(market.to_string())),
        };
        Ok(Self {
            market: market.to_string(),
            symbol_suffix: suffix.map(String::from),
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
        })
    }

    /// The symbol to request from the price provider for `ticker`.
    pub fn provider_symbol(&self, ticker: &str) -> String {
        match &self.symbol_suffix {
            Some(suffix) => format!("{ticker}{suffix}"),
            None => ticker.to_string(),
        }
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }
}
