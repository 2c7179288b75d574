//! Breadth Core: price matrix, rolling indicators, breadth engine, windowing.
//!
//! This crate holds the computation the runner orchestrates:
//! - Domain types (price series, the aligned price matrix, output tables)
//! - Price providers and the union-calendar matrix builder
//! - Rolling SMA and rolling extremes
//! - The three breadth families (SMA breadth, new highs/lows, advance–decline)
//! - Smoothing and display-window truncation

pub mod breadth;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod postprocess;

pub use breadth::{BreadthEngine, BreadthError, BreadthOutput};
pub use postprocess::{FamilyTables, PostProcessor, ProcessedBreadth};
