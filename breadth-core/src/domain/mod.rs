//! Domain types: per-ticker price series, the aligned price matrix, and the
//! date-indexed tables every breadth family is expressed in.

pub mod matrix;
pub mod series;
pub mod table;

pub use matrix::PriceMatrix;
pub use series::{MatrixError, PricePoint, PriceSeries};
pub use table::{SeriesColumn, SeriesTable};
