//! Data collaborators: price providers, the constituent universe, and the
//! builder that aligns per-ticker series into a price matrix.

pub mod align;
pub mod circuit_breaker;
pub mod csv_dir;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use align::build_price_matrix;
pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use provider::{
    DataError, DataSource, DownloadProgress, PriceProvider, SilentProgress, TracingProgress,
};
pub use synthetic::SyntheticProvider;
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
