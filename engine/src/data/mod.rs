// Historical bar sources. Each returns a validated, time-ordered Series or NotFound.
pub mod csv_source;
pub mod yahoo;

pub use csv_source::CsvSource;
pub use yahoo::YahooChartSource;

use async_trait::async_trait;
use shared::{Bar, DateRange, Series, SeriesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("No data found for {symbol}")]
    NotFound { symbol: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Api(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub symbol: String,
    pub range: DateRange,
}

impl SeriesRequest {
    pub fn new(symbol: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            range,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, request: &SeriesRequest) -> Result<Series, DataSourceError>;
}

/// Keeps bars inside `range` and orders them by time.
///
/// Exact repeats of a row collapse into one. Two different rows for the same
/// timestamp are rejected with `NonIncreasingTimestamp`.
pub(crate) fn assemble_series(symbol: &str, mut bars: Vec<Bar>, range: &DateRange) -> Result<Series, DataSourceError> {
    bars.retain(|bar| range.contains(bar.timestamp.date_naive()));
    if bars.is_empty() {
        return Err(DataSourceError::NotFound { symbol: symbol.to_string() });
    }
    bars.sort_by_key(|bar| bar.timestamp);
    bars.dedup_by(|a, b| a == b);
    Ok(Series::new(symbol, bars)?)
}
