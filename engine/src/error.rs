use thiserror::Error;

use crate::data::DataSourceError;
use shared::SeriesError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No bars available to analyze")]
    EmptySeries,

    #[error("Invalid window size {window}: must be at least 1")]
    InvalidWindow { window: usize },

    #[error("Invalid Bollinger band multiplier {0}: must be finite")]
    InvalidMultiplier(f64),

    #[error("Price change undefined: first close is zero")]
    DivisionByZero,

    #[error("Required column '{0}' is missing from the annotated series")]
    MissingColumn(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Series error: {0}")]
    Series(SeriesError),

    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

// An empty series is its own error kind, not a generic series failure.
impl From<SeriesError> for EngineError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::EmptySeries => EngineError::EmptySeries,
            other => EngineError::Series(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_maps_to_dedicated_kind() {
        let err: EngineError = SeriesError::EmptySeries.into();
        assert!(matches!(err, EngineError::EmptySeries));
    }

    #[test]
    fn test_other_series_errors_are_wrapped() {
        let err: EngineError = SeriesError::DuplicateColumn("RSI".to_string()).into();
        assert!(matches!(err, EngineError::Series(SeriesError::DuplicateColumn(_))));
        assert_eq!(err.to_string(), "Series error: column 'RSI' already exists");
    }

    #[test]
    fn test_invalid_window_message() {
        assert_eq!(
            EngineError::InvalidWindow { window: 0 }.to_string(),
            "Invalid window size 0: must be at least 1"
        );
    }
}
