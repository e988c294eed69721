// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger, rolling_std, Bollinger, BollingerBands};
pub use ema::{ema, Ema};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};

use crate::error::{EngineError, Result};
use serde_json::Value;
use shared::DerivedColumn;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    // Named output columns, each aligned 1:1 with `closes`. Most indicators emit one.
    fn calculate(&self, closes: &[f64]) -> Result<Vec<(String, DerivedColumn)>>;
}

pub(crate) fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(EngineError::InvalidWindow { window });
    }
    Ok(())
}
