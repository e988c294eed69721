// Bollinger Bands indicator implementation
//
// A middle band (SMA) with upper and lower bands offset by `num_std` rolling
// standard deviations. The deviation is the POPULATION form (divide by the
// window length), computed over the same trailing window as the middle band.

use super::{check_window, sma, IndicatorCalculator};
use crate::error::{EngineError, Result};
use serde_json::Value;
use shared::DerivedColumn;

pub const DEFAULT_BOLLINGER_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

pub const MIDDLE_COLUMN: &str = "BB_middle";
pub const UPPER_COLUMN: &str = "BB_upper";
pub const LOWER_COLUMN: &str = "BB_lower";

/// Three index-aligned band columns.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: DerivedColumn,
    pub upper: DerivedColumn,
    pub lower: DerivedColumn,
}

/// Rolling population standard deviation over `window` closes.
pub fn rolling_std(closes: &[f64], window: usize) -> Result<DerivedColumn> {
    let means = sma(closes, window)?;
    Ok(std_around(closes, &means, window))
}

pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> Result<BollingerBands> {
    check_window(window)?;
    if !num_std.is_finite() {
        return Err(EngineError::InvalidMultiplier(num_std));
    }

    let middle = sma(closes, window)?;
    let stdev = std_around(closes, &middle, window);

    let band = |sign: f64| -> DerivedColumn {
        middle
            .iter()
            .zip(&stdev)
            .map(|(m, s)| Some((*m)? + sign * num_std * (*s)?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    Ok(BollingerBands { middle, upper, lower })
}

// Deviation of each trailing window around its precomputed mean.
fn std_around(closes: &[f64], means: &[Option<f64>], window: usize) -> DerivedColumn {
    means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            let mean = (*mean)?;
            let slice = &closes[i + 1 - window..=i];
            let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window as f64;
            Some(variance.sqrt())
        })
        .collect()
}

pub struct Bollinger {
    window: usize,
    num_std: f64,
}

impl Bollinger {
    pub fn new(window: usize, num_std: f64) -> Self {
        Self { window, num_std }
    }
}

impl Default for Bollinger {
    fn default() -> Self {
        Self::new(DEFAULT_BOLLINGER_WINDOW, DEFAULT_NUM_STD)
    }
}

impl IndicatorCalculator for Bollinger {
    fn name(&self) -> &str {
        "BB"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window, "num_std": self.num_std })
    }

    fn calculate(&self, closes: &[f64]) -> Result<Vec<(String, DerivedColumn)>> {
        let bands = bollinger(closes, self.window, self.num_std)?;
        Ok(vec![
            (UPPER_COLUMN.to_string(), bands.upper),
            (LOWER_COLUMN.to_string(), bands.lower),
            (MIDDLE_COLUMN.to_string(), bands.middle),
        ])
    }
}
