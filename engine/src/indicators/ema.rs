// Exponential Moving Average (EMA) indicator implementation
use super::{check_window, IndicatorCalculator};
use crate::error::Result;
use serde_json::Value;
use shared::DerivedColumn;

/// EMA with `alpha = 2 / (window + 1)`, seeded by the SMA of the first `window` closes.
pub fn ema(closes: &[f64], window: usize) -> Result<DerivedColumn> {
    check_window(window)?;
    if closes.len() < window {
        return Ok(vec![None; closes.len()]);
    }

    let mut results = vec![None; window - 1];
    let alpha = 2.0 / (window as f64 + 1.0);

    // Calculate initial SMA for the first EMA value
    let initial_sum: f64 = closes[..window].iter().sum();
    let mut previous_ema = initial_sum / window as f64;
    results.push(Some(previous_ema));

    for &close in &closes[window..] {
        let ema = alpha * close + (1.0 - alpha) * previous_ema;
        results.push(Some(ema));
        previous_ema = ema;
    }
    Ok(results)
}

pub struct Ema {
    name: String,
    window: usize,
}

impl Ema {
    pub fn new(window: usize) -> Self {
        Self {
            name: format!("EMA{}", window),
            window,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, closes: &[f64]) -> Result<Vec<(String, DerivedColumn)>> {
        Ok(vec![(self.name.clone(), ema(closes, self.window)?)])
    }
}
