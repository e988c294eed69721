// Relative Strength Index (RSI) indicator implementation
use super::{check_window, IndicatorCalculator};
use crate::error::Result;
use serde_json::Value;
use shared::DerivedColumn;

pub const DEFAULT_RSI_WINDOW: usize = 14;

/// Wilder's RSI.
///
/// The first value sits at index `window`, once `window` price changes exist.
/// Averages are seeded with the simple mean of the first `window` gains and
/// losses, then smoothed with `alpha = 1 / window`. A zero average loss gives 100.
pub fn rsi(closes: &[f64], window: usize) -> Result<DerivedColumn> {
    check_window(window)?;
    if closes.len() <= window {
        return Ok(vec![None; closes.len()]);
    }

    let mut results = vec![None; window];

    let mut gains = 0.0;
    let mut losses = 0.0;

    // Calculate initial average gain and loss
    for i in 1..=window {
        let (gain, loss) = split_change(closes[i] - closes[i - 1]);
        gains += gain;
        losses += loss;
    }

    let mut avg_gain = gains / window as f64;
    let mut avg_loss = losses / window as f64;
    results.push(Some(rsi_value(avg_gain, avg_loss)));

    let w = window as f64;
    for i in (window + 1)..closes.len() {
        let (gain, loss) = split_change(closes[i] - closes[i - 1]);
        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        results.push(Some(rsi_value(avg_gain, avg_loss)));
    }
    Ok(results)
}

// (gain, loss) with both sides non-negative.
fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, -change)
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

pub struct Rsi {
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_RSI_WINDOW)
    }
}

impl IndicatorCalculator for Rsi {
    // The oscillator is a single column regardless of window.
    fn name(&self) -> &str {
        "RSI"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, closes: &[f64]) -> Result<Vec<(String, DerivedColumn)>> {
        Ok(vec![(self.name().to_string(), rsi(closes, self.window)?)])
    }
}
