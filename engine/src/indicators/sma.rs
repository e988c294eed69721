// Simple Moving Average (SMA) indicator implementation
use super::{check_window, IndicatorCalculator};
use crate::error::Result;
use serde_json::Value;
use shared::DerivedColumn;

/// Trailing arithmetic mean over `window` closes.
///
/// Indices before `window - 1` are `None`; a series shorter than the window
/// yields an all-`None` column of the same length.
pub fn sma(closes: &[f64], window: usize) -> Result<DerivedColumn> {
    check_window(window)?;
    if closes.len() < window {
        return Ok(vec![None; closes.len()]);
    }

    let mut results = vec![None; window - 1];

    // Calculate sum for the first window
    let mut sum: f64 = closes[..window].iter().sum();
    results.push(Some(sum / window as f64));

    // Slide the window
    for i in window..closes.len() {
        sum = sum - closes[i - window] + closes[i];
        results.push(Some(sum / window as f64));
    }
    Ok(results)
}

pub struct Sma {
    name: String,
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            name: format!("SMA{}", window),
            window,
        }
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, closes: &[f64]) -> Result<Vec<(String, DerivedColumn)>> {
        Ok(vec![(self.name.clone(), sma(closes, self.window)?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::indicators::test_support::assert_column_eq;

    #[test]
    fn test_sma_calculation() {
        let results = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        // expected: None, None, (1+2+3)/3=2.0, (2+3+4)/3=3.0, (3+4+5)/3=4.0
        assert_column_eq(&results, &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_step_at_end() {
        let mut closes = vec![10.0; 11];
        closes.push(12.0);
        let results = sma(&closes, 10).unwrap();
        assert_eq!(results.len(), 12);
        assert!(results[..9].iter().all(Option::is_none));
        assert_column_eq(&results[9..], &[Some(10.0), Some(10.0), Some(10.2)]);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let results = sma(&[1.0, 2.0], 3).unwrap();
        assert_eq!(results, vec![None, None]);
    }

    #[test]
    fn test_sma_present_count() {
        let closes: Vec<f64> = (0..30).map(|i| i as f64).collect();
        for window in 1..=30 {
            let results = sma(&closes, window).unwrap();
            assert_eq!(results.len(), 30);
            assert_eq!(results.iter().filter(|v| v.is_some()).count(), 30 - window + 1);
        }
    }

    #[test]
    fn test_sma_window_one() {
        // SMA(1) is just the close price
        let results = sma(&[1.0, 2.0, 3.0], 1).unwrap();
        assert_column_eq(&results, &[Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_sma_empty_data() {
        assert!(sma(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_sma_window_zero() {
        assert!(matches!(sma(&[1.0], 0), Err(EngineError::InvalidWindow { window: 0 })));
    }

    #[test]
    fn test_sma_calculator_naming() {
        let calc = Sma::new(20);
        assert_eq!(calc.name(), "SMA20");
        assert_eq!(calc.parameters(), serde_json::json!({ "window": 20 }));
        let columns = calc.calculate(&[1.0; 25]).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].0, "SMA20");
        assert_eq!(columns[0].1.len(), 25);
    }
}
