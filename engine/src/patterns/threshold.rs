// Oscillator threshold flags. Absent values are never flagged.
use shared::SignalColumn;

/// `true` where the value is present and strictly below `level`.
pub fn below_threshold(values: &[Option<f64>], level: f64) -> SignalColumn {
    values.iter().map(|v| v.map_or(false, |x| x < level)).collect()
}

/// `true` where the value is present and strictly above `level`.
pub fn above_threshold(values: &[Option<f64>], level: f64) -> SignalColumn {
    values.iter().map(|v| v.map_or(false, |x| x > level)).collect()
}
