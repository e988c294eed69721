// Moving-average crossover signals.
//
// A cross fires at `i` when the fast line is strictly on the new side at `i`
// and was on or touching the old side at `i - 1`; equality at `i - 1` counts
// as the old side.
use crate::error::Result;
use shared::{SeriesError, SignalColumn};

/// `fast` crosses above `slow`.
pub fn golden_cross(fast: &[Option<f64>], slow: &[Option<f64>]) -> Result<SignalColumn> {
    crossings(fast, slow, |f, s| f > s, |f, s| f <= s)
}

/// `fast` crosses below `slow`.
pub fn death_cross(fast: &[Option<f64>], slow: &[Option<f64>]) -> Result<SignalColumn> {
    crossings(fast, slow, |f, s| f < s, |f, s| f >= s)
}

fn crossings(
    fast: &[Option<f64>],
    slow: &[Option<f64>],
    now: impl Fn(f64, f64) -> bool,
    before: impl Fn(f64, f64) -> bool,
) -> Result<SignalColumn> {
    if fast.len() != slow.len() {
        return Err(SeriesError::ColumnLengthMismatch {
            name: "slow".to_string(),
            expected: fast.len(),
            actual: slow.len(),
        }
        .into());
    }

    let mut signals = vec![false; fast.len()];
    for i in 1..fast.len() {
        // Absent operands on either index never signal.
        if let (Some(f0), Some(s0), Some(f1), Some(s1)) = (fast[i - 1], slow[i - 1], fast[i], slow[i]) {
            signals[i] = now(f1, s1) && before(f0, s0);
        }
    }
    Ok(signals)
}
