// Reduces an annotated series into the fixed-shape summary report.
use crate::error::{EngineError, Result};
use crate::patterns::{DEATH_CROSS_COLUMN, GOLDEN_CROSS_COLUMN, OVERBOUGHT_COLUMN, OVERSOLD_COLUMN};
use shared::{AnnotatedSeries, DateRange, Report};

pub const RSI_COLUMN: &str = "RSI";

/// Percentage change from `first_close` to `last_close`.
pub fn price_change_pct(first_close: f64, last_close: f64) -> Result<f64> {
    if first_close == 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    Ok((last_close - first_close) / first_close * 100.0)
}

/// Builds the report for `period`. Requires the RSI column and all four signal columns.
pub fn summarize(annotated: &AnnotatedSeries, period: &DateRange) -> Result<Report> {
    let series = annotated.series();
    let first_close = series.first().close;
    let current_price = series.last().close;

    let rsi = annotated
        .derived(RSI_COLUMN)
        .ok_or_else(|| EngineError::MissingColumn(RSI_COLUMN.to_string()))?;
    let rsi_latest = rsi.last().copied().flatten();
    if rsi_latest.is_none() {
        tracing::warn!(symbol = %annotated.symbol(), bars = annotated.len(), "RSI unavailable at the last bar");
    }

    Ok(Report {
        symbol: annotated.symbol().to_string(),
        period: *period,
        current_price,
        price_change_pct: price_change_pct(first_close, current_price)?,
        rsi_latest,
        golden_crosses: count_true(annotated, GOLDEN_CROSS_COLUMN)?,
        death_crosses: count_true(annotated, DEATH_CROSS_COLUMN)?,
        times_oversold: count_true(annotated, OVERSOLD_COLUMN)?,
        times_overbought: count_true(annotated, OVERBOUGHT_COLUMN)?,
    })
}

fn count_true(annotated: &AnnotatedSeries, name: &str) -> Result<usize> {
    annotated
        .signal(name)
        .map(|flags| flags.iter().filter(|&&flag| flag).count())
        .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
}
