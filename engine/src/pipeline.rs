// One-pass analysis pipeline: Series -> indicators -> signals -> report.
use shared::{AnnotatedSeries, Column, DateRange, Report, Series};

use crate::config::AnalyzerSettings;
use crate::error::Result;
use crate::indicators::bollinger::{LOWER_COLUMN, UPPER_COLUMN};
use crate::indicators::{Bollinger, Ema, IndicatorCalculator, Rsi, Sma};
use crate::patterns::{PatternDetector, DEATH_CROSS_COLUMN, GOLDEN_CROSS_COLUMN};
use crate::report::{summarize, RSI_COLUMN};

/// Output of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub annotated: AnnotatedSeries,
    pub report: Report,
}

/// Stateless driver; every stage consumes the previous AnnotatedSeries and returns an extended one.
#[derive(Debug, Clone)]
pub struct Analyzer {
    settings: AnalyzerSettings,
}

impl Analyzer {
    pub fn new(settings: AnalyzerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn fast_column(&self) -> String {
        format!("SMA{}", self.settings.indicators.sma_fast)
    }

    pub fn slow_column(&self) -> String {
        format!("SMA{}", self.settings.indicators.sma_slow)
    }

    /// Configured indicators in column order.
    pub fn indicators(&self) -> Vec<Box<dyn IndicatorCalculator>> {
        let ind = &self.settings.indicators;
        vec![
            Box::new(Sma::new(ind.sma_fast)),
            Box::new(Sma::new(ind.sma_slow)),
            Box::new(Ema::new(ind.ema)),
            Box::new(Rsi::new(ind.rsi)),
            Box::new(Bollinger::new(ind.bollinger_window, ind.bollinger_num_std)),
        ]
    }

    pub fn add_indicators(&self, annotated: AnnotatedSeries) -> Result<AnnotatedSeries> {
        let closes = annotated.series().closes();
        let mut annotated = annotated;
        for indicator in self.indicators() {
            let columns = indicator.calculate(&closes)?;
            tracing::debug!(
                indicator = indicator.name(),
                parameters = %indicator.parameters(),
                columns = columns.len(),
                "Calculated indicator"
            );
            annotated = annotated.with_columns(
                columns.into_iter().map(|(name, values)| (name, Column::Derived(values))),
            )?;
        }
        Ok(annotated)
    }

    pub fn identify_patterns(&self, annotated: AnnotatedSeries) -> Result<AnnotatedSeries> {
        PatternDetector::new(self.fast_column(), self.slow_column(), RSI_COLUMN)
            .with_thresholds(self.settings.patterns.oversold, self.settings.patterns.overbought)
            .detect(annotated)
    }

    pub fn annotate(&self, series: Series) -> Result<AnnotatedSeries> {
        tracing::info!(
            symbol = %series.symbol(),
            bars = series.len(),
            dates = %series.date_range(),
            "Annotating series"
        );
        let annotated = self.add_indicators(AnnotatedSeries::new(series))?;
        self.identify_patterns(annotated)
    }

    pub fn run(&self, series: Series, period: &DateRange) -> Result<Analysis> {
        let annotated = self.annotate(series)?;
        let report = summarize(&annotated, period)?;
        tracing::info!(
            symbol = %report.symbol,
            golden_crosses = report.golden_crosses,
            death_crosses = report.death_crosses,
            "Analysis complete"
        );
        Ok(Analysis { annotated, report })
    }

    /// Column names the chart overlays read.
    pub fn chart_columns(&self) -> chart::ChartColumns {
        chart::ChartColumns {
            fast: self.fast_column(),
            slow: self.slow_column(),
            upper: UPPER_COLUMN.to_string(),
            lower: LOWER_COLUMN.to_string(),
            golden_cross: GOLDEN_CROSS_COLUMN.to_string(),
            death_cross: DEATH_CROSS_COLUMN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use shared::Bar;

    fn series(closes: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close, high: close + 1.0, low: close - 1.0, close,
            })
            .collect();
        Series::new("BTC", bars).unwrap()
    }

    fn period() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn test_annotate_adds_columns_in_order() {
        let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
        let annotated = analyzer.annotate(series(&[100.0; 60])).unwrap();
        let names: Vec<_> = annotated.column_names().collect();
        assert_eq!(
            names,
            vec![
                "SMA20", "SMA50", "EMA20", "RSI", "BB_upper", "BB_lower", "BB_middle",
                "Golden_Cross", "Death_Cross", "Oversold", "Overbought",
            ]
        );
    }

    #[test]
    fn test_custom_windows_rename_columns() {
        let mut settings = AnalyzerSettings::default();
        settings.indicators.sma_fast = 5;
        settings.indicators.sma_slow = 10;
        let analyzer = Analyzer::new(settings).unwrap();
        let annotated = analyzer.annotate(series(&[1.0; 12])).unwrap();
        assert!(annotated.derived("SMA5").is_some());
        assert!(annotated.derived("SMA10").is_some());
        assert_eq!(analyzer.chart_columns().fast, "SMA5");
    }

    #[test]
    fn test_run_flat_series() {
        let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
        let analysis = analyzer.run(series(&[50.0; 80]), &period()).unwrap();
        let report = analysis.report;
        assert_eq!(report.current_price, 50.0);
        assert_eq!(report.price_change_pct, 0.0);
        assert_eq!(report.rsi_latest, Some(100.0));
        assert_eq!(report.golden_crosses, 0);
        assert_eq!(report.death_crosses, 0);
        assert_eq!(report.times_oversold, 0);
        // Flat RSI sits at 100 from index 14 onward.
        assert_eq!(report.times_overbought, 80 - 14);
    }

    #[test]
    fn test_short_series_has_no_rsi() {
        let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
        let analysis = analyzer.run(series(&[1.0, 2.0, 3.0]), &period()).unwrap();
        assert_eq!(analysis.report.rsi_latest, None);
        assert_eq!(analysis.annotated.len(), 3);
    }

    #[test]
    fn test_zero_first_close_fails() {
        let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
        let result = analyzer.run(series(&[0.0, 1.0]), &period());
        assert!(matches!(result, Err(EngineError::DivisionByZero)));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = AnalyzerSettings::default();
        settings.indicators.ema = 0;
        assert!(matches!(Analyzer::new(settings), Err(EngineError::ConfigError(_))));
    }
}
