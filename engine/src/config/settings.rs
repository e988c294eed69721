// Analyzer settings, loaded from an optional JSON file. Missing keys fall back to defaults.
use serde::Deserialize;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::indicators::bollinger::{DEFAULT_BOLLINGER_WINDOW, DEFAULT_NUM_STD};
use crate::indicators::rsi::DEFAULT_RSI_WINDOW;
use crate::patterns::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use chart::{ChartStyle, ChartTheme};

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub indicators: IndicatorSettings,
    pub patterns: PatternSettings,
    pub data: DataSettings,
    pub chart: ChartSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub ema: usize,
    pub rsi: usize,
    pub bollinger_window: usize,
    pub bollinger_num_std: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            sma_fast: 20,
            sma_slow: 50,
            ema: 20,
            rsi: DEFAULT_RSI_WINDOW,
            bollinger_window: DEFAULT_BOLLINGER_WINDOW,
            bollinger_num_std: DEFAULT_NUM_STD,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PatternSettings {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for PatternSettings {
    fn default() -> Self {
        PatternSettings {
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub base_url: String,
    pub quote_suffix: String, // appended to the symbol, e.g. BTC -> BTC-USD
    pub interval: String,
    pub timeout_secs: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            quote_suffix: "-USD".to_string(),
            interval: "1d".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub output_dir: String,
    pub theme: ChartTheme,
    pub style: Option<ChartStyle>, // full override of the theme preset
}

impl Default for ChartSettings {
    fn default() -> Self {
        ChartSettings {
            output_dir: ".".to_string(),
            theme: ChartTheme::Dark,
            style: None,
        }
    }
}

impl ChartSettings {
    pub fn resolved_style(&self) -> ChartStyle {
        self.style.clone().unwrap_or_else(|| self.theme.style())
    }
}

impl AnalyzerSettings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        for (name, window) in [
            ("sma_fast", ind.sma_fast),
            ("sma_slow", ind.sma_slow),
            ("ema", ind.ema),
            ("rsi", ind.rsi),
            ("bollinger_window", ind.bollinger_window),
        ] {
            if window == 0 {
                return Err(EngineError::ConfigError(format!("indicators.{} must be at least 1", name)));
            }
        }
        if ind.sma_fast == ind.sma_slow {
            return Err(EngineError::ConfigError(
                "indicators.sma_fast and indicators.sma_slow must differ".to_string(),
            ));
        }
        if !ind.bollinger_num_std.is_finite() || ind.bollinger_num_std < 0.0 {
            return Err(EngineError::ConfigError(format!(
                "indicators.bollinger_num_std must be a non-negative number, got {}",
                ind.bollinger_num_std
            )));
        }
        let pat = &self.patterns;
        if !(pat.oversold < pat.overbought) {
            return Err(EngineError::ConfigError(format!(
                "patterns.oversold ({}) must be below patterns.overbought ({})",
                pat.oversold, pat.overbought
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = AnalyzerSettings::default();
        assert_eq!(settings.indicators.sma_fast, 20);
        assert_eq!(settings.indicators.sma_slow, 50);
        assert_eq!(settings.indicators.ema, 20);
        assert_eq!(settings.indicators.rsi, 14);
        assert_eq!(settings.indicators.bollinger_window, 20);
        assert_eq!(settings.indicators.bollinger_num_std, 2.0);
        assert_eq!(settings.patterns.oversold, 30.0);
        assert_eq!(settings.patterns.overbought, 70.0);
        assert_eq!(settings.data.quote_suffix, "-USD");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = AnalyzerSettings::from_json(r#"{ "indicators": { "sma_fast": 10 }, "data": { "quote_suffix": "-EUR" } }"#).unwrap();
        assert_eq!(settings.indicators.sma_fast, 10);
        assert_eq!(settings.indicators.sma_slow, 50);
        assert_eq!(settings.data.quote_suffix, "-EUR");
        assert_eq!(settings.data.interval, "1d");
        assert_eq!(settings.chart.output_dir, ".");
    }

    #[test]
    fn test_chart_theme_preset() {
        assert_eq!(AnalyzerSettings::default().chart.resolved_style(), ChartStyle::dark());
        let settings = AnalyzerSettings::from_json(r#"{ "chart": { "theme": "light" } }"#).unwrap();
        assert_eq!(settings.chart.theme, ChartTheme::Light);
        assert_eq!(settings.chart.resolved_style(), ChartStyle::light());
    }

    #[test]
    fn test_chart_style_overrides_theme() {
        let settings = AnalyzerSettings::from_json(r#"{ "chart": { "theme": "light", "style": { "width": 800 } } }"#).unwrap();
        let style = settings.chart.resolved_style();
        assert_eq!(style.width, 800);
        assert_eq!(style.background, ChartStyle::dark().background);
    }

    #[test]
    fn test_invalid_json() {
        let result = AnalyzerSettings::from_json("{ not json");
        assert!(matches!(result, Err(EngineError::ConfigError(msg)) if msg.contains("Invalid settings JSON")));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut settings = AnalyzerSettings::default();
        settings.indicators.rsi = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("indicators.rsi"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut settings = AnalyzerSettings::default();
        settings.patterns.oversold = 80.0;
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "patterns": {{ "oversold": 25.0, "overbought": 75.0 }} }}"#).unwrap();
        let settings = AnalyzerSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.patterns.oversold, 25.0);
        assert_eq!(settings.patterns.overbought, 75.0);
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(AnalyzerSettings::load(None).unwrap(), AnalyzerSettings::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = AnalyzerSettings::load(Some(Path::new("does/not/exist.json")));
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }
}
