// Chart colours and dimensions
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub foreground: String,
    pub grid: String,
    pub bullish: String,
    pub bearish: String,
    pub sma_fast: String,
    pub sma_slow: String,
    pub band: String,
    pub golden_cross: String,
    pub death_cross: String,
}

impl ChartStyle {
    pub fn dark() -> Self {
        Self {
            width: 1280,
            height: 720,
            background: "#111111".to_string(),
            foreground: "#d1d4dc".to_string(),
            grid: "#2a2e39".to_string(),
            bullish: "#26a69a".to_string(),
            bearish: "#ef5350".to_string(),
            sma_fast: "orange".to_string(),
            sma_slow: "#2962ff".to_string(),
            band: "gray".to_string(),
            golden_cross: "green".to_string(),
            death_cross: "red".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            foreground: "#000000".to_string(),
            grid: "#e0e0e0".to_string(),
            bullish: "#4caf50".to_string(),
            bearish: "#f44336".to_string(),
            ..Self::dark()
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::dark()
    }
}

/// Named colour preset, selectable from settings as `"dark"` or `"light"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Dark,
    Light,
}

impl ChartTheme {
    pub fn style(self) -> ChartStyle {
        match self {
            ChartTheme::Dark => ChartStyle::dark(),
            ChartTheme::Light => ChartStyle::light(),
        }
    }
}
