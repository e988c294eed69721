// Pattern detection over indicator columns
pub mod crossover;
pub mod threshold;

pub use crossover::{death_cross, golden_cross};
pub use threshold::{above_threshold, below_threshold};

use crate::error::{EngineError, Result};
use shared::{AnnotatedSeries, Column};

pub const GOLDEN_CROSS_COLUMN: &str = "Golden_Cross";
pub const DEATH_CROSS_COLUMN: &str = "Death_Cross";
pub const OVERSOLD_COLUMN: &str = "Oversold";
pub const OVERBOUGHT_COLUMN: &str = "Overbought";

pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

/// Derives the four signal columns from a fast/slow moving-average pair and an oscillator.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    pub fast: String,
    pub slow: String,
    pub oscillator: String,
    pub oversold: f64,
    pub overbought: f64,
}

impl PatternDetector {
    pub fn new(fast: impl Into<String>, slow: impl Into<String>, oscillator: impl Into<String>) -> Self {
        Self {
            fast: fast.into(),
            slow: slow.into(),
            oscillator: oscillator.into(),
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }

    pub fn with_thresholds(mut self, oversold: f64, overbought: f64) -> Self {
        self.oversold = oversold;
        self.overbought = overbought;
        self
    }

    pub fn detect(&self, annotated: AnnotatedSeries) -> Result<AnnotatedSeries> {
        let fast = Self::require(&annotated, &self.fast)?;
        let slow = Self::require(&annotated, &self.slow)?;
        let oscillator = Self::require(&annotated, &self.oscillator)?;

        let golden = golden_cross(fast, slow)?;
        let death = death_cross(fast, slow)?;
        let oversold = below_threshold(oscillator, self.oversold);
        let overbought = above_threshold(oscillator, self.overbought);

        tracing::debug!(
            symbol = %annotated.symbol(),
            golden = golden.iter().filter(|&&f| f).count(),
            death = death.iter().filter(|&&f| f).count(),
            oversold = oversold.iter().filter(|&&f| f).count(),
            overbought = overbought.iter().filter(|&&f| f).count(),
            "Detected patterns"
        );

        Ok(annotated.with_columns([
            (GOLDEN_CROSS_COLUMN, Column::Signal(golden)),
            (DEATH_CROSS_COLUMN, Column::Signal(death)),
            (OVERSOLD_COLUMN, Column::Signal(oversold)),
            (OVERBOUGHT_COLUMN, Column::Signal(overbought)),
        ])?)
    }

    fn require<'a>(annotated: &'a AnnotatedSeries, name: &str) -> Result<&'a [Option<f64>]> {
        annotated
            .derived(name)
            .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
    }
}
