use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::format_decimal;

/// One time-indexed OHLC observation. Values are passed through unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("series contains no bars")]
    EmptySeries,

    #[error("timestamp at index {index} is not strictly after the previous bar")]
    NonIncreasingTimestamp { index: usize },

    #[error("column '{name}' has {actual} values, series has {expected} bars")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
}

/// Non-empty, strictly time-ordered bars for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(SeriesError::NonIncreasingTimestamp { index: index + 1 });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Calendar dates of the first and last bar.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.first().timestamp.date_naive(),
            end: self.last().timestamp.date_naive(),
        }
    }
}

/// Per-bar optional values; `None` marks the warm-up span of a rolling computation.
pub type DerivedColumn = Vec<Option<f64>>;

/// Per-bar event flags.
pub type SignalColumn = Vec<bool>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    Derived(DerivedColumn),
    Signal(SignalColumn),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Derived(values) => values.len(),
            Column::Signal(flags) => flags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A series plus its named, index-aligned derived and signal columns.
///
/// Columns are only ever added, each through [`AnnotatedSeries::with_column`],
/// which returns a new value and rejects misaligned or duplicate columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    series: Series,
    columns: IndexMap<String, Column>,
}

impl AnnotatedSeries {
    pub fn new(series: Series) -> Self {
        Self {
            series,
            columns: IndexMap::new(),
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, SeriesError> {
        let name = name.into();
        if column.len() != self.series.len() {
            return Err(SeriesError::ColumnLengthMismatch {
                name,
                expected: self.series.len(),
                actual: column.len(),
            });
        }
        if self.columns.contains_key(&name) {
            return Err(SeriesError::DuplicateColumn(name));
        }
        self.columns.insert(name, column);
        Ok(self)
    }

    pub fn with_columns<I, S>(self, columns: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        columns
            .into_iter()
            .try_fold(self, |annotated, (name, column)| annotated.with_column(name, column))
    }

    pub fn derived(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.columns.get(name) {
            Some(Column::Derived(values)) => Some(values),
            _ => None,
        }
    }

    pub fn signal(&self, name: &str) -> Option<&[bool]> {
        match self.columns.get(name) {
            Some(Column::Signal(flags)) => Some(flags),
            _ => None,
        }
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Terminal summary of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub symbol: String,
    pub period: DateRange,
    pub current_price: f64,
    pub price_change_pct: f64,
    pub rsi_latest: Option<f64>,
    pub golden_crosses: usize,
    pub death_crosses: usize,
    pub times_oversold: usize,
    pub times_overbought: usize,
}

impl Report {
    /// Human-readable label to value, in print order.
    pub fn fields(&self) -> IndexMap<&'static str, String> {
        let mut fields = IndexMap::new();
        fields.insert("Symbol", self.symbol.clone());
        fields.insert("Period", self.period.to_string());
        fields.insert("Current Price", format_decimal(self.current_price, 2));
        fields.insert("Price Change (%)", format_decimal(self.price_change_pct, 2));
        fields.insert(
            "RSI",
            self.rsi_latest
                .map(|rsi| format_decimal(rsi, 2))
                .unwrap_or_else(|| "unavailable".to_string()),
        );
        fields.insert("Golden Crosses", self.golden_crosses.to_string());
        fields.insert("Death Crosses", self.death_crosses.to_string());
        fields.insert("Times Oversold", self.times_oversold.to_string());
        fields.insert("Times Overbought", self.times_overbought.to_string());
        fields
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Report:")?;
        for (label, value) in self.fields() {
            writeln!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}
