use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::utils::{parse_date, start_of_day_utc};
use shared::{Bar, DateRange, Series};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::{assemble_series, DataSource, DataSourceError, SeriesRequest};

// Accepted date forms: "2024-01-31", "2024-01-31 00:00:00+00:00", RFC 3339.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(date) = parse_date(s) {
        return Ok(start_of_day_utc(date));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    Err(format!("Failed to parse date '{}'", s))
}

/// Reads daily bars from a comma-separated OHLC export.
///
/// Header: `Date,Open,High,Low,Close` (case-insensitive, any order, extra
/// columns such as `Adj Close` or `Volume` are ignored). `fetch` runs the
/// file read on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self, symbol: &str, range: &DateRange) -> Result<Series, DataSourceError> {
        let file = File::open(&self.path)?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let headers = rdr.headers()?.clone();
        let columns = Columns::locate(&headers)?;

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2; // 1-based, after the header row
            let record = result?;
            bars.push(columns.bar(&record, line)?);
        }

        tracing::debug!(path = %self.path.display(), rows = bars.len(), "Read CSV bars");
        assemble_series(symbol, bars, range)
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn fetch(&self, request: &SeriesRequest) -> Result<Series, DataSourceError> {
        let source = self.clone();
        let SeriesRequest { symbol, range } = request.clone();
        let series = tokio::task::spawn_blocking(move || source.load(&symbol, &range)).await??;
        tracing::info!(
            symbol = %request.symbol,
            path = %self.path.display(),
            bars = series.len(),
            "Loaded bars from CSV"
        );
        Ok(series)
    }
}

// Column positions resolved once from the header row.
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DataSourceError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| DataSourceError::Parse {
                    line: 1,
                    message: format!("Missing '{}' column in header", name),
                })
        };
        Ok(Self {
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
        })
    }

    fn bar(&self, record: &StringRecord, line: usize) -> Result<Bar, DataSourceError> {
        let field = |pos: usize, name: &str| {
            record.get(pos).filter(|s| !s.is_empty()).ok_or_else(|| DataSourceError::Parse {
                line,
                message: format!("Missing '{}' field", name),
            })
        };
        let number = |pos: usize, name: &str| -> Result<f64, DataSourceError> {
            let raw = field(pos, name)?;
            raw.parse::<f64>().map_err(|e| DataSourceError::Parse {
                line,
                message: format!("Error parsing '{}' value '{}': {}", name, raw, e),
            })
        };

        let timestamp = parse_timestamp(field(self.date, "Date")?)
            .map_err(|message| DataSourceError::Parse { line, message })?;

        Ok(Bar {
            timestamp,
            open: number(self.open, "Open")?,
            high: number(self.high, "High")?,
            low: number(self.low, "Low")?,
            close: number(self.close, "Close")?,
        })
    }
}
