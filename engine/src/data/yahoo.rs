// Daily bars from the Yahoo Finance chart endpoint.
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use reqwest::Client;
use serde::Deserialize;
use shared::utils::start_of_day_utc;
use shared::{Bar, DateRange, Series};

use super::{assemble_series, DataSource, DataSourceError, SeriesRequest};
use crate::config::DataSettings;

pub struct YahooChartSource {
    client: Client,
    base_url: String,
    quote_suffix: String,
    interval: String,
}

impl YahooChartSource {
    pub fn new(settings: &DataSettings) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("crypto-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            quote_suffix: settings.quote_suffix.clone(),
            interval: settings.interval.clone(),
        })
    }

    /// Provider ticker for a bare symbol, e.g. `BTC` -> `BTC-USD`.
    pub fn ticker(&self, symbol: &str) -> String {
        format!("{}{}", symbol.to_uppercase(), self.quote_suffix)
    }

    // period2 is exclusive upstream; push it to the midnight after `end`.
    fn query(&self, range: &DateRange) -> Vec<(&'static str, String)> {
        let period1 = start_of_day_utc(range.start).timestamp();
        let period2 = start_of_day_utc(range.end + Duration::days(1)).timestamp();
        vec![
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", self.interval.clone()),
            ("events", "history".to_string()),
        ]
    }
}

#[async_trait]
impl DataSource for YahooChartSource {
    async fn fetch(&self, request: &SeriesRequest) -> Result<Series, DataSourceError> {
        let ticker = self.ticker(&request.symbol);
        let url = format!("{}/{}", self.base_url, ticker);
        tracing::info!(%ticker, range = %request.range, "Requesting historical bars");

        let response = self.client.get(&url).query(&self.query(&request.range)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let chart = match serde_json::from_str::<ChartResponse>(&body) {
            Ok(chart) => chart,
            Err(_) if !status.is_success() => {
                return Err(DataSourceError::Api(format!("HTTP {}: {}", status, body.trim())));
            }
            Err(e) => return Err(DataSourceError::Api(format!("Malformed chart response: {}", e))),
        };

        let series = decode_chart(&request.symbol, chart, &request.range)?;
        tracing::info!(%ticker, bars = series.len(), "Fetched historical bars");
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// Rows with any null OHLC field are skipped.
fn decode_chart(symbol: &str, chart: ChartResponse, range: &DateRange) -> Result<Series, DataSourceError> {
    if let Some(error) = chart.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(DataSourceError::NotFound { symbol: symbol.to_string() });
        }
        return Err(DataSourceError::Api(format!("{}: {}", error.code, error.description)));
    }

    let result = chart
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataSourceError::NotFound { symbol: symbol.to_string() })?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(Bar {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: at(&quote.open[..], i)?,
                high: at(&quote.high[..], i)?,
                low: at(&quote.low[..], i)?,
                close: at(&quote.close[..], i)?,
            })
        })
        .collect();

    let skipped = result.timestamp.len() - bars.len();
    if skipped > 0 {
        tracing::debug!(symbol, skipped, "Skipped incomplete chart rows");
    }
    assemble_series(symbol, bars, range)
}
