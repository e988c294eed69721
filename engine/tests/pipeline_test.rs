use analysis_engine::config::AnalyzerSettings;
use analysis_engine::data::{CsvSource, DataSource, DataSourceError, SeriesRequest};
use analysis_engine::indicators::sma;
use analysis_engine::{Analyzer, EngineError};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use shared::{Bar, DateRange, Series};
use std::io::Write;
use tempfile::NamedTempFile;

fn year_2024() -> DateRange {
    DateRange {
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    }
}

fn wave(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + 15.0 * (i as f64 / 8.0).sin() + 0.05 * i as f64).collect()
}

fn series_from(closes: &[f64]) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        })
        .collect();
    Series::new("BTC", bars).unwrap()
}

fn csv_fixture(closes: &[f64]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, close) in closes.iter().enumerate() {
        let date = start + Duration::days(i as i64);
        writeln!(file, "{},{},{},{},{},{},1000", date, close, close + 1.0, close - 1.0, close, close).unwrap();
    }
    file.flush().unwrap();
    file
}

fn count(flags: &[bool]) -> usize {
    flags.iter().filter(|&&f| f).count()
}

#[tokio::test]
async fn test_csv_to_report() {
    let fixture = csv_fixture(&wave(120));
    let source = CsvSource::new(fixture.path());
    let series = source.fetch(&SeriesRequest::new("BTC", year_2024())).await.unwrap();
    assert_eq!(series.len(), 120);

    let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
    let analysis = analyzer.run(series, &year_2024()).unwrap();
    let annotated = &analysis.annotated;

    let names: Vec<&str> = annotated.column_names().collect();
    assert_eq!(
        names,
        vec![
            "SMA20", "SMA50", "EMA20", "RSI", "BB_upper", "BB_lower", "BB_middle",
            "Golden_Cross", "Death_Cross", "Oversold", "Overbought",
        ]
    );

    let golden = annotated.signal("Golden_Cross").unwrap();
    let death = annotated.signal("Death_Cross").unwrap();
    assert!(golden.iter().zip(death).all(|(g, d)| !(*g && *d)));
    assert!(golden[..50].iter().all(|f| !f));

    let report = &analysis.report;
    assert_eq!(report.symbol, "BTC");
    assert_eq!(report.golden_crosses, count(golden));
    assert_eq!(report.death_crosses, count(death));
    assert!(report.golden_crosses > 0);
    assert!(report.death_crosses > 0);
    assert_eq!(report.times_oversold, count(annotated.signal("Oversold").unwrap()));
    assert_eq!(report.times_overbought, count(annotated.signal("Overbought").unwrap()));
    assert!(report.rsi_latest.is_some());
    assert_eq!(report.current_price, *wave(120).last().unwrap());
}

#[test]
fn test_runs_are_identical() {
    let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
    let first = analyzer.run(series_from(&wave(90)), &year_2024()).unwrap();
    let second = analyzer.run(series_from(&wave(90)), &year_2024()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.report.to_string(), second.report.to_string());
    assert_eq!(
        first.report.current_price.to_bits(),
        second.report.current_price.to_bits()
    );
    assert_eq!(
        first.report.price_change_pct.to_bits(),
        second.report.price_change_pct.to_bits()
    );
}

#[test]
fn test_sma_last_values() {
    let mut closes = vec![10.0; 11];
    closes.push(12.0);
    let values = sma(&closes, 10).unwrap();

    assert!(values[..9].iter().all(Option::is_none));
    assert!((values[9].unwrap() - 10.0).abs() < 1e-9);
    assert!((values[10].unwrap() - 10.0).abs() < 1e-9);
    assert!((values[11].unwrap() - 10.2).abs() < 1e-9);
}

#[test]
fn test_steady_decline_is_oversold() {
    let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64 * 5.0).collect();
    let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
    let analysis = analyzer.run(series_from(&closes), &year_2024()).unwrap();

    let oversold = analysis.annotated.signal("Oversold").unwrap();
    assert!(oversold[..14].iter().all(|f| !f));
    assert!(oversold[14..].iter().all(|&f| f));
    assert_eq!(analysis.report.times_oversold, 6);
    assert_eq!(analysis.report.rsi_latest, Some(0.0));
    assert_eq!(analysis.report.times_overbought, 0);
    // Not enough history for SMA50, so no crosses either way.
    assert_eq!(analysis.report.golden_crosses, 0);
    assert_eq!(analysis.report.death_crosses, 0);
}

#[test]
fn test_zero_first_close_fails() {
    let closes: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let analyzer = Analyzer::new(AnalyzerSettings::default()).unwrap();
    let result = analyzer.run(series_from(&closes), &year_2024());
    assert!(matches!(result, Err(EngineError::DivisionByZero)));
}

#[tokio::test]
async fn test_range_outside_data_is_not_found() {
    let fixture = csv_fixture(&wave(10));
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
    };
    let result = CsvSource::new(fixture.path()).fetch(&SeriesRequest::new("ETH", range)).await;
    assert!(matches!(result, Err(DataSourceError::NotFound { symbol }) if symbol == "ETH"));
}

#[tokio::test]
async fn test_range_trims_bars() {
    let fixture = csv_fixture(&wave(60));
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
    };
    let series = CsvSource::new(fixture.path()).fetch(&SeriesRequest::new("BTC", range)).await.unwrap();
    assert_eq!(series.len(), 10);
    assert_eq!(series.first().timestamp.date_naive(), range.start);
    assert_eq!(series.last().timestamp.date_naive(), range.end);
}
