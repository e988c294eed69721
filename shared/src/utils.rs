// Date and number helpers shared by the engine and the chart renderer.
use chrono::{DateTime, NaiveDate, NaiveTime, ParseError, Utc};

/// Calendar date format used on the command line, in CSV exports and in reports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc)
}

pub fn format_decimal(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}", value, decimals = decimals)
}
