// Requested analysis window. Omitted bounds default to the 365 days ending today.
use chrono::{Duration, NaiveDate};
use shared::utils::parse_date;
use shared::DateRange;

use crate::error::{EngineError, Result};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateWindow {
    /// Parses optional `YYYY-MM-DD` bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let parse = |label: &str, value: Option<&str>| -> Result<Option<NaiveDate>> {
            value
                .map(|s| {
                    parse_date(s).map_err(|e| {
                        EngineError::ConfigError(format!("Invalid {} date '{}' (expected YYYY-MM-DD): {}", label, s, e))
                    })
                })
                .transpose()
        };
        Ok(Self {
            start_date: parse("start", start)?,
            end_date: parse("end", end)?,
        })
    }

    /// Inclusive range against the caller-supplied `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or(today - Duration::days(DEFAULT_LOOKBACK_DAYS));
        if start > end {
            return Err(EngineError::ConfigError(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(DateRange { start, end })
    }
}
