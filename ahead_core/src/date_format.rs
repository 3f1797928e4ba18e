//! Output date encodings

use crate::error::{ForecastError, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar date format used for `DateFormatting::Original`
pub const CALENDAR_FORMAT: &str = "%Y-%m-%d";

/// How output dates are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormatting {
    /// `yyyy-mm-dd` strings
    #[default]
    #[serde(rename = "original", alias = "calendar")]
    Original,
    /// Milliseconds since the Unix epoch, at midnight
    #[serde(rename = "ms", alias = "epoch_ms")]
    Milliseconds,
}

impl FromStr for DateFormatting {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "original" | "calendar" => Ok(DateFormatting::Original),
            "ms" | "epoch_ms" => Ok(DateFormatting::Milliseconds),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown date formatting '{}' (expected 'original' or 'ms')",
                other
            ))),
        }
    }
}

/// A date rendered in one of the output encodings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FormattedDate {
    Calendar(String),
    EpochMillis(i64),
}

impl fmt::Display for FormattedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattedDate::Calendar(s) => write!(f, "{}", s),
            FormattedDate::EpochMillis(ms) => write!(f, "{}", ms),
        }
    }
}

/// Renders dates with one encoding for the whole forecast call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    formatting: DateFormatting,
    /// Offset at which calendar midnight is taken for epoch timestamps
    offset: FixedOffset,
}

impl DateFormatter {
    /// Create a formatter taking midnight in UTC
    pub fn new(formatting: DateFormatting) -> Self {
        Self::with_offset(formatting, Utc.fix())
    }

    /// Create a formatter taking midnight at a fixed UTC offset
    pub fn with_offset(formatting: DateFormatting, offset: FixedOffset) -> Self {
        Self { formatting, offset }
    }

    pub fn formatting(&self) -> DateFormatting {
        self.formatting
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Encode one date.
    ///
    /// Epoch timestamps are derived from the rendered calendar string, so they
    /// always fall on midnight of that calendar day.
    pub fn format(&self, date: NaiveDate) -> Result<FormattedDate> {
        let calendar = date.format(CALENDAR_FORMAT).to_string();

        match self.formatting {
            DateFormatting::Original => Ok(FormattedDate::Calendar(calendar)),
            DateFormatting::Milliseconds => {
                let midnight = parse_calendar(&calendar)?
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| {
                        ForecastError::DataError(format!("no midnight on {}", calendar))
                    })?;
                let local = self
                    .offset
                    .from_local_datetime(&midnight)
                    .single()
                    .ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "midnight of {} is ambiguous at offset {}",
                            calendar, self.offset
                        ))
                    })?;
                Ok(FormattedDate::EpochMillis(local.timestamp_millis()))
            }
        }
    }

    /// Encode a timestamp, truncating it to its calendar day
    pub fn format_datetime(&self, timestamp: NaiveDateTime) -> Result<FormattedDate> {
        self.format(timestamp.date())
    }

    /// Encode every date with the same mode
    pub fn format_all(&self, dates: &[NaiveDate]) -> Result<Vec<FormattedDate>> {
        dates.iter().map(|d| self.format(*d)).collect()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(DateFormatting::default())
    }
}

/// Parse a `yyyy-mm-dd` string
pub fn parse_calendar(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), CALENDAR_FORMAT)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("ms".parse::<DateFormatting>().unwrap(), DateFormatting::Milliseconds);
        assert_eq!("Original".parse::<DateFormatting>().unwrap(), DateFormatting::Original);
        assert!("seconds".parse::<DateFormatting>().is_err());
    }

    #[test]
    fn test_datetime_truncated_to_midnight() {
        let formatter = DateFormatter::new(DateFormatting::Milliseconds);
        let noon = NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            formatter.format_datetime(noon).unwrap(),
            FormattedDate::EpochMillis(86_400_000)
        );
    }
}
