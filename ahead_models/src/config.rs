//! Forecast call configuration

use ahead_core::date_format::{DateFormatter, DateFormatting};
use ahead_core::error::{ForecastError, Result};
use ahead_core::normalize::BufferLayout;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SECONDS_PER_DAY: i32 = 86_400;

/// Settings shared by every model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of steps ahead; `None` lets the model pick (fit-and-forecast only)
    #[serde(alias = "h")]
    pub horizon: Option<usize>,
    /// Confidence level of the prediction intervals, in percent
    pub level: f64,
    pub date_formatting: DateFormatting,
    /// Offset from UTC at which output dates start, for epoch timestamps
    pub utc_offset_seconds: i32,
    /// Flattening of the engine output buffers
    pub layout: BufferLayout,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: Some(5),
            level: 95.0,
            date_formatting: DateFormatting::Original,
            utc_offset_seconds: 0,
            layout: BufferLayout::SeriesMajor,
        }
    }
}

impl ForecastConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Let the model derive the horizon from the input length
    pub fn without_horizon(mut self) -> Self {
        self.horizon = None;
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn with_date_formatting(mut self, date_formatting: DateFormatting) -> Self {
        self.date_formatting = date_formatting;
        self
    }

    pub fn with_utc_offset_seconds(mut self, seconds: i32) -> Self {
        self.utc_offset_seconds = seconds;
        self
    }

    pub fn with_layout(mut self, layout: BufferLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Load a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be positive".to_string(),
            ));
        }
        if !(self.level > 0.0 && self.level < 100.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Level must be in (0, 100), got {}",
                self.level
            )));
        }
        self.offset()?;
        Ok(())
    }

    /// UTC offset as a chrono offset
    pub fn offset(&self) -> Result<FixedOffset> {
        if self.utc_offset_seconds.abs() >= SECONDS_PER_DAY {
            return Err(ForecastError::InvalidParameter(format!(
                "UTC offset must be within 24 hours, got {} seconds",
                self.utc_offset_seconds
            )));
        }
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Invalid UTC offset of {} seconds",
                self.utc_offset_seconds
            ))
        })
    }

    /// Date formatter for this configuration
    pub fn formatter(&self) -> Result<DateFormatter> {
        Ok(DateFormatter::with_offset(self.date_formatting, self.offset()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon, Some(5));
        assert_eq!(config.level, 95.0);
    }

    #[test]
    fn test_offset_bounds() {
        assert!(ForecastConfig::default()
            .with_utc_offset_seconds(SECONDS_PER_DAY)
            .validate()
            .is_err());
        assert!(ForecastConfig::default()
            .with_utc_offset_seconds(-3600)
            .validate()
            .is_ok());
    }
}
