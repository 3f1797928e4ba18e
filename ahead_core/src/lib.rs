//! # Ahead Core
//!
//! Calendar alignment and result normalization for time series forecast engines.
//!
//! ## Features
//!
//! - Frequency code resolution (exact aliases with a closest-match fallback)
//! - Frequency inference and forecast date generation
//! - Output date encoding (calendar strings or epoch milliseconds)
//! - Normalization of flat engine buffers into per-series result tables
//! - Unpacking of simulated sample paths into per-series matrices
//! - Rolling-origin cross-validation indices
//!
//! ## Quick Start
//!
//! ```rust
//! use ahead_core::calendar::compute_output_dates;
//! use ahead_core::date_format::{DateFormatter, DateFormatting};
//! use ahead_core::normalize::{normalize, BufferLayout, RawForecastBuffer};
//! use chrono::NaiveDate;
//!
//! # fn main() -> ahead_core::Result<()> {
//! let dates: Vec<NaiveDate> = ["2020-01-01", "2020-02-01", "2020-03-01"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//!
//! // Monthly input, two steps ahead
//! let (output_dates, frequency) = compute_output_dates(&dates, 2)?;
//! assert_eq!(frequency.cycle_length(), 12);
//!
//! // Shape the engine output
//! let formatter = DateFormatter::new(DateFormatting::Original);
//! let formatted = formatter.format_all(&output_dates)?;
//! let raw = RawForecastBuffer::new(vec![1.0, 2.0], vec![0.5, 1.5], vec![1.5, 2.5]);
//! let forecast = normalize(1, &formatted, 2, &raw, BufferLayout::SeriesMajor)?;
//! assert!(forecast.is_univariate());
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod data;
pub mod date_format;
pub mod error;
pub mod frequency;
pub mod normalize;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use crate::calendar::{compute_input_dates, compute_output_dates, Anchor, Frequency};
pub use crate::data::{DataLoader, TableIndex, TimeSeriesTable};
pub use crate::date_format::{DateFormatter, DateFormatting, FormattedDate};
pub use crate::error::{ForecastError, Result};
pub use crate::normalize::{
    compute_result_df, normalize, BufferLayout, MeanPoint, NormalizedForecast, RangePoint,
    RawForecastBuffer,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
