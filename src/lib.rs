//! # Ahead
//!
//! Calendar alignment and output normalization in front of a time series
//! forecast engine.
//!
//! - [`ahead_core`]: frequency resolution, date alignment, date encodings, result
//!   normalization and simulation unpacking
//! - [`ahead_models`]: model specifications, the engine contract and the
//!   forecasting pipeline
//!
//! ## Example
//!
//! ```
//! use ahead::ahead_core::frequency::resolve;
//!
//! assert_eq!(resolve("MS"), 12);
//! assert_eq!(resolve("Mnth"), 12);
//! ```

pub use ahead_core;
pub use ahead_models;

pub use ahead_core::{ForecastError, Result};
pub use ahead_models::{ForecastConfig, Forecaster, ModelSpec};
