//! # Ahead Models
//!
//! Model specifications, the forecast engine contract and the forecasting
//! pipeline built on `ahead_core`.
//!
//! ## Models
//!
//! Every engine entry point has a typed parameter struct with its defaults:
//!
//! - **ARMA-GARCH**, **dynamic regression**, **EAT** and **MLARCH**: single series only
//! - **Basic** (mean, median, random walk), **ridge2**, **VAR** and
//!   **fit-and-forecast**: one or more series
//!
//! ## Usage Example
//!
//! ```rust
//! use ahead_core::data::TimeSeriesTable;
//! use ahead_models::engines::BaselineEngine;
//! use ahead_models::models::{BasicMethod, BasicParams, ModelSpec};
//! use ahead_models::{ForecastConfig, Forecaster};
//! use chrono::NaiveDate;
//!
//! # fn main() -> ahead_core::Result<()> {
//! let dates: Vec<NaiveDate> = ["2020-01-01", "2020-02-01", "2020-03-01", "2020-04-01"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//! let table = TimeSeriesTable::univariate(dates, "sales", vec![10.0, 12.0, 11.0, 13.0])?;
//!
//! let config = ForecastConfig::default().with_horizon(3);
//! let mut forecaster = Forecaster::with_config(BaselineEngine::new(), config)?;
//! let model = ModelSpec::from(BasicParams::with_method(BasicMethod::RandomWalk));
//!
//! let outcome = forecaster.forecast(&table, &model)?;
//! assert_eq!(outcome.horizon(), 3);
//! assert_eq!(outcome.frequency.cycle_length(), 12);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod engines;
pub mod models;
pub mod pipeline;

pub use crate::config::ForecastConfig;
pub use crate::engine::{
    EngineOutput, EngineRequest, EngineValue, ForecastEngine, FrequencyTaggedSeries,
};
pub use crate::models::{IntervalMethod, ModelSpec};
pub use crate::pipeline::{ForecastOutcome, Forecaster};
