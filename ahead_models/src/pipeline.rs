//! Forecasting pipeline shared by every model
//!
//! A forecast call aligns the input on a calendar, hands a frequency-tagged
//! series to the engine and shapes the engine's flat answer into per-series
//! results.

use crate::config::ForecastConfig;
use crate::engine::{EngineOutput, EngineRequest, ForecastEngine, FrequencyTaggedSeries};
use crate::models::ModelSpec;
use ahead_core::calendar::{compute_input_dates, compute_output_dates, Frequency};
use ahead_core::data::TimeSeriesTable;
use ahead_core::date_format::FormattedDate;
use ahead_core::error::{ForecastError, Result};
use ahead_core::normalize::{compute_result_df, normalize, BufferLayout, NormalizedForecast};
use ahead_core::simulation::unpack;
use chrono::{NaiveDate, Utc};
use ndarray::Array2;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

/// Everything produced by one forecast call
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub series_names: Vec<String>,
    /// Inferred sampling frequency of the input
    pub frequency: Frequency,
    /// Regularized dates of the input observations
    pub input_dates: Vec<NaiveDate>,
    pub output_dates: Vec<FormattedDate>,
    pub forecast: NormalizedForecast,
    /// Point forecasts, `horizon × n_series`
    pub mean: Array2<f64>,
    /// Lower interval bounds, `horizon × n_series`
    pub lower: Array2<f64>,
    /// Upper interval bounds, `horizon × n_series`
    pub upper: Array2<f64>,
    /// One `date`, `mean`, `lower`, `upper` table per series
    pub result_tables: Vec<DataFrame>,
    /// One `horizon × B` matrix per series, for simulation-based intervals
    pub simulations: Option<Vec<Array2<f64>>>,
    /// Engine answer as received
    pub raw: EngineOutput,
}

impl ForecastOutcome {
    pub fn horizon(&self) -> usize {
        self.output_dates.len()
    }

    pub fn n_series(&self) -> usize {
        self.series_names.len()
    }

    /// Result table of a series by name
    pub fn result_table(&self, name: &str) -> Option<&DataFrame> {
        let ix = self.series_names.iter().position(|n| n == name)?;
        self.result_tables.get(ix)
    }

    /// Simulated paths of a series by name
    pub fn simulations_for(&self, name: &str) -> Option<&Array2<f64>> {
        let ix = self.series_names.iter().position(|n| n == name)?;
        self.simulations.as_ref()?.get(ix)
    }
}

/// Runs forecasts through an engine
#[derive(Debug)]
pub struct Forecaster<E: ForecastEngine> {
    engine: E,
    config: ForecastConfig,
    /// Date used for zero-based positional indices; today when unset
    reference_date: Option<NaiveDate>,
    initialized: bool,
}

impl<E: ForecastEngine> Forecaster<E> {
    /// Create a forecaster with the default configuration
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: ForecastConfig::default(),
            reference_date: None,
            initialized: false,
        }
    }

    /// Create a forecaster with a custom configuration
    pub fn with_config(engine: E, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(engine)
        })
    }

    /// Pin the first date of zero-based positional indices
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Forecast every series of `table` with `model`
    pub fn forecast(
        &mut self,
        table: &TimeSeriesTable,
        model: &ModelSpec,
    ) -> Result<ForecastOutcome> {
        self.forecast_with_xreg(table, model, None)
    }

    /// Forecast with external regressors (one row per observation)
    pub fn forecast_with_xreg(
        &mut self,
        table: &TimeSeriesTable,
        model: &ModelSpec,
        xreg: Option<Array2<f64>>,
    ) -> Result<ForecastOutcome> {
        self.config.validate()?;
        model.validate()?;

        let n_series = table.n_series();
        let n_rows = table.len();

        if model.is_univariate_only() && n_series > 1 {
            return Err(ForecastError::ValidationError(format!(
                "{} forecasts a single series, got {}",
                model.engine_function(),
                n_series
            )));
        }
        if let Some(xreg) = &xreg {
            if !model.supports_xreg() {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} does not accept external regressors",
                    model.engine_function()
                )));
            }
            if xreg.nrows() != n_rows {
                return Err(ForecastError::shape("xreg rows", n_rows, xreg.nrows()));
            }
        }

        let horizon = self.resolve_horizon(model, n_rows)?;

        let today = self.reference_date.unwrap_or_else(|| Utc::now().date_naive());
        let input_dates = compute_input_dates(table.index(), today)?;
        let (output_dates, frequency) = compute_output_dates(&input_dates, horizon)?;
        let cycle_length = ahead_core::frequency::resolve(&frequency.code());

        debug!(
            engine = self.engine.name(),
            model = model.engine_function(),
            n_series,
            n_rows,
            horizon,
            frequency = %frequency,
            cycle_length,
            "prepared forecast input"
        );

        let request = EngineRequest {
            series: FrequencyTaggedSeries::from_table(table, cycle_length)?,
            horizon,
            level: self.config.level,
            model: model.clone(),
            xreg,
            layout: self.config.layout,
        };

        self.ensure_initialized()?;
        let raw = self.engine.invoke(&request).map_err(|err| {
            warn!(engine = self.engine.name(), error = %err, "engine call failed");
            err
        })?;

        let formatter = self.config.formatter()?;
        let formatted_dates = formatter.format_all(&output_dates)?;
        let buffer = raw.buffer();
        let forecast = normalize(n_series, &formatted_dates, horizon, &buffer, self.config.layout)?;

        let layout = self.config.layout;
        let mean = to_matrix(&buffer.mean, layout, horizon, n_series);
        let lower = to_matrix(&buffer.lower, layout, horizon, n_series);
        let upper = to_matrix(&buffer.upper, layout, horizon, n_series);

        let result_tables = (0..n_series)
            .map(|j| {
                let (averages, ranges) = forecast.series(j).ok_or_else(|| {
                    ForecastError::DataError(format!("No forecast for series {}", j))
                })?;
                compute_result_df(averages, ranges)
            })
            .collect::<Result<Vec<_>>>()?;

        let simulations = match (&raw.sims, model.interval_method().is_stochastic()) {
            (Some(sims), true) => Some(unpack(sims, n_series, horizon, layout)?),
            (None, true) => {
                debug!(model = model.engine_function(), "engine returned no simulations");
                None
            }
            (_, false) => None,
        };

        Ok(ForecastOutcome {
            series_names: table.series_names().to_vec(),
            frequency,
            input_dates,
            output_dates: formatted_dates,
            forecast,
            mean,
            lower,
            upper,
            result_tables,
            simulations,
            raw,
        })
    }

    fn resolve_horizon(&self, model: &ModelSpec, n_rows: usize) -> Result<usize> {
        match (self.config.horizon, model) {
            (Some(horizon), _) => Ok(horizon),
            (None, ModelSpec::FitForecast(params)) => Ok(params.default_horizon(n_rows)),
            (None, _) => Err(ForecastError::InvalidParameter(format!(
                "{} needs an explicit horizon",
                model.engine_function()
            ))),
        }
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if !self.initialized {
            debug!(engine = self.engine.name(), "initializing forecast engine");
            self.engine.initialize()?;
            self.initialized = true;
        }
        Ok(())
    }
}

/// `horizon × n_series` view of a flat buffer already checked by `normalize`
fn to_matrix(values: &[f64], layout: BufferLayout, horizon: usize, n_series: usize) -> Array2<f64> {
    Array2::from_shape_fn((horizon, n_series), |(i, j)| {
        values[layout.offset(i, j, horizon, n_series)]
    })
}
