//! Mean, median and random walk forecasts with Gaussian intervals
//!
//! Answers the basic model without an external engine. Every other model,
//! and every interval method other than Gaussian, is refused.

use crate::engine::{EngineOutput, EngineRequest, EngineValue, ForecastEngine};
use crate::models::{BasicMethod, BasicParams, IntervalMethod, ModelSpec};
use ahead_core::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Engine answering [`ModelSpec::Basic`] with Gaussian intervals
#[derive(Debug, Clone, Default)]
pub struct BaselineEngine {
    initialized: bool,
}

impl BaselineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Point forecast and interval half-widths of one series
struct SeriesForecast {
    point: f64,
    half_widths: Vec<f64>,
    fitted: Vec<f64>,
}

impl ForecastEngine for BaselineEngine {
    fn name(&self) -> &str {
        "baseline"
    }

    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn invoke(&self, request: &EngineRequest) -> Result<EngineOutput> {
        let params = match &request.model {
            ModelSpec::Basic(params) if params.type_pi == IntervalMethod::Gaussian => params,
            ModelSpec::Basic(params) => {
                return Err(ForecastError::EngineInvocation(format!(
                    "interval method '{}' not supported by baseline engine",
                    params.type_pi.code()
                )))
            }
            other => {
                return Err(ForecastError::EngineInvocation(format!(
                    "model '{}' not supported by baseline engine",
                    other.engine_function()
                )))
            }
        };

        let z = gaussian_quantile(request.level)?;
        let horizon = request.horizon;
        let n_series = request.series.n_cols;
        let total = horizon * n_series;

        let mut mean = vec![0.0; total];
        let mut lower = vec![0.0; total];
        let mut upper = vec![0.0; total];
        let mut residuals = Vec::with_capacity(request.series.values.len());
        let mut fitted = Vec::with_capacity(request.series.values.len());

        for j in 0..n_series {
            let values = request.series.column(j)?;
            let forecast = forecast_series(&values, params, horizon, z)?;

            for (i, half_width) in forecast.half_widths.iter().enumerate() {
                let offset = request.layout.offset(i, j, horizon, n_series);
                mean[offset] = forecast.point;
                lower[offset] = forecast.point - half_width;
                upper[offset] = forecast.point + half_width;
            }
            residuals.extend(values.iter().zip(&forecast.fitted).map(|(y, f)| y - f));
            fitted.extend(forecast.fitted);
        }

        debug!(
            method = params.method.code(),
            horizon,
            n_series,
            level = request.level,
            "baseline forecast computed"
        );

        EngineOutput::from_fields(vec![
            ("mean", EngineValue::Vector(mean)),
            ("lower", EngineValue::Vector(lower)),
            ("upper", EngineValue::Vector(upper)),
            ("residuals", EngineValue::Vector(residuals)),
            ("fitted", EngineValue::Vector(fitted)),
            ("x", EngineValue::Vector(request.series.values.clone())),
            ("level", EngineValue::Scalar(request.level)),
            ("method", EngineValue::Text(params.method.code().to_string())),
        ])
    }
}

/// Two-sided standard normal quantile for a level in percent
fn gaussian_quantile(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 100.0) {
        return Err(ForecastError::EngineInvocation(format!(
            "level must be in (0, 100), got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::EngineInvocation(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 200.0))
}

fn forecast_series(
    values: &[f64],
    params: &BasicParams,
    horizon: usize,
    z: f64,
) -> Result<SeriesForecast> {
    let n = values.len();

    match params.method {
        BasicMethod::Mean | BasicMethod::Median => {
            if n < 2 {
                return Err(ForecastError::EngineInvocation(format!(
                    "need at least 2 observations, got {}",
                    n
                )));
            }
            let point = match params.method {
                BasicMethod::Median => median(values),
                _ => mean(values),
            };
            let half_width = z * std_dev(values) * (1.0 + 1.0 / n as f64).sqrt();
            Ok(SeriesForecast {
                point,
                half_widths: vec![half_width; horizon],
                fitted: vec![point; n],
            })
        }
        BasicMethod::RandomWalk => {
            if n < 3 {
                return Err(ForecastError::EngineInvocation(format!(
                    "need at least 3 observations for a random walk, got {}",
                    n
                )));
            }
            let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
            let sigma = std_dev(&diffs);
            let point = values[n - 1];
            let half_widths = (1..=horizon)
                .map(|k| z * sigma * (k as f64).sqrt())
                .collect();
            // the first observation has no predecessor
            let fitted = std::iter::once(values[0])
                .chain(values[..n - 1].iter().copied())
                .collect();
            Ok(SeriesForecast {
                point,
                half_widths,
                fitted,
            })
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
