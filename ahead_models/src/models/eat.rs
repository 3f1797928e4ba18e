//! Combination of ETS, ARIMA and Theta forecasts

use super::{check_interval_method, IntervalMethod};
use ahead_core::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the EAT entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EatParams {
    /// Weights of the ETS, ARIMA and Theta forecasts
    pub weights: [f64; 3],
    pub type_pi: IntervalMethod,
}

impl Default for EatParams {
    fn default() -> Self {
        Self {
            weights: [1.0 / 3.0; 3],
            type_pi: IntervalMethod::Ets,
        }
    }
}

impl EatParams {
    /// Create parameters with the given combination weights
    pub fn with_weights(weights: [f64; 3]) -> Result<Self> {
        let params = Self {
            weights,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "EAT weights must be finite and non-negative, got {:?}",
                self.weights
            )));
        }
        if self.weights.iter().all(|w| *w == 0.0) {
            return Err(ForecastError::InvalidParameter(
                "EAT weights cannot all be zero".to_string(),
            ));
        }
        check_interval_method(
            "eatf",
            self.type_pi,
            &[IntervalMethod::Ets, IntervalMethod::Arima, IntervalMethod::Theta],
        )
    }
}
