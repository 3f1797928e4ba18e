//! Dynamic regression model

use super::{check_interval_method, IntervalMethod};
use ahead_core::error::Result;
use serde::{Deserialize, Serialize};

/// Parameters of the dynamic regression entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRegressionParams {
    /// Model fitted to the residuals for the intervals (`E`, `A` or `T`)
    pub type_pi: IntervalMethod,
}

impl Default for DynamicRegressionParams {
    fn default() -> Self {
        Self {
            type_pi: IntervalMethod::Ets,
        }
    }
}

impl DynamicRegressionParams {
    pub fn validate(&self) -> Result<()> {
        check_interval_method(
            "dynrmf",
            self.type_pi,
            &[IntervalMethod::Ets, IntervalMethod::Arima, IntervalMethod::Theta],
        )
    }
}
