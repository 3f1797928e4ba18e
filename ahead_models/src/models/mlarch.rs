//! Conformalized machine learning ARCH model

use super::{check_interval_method, check_positive, IntervalMethod, ResidualSimulation};
use ahead_core::error::Result;
use serde::{Deserialize, Serialize};

/// Parameters of the MLARCH entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlArchParams {
    #[serde(alias = "B")]
    pub b: usize,
    /// Simulation of the volatility intervals
    pub type_pi: IntervalMethod,
    /// Simulation of the standardized residuals during conformalization
    pub type_sim_conformalize: ResidualSimulation,
    pub seed: u64,
}

impl Default for MlArchParams {
    fn default() -> Self {
        Self {
            b: 100,
            type_pi: IntervalMethod::Surrogate,
            type_sim_conformalize: ResidualSimulation::BlockBootstrap,
            seed: 123,
        }
    }
}

impl MlArchParams {
    pub fn validate(&self) -> Result<()> {
        check_positive("B", self.b)?;
        check_interval_method(
            "mlarchf",
            self.type_pi,
            &[
                IntervalMethod::Surrogate,
                IntervalMethod::Bootstrap,
                IntervalMethod::Kde,
            ],
        )
    }
}
