//! ARMA(1, 1)-GARCH(1, 1) model

use super::check_positive;
use ahead_core::error::Result;
use serde::{Deserialize, Serialize};

/// Distribution of the GARCH innovations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Innovations {
    #[default]
    Student,
    Gaussian,
}

/// Parameters of the ARMA-GARCH entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmaGarchParams {
    /// Number of simulated paths
    #[serde(alias = "B")]
    pub b: usize,
    /// Number of parallel workers on the engine side
    pub cl: usize,
    pub dist: Innovations,
    pub seed: u64,
}

impl Default for ArmaGarchParams {
    fn default() -> Self {
        Self {
            b: 250,
            cl: 1,
            dist: Innovations::Student,
            seed: 123,
        }
    }
}

impl ArmaGarchParams {
    pub fn validate(&self) -> Result<()> {
        check_positive("B", self.b)?;
        check_positive("cl", self.cl)
    }
}
