//! Fit a classical model and forecast with calibrated uncertainty

use super::{check_positive, Aggregation};
use ahead_core::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Model fitted by the fit-and-forecast entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitForecastMethod {
    #[default]
    Thetaf,
    Arima,
    Ets,
    Te,
    Tbats,
    Tslm,
    Dynrmf,
    Ridge2f,
    Naive,
    Snaive,
}

/// Calibration of the conformal intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calibration {
    #[default]
    SplitConformal,
    MedianScp,
}

/// Volatility model of the calibration residuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    #[default]
    Constant,
    Garch,
}

/// Simulation of calibration residuals, shared with MLARCH conformalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualSimulation {
    #[default]
    Kde,
    Surrogate,
    Bootstrap,
    #[serde(rename = "block-bootstrap")]
    BlockBootstrap,
}

impl ResidualSimulation {
    /// Name passed to the engine
    pub fn code(&self) -> &'static str {
        match self {
            ResidualSimulation::Kde => "kde",
            ResidualSimulation::Surrogate => "surrogate",
            ResidualSimulation::Bootstrap => "bootstrap",
            ResidualSimulation::BlockBootstrap => "block-bootstrap",
        }
    }
}

/// Parameters of the fit-and-forecast entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitForecastParams {
    pub method: FitForecastMethod,
    /// Share of the series used for fitting
    pub pct_train: f64,
    /// Share of the series used for calibration; also sets the default horizon
    pub pct_calibration: f64,
    #[serde(alias = "B")]
    pub b: usize,
    pub seed: u64,
    pub conformalize: bool,
    pub type_calibration: Calibration,
    pub gap: usize,
    /// Aggregation of the calibration residuals
    pub agg: Aggregation,
    pub vol: Volatility,
    pub type_sim: ResidualSimulation,
}

impl Default for FitForecastParams {
    fn default() -> Self {
        Self {
            method: FitForecastMethod::Thetaf,
            pct_train: 0.9,
            pct_calibration: 0.5,
            b: 1000,
            seed: 17223,
            conformalize: false,
            type_calibration: Calibration::SplitConformal,
            gap: 3,
            agg: Aggregation::Mean,
            vol: Volatility::Constant,
            type_sim: ResidualSimulation::Kde,
        }
    }
}

impl FitForecastParams {
    pub fn with_method(method: FitForecastMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Horizon used when none is configured: `floor(n_rows × pct_calibration)`, at least 1
    pub fn default_horizon(&self, n_rows: usize) -> usize {
        ((n_rows as f64 * self.pct_calibration).floor() as usize).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pct_train", self.pct_train),
            ("pct_calibration", self.pct_calibration),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be in (0, 1), got {}",
                    name, value
                )));
            }
        }
        check_positive("B", self.b)
    }
}
