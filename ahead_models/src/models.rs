//! Model specifications for the forecast engine
//!
//! Each engine entry point has a typed parameter struct carrying its
//! defaults. [`ModelSpec`] selects one of them for a forecast call.

use ahead_core::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

pub mod armagarch;
pub mod basic;
pub mod dynrm;
pub mod eat;
pub mod fit_forecast;
pub mod mlarch;
pub mod ridge2;
pub mod var;

pub use armagarch::{ArmaGarchParams, Innovations};
pub use basic::{BasicMethod, BasicParams};
pub use dynrm::DynamicRegressionParams;
pub use eat::EatParams;
pub use fit_forecast::{
    Calibration, FitForecastMethod, FitForecastParams, ResidualSimulation, Volatility,
};
pub use mlarch::MlArchParams;
pub use ridge2::{Activation, Clustering, Margins, NodeSimulation, Ridge2Params};
pub use var::{VarParams, VarType};

/// How prediction intervals are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalMethod {
    /// Gaussian quantiles around the point forecast
    #[serde(rename = "gaussian")]
    Gaussian,
    /// Independent bootstrap of residuals
    #[serde(rename = "bootstrap")]
    Bootstrap,
    /// Circular block bootstrap of residuals
    #[serde(rename = "blockbootstrap")]
    BlockBootstrap,
    /// Moving block bootstrap of residuals
    #[serde(rename = "movingblockbootstrap")]
    MovingBlockBootstrap,
    /// R-vine copula simulation of residuals
    #[serde(rename = "rvinecopula")]
    RVineCopula,
    /// Intervals of an ETS model fitted to the residuals
    #[serde(rename = "E")]
    Ets,
    /// Intervals of an ARIMA model fitted to the residuals
    #[serde(rename = "A")]
    Arima,
    /// Intervals of a Theta model fitted to the residuals
    #[serde(rename = "T")]
    Theta,
    /// Surrogate simulation of standardized residuals
    #[serde(rename = "surrogate")]
    Surrogate,
    /// Kernel density simulation of standardized residuals
    #[serde(rename = "kde")]
    Kde,
    /// Conformal calibration on a held-out part of the series
    #[serde(rename = "conformal")]
    Conformal,
}

impl IntervalMethod {
    /// Whether the engine returns simulated sample paths for this method
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            IntervalMethod::Bootstrap
                | IntervalMethod::BlockBootstrap
                | IntervalMethod::MovingBlockBootstrap
                | IntervalMethod::RVineCopula
        )
    }

    /// Name the engine expects for this method
    pub fn code(&self) -> &'static str {
        match self {
            IntervalMethod::Gaussian => "gaussian",
            IntervalMethod::Bootstrap => "bootstrap",
            IntervalMethod::BlockBootstrap => "blockbootstrap",
            IntervalMethod::MovingBlockBootstrap => "movingblockbootstrap",
            IntervalMethod::RVineCopula => "rvinecopula",
            IntervalMethod::Ets => "E",
            IntervalMethod::Arima => "A",
            IntervalMethod::Theta => "T",
            IntervalMethod::Surrogate => "surrogate",
            IntervalMethod::Kde => "kde",
            IntervalMethod::Conformal => "conformal",
        }
    }
}

/// Mean or median aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
}

/// Check that `method` is one of `allowed` for model `model`
pub(crate) fn check_interval_method(
    model: &str,
    method: IntervalMethod,
    allowed: &[IntervalMethod],
) -> Result<()> {
    if allowed.contains(&method) {
        return Ok(());
    }
    let names: Vec<&str> = allowed.iter().map(|m| m.code()).collect();
    Err(ForecastError::InvalidParameter(format!(
        "{} does not support interval method '{}' (expected one of {})",
        model,
        method.code(),
        names.join(", ")
    )))
}

pub(crate) fn check_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ForecastError::InvalidParameter(format!(
            "{} must be positive",
            name
        )));
    }
    Ok(())
}

/// One model and its hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    ArmaGarch(ArmaGarchParams),
    Basic(BasicParams),
    DynamicRegression(DynamicRegressionParams),
    Eat(EatParams),
    Ridge2(Ridge2Params),
    Var(VarParams),
    MlArch(MlArchParams),
    FitForecast(FitForecastParams),
}

impl ModelSpec {
    /// Name of the engine entry point serving this model
    pub fn engine_function(&self) -> &'static str {
        match self {
            ModelSpec::ArmaGarch(_) => "armagarchf",
            ModelSpec::Basic(_) => "basicf",
            ModelSpec::DynamicRegression(_) => "dynrmf",
            ModelSpec::Eat(_) => "eatf",
            ModelSpec::Ridge2(_) => "ridge2f",
            ModelSpec::Var(_) => "varf",
            ModelSpec::MlArch(_) => "mlarchf",
            ModelSpec::FitForecast(_) => "fitforecast",
        }
    }

    pub fn interval_method(&self) -> IntervalMethod {
        match self {
            // intervals come from simulated ARMA-GARCH paths
            ModelSpec::ArmaGarch(_) => IntervalMethod::Bootstrap,
            ModelSpec::Basic(p) => p.type_pi,
            ModelSpec::DynamicRegression(p) => p.type_pi,
            ModelSpec::Eat(p) => p.type_pi,
            ModelSpec::Ridge2(p) => p.type_pi,
            ModelSpec::Var(_) => IntervalMethod::Gaussian,
            ModelSpec::MlArch(p) => p.type_pi,
            ModelSpec::FitForecast(p) if p.conformalize => IntervalMethod::Conformal,
            ModelSpec::FitForecast(_) => IntervalMethod::Gaussian,
        }
    }

    /// Number of simulated replications, for models that simulate
    pub fn replications(&self) -> Option<usize> {
        match self {
            ModelSpec::ArmaGarch(p) => Some(p.b),
            ModelSpec::Basic(p) if p.type_pi.is_stochastic() => Some(p.b),
            ModelSpec::Ridge2(p) if p.type_pi.is_stochastic() => Some(p.b),
            ModelSpec::MlArch(p) => Some(p.b),
            ModelSpec::FitForecast(p) if p.conformalize => Some(p.b),
            _ => None,
        }
    }

    /// Whether the model only accepts a single series
    pub fn is_univariate_only(&self) -> bool {
        matches!(
            self,
            ModelSpec::ArmaGarch(_)
                | ModelSpec::DynamicRegression(_)
                | ModelSpec::Eat(_)
                | ModelSpec::MlArch(_)
        )
    }

    /// Whether the model accepts external regressors
    pub fn supports_xreg(&self) -> bool {
        matches!(self, ModelSpec::Ridge2(_))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelSpec::ArmaGarch(p) => p.validate(),
            ModelSpec::Basic(p) => p.validate(),
            ModelSpec::DynamicRegression(p) => p.validate(),
            ModelSpec::Eat(p) => p.validate(),
            ModelSpec::Ridge2(p) => p.validate(),
            ModelSpec::Var(p) => p.validate(),
            ModelSpec::MlArch(p) => p.validate(),
            ModelSpec::FitForecast(p) => p.validate(),
        }
    }

    /// Parse a model specification from JSON, e.g. `{"model": "ridge2", "lags": 2}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: ModelSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::Basic(BasicParams::default())
    }
}

macro_rules! impl_from_params {
    ($($params:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$params> for ModelSpec {
                fn from(params: $params) -> Self {
                    ModelSpec::$variant(params)
                }
            }
        )*
    };
}

impl_from_params!(
    ArmaGarchParams => ArmaGarch,
    BasicParams => Basic,
    DynamicRegressionParams => DynamicRegression,
    EatParams => Eat,
    Ridge2Params => Ridge2,
    VarParams => Var,
    MlArchParams => MlArch,
    FitForecastParams => FitForecast,
);
