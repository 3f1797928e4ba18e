//! Random vector functional link network with two regularization parameters

use super::{check_interval_method, check_positive, Aggregation, IntervalMethod};
use ahead_core::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Sequence used to draw the hidden layer weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSimulation {
    #[default]
    Sobol,
    Halton,
    Unif,
}

/// Hidden layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Sigmoid,
    Tanh,
    LeakyRelu,
    Elu,
    Linear,
}

/// Marginal distribution of the residuals for copula intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Margins {
    #[default]
    Empirical,
    Gaussian,
}

/// Clustering of the inputs before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clustering {
    #[default]
    KMeans,
    HClust,
}

/// Parameters of the ridge2 entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ridge2Params {
    /// Number of lags of each series used as predictors
    pub lags: usize,
    /// Nodes in the hidden layer
    pub nb_hidden: usize,
    pub nodes_sim: NodeSimulation,
    pub activation: Activation,
    /// Slope of the `leakyrelu` and `elu` activations
    pub a: f64,
    /// Regularization of the original predictors
    pub lambda_1: f64,
    /// Regularization of the hidden layer
    pub lambda_2: f64,
    /// Share of hidden nodes dropped, in `[0, 1)`
    pub dropout: f64,
    pub type_pi: IntervalMethod,
    pub block_length: usize,
    pub margins: Margins,
    #[serde(alias = "B")]
    pub b: usize,
    /// Aggregation of bootstrap replications into the point forecast
    pub type_aggregation: Aggregation,
    /// Number of clusters, 0 disables clustering
    pub centers: usize,
    pub type_clustering: Clustering,
    pub cl: usize,
    pub seed: u64,
}

impl Default for Ridge2Params {
    fn default() -> Self {
        Self {
            lags: 1,
            nb_hidden: 5,
            nodes_sim: NodeSimulation::Sobol,
            activation: Activation::Relu,
            a: 0.01,
            lambda_1: 0.1,
            lambda_2: 0.1,
            dropout: 0.0,
            type_pi: IntervalMethod::Gaussian,
            block_length: 3,
            margins: Margins::Empirical,
            b: 100,
            type_aggregation: Aggregation::Mean,
            centers: 2,
            type_clustering: Clustering::KMeans,
            cl: 1,
            seed: 123,
        }
    }
}

impl Ridge2Params {
    pub fn validate(&self) -> Result<()> {
        check_positive("lags", self.lags)?;
        check_positive("nb_hidden", self.nb_hidden)?;
        check_positive("B", self.b)?;
        check_positive("cl", self.cl)?;

        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ForecastError::InvalidParameter(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        for (name, value) in [
            ("a", self.a),
            ("lambda_1", self.lambda_1),
            ("lambda_2", self.lambda_2),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        check_interval_method(
            "ridge2f",
            self.type_pi,
            &[
                IntervalMethod::Gaussian,
                IntervalMethod::Bootstrap,
                IntervalMethod::BlockBootstrap,
                IntervalMethod::MovingBlockBootstrap,
                IntervalMethod::RVineCopula,
            ],
        )
    }
}
