//! Benchmark forecasts: mean, median and random walk

use super::{check_interval_method, check_positive, IntervalMethod};
use ahead_core::error::Result;
use serde::{Deserialize, Serialize};

/// Point forecast of the basic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BasicMethod {
    /// Sample mean
    #[default]
    #[serde(rename = "mean")]
    Mean,
    /// Sample median
    #[serde(rename = "median")]
    Median,
    /// Last observation
    #[serde(rename = "rw", alias = "random_walk")]
    RandomWalk,
}

impl BasicMethod {
    pub fn code(&self) -> &'static str {
        match self {
            BasicMethod::Mean => "mean",
            BasicMethod::Median => "median",
            BasicMethod::RandomWalk => "rw",
        }
    }
}

/// Parameters of the basic entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicParams {
    pub method: BasicMethod,
    pub type_pi: IntervalMethod,
    /// Block length for block bootstrap intervals
    pub block_length: usize,
    /// Number of bootstrap replications
    #[serde(alias = "B")]
    pub b: usize,
    pub seed: u64,
}

impl Default for BasicParams {
    fn default() -> Self {
        Self {
            method: BasicMethod::Mean,
            type_pi: IntervalMethod::Gaussian,
            block_length: 3,
            b: 100,
            seed: 123,
        }
    }
}

impl BasicParams {
    /// Default parameters with another point forecast
    pub fn with_method(method: BasicMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_interval_method(
            "basicf",
            self.type_pi,
            &[
                IntervalMethod::Gaussian,
                IntervalMethod::Bootstrap,
                IntervalMethod::BlockBootstrap,
                IntervalMethod::MovingBlockBootstrap,
            ],
        )?;
        check_positive("B", self.b)?;
        check_positive("block_length", self.block_length)
    }
}
