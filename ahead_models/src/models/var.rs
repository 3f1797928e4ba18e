//! Vector autoregression

use super::check_positive;
use ahead_core::error::Result;
use serde::{Deserialize, Serialize};

/// Deterministic regressors of the VAR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    #[default]
    None,
    Const,
    Trend,
    Both,
}

/// Parameters of the VAR entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarParams {
    pub lags: usize,
    #[serde(alias = "type_VAR")]
    pub type_var: VarType,
}

impl Default for VarParams {
    fn default() -> Self {
        Self {
            lags: 1,
            type_var: VarType::None,
        }
    }
}

impl VarParams {
    pub fn validate(&self) -> Result<()> {
        check_positive("lags", self.lags)
    }
}
