//! Utility functions for the ahead_core crate

use crate::error::{ForecastError, Result};
use std::ops::Range;

/// One rolling-origin split: observation indices for training and testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// Splits for time series cross-validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TscvSplits {
    /// Splits whose test window ends within the first `p × n` observations
    pub train_test: Vec<Split>,
    /// Remaining splits (always empty when `p == 1`)
    pub hold_out: Vec<Split>,
}

/// Generate rolling-origin indices for time series cross-validation.
///
/// # Arguments
/// * `n` - Input series length
/// * `p` - Proportion of data used for the cross-validation splits, in `(0, 1]`
/// * `initial_window` - Length of the first training window
/// * `horizon` - Length of each test window
/// * `fixed_window` - Slide the training window instead of expanding it
pub fn tscv_indices(
    n: usize,
    p: f64,
    initial_window: usize,
    horizon: usize,
    fixed_window: bool,
) -> Result<TscvSplits> {
    if !(p > 0.0 && p <= 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "p must be in (0, 1], got {}",
            p
        )));
    }
    if initial_window == 0 || horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Initial window and horizon must be positive".to_string(),
        ));
    }

    let cutoff = (p * n as f64).floor() as usize;
    let mut splits = TscvSplits::default();

    let mut train = 0..initial_window;
    let mut test = initial_window..initial_window + horizon;

    while test.end <= n {
        let split = Split {
            train: train.clone(),
            test: test.clone(),
        };
        if p >= 1.0 || test.end <= cutoff {
            splits.train_test.push(split);
        } else {
            splits.hold_out.push(split);
        }

        if fixed_window {
            train.start += 1;
        }
        train.end += 1;
        test.start += 1;
        test.end += 1;
    }

    Ok(splits)
}
