//! Unpacking of simulated sample paths
//!
//! Stochastic interval methods make the engine return `B` replications, each
//! a flat `horizon × n_series` buffer. Downstream consumers (fan charts,
//! custom quantiles) want one `horizon × B` matrix per series instead.

use crate::error::{ForecastError, Result};
use crate::normalize::BufferLayout;
use ndarray::Array2;

/// Reshape `B` flat replication buffers into one `horizon × B` matrix per series.
///
/// Column `b` of every matrix is replication `b`; row `i` is horizon step `i`.
pub fn unpack(
    raw: &[Vec<f64>],
    n_series: usize,
    horizon: usize,
    layout: BufferLayout,
) -> Result<Vec<Array2<f64>>> {
    if raw.is_empty() {
        return Err(ForecastError::shape("simulations", 1, 0));
    }
    if n_series == 0 || horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Number of series and horizon must be positive".to_string(),
        ));
    }

    let expected = n_series * horizon;
    for (b, replication) in raw.iter().enumerate() {
        if replication.len() != expected {
            return Err(ForecastError::shape(
                format!("simulation {}", b),
                expected,
                replication.len(),
            ));
        }
    }

    let replications = raw.len();
    let matrices = (0..n_series)
        .map(|ix| {
            Array2::from_shape_fn((horizon, replications), |(i, b)| {
                raw[b][layout.offset(i, ix, horizon, n_series)]
            })
        })
        .collect();

    Ok(matrices)
}

/// Column `ix` of every `horizon × n_series` replication, stacked as a
/// `horizon × B` matrix.
pub fn unpack_matrices(raw: &[Array2<f64>], ix: usize) -> Result<Array2<f64>> {
    let first = raw
        .first()
        .ok_or_else(|| ForecastError::shape("simulations", 1, 0))?;
    let (horizon, n_series) = first.dim();

    if ix >= n_series {
        return Err(ForecastError::InvalidParameter(format!(
            "Series index {} out of range (< {})",
            ix, n_series
        )));
    }

    for (b, replication) in raw.iter().enumerate() {
        if replication.dim() != (horizon, n_series) {
            return Err(ForecastError::shape(
                format!("simulation {}", b),
                horizon * n_series,
                replication.len(),
            ));
        }
    }

    Ok(Array2::from_shape_fn((horizon, raw.len()), |(i, b)| {
        raw[b][[i, ix]]
    }))
}
