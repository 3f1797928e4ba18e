//! Normalization of flat engine output into per-series results
//!
//! Forecast engines return the mean, lower and upper bounds of every series
//! as three flat buffers of length `n_series × horizon`. This module slices
//! them back into one `(date, mean)` list and one `(date, lower, upper)` list
//! per series, and assembles those lists into result tables.

use crate::date_format::FormattedDate;
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How a `horizon × n_series` block is flattened by the engine.
///
/// This is a versioned contract with the engine: current engines flatten
/// series-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferLayout {
    /// All steps of series 0, then all steps of series 1, ...
    #[default]
    SeriesMajor,
    /// All series at step 0, then all series at step 1, ...
    StepMajor,
}

impl BufferLayout {
    /// Flat offset of horizon `step` for series `series`
    pub fn offset(&self, step: usize, series: usize, horizon: usize, n_series: usize) -> usize {
        match self {
            BufferLayout::SeriesMajor => step + series * horizon,
            BufferLayout::StepMajor => series + step * n_series,
        }
    }
}

/// Flat mean, lower and upper buffers as returned by an engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawForecastBuffer {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl RawForecastBuffer {
    pub fn new(mean: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self { mean, lower, upper }
    }

    /// Check that every buffer holds exactly `expected` values
    pub fn check_len(&self, expected: usize) -> Result<()> {
        for (what, buffer) in [
            ("mean", &self.mean),
            ("lower", &self.lower),
            ("upper", &self.upper),
        ] {
            if buffer.len() != expected {
                return Err(ForecastError::shape(what, expected, buffer.len()));
            }
        }
        Ok(())
    }
}

/// Point forecast at one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanPoint {
    pub date: FormattedDate,
    pub mean: f64,
}

/// Prediction interval at one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangePoint {
    pub date: FormattedDate,
    pub lower: f64,
    pub upper: f64,
}

/// Per-series forecast lists.
///
/// A single series is returned flat; several series are nested by series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedForecast {
    Univariate {
        averages: Vec<MeanPoint>,
        ranges: Vec<RangePoint>,
    },
    Multivariate {
        averages: Vec<Vec<MeanPoint>>,
        ranges: Vec<Vec<RangePoint>>,
    },
}

impl NormalizedForecast {
    pub fn is_univariate(&self) -> bool {
        matches!(self, NormalizedForecast::Univariate { .. })
    }

    pub fn n_series(&self) -> usize {
        match self {
            NormalizedForecast::Univariate { .. } => 1,
            NormalizedForecast::Multivariate { averages, .. } => averages.len(),
        }
    }

    /// Mean and interval lists of series `ix`, whatever the shape
    pub fn series(&self, ix: usize) -> Option<(&[MeanPoint], &[RangePoint])> {
        match self {
            NormalizedForecast::Univariate { averages, ranges } if ix == 0 => {
                Some((averages.as_slice(), ranges.as_slice()))
            }
            NormalizedForecast::Univariate { .. } => None,
            NormalizedForecast::Multivariate { averages, ranges } => {
                Some((averages.get(ix)?.as_slice(), ranges.get(ix)?.as_slice()))
            }
        }
    }
}

/// Slice flat engine buffers into per-series lists.
pub fn normalize(
    n_series: usize,
    dates: &[FormattedDate],
    horizon: usize,
    raw: &RawForecastBuffer,
    layout: BufferLayout,
) -> Result<NormalizedForecast> {
    if n_series == 0 {
        return Err(ForecastError::InvalidParameter(
            "Number of series must be positive".to_string(),
        ));
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be positive".to_string(),
        ));
    }
    if dates.len() != horizon {
        return Err(ForecastError::shape("output dates", horizon, dates.len()));
    }
    raw.check_len(n_series * horizon)?;

    let mut averages = Vec::with_capacity(n_series);
    let mut ranges = Vec::with_capacity(n_series);

    for j in 0..n_series {
        let mut averages_j = Vec::with_capacity(horizon);
        let mut ranges_j = Vec::with_capacity(horizon);
        for (i, date) in dates.iter().enumerate() {
            let index = layout.offset(i, j, horizon, n_series);
            averages_j.push(MeanPoint {
                date: date.clone(),
                mean: raw.mean[index],
            });
            ranges_j.push(RangePoint {
                date: date.clone(),
                lower: raw.lower[index],
                upper: raw.upper[index],
            });
        }
        averages.push(averages_j);
        ranges.push(ranges_j);
    }

    debug!(n_series, horizon, ?layout, "normalized forecast buffers");

    if n_series == 1 {
        // both vectors hold exactly one list here
        let averages = averages.pop().unwrap_or_default();
        let ranges = ranges.pop().unwrap_or_default();
        return Ok(NormalizedForecast::Univariate { averages, ranges });
    }

    Ok(NormalizedForecast::Multivariate { averages, ranges })
}

/// Join one series' mean and interval lists on date into a table with
/// `date`, `mean`, `lower` and `upper` columns.
pub fn compute_result_df(averages: &[MeanPoint], ranges: &[RangePoint]) -> Result<DataFrame> {
    let intervals: HashMap<&FormattedDate, (f64, f64)> = ranges
        .iter()
        .map(|r| (&r.date, (r.lower, r.upper)))
        .collect();

    let mut dates = Vec::with_capacity(averages.len());
    let mut means = Vec::with_capacity(averages.len());
    let mut lowers = Vec::with_capacity(averages.len());
    let mut uppers = Vec::with_capacity(averages.len());

    for point in averages {
        if let Some(&(lower, upper)) = intervals.get(&point.date) {
            dates.push(&point.date);
            means.push(point.mean);
            lowers.push(lower);
            uppers.push(upper);
        }
    }

    let date_series = date_column(&dates)?;
    let df = DataFrame::new(vec![
        date_series,
        Series::new("mean", means),
        Series::new("lower", lowers),
        Series::new("upper", uppers),
    ])?;

    Ok(df)
}

fn date_column(dates: &[&FormattedDate]) -> Result<Series> {
    let all_millis = dates
        .iter()
        .all(|d| matches!(d, FormattedDate::EpochMillis(_)));

    if all_millis && !dates.is_empty() {
        let millis: Vec<i64> = dates
            .iter()
            .filter_map(|d| match d {
                FormattedDate::EpochMillis(ms) => Some(*ms),
                FormattedDate::Calendar(_) => None,
            })
            .collect();
        return Ok(Series::new("date", millis));
    }

    let calendar = dates
        .iter()
        .map(|d| match d {
            FormattedDate::Calendar(s) => Ok(s.clone()),
            FormattedDate::EpochMillis(_) => Err(ForecastError::DataError(
                "Cannot mix calendar and epoch dates in one table".to_string(),
            )),
        })
        .collect::<Result<Vec<String>>>()?;

    Ok(Series::new("date", calendar))
}
