//! Contract between the pipeline and an external forecast engine
//!
//! The engine is a black box: it receives a frequency-tagged series, a
//! horizon, a confidence level and model parameters, and answers with named
//! output fields. [`EngineOutput::from_fields`] turns those fields into a
//! fixed structure.

use crate::models::ModelSpec;
use ahead_core::data::TimeSeriesTable;
use ahead_core::error::{ForecastError, Result};
use ahead_core::normalize::{BufferLayout, RawForecastBuffer};
use ndarray::Array2;
use tracing::debug;

/// Common interface for forecast engines
pub trait ForecastEngine {
    /// Engine name, used in logs
    fn name(&self) -> &str;

    /// Prepare the engine before the first call.
    ///
    /// Must be idempotent; the pipeline calls it once per forecaster.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Run one forecast.
    ///
    /// Engine failures are reported as [`ForecastError::EngineInvocation`]
    /// carrying the engine's own message.
    fn invoke(&self, request: &EngineRequest) -> Result<EngineOutput>;
}

/// Observations tagged with their seasonal cycle length
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTaggedSeries {
    /// Observations, row by row (`n_rows × n_cols`)
    pub values: Vec<f64>,
    pub n_rows: usize,
    pub n_cols: usize,
    /// Periods per seasonal cycle
    pub frequency: usize,
    /// Column names, in order
    pub names: Vec<String>,
}

impl FrequencyTaggedSeries {
    /// Build the tagged series from every series column of a table
    pub fn from_table(table: &TimeSeriesTable, frequency: usize) -> Result<Self> {
        Ok(Self {
            values: table.to_row_major()?,
            n_rows: table.len(),
            n_cols: table.n_series(),
            frequency,
            names: table.series_names().to_vec(),
        })
    }

    pub fn is_univariate(&self) -> bool {
        self.n_cols == 1
    }

    /// Observations of column `ix`
    pub fn column(&self, ix: usize) -> Result<Vec<f64>> {
        if ix >= self.n_cols {
            return Err(ForecastError::InvalidParameter(format!(
                "Series index {} out of range (< {})",
                ix, self.n_cols
            )));
        }
        Ok(self
            .values
            .iter()
            .skip(ix)
            .step_by(self.n_cols)
            .copied()
            .collect())
    }

    /// Observations as an `n_rows × n_cols` matrix
    pub fn to_array(&self) -> Result<Array2<f64>> {
        Array2::from_shape_vec((self.n_rows, self.n_cols), self.values.clone()).map_err(|_| {
            ForecastError::shape("series values", self.n_rows * self.n_cols, self.values.len())
        })
    }
}

/// Everything the engine needs for one call
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub series: FrequencyTaggedSeries,
    pub horizon: usize,
    /// Confidence level in percent
    pub level: f64,
    pub model: ModelSpec,
    /// External regressors, one row per observation
    pub xreg: Option<Array2<f64>>,
    /// Flattening expected for the output buffers
    pub layout: BufferLayout,
}

/// One value returned by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Null,
    Scalar(f64),
    Text(String),
    Vector(Vec<f64>),
    /// `horizon × n_series` values
    Matrix(Array2<f64>),
    /// Flat replication buffers
    Replications(Vec<Vec<f64>>),
    /// `horizon × n_series` replications
    MatrixList(Vec<Array2<f64>>),
}

impl EngineValue {
    fn kind(&self) -> &'static str {
        match self {
            EngineValue::Null => "null",
            EngineValue::Scalar(_) => "scalar",
            EngineValue::Text(_) => "text",
            EngineValue::Vector(_) => "vector",
            EngineValue::Matrix(_) => "matrix",
            EngineValue::Replications(_) => "replications",
            EngineValue::MatrixList(_) => "matrix list",
        }
    }
}

impl From<f64> for EngineValue {
    fn from(value: f64) -> Self {
        EngineValue::Scalar(value)
    }
}

impl From<Vec<f64>> for EngineValue {
    fn from(values: Vec<f64>) -> Self {
        EngineValue::Vector(values)
    }
}

impl From<Array2<f64>> for EngineValue {
    fn from(values: Array2<f64>) -> Self {
        EngineValue::Matrix(values)
    }
}

impl From<&str> for EngineValue {
    fn from(value: &str) -> Self {
        EngineValue::Text(value.to_string())
    }
}

/// Fields of an engine answer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineOutput {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// Simulated paths, one flat buffer per replication
    pub sims: Option<Vec<Vec<f64>>>,
    pub residuals: Option<Vec<f64>>,
    pub fitted: Option<Vec<f64>>,
    /// Input observations as seen by the engine
    pub x: Option<Vec<f64>>,
    pub level: Option<f64>,
    pub method: Option<String>,
}

impl EngineOutput {
    /// Collect named engine fields, flattening matrices series-major
    pub fn from_fields<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, EngineValue)>,
        S: AsRef<str>,
    {
        Self::from_fields_with_layout(fields, BufferLayout::SeriesMajor)
    }

    /// Collect named engine fields, flattening matrices with `layout`.
    ///
    /// Unknown names are skipped. `mean`, `lower` and `upper` are required;
    /// `Null` counts as absent.
    pub fn from_fields_with_layout<I, S>(fields: I, layout: BufferLayout) -> Result<Self>
    where
        I: IntoIterator<Item = (S, EngineValue)>,
        S: AsRef<str>,
    {
        let mut mean = None;
        let mut lower = None;
        let mut upper = None;
        let mut output = EngineOutput::default();

        for (name, value) in fields {
            let name = name.as_ref();
            if value == EngineValue::Null {
                continue;
            }
            match name {
                "mean" => mean = Some(numbers(name, value, layout)?),
                "lower" => lower = Some(numbers(name, value, layout)?),
                "upper" => upper = Some(numbers(name, value, layout)?),
                "sims" => output.sims = Some(replications(name, value, layout)?),
                "residuals" => output.residuals = Some(numbers(name, value, layout)?),
                "fitted" => output.fitted = Some(numbers(name, value, layout)?),
                "x" => output.x = Some(numbers(name, value, layout)?),
                "level" => match value {
                    EngineValue::Scalar(level) => output.level = Some(level),
                    other => return Err(unexpected(name, &other)),
                },
                "method" => match value {
                    EngineValue::Text(method) => output.method = Some(method),
                    other => return Err(unexpected(name, &other)),
                },
                other => debug!(field = other, kind = value.kind(), "ignoring engine output field"),
            }
        }

        output.mean = mean.ok_or_else(|| ForecastError::MissingOutputField("mean".to_string()))?;
        output.lower = lower.ok_or_else(|| ForecastError::MissingOutputField("lower".to_string()))?;
        output.upper = upper.ok_or_else(|| ForecastError::MissingOutputField("upper".to_string()))?;

        Ok(output)
    }

    /// Mean, lower and upper buffers
    pub fn buffer(&self) -> RawForecastBuffer {
        RawForecastBuffer::new(self.mean.clone(), self.lower.clone(), self.upper.clone())
    }
}

fn unexpected(name: &str, value: &EngineValue) -> ForecastError {
    ForecastError::DataError(format!(
        "engine output field '{}' has unexpected type {}",
        name,
        value.kind()
    ))
}

fn flatten(matrix: &Array2<f64>, layout: BufferLayout) -> Vec<f64> {
    match layout {
        BufferLayout::SeriesMajor => matrix.t().iter().copied().collect(),
        BufferLayout::StepMajor => matrix.iter().copied().collect(),
    }
}

fn numbers(name: &str, value: EngineValue, layout: BufferLayout) -> Result<Vec<f64>> {
    match value {
        EngineValue::Scalar(v) => Ok(vec![v]),
        EngineValue::Vector(values) => Ok(values),
        EngineValue::Matrix(matrix) => Ok(flatten(&matrix, layout)),
        other => Err(unexpected(name, &other)),
    }
}

fn replications(name: &str, value: EngineValue, layout: BufferLayout) -> Result<Vec<Vec<f64>>> {
    match value {
        EngineValue::Replications(paths) => Ok(paths),
        EngineValue::MatrixList(paths) => Ok(paths.iter().map(|m| flatten(m, layout)).collect()),
        // a single series: one column per replication
        EngineValue::Matrix(matrix) => Ok(matrix
            .columns()
            .into_iter()
            .map(|column| column.to_vec())
            .collect()),
        other => Err(unexpected(name, &other)),
    }
}
