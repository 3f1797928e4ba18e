//! Input tables for forecasting

use crate::date_format::parse_calendar;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Row index of a [`TimeSeriesTable`]
#[derive(Debug, Clone, PartialEq)]
pub enum TableIndex {
    /// Calendar dates
    Dates(Vec<NaiveDate>),
    /// Numeric positions or epoch milliseconds
    Positions(Vec<i64>),
}

impl TableIndex {
    pub fn len(&self) -> usize {
        match self {
            TableIndex::Dates(dates) => dates.len(),
            TableIndex::Positions(positions) => positions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The calendar dates, if this is a date index
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        match self {
            TableIndex::Dates(dates) => Some(dates),
            TableIndex::Positions(_) => None,
        }
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            TableIndex::Dates(dates) => TableIndex::Dates(dates[start..end].to_vec()),
            TableIndex::Positions(p) => TableIndex::Positions(p[start..end].to_vec()),
        }
    }

    fn is_strictly_increasing(&self) -> bool {
        match self {
            TableIndex::Dates(dates) => dates.windows(2).all(|w| w[0] < w[1]),
            TableIndex::Positions(p) => p.windows(2).all(|w| w[0] < w[1]),
        }
    }
}

/// Date-indexed table of one or more numeric series
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    /// Data frame holding the index column and the series columns
    df: DataFrame,
    /// Name of the index column
    index_column: String,
    /// Names of the series columns, in input order
    series_columns: Vec<String>,
    /// Parsed index
    index: TableIndex,
}

/// Data loader for time series tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesTable> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Create a table from an existing DataFrame.
    ///
    /// The index is the first column whose name mentions a date or time, or
    /// the first column otherwise. Every other column must be numeric.
    pub fn from_dataframe(df: DataFrame) -> Result<TimeSeriesTable> {
        let index_column = Self::detect_index_column(&df)?;
        let index = Self::parse_index(df.column(&index_column)?)?;

        let mut series_columns = Vec::new();
        for series in df.get_columns() {
            if series.name() == index_column {
                continue;
            }
            if !series.dtype().is_numeric() {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' is not numeric ({})",
                    series.name(),
                    series.dtype()
                )));
            }
            series_columns.push(series.name().to_string());
        }

        debug!(
            index_column = index_column.as_str(),
            n_series = series_columns.len(),
            n_rows = df.height(),
            "loaded time series table"
        );

        TimeSeriesTable::from_parts(df, index_column, series_columns, index)
    }

    /// Detect the index column in a DataFrame
    fn detect_index_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date")
                || lower_name.contains("time")
                || lower_name.contains("index")
            {
                return Ok(name.to_string());
            }
        }

        column_names
            .first()
            .map(|name| name.to_string())
            .ok_or_else(|| ForecastError::DataError("No columns found in data".to_string()))
    }

    /// Parse an index column into dates or positions
    fn parse_index(series: &Series) -> Result<TableIndex> {
        if series.null_count() > 0 {
            return Err(ForecastError::DataError(format!(
                "Index column '{}' contains missing values",
                series.name()
            )));
        }

        match series.dtype() {
            DataType::Utf8 => {
                let dates = series
                    .utf8()?
                    .into_iter()
                    .flatten()
                    .map(parse_index_value)
                    .collect::<Result<Vec<_>>>()?;
                Ok(TableIndex::Dates(dates))
            }
            DataType::Date => {
                let days = series.cast(&DataType::Int32)?;
                let dates = days
                    .i32()?
                    .into_iter()
                    .flatten()
                    .map(date_from_epoch_days)
                    .collect::<Result<Vec<_>>>()?;
                Ok(TableIndex::Dates(dates))
            }
            DataType::Datetime(unit, _) => {
                let per_milli = match unit {
                    TimeUnit::Nanoseconds => 1_000_000,
                    TimeUnit::Microseconds => 1_000,
                    TimeUnit::Milliseconds => 1,
                };
                let raw = series.cast(&DataType::Int64)?;
                let dates = raw
                    .i64()?
                    .into_iter()
                    .flatten()
                    .map(|value| date_from_epoch_millis(value.div_euclid(per_milli)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TableIndex::Dates(dates))
            }
            dtype if dtype.is_integer() => {
                let raw = series.cast(&DataType::Int64)?;
                let positions = raw.i64()?.into_iter().flatten().collect();
                Ok(TableIndex::Positions(positions))
            }
            other => Err(ForecastError::DataError(format!(
                "Index column '{}' has unsupported type {}",
                series.name(),
                other
            ))),
        }
    }
}

impl TimeSeriesTable {
    /// Create a table from dates and named series
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let epoch = epoch_date();
        let days: Vec<i32> = dates
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();
        let index_series = Series::new("date", days).cast(&DataType::Date)?;

        Self::build(index_series, TableIndex::Dates(dates), columns)
    }

    /// Create a single-series table
    pub fn univariate(dates: Vec<NaiveDate>, name: &str, values: Vec<f64>) -> Result<Self> {
        Self::new(dates, vec![(name, values)])
    }

    /// Create a table indexed by integer positions (or epoch milliseconds)
    pub fn with_positions(positions: Vec<i64>, columns: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let index_series = Series::new("index", positions.clone());
        Self::build(index_series, TableIndex::Positions(positions), columns)
    }

    fn build(index_series: Series, index: TableIndex, columns: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let index_column = index_series.name().to_string();
        let mut series = vec![index_series];
        let mut series_columns = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            if name == index_column {
                return Err(ForecastError::ValidationError(format!(
                    "Series name '{}' clashes with the index column",
                    name
                )));
            }
            series_columns.push(name.to_string());
            series.push(Series::new(name, values));
        }

        // DataFrame::new rejects columns of different lengths
        let df = DataFrame::new(series)?;
        Self::from_parts(df, index_column, series_columns, index)
    }

    fn from_parts(
        df: DataFrame,
        index_column: String,
        series_columns: Vec<String>,
        index: TableIndex,
    ) -> Result<Self> {
        if series_columns.is_empty() {
            return Err(ForecastError::DataError(
                "No series columns found in data".to_string(),
            ));
        }
        if index.is_empty() {
            return Err(ForecastError::DataError("Empty time series data".to_string()));
        }
        if !index.is_strictly_increasing() {
            return Err(ForecastError::ValidationError(format!(
                "Index column '{}' must be strictly increasing",
                index_column
            )));
        }

        Ok(Self {
            df,
            index_column,
            series_columns,
            index,
        })
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the index column name
    pub fn index_column(&self) -> &str {
        &self.index_column
    }

    /// Get the parsed index
    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    /// Get the series column names
    pub fn series_names(&self) -> &[String] {
        &self.series_columns
    }

    /// Number of series
    pub fn n_series(&self) -> usize {
        self.series_columns.len()
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Values of a series by name
    pub fn column_values(&self, column_name: &str) -> Result<Vec<f64>> {
        let col = self.df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        if col.null_count() > 0 {
            return Err(ForecastError::DataError(format!(
                "Column '{}' contains missing values",
                column_name
            )));
        }

        let values = col.cast(&DataType::Float64)?;
        let values = values.f64()?.into_iter().flatten().collect();
        Ok(values)
    }

    /// Values of a series by position
    pub fn series(&self, ix: usize) -> Result<Vec<f64>> {
        let name = self.series_columns.get(ix).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Series index {} out of range (< {})",
                ix,
                self.series_columns.len()
            ))
        })?;
        self.column_values(name)
    }

    /// Position of a series by name
    pub fn series_position(&self, name: &str) -> Option<usize> {
        self.series_columns.iter().position(|c| c == name)
    }

    /// All observations flattened row by row (`n_rows × n_series`)
    pub fn to_row_major(&self) -> Result<Vec<f64>> {
        let columns = (0..self.n_series())
            .map(|ix| self.series(ix))
            .collect::<Result<Vec<_>>>()?;

        let mut values = Vec::with_capacity(self.len() * columns.len());
        for row in 0..self.len() {
            for column in &columns {
                values.push(column[row]);
            }
        }
        Ok(values)
    }

    /// Rows `start..end` (to the last row when `end` is `None`)
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.df.height());
        if start >= end || end > self.df.height() {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid slice {}..{} of {} rows",
                start,
                end,
                self.df.height()
            )));
        }

        Ok(Self {
            df: self.df.slice(start as i64, end - start),
            index_column: self.index_column.clone(),
            series_columns: self.series_columns.clone(),
            index: self.index.slice(start, end),
        })
    }
}

fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

fn date_from_epoch_days(days: i32) -> Result<NaiveDate> {
    epoch_date()
        .checked_add_signed(Duration::days(days as i64))
        .ok_or_else(|| ForecastError::DataError(format!("{} days is out of range", days)))
}

fn date_from_epoch_millis(millis: i64) -> Result<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|ts| ts.date_naive())
        .ok_or_else(|| ForecastError::DataError(format!("{} ms is out of range", millis)))
}

/// Parse `yyyy-mm-dd`, or a timestamp truncated to its date
fn parse_index_value(value: &str) -> Result<NaiveDate> {
    if let Ok(date) = parse_calendar(value) {
        return Ok(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value.trim(), format) {
            return Ok(timestamp.date());
        }
    }

    Err(ForecastError::ParseError(format!(
        "Cannot parse '{}' as a date",
        value
    )))
}
