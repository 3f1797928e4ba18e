use ahead_core::calendar::{Anchor, Frequency};
use ahead_core::data::TimeSeriesTable;
use ahead_core::date_format::{DateFormatting, FormattedDate};
use ahead_core::error::{ForecastError, Result};
use ahead_core::normalize::BufferLayout;
use ahead_models::engine::{EngineOutput, EngineRequest, EngineValue, ForecastEngine};
use ahead_models::models::{
    BasicParams, DynamicRegressionParams, FitForecastParams, IntervalMethod, ModelSpec,
    Ridge2Params, VarParams,
};
use ahead_models::{ForecastConfig, Forecaster};
use chrono::NaiveDate;
use ndarray::{array, Array2};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::RefCell;

/// Engine answering with `mean[k] = k`, `lower = mean - 1`, `upper = mean + 1`,
/// and `b` replications where replication `b` holds `100 * b + k`.
#[derive(Default)]
struct StubEngine {
    initialize_calls: usize,
    replications: Option<usize>,
    failure: Option<String>,
    /// Output field answered with one value too few
    short_field: Option<&'static str>,
    requests: RefCell<Vec<EngineRequest>>,
}

impl StubEngine {
    fn with_sims(replications: usize) -> Self {
        Self {
            replications: Some(replications),
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn short(field: &'static str) -> Self {
        Self {
            short_field: Some(field),
            ..Self::default()
        }
    }

    fn last_request(&self) -> EngineRequest {
        self.requests.borrow().last().cloned().unwrap()
    }
}

impl ForecastEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn initialize(&mut self) -> Result<()> {
        self.initialize_calls += 1;
        Ok(())
    }

    fn invoke(&self, request: &EngineRequest) -> Result<EngineOutput> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(message) = &self.failure {
            return Err(ForecastError::EngineInvocation(message.clone()));
        }

        let total = request.horizon * request.series.n_cols;
        let mean: Vec<f64> = (0..total).map(|k| k as f64).collect();
        let mut buffers = [
            ("mean", mean.clone()),
            ("lower", mean.iter().map(|v| v - 1.0).collect::<Vec<_>>()),
            ("upper", mean.iter().map(|v| v + 1.0).collect::<Vec<_>>()),
        ];
        for (name, values) in buffers.iter_mut() {
            if self.short_field == Some(*name) {
                values.pop();
            }
        }
        let mut fields: Vec<(&str, EngineValue)> = buffers
            .into_iter()
            .map(|(name, values)| (name, EngineValue::Vector(values)))
            .collect();
        fields.push(("model_internals", EngineValue::Text("ignored".to_string())));
        if let Some(b) = self.replications {
            let sims = (0..b)
                .map(|r| (0..total).map(|k| (100 * r + k) as f64).collect())
                .collect();
            fields.push(("sims", EngineValue::Replications(sims)));
        }
        EngineOutput::from_fields(fields)
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn monthly_dates() -> Vec<NaiveDate> {
    ["2020-01-01", "2020-02-01", "2020-03-01", "2020-04-01", "2020-05-01"]
        .iter()
        .map(|s| date(s))
        .collect()
}

fn two_series_table() -> TimeSeriesTable {
    TimeSeriesTable::new(
        monthly_dates(),
        vec![
            ("series1", vec![34.0, 30.0, 35.6, 33.3, 38.1]),
            ("series2", vec![4.0, 5.5, 5.6, 6.3, 5.1]),
        ],
    )
    .unwrap()
}

fn one_series_table() -> TimeSeriesTable {
    TimeSeriesTable::univariate(monthly_dates(), "y", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap()
}

#[test]
fn test_two_series_forecast() {
    let mut forecaster = Forecaster::new(StubEngine::default());
    let model = ModelSpec::from(Ridge2Params::default());

    let outcome = forecaster.forecast(&two_series_table(), &model).unwrap();

    assert_eq!(outcome.frequency, Frequency::Monthly(Anchor::Start));
    assert_eq!(outcome.series_names, vec!["series1", "series2"]);
    assert_eq!(
        outcome.output_dates,
        ["2020-06-01", "2020-07-01", "2020-08-01", "2020-09-01", "2020-10-01"]
            .iter()
            .map(|s| FormattedDate::Calendar(s.to_string()))
            .collect::<Vec<_>>()
    );

    let (averages, ranges) = outcome.forecast.series(1).unwrap();
    let means: Vec<f64> = averages.iter().map(|p| p.mean).collect();
    assert_eq!(means, vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    assert_eq!(ranges[0].lower, 4.0);

    assert_eq!(outcome.mean.dim(), (5, 2));
    assert_eq!(outcome.mean[[4, 0]], 4.0);
    assert_eq!(outcome.mean[[0, 1]], 5.0);
    assert_eq!(outcome.upper[[2, 1]], 8.0);

    assert_eq!(outcome.result_tables.len(), 2);
    let table = outcome.result_table("series2").unwrap();
    assert_eq!(table.height(), 5);
    assert!(outcome.simulations.is_none());
}

#[test]
fn test_request_carries_cycle_length_and_values() {
    let mut forecaster = Forecaster::with_config(
        StubEngine::default(),
        ForecastConfig::default().with_horizon(2).with_level(80.0),
    )
    .unwrap();
    let model = ModelSpec::from(VarParams::default());

    forecaster.forecast(&two_series_table(), &model).unwrap();

    let request = forecaster.engine().last_request();
    assert_eq!(request.series.frequency, 12);
    assert_eq!(request.series.n_rows, 5);
    assert_eq!(request.series.n_cols, 2);
    assert_eq!(&request.series.values[..4], &[34.0, 4.0, 30.0, 5.5]);
    assert_eq!(request.horizon, 2);
    assert_eq!(request.level, 80.0);
    assert_eq!(request.model.engine_function(), "varf");
}

#[test]
fn test_single_series_outcome_is_flat() {
    let mut forecaster = Forecaster::new(StubEngine::default());
    let model = ModelSpec::from(DynamicRegressionParams::default());

    let outcome = forecaster.forecast(&one_series_table(), &model).unwrap();

    assert!(outcome.forecast.is_univariate());
    assert_eq!(outcome.mean.dim(), (5, 1));
}

#[test]
fn test_univariate_only_model_rejects_several_series() {
    let mut forecaster = Forecaster::new(StubEngine::default());
    let model = ModelSpec::from(DynamicRegressionParams::default());

    let result = forecaster.forecast(&two_series_table(), &model);

    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    assert!(forecaster.engine().requests.borrow().is_empty());
}

#[test]
fn test_engine_initialized_once() {
    let mut forecaster = Forecaster::new(StubEngine::default());
    let model = ModelSpec::default();

    forecaster.forecast(&one_series_table(), &model).unwrap();
    forecaster.forecast(&one_series_table(), &model).unwrap();

    let engine = forecaster.into_engine();
    assert_eq!(engine.initialize_calls, 1);
    assert_eq!(engine.requests.borrow().len(), 2);
}

#[test]
fn test_engine_failure_propagates_message() {
    let mut forecaster = Forecaster::new(StubEngine::failing("non-conformable arguments"));

    let result = forecaster.forecast(&one_series_table(), &ModelSpec::default());

    match result {
        Err(err @ ForecastError::EngineInvocation(_)) => {
            assert_eq!(err.to_string(), "non-conformable arguments")
        }
        other => panic!("expected an engine failure, got {:?}", other.map(|o| o.mean)),
    }
}

#[rstest]
#[case("mean")]
#[case("lower")]
#[case("upper")]
fn test_short_engine_buffer_is_a_shape_mismatch(#[case] field: &'static str) {
    let mut forecaster = Forecaster::new(StubEngine::short(field));
    let model = ModelSpec::from(Ridge2Params::default());

    let result = forecaster.forecast(&two_series_table(), &model);

    match result {
        Err(ForecastError::ShapeMismatch { what, expected, got }) => {
            assert_eq!(what, field);
            assert_eq!((expected, got), (10, 9));
        }
        other => panic!("expected a shape mismatch, got {:?}", other.map(|o| o.mean)),
    }
    assert_eq!(forecaster.engine().requests.borrow().len(), 1);
}

#[test]
fn test_irregular_dates_fail_before_engine_call() {
    let dates = vec![date("2020-01-01"), date("2020-01-02"), date("2020-01-05")];
    let table = TimeSeriesTable::univariate(dates, "y", vec![1.0, 2.0, 3.0]).unwrap();
    let mut forecaster = Forecaster::new(StubEngine::default());

    let result = forecaster.forecast(&table, &ModelSpec::default());

    assert!(matches!(result, Err(ForecastError::FrequencyInference(_))));
    assert!(forecaster.engine().requests.borrow().is_empty());
}

#[test]
fn test_stochastic_intervals_unpack_simulations() {
    let mut forecaster = Forecaster::with_config(
        StubEngine::with_sims(3),
        ForecastConfig::default().with_horizon(2),
    )
    .unwrap();
    let model = ModelSpec::from(Ridge2Params {
        type_pi: IntervalMethod::Bootstrap,
        ..Ridge2Params::default()
    });

    let outcome = forecaster.forecast(&two_series_table(), &model).unwrap();

    let simulations = outcome.simulations.as_ref().unwrap();
    assert_eq!(simulations.len(), 2);
    assert_eq!(simulations[0], array![[0.0, 100.0, 200.0], [1.0, 101.0, 201.0]]);
    assert_eq!(
        outcome.simulations_for("series2").unwrap(),
        &array![[2.0, 102.0, 202.0], [3.0, 103.0, 203.0]]
    );
}

#[test]
fn test_gaussian_intervals_ignore_simulations() {
    let mut forecaster = Forecaster::new(StubEngine::with_sims(3));
    let model = ModelSpec::from(BasicParams::default());

    let outcome = forecaster.forecast(&one_series_table(), &model).unwrap();

    assert!(outcome.simulations.is_none());
    assert!(outcome.raw.sims.is_some());
}

#[test]
fn test_epoch_millisecond_dates() {
    let config = ForecastConfig::default()
        .with_horizon(1)
        .with_date_formatting(DateFormatting::Milliseconds);
    let mut forecaster = Forecaster::with_config(StubEngine::default(), config).unwrap();

    let outcome = forecaster.forecast(&one_series_table(), &ModelSpec::default()).unwrap();

    assert_eq!(outcome.output_dates, vec![FormattedDate::EpochMillis(1_590_969_600_000)]);
}

#[test]
fn test_epoch_millisecond_dates_at_offset() {
    let config = ForecastConfig::default()
        .with_horizon(1)
        .with_date_formatting(DateFormatting::Milliseconds)
        .with_utc_offset_seconds(7200);
    let mut forecaster = Forecaster::with_config(StubEngine::default(), config).unwrap();

    let outcome = forecaster.forecast(&one_series_table(), &ModelSpec::default()).unwrap();

    assert_eq!(outcome.output_dates, vec![FormattedDate::EpochMillis(1_590_962_400_000)]);
}

#[test]
fn test_step_major_layout() {
    let config = ForecastConfig::default()
        .with_horizon(2)
        .with_layout(BufferLayout::StepMajor);
    let mut forecaster = Forecaster::with_config(StubEngine::default(), config).unwrap();
    let model = ModelSpec::from(VarParams::default());

    let outcome = forecaster.forecast(&two_series_table(), &model).unwrap();

    assert_eq!(outcome.mean, array![[0.0, 1.0], [2.0, 3.0]]);
    assert_eq!(forecaster.engine().last_request().layout, BufferLayout::StepMajor);
}

#[test]
fn test_positional_index_uses_reference_date() {
    let table =
        TimeSeriesTable::with_positions(vec![0, 1, 2, 3], vec![("y", vec![1.0, 2.0, 3.0, 4.0])])
            .unwrap();
    let mut forecaster = Forecaster::with_config(
        StubEngine::default(),
        ForecastConfig::default().with_horizon(2),
    )
    .unwrap()
    .with_reference_date(date("2024-03-10"));

    let outcome = forecaster.forecast(&table, &ModelSpec::default()).unwrap();

    assert_eq!(outcome.frequency, Frequency::Daily);
    assert_eq!(outcome.input_dates[0], date("2024-03-10"));
    assert_eq!(
        outcome.output_dates,
        vec![
            FormattedDate::Calendar("2024-03-14".to_string()),
            FormattedDate::Calendar("2024-03-15".to_string()),
        ]
    );
    assert_eq!(forecaster.engine().last_request().series.frequency, 365);
}

#[test]
fn test_fit_forecast_derives_horizon() {
    let config = ForecastConfig::default().without_horizon();
    let mut forecaster = Forecaster::with_config(StubEngine::default(), config).unwrap();
    let model = ModelSpec::from(FitForecastParams::default());

    let outcome = forecaster.forecast(&one_series_table(), &model).unwrap();

    // floor(5 * 0.5)
    assert_eq!(outcome.horizon(), 2);
}

#[test]
fn test_missing_horizon_rejected_for_other_models() {
    let config = ForecastConfig::default().without_horizon();
    let mut forecaster = Forecaster::with_config(StubEngine::default(), config).unwrap();

    let result = forecaster.forecast(&one_series_table(), &ModelSpec::default());
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_xreg_checks() {
    let mut forecaster = Forecaster::new(StubEngine::default());
    let ridge2 = ModelSpec::from(Ridge2Params::default());

    let xreg = Array2::from_shape_fn((5, 1), |(i, _)| i as f64);
    forecaster
        .forecast_with_xreg(&two_series_table(), &ridge2, Some(xreg.clone()))
        .unwrap();
    assert_eq!(forecaster.engine().last_request().xreg, Some(xreg.clone()));

    let short = Array2::zeros((3, 1));
    assert!(matches!(
        forecaster.forecast_with_xreg(&two_series_table(), &ridge2, Some(short)),
        Err(ForecastError::ShapeMismatch { .. })
    ));

    assert!(matches!(
        forecaster.forecast_with_xreg(&one_series_table(), &ModelSpec::default(), Some(xreg)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let config = ForecastConfig::default().with_level(120.0);
    assert!(Forecaster::with_config(StubEngine::default(), config).is_err());
}
