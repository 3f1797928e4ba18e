use polars::prelude::TakeRandomUtf8;
use ahead_core::date_format::FormattedDate;
use ahead_core::error::ForecastError;
use ahead_core::normalize::{
    compute_result_df, normalize, BufferLayout, NormalizedForecast, RawForecastBuffer,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;

fn calendar_dates(horizon: usize) -> Vec<FormattedDate> {
    (0..horizon)
        .map(|i| FormattedDate::Calendar(format!("2020-{:02}-01", i + 6)))
        .collect()
}

/// Mean buffer `0..n`, lower `mean - 1`, upper `mean + 1`
fn sequential_buffer(len: usize) -> RawForecastBuffer {
    let mean: Vec<f64> = (0..len).map(|v| v as f64).collect();
    let lower = mean.iter().map(|v| v - 1.0).collect();
    let upper = mean.iter().map(|v| v + 1.0).collect();
    RawForecastBuffer::new(mean, lower, upper)
}

#[test]
fn test_two_series_series_major() {
    let dates = calendar_dates(5);
    let raw = sequential_buffer(10);

    let forecast = normalize(2, &dates, 5, &raw, BufferLayout::SeriesMajor).unwrap();

    assert!(!forecast.is_univariate());
    assert_eq!(forecast.n_series(), 2);

    let (averages, ranges) = forecast.series(1).unwrap();
    let means: Vec<f64> = averages.iter().map(|p| p.mean).collect();
    assert_eq!(means, vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    assert_eq!(averages[0].date, FormattedDate::Calendar("2020-06-01".to_string()));
    assert_eq!(ranges[4].lower, 8.0);
    assert_eq!(ranges[4].upper, 10.0);

    let (first, _) = forecast.series(0).unwrap();
    assert_eq!(first[4].mean, 4.0);
}

#[test]
fn test_two_series_step_major() {
    let dates = calendar_dates(3);
    let raw = sequential_buffer(6);

    let forecast = normalize(2, &dates, 3, &raw, BufferLayout::StepMajor).unwrap();

    let (averages, _) = forecast.series(1).unwrap();
    let means: Vec<f64> = averages.iter().map(|p| p.mean).collect();
    assert_eq!(means, vec![1.0, 3.0, 5.0]);
}

#[test]
fn test_single_series_is_flat() {
    let dates = calendar_dates(3);
    let raw = sequential_buffer(3);

    let forecast = normalize(1, &dates, 3, &raw, BufferLayout::SeriesMajor).unwrap();

    match &forecast {
        NormalizedForecast::Univariate { averages, ranges } => {
            assert_eq!(averages.len(), 3);
            assert_eq!(ranges.len(), 3);
            assert_eq!(averages[2].mean, 2.0);
        }
        NormalizedForecast::Multivariate { .. } => panic!("expected a flat forecast"),
    }
    assert!(forecast.series(1).is_none());
}

#[rstest]
fn test_every_value_used_once(
    #[values(1, 2, 4)] n_series: usize,
    #[values(1, 3, 7)] horizon: usize,
    #[values(BufferLayout::SeriesMajor, BufferLayout::StepMajor)] layout: BufferLayout,
) {
    let dates = calendar_dates(horizon);
    let raw = sequential_buffer(n_series * horizon);

    let forecast = normalize(n_series, &dates, horizon, &raw, layout).unwrap();

    let mut seen = HashSet::new();
    for j in 0..n_series {
        let (averages, ranges) = forecast.series(j).unwrap();
        assert_eq!(averages.len(), horizon);
        assert_eq!(ranges.len(), horizon);
        for (i, point) in averages.iter().enumerate() {
            assert_eq!(point.date, dates[i]);
            assert!(seen.insert(point.mean as usize));
        }
    }
    assert_eq!(seen.len(), n_series * horizon);
}

#[test]
fn test_buffer_length_mismatch() {
    let dates = calendar_dates(5);
    let mut raw = sequential_buffer(10);
    raw.upper.pop();

    let result = normalize(2, &dates, 5, &raw, BufferLayout::SeriesMajor);
    match result {
        Err(ForecastError::ShapeMismatch {
            what,
            expected,
            got,
        }) => {
            assert_eq!(what, "upper");
            assert_eq!(expected, 10);
            assert_eq!(got, 9);
        }
        other => panic!("expected a shape mismatch, got {:?}", other),
    }
}

#[test]
fn test_date_count_mismatch() {
    let dates = calendar_dates(4);
    let raw = sequential_buffer(5);

    let result = normalize(1, &dates, 5, &raw, BufferLayout::SeriesMajor);
    assert!(matches!(result, Err(ForecastError::ShapeMismatch { .. })));
}

#[test]
fn test_invalid_counts() {
    let raw = RawForecastBuffer::default();
    assert!(matches!(
        normalize(0, &[], 1, &raw, BufferLayout::SeriesMajor),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        normalize(1, &[], 0, &raw, BufferLayout::SeriesMajor),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_result_table_with_calendar_dates() {
    let dates = calendar_dates(3);
    let raw = sequential_buffer(3);
    let forecast = normalize(1, &dates, 3, &raw, BufferLayout::SeriesMajor).unwrap();
    let (averages, ranges) = forecast.series(0).unwrap();

    let df = compute_result_df(averages, ranges).unwrap();

    assert_eq!(df.height(), 3);
    assert_eq!(df.get_column_names(), vec!["date", "mean", "lower", "upper"]);
    let date_column = df.column("date").unwrap().utf8().unwrap();
    assert_eq!(date_column.get(0), Some("2020-06-01"));
    let upper: Vec<f64> = df
        .column("upper")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(upper, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_result_table_with_epoch_dates() {
    let dates = vec![
        FormattedDate::EpochMillis(1_590_969_600_000),
        FormattedDate::EpochMillis(1_593_561_600_000),
    ];
    let raw = sequential_buffer(2);
    let forecast = normalize(1, &dates, 2, &raw, BufferLayout::SeriesMajor).unwrap();
    let (averages, ranges) = forecast.series(0).unwrap();

    let df = compute_result_df(averages, ranges).unwrap();

    let millis: Vec<i64> = df
        .column("date")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(millis, vec![1_590_969_600_000, 1_593_561_600_000]);
}

#[test]
fn test_result_table_inner_join_drops_unmatched_dates() {
    let dates = calendar_dates(3);
    let raw = sequential_buffer(3);
    let forecast = normalize(1, &dates, 3, &raw, BufferLayout::SeriesMajor).unwrap();
    let (averages, ranges) = forecast.series(0).unwrap();

    let df = compute_result_df(averages, &ranges[..2]).unwrap();
    assert_eq!(df.height(), 2);
}

#[test]
fn test_normalized_forecast_serializes_by_shape() {
    let dates = vec![FormattedDate::Calendar("2020-06-01".to_string())];
    let raw = RawForecastBuffer::new(vec![1.5], vec![1.0], vec![2.0]);
    let forecast = normalize(1, &dates, 1, &raw, BufferLayout::SeriesMajor).unwrap();

    let json = serde_json::to_value(&forecast).unwrap();
    assert_eq!(json["averages"][0]["date"], "2020-06-01");
    assert_eq!(json["averages"][0]["mean"], 1.5);
    assert_eq!(json["ranges"][0]["upper"], 2.0);
}
