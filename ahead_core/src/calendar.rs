//! Calendar alignment of forecast horizons
//!
//! Infers the sampling frequency of a date index and extrapolates it past
//! the last observation to obtain the dates a forecast covers.

use crate::data::TableIndex;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use serde::Serialize;
use std::fmt;

const MONTH_CODES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Whether month-based dates sit on the first or the last day of their month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    /// First day of the month
    Start,
    /// Last day of the month
    End,
}

/// Sampling frequency of a date index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    /// One observation per year; `month` is the month of the observations
    Annual { anchor: Anchor, month: u32 },
    /// One observation per quarter; `month` is the month of the first observation
    Quarterly { anchor: Anchor, month: u32 },
    /// One observation per month
    Monthly(Anchor),
    /// One observation per week, on the given weekday
    Weekly(Weekday),
    /// One observation per business day (Monday to Friday)
    BusinessDaily,
    /// One observation per calendar day
    Daily,
}

impl Frequency {
    /// Number of periods per seasonal cycle
    pub fn cycle_length(&self) -> usize {
        match self {
            Frequency::Annual { .. } => 1,
            Frequency::Quarterly { .. } => 4,
            Frequency::Monthly(_) => 12,
            Frequency::Weekly(_) => 52,
            Frequency::BusinessDaily | Frequency::Daily => 365,
        }
    }

    /// Canonical frequency alias, e.g. `"MS"` or `"AS-JAN"`
    pub fn code(&self) -> String {
        match self {
            Frequency::Annual { anchor, month } => {
                let prefix = match anchor {
                    Anchor::Start => "AS",
                    Anchor::End => "A",
                };
                format!("{}-{}", prefix, MONTH_CODES[month_index(*month)])
            }
            Frequency::Quarterly { anchor, month } => {
                let offset = month_index(*month) % 3;
                match anchor {
                    Anchor::Start => format!("QS-{}", MONTH_CODES[offset]),
                    Anchor::End => format!("Q-{}", MONTH_CODES[offset + 9]),
                }
            }
            Frequency::Monthly(Anchor::Start) => "MS".to_string(),
            Frequency::Monthly(Anchor::End) => "M".to_string(),
            Frequency::Weekly(weekday) => format!("W-{}", weekday_code(*weekday)),
            Frequency::BusinessDaily => "B".to_string(),
            Frequency::Daily => "D".to_string(),
        }
    }

    /// The date `steps` periods after `date`
    pub fn advance(&self, date: NaiveDate, steps: usize) -> Result<NaiveDate> {
        let out_of_range = || {
            ForecastError::DataError(format!(
                "date {} advanced by {} periods is out of range",
                date, steps
            ))
        };

        match self {
            Frequency::Daily => date
                .checked_add_signed(Duration::days(steps as i64))
                .ok_or_else(out_of_range),
            Frequency::Weekly(_) => date
                .checked_add_signed(Duration::weeks(steps as i64))
                .ok_or_else(out_of_range),
            Frequency::BusinessDaily => {
                let mut current = date;
                for _ in 0..steps {
                    current = next_business_day(current).ok_or_else(out_of_range)?;
                }
                Ok(current)
            }
            Frequency::Monthly(anchor) => add_anchored_months(date, steps, 1, *anchor),
            Frequency::Quarterly { anchor, .. } => add_anchored_months(date, steps, 3, *anchor),
            Frequency::Annual { anchor, .. } => add_anchored_months(date, steps, 12, *anchor),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Infer the sampling frequency of strictly increasing dates
pub fn infer_frequency(dates: &[NaiveDate]) -> Result<Frequency> {
    if dates.len() < 2 {
        return Err(ForecastError::FrequencyInference(format!(
            "need at least 2 dates to infer a frequency, got {}",
            dates.len()
        )));
    }

    let gaps: Vec<i64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    if gaps.iter().any(|&gap| gap <= 0) {
        return Err(ForecastError::FrequencyInference(
            "dates must be strictly increasing".to_string(),
        ));
    }

    if gaps.iter().all(|&gap| gap == 1) {
        return Ok(Frequency::Daily);
    }

    if gaps.iter().all(|&gap| gap == 7) {
        return Ok(Frequency::Weekly(dates[0].weekday()));
    }

    if is_business_daily(dates) {
        return Ok(Frequency::BusinessDaily);
    }

    if let Some(frequency) = infer_month_based(dates) {
        return Ok(frequency);
    }

    Err(ForecastError::FrequencyInference(format!(
        "no consistent frequency for spacing {:?}",
        summarize_gaps(&gaps)
    )))
}

/// Dates covered by a forecast of `horizon` steps, with the inferred frequency.
///
/// The last input date is not part of the output.
pub fn compute_output_dates(
    dates: &[NaiveDate],
    horizon: usize,
) -> Result<(Vec<NaiveDate>, Frequency)> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be positive".to_string(),
        ));
    }

    let frequency = infer_frequency(dates)?;
    // infer_frequency guarantees at least two dates
    let last = dates[dates.len() - 1];

    let output_dates = (1..=horizon)
        .map(|step| frequency.advance(last, step))
        .collect::<Result<Vec<_>>>()?;

    Ok((output_dates, frequency))
}

/// Regularized date axis for the input observations.
///
/// Calendar indices are regenerated from their first date at the inferred
/// frequency. A positional index `0, 1, 2, ...` becomes daily dates starting
/// at `today`; any other integer index is read as epoch milliseconds.
pub fn compute_input_dates(index: &TableIndex, today: NaiveDate) -> Result<Vec<NaiveDate>> {
    match index {
        TableIndex::Dates(dates) => regularize(dates),
        TableIndex::Positions(positions) if positions.is_empty() => {
            Err(ForecastError::DataError("Empty index".to_string()))
        }
        TableIndex::Positions(positions) => {
            let zero_based = positions
                .iter()
                .enumerate()
                .all(|(i, &position)| position == i as i64);
            if zero_based {
                (0..positions.len())
                    .map(|step| Frequency::Daily.advance(today, step))
                    .collect()
            } else {
                let dates = positions
                    .iter()
                    .map(|&millis| {
                        DateTime::<Utc>::from_timestamp_millis(millis)
                            .map(|ts| ts.date_naive())
                            .ok_or_else(|| {
                                ForecastError::DataError(format!(
                                    "{} is not a valid epoch millisecond timestamp",
                                    millis
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                regularize(&dates)
            }
        }
    }
}

/// [`compute_input_dates`] with today's UTC date
pub fn compute_input_dates_today(index: &TableIndex) -> Result<Vec<NaiveDate>> {
    compute_input_dates(index, Utc::now().date_naive())
}

fn regularize(dates: &[NaiveDate]) -> Result<Vec<NaiveDate>> {
    let frequency = infer_frequency(dates)?;
    (0..dates.len())
        .map(|step| frequency.advance(dates[0], step))
        .collect()
}

fn is_business_daily(dates: &[NaiveDate]) -> bool {
    let all_weekdays = dates.iter().all(|d| !is_weekend(*d));
    let consecutive = dates
        .windows(2)
        .all(|w| next_business_day(w[0]) == Some(w[1]));
    let skips_weekend = dates.windows(2).any(|w| (w[1] - w[0]).num_days() > 1);

    all_weekdays && consecutive && skips_weekend
}

fn infer_month_based(dates: &[NaiveDate]) -> Option<Frequency> {
    let anchor = if dates.iter().all(|d| d.day() == 1) {
        Anchor::Start
    } else if dates.iter().all(|d| is_month_end(*d)) {
        Anchor::End
    } else {
        return None;
    };

    let month_numbers: Vec<i64> = dates
        .iter()
        .map(|d| d.year() as i64 * 12 + d.month0() as i64)
        .collect();
    let step = month_numbers[1] - month_numbers[0];
    if month_numbers.windows(2).any(|w| w[1] - w[0] != step) {
        return None;
    }

    let month = dates[0].month();
    match step {
        1 => Some(Frequency::Monthly(anchor)),
        3 => Some(Frequency::Quarterly { anchor, month }),
        12 => Some(Frequency::Annual { anchor, month }),
        _ => None,
    }
}

fn add_anchored_months(
    date: NaiveDate,
    steps: usize,
    months_per_step: u32,
    anchor: Anchor,
) -> Result<NaiveDate> {
    let months = u32::try_from(steps)
        .ok()
        .and_then(|s| s.checked_mul(months_per_step))
        .ok_or_else(|| ForecastError::InvalidParameter(format!("{} steps is too many", steps)))?;

    let first_of_month = date.with_day(1).ok_or_else(|| {
        ForecastError::DataError(format!("cannot take the first day of the month of {}", date))
    })?;

    let shifted = match anchor {
        Anchor::Start => first_of_month.checked_add_months(Months::new(months)),
        Anchor::End => first_of_month
            .checked_add_months(Months::new(months + 1))
            .and_then(|d| d.pred_opt()),
    };

    shifted.ok_or_else(|| {
        ForecastError::DataError(format!(
            "date {} advanced by {} months is out of range",
            date, months
        ))
    })
}

fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut next = date.succ_opt()?;
    while is_weekend(next) {
        next = next.succ_opt()?;
    }
    Some(next)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.day() == 1).unwrap_or(true)
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

fn summarize_gaps(gaps: &[i64]) -> Vec<i64> {
    let mut distinct = gaps.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_advance_handles_short_months() {
        let frequency = Frequency::Monthly(Anchor::End);
        assert_eq!(frequency.advance(date(2020, 1, 31), 1).unwrap(), date(2020, 2, 29));
        assert_eq!(frequency.advance(date(2020, 1, 31), 2).unwrap(), date(2020, 3, 31));
    }

    #[test]
    fn test_business_day_skips_weekend() {
        // 2024-01-05 is a Friday
        assert_eq!(next_business_day(date(2024, 1, 5)), Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_quarter_codes() {
        let start = Frequency::Quarterly { anchor: Anchor::Start, month: 4 };
        let end = Frequency::Quarterly { anchor: Anchor::End, month: 6 };
        assert_eq!(start.code(), "QS-JAN");
        assert_eq!(end.code(), "Q-DEC");
    }
}
