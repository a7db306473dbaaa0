//! Daily resampling and classical additive decomposition of a station's PM10 series.
//!
//! `observed = trend + seasonal + residual`. The trend is a centered moving average over
//! one period, so it is undefined for the first and last `period / 2` days. The residual is
//! undefined wherever the trend is.

use crate::error::AirQualityError;
use crate::preprocess::timestamp;
use crate::stats;
use crate::types::columns::{DATE, DAY, MONTH, PM10, YEAR};
use crate::types::frame::StationFrame;
use crate::types::station::Station;
use crate::views::{float_values, int_values};
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use polars::df;
use polars::prelude::{col, DataFrame, DatetimeChunked, IntoLazy, IntoSeries, TimeUnit};
use serde::Serialize;
use std::collections::BTreeMap;

/// Seasonal period in days.
pub const DECOMPOSITION_PERIOD: usize = 365;

/// Mean PM10 per calendar day, without gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub station: Station,
    pub dates: Vec<NaiveDate>,
    pub pm10: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.pm10.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pm10.is_empty()
    }
}

/// Resamples a station's readings to one mean per calendar day.
///
/// The series covers every day from the first to the last recorded day. Days without any
/// PM10 reading are linearly interpolated between their neighbours; days before the first
/// or after the last reading take the nearest known value. A station without PM10 values
/// yields an empty series.
pub fn daily_aggregate(subset: &StationFrame) -> Result<DailySeries, AirQualityError> {
    let grouped = subset
        .data
        .frame
        .clone()
        .lazy()
        .group_by([col(YEAR), col(MONTH), col(DAY)])
        .agg([col(PM10).mean()])
        .collect()?;

    let years = int_values(&grouped, YEAR)?;
    let months = int_values(&grouped, MONTH)?;
    let days = int_values(&grouped, DAY)?;
    let means = float_values(&grouped, PM10)?;

    let mut by_day: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (row, (((year, month), day), mean)) in
        years.into_iter().zip(months).zip(days).zip(means).enumerate()
    {
        let date = timestamp::resolve(row, year, month, day, Some(0))?.date();
        by_day.insert(date, mean);
    }

    let empty = DailySeries {
        station: subset.station,
        dates: Vec::new(),
        pm10: Vec::new(),
    };
    let (Some(first), Some(last)) = (
        by_day.keys().next().copied(),
        by_day.keys().next_back().copied(),
    ) else {
        return Ok(empty);
    };

    let dates: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();
    let raw: Vec<Option<f64>> = dates
        .iter()
        .map(|date| by_day.get(date).copied().flatten())
        .collect();

    let Some(pm10) = fill_gaps(&raw) else {
        return Ok(empty);
    };
    debug!(
        "Daily aggregate for {}: {} days, {} filled",
        subset.station,
        dates.len(),
        raw.iter().filter(|v| v.is_none()).count()
    );

    Ok(DailySeries {
        station: subset.station,
        dates,
        pm10,
    })
}

/// Fills missing values: linear between known neighbours, nearest known value at the
/// edges. `None` if nothing is known.
pub fn fill_gaps(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| value.filter(|v| !v.is_nan()).map(|v| (i, v)))
        .collect();
    let &(_, first_value) = known.first()?;
    let &(last_index, last_value) = known.last()?;

    let mut filled = vec![first_value; values.len()];
    for pair in known.windows(2) {
        let (a, from) = pair[0];
        let (b, to) = pair[1];
        for (i, slot) in filled.iter_mut().enumerate().take(b + 1).skip(a) {
            let t = (i - a) as f64 / (b - a) as f64;
            *slot = from + (to - from) * t;
        }
    }
    for slot in filled.iter_mut().skip(last_index) {
        *slot = last_value;
    }
    Some(filled)
}

/// Trend, seasonal and residual parts, aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<Option<f64>>,
    pub residual: Vec<Option<f64>>,
}

/// Centered moving average of length `period`. Even periods use the 2 x period average,
/// which gives the two end points half weight.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];
    if n <= 2 * half {
        return trend;
    }
    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &values[i - half..=i + half];
        let sum: f64 = if period % 2 == 1 {
            window.iter().sum()
        } else {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            inner + 0.5 * (window[0] + window[window.len() - 1])
        };
        *slot = Some(sum / period as f64);
    }
    trend
}

/// Classical additive decomposition with a fixed `period`.
///
/// The seasonal value at index `i` is the mean detrended value over all indices sharing
/// `i % period`, centred so the defined position means average to zero.
///
/// # Errors
///
/// [`AirQualityError::InsufficientData`] if the series is shorter than one period.
pub fn additive_decompose(values: &[f64], period: usize) -> Result<Components, AirQualityError> {
    if period < 2 || values.len() < period {
        return Err(AirQualityError::InsufficientData {
            found: values.len(),
            required: period.max(2),
        });
    }

    let trend = centered_moving_average(values, period);

    let mut position_values: Vec<Vec<f64>> = vec![Vec::new(); period];
    for (i, (value, trend)) in values.iter().zip(&trend).enumerate() {
        if let Some(trend) = trend {
            position_values[i % period].push(value - trend);
        }
    }
    let position_means: Vec<Option<f64>> = position_values
        .iter()
        .map(|detrended| stats::mean(detrended))
        .collect();
    let defined: Vec<f64> = position_means.iter().flatten().copied().collect();
    let offset = stats::mean(&defined).unwrap_or(0.0);

    let seasonal: Vec<Option<f64>> = (0..values.len())
        .map(|i| position_means[i % period].map(|m| m - offset))
        .collect();
    let residual = values
        .iter()
        .zip(trend.iter().zip(&seasonal))
        .map(|(value, (trend, seasonal))| match (trend, seasonal) {
            (Some(t), Some(s)) => Some(value - t - s),
            _ => None,
        })
        .collect();

    Ok(Components {
        trend,
        seasonal,
        residual,
    })
}

/// Decomposition of one station's daily PM10 series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub station: Station,
    pub period: usize,
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<Option<f64>>,
    pub residual: Vec<Option<f64>>,
}

impl Decomposition {
    /// One row per day with the four aligned series and a `date` column.
    pub fn to_frame(&self) -> Result<DataFrame, AirQualityError> {
        let mut frame = df!(
            "observed" => self.observed.clone(),
            "trend" => self.trend.clone(),
            "seasonal" => self.seasonal.clone(),
            "residual" => self.residual.clone()
        )?;
        let dates = DatetimeChunked::from_naive_datetime(
            DATE.into(),
            self.dates.iter().map(|d| d.and_time(NaiveTime::MIN)),
            TimeUnit::Milliseconds,
        );
        frame.with_column(dates.into_series())?;
        Ok(frame)
    }
}

/// Resamples `subset` to days and decomposes it with a one-year period.
///
/// # Errors
///
/// [`AirQualityError::InsufficientData`] if fewer than [`DECOMPOSITION_PERIOD`] days are
/// available. No partial result is produced.
pub fn decompose(subset: &StationFrame) -> Result<Decomposition, AirQualityError> {
    let daily = daily_aggregate(subset)?;
    decompose_daily(daily)
}

pub fn decompose_daily(daily: DailySeries) -> Result<Decomposition, AirQualityError> {
    if daily.len() < DECOMPOSITION_PERIOD {
        return Err(AirQualityError::InsufficientData {
            found: daily.len(),
            required: DECOMPOSITION_PERIOD,
        });
    }
    let components = additive_decompose(&daily.pm10, DECOMPOSITION_PERIOD)?;
    Ok(Decomposition {
        station: daily.station,
        period: DECOMPOSITION_PERIOD,
        dates: daily.dates,
        observed: daily.pm10,
        trend: components.trend,
        seasonal: components.seasonal,
        residual: components.residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{daily_rows, preprocessed, Row};
    use std::f64::consts::PI;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_fill_gaps_interpolates_and_extends_edges() {
        let filled = fill_gaps(&[None, Some(2.0), None, None, Some(8.0), None]);
        assert_eq!(filled, Some(vec![2.0, 2.0, 4.0, 6.0, 8.0, 8.0]));
        assert_eq!(fill_gaps(&[None, None]), None);
        assert_eq!(fill_gaps(&[Some(f64::NAN), Some(1.0)]), Some(vec![1.0, 1.0]));
    }

    #[test]
    fn test_daily_aggregate_spans_recorded_days() -> Result<(), AirQualityError> {
        let pre = preprocessed(&[
            Row::new("Dongsi", 2013, 12, 31, 23),
            Row::new("Dongsi", 2014, 1, 1, 0).pm10(8.0),
            Row::new("Dongsi", 2014, 1, 1, 1).pm10(12.0),
            Row::new("Dongsi", 2014, 1, 3, 0).pm10(30.0),
            Row::new("Wanliu", 2014, 2, 1, 0).pm10(99.0),
        ])?;
        let daily = daily_aggregate(&pre.dongsi)?;
        assert_eq!(
            daily.dates,
            vec![
                date(2013, 12, 31),
                date(2014, 1, 1),
                date(2014, 1, 2),
                date(2014, 1, 3)
            ]
        );
        assert_eq!(daily.pm10, vec![10.0, 10.0, 20.0, 30.0]);
        Ok(())
    }

    #[test]
    fn test_short_series_is_insufficient() -> Result<(), AirQualityError> {
        let rows = daily_rows("Wanliu", date(2015, 1, 1), 100, |i| i as f64);
        let pre = preprocessed(&rows)?;
        match decompose(&pre.wanliu) {
            Err(AirQualityError::InsufficientData { found, required }) => {
                assert_eq!(found, 100);
                assert_eq!(required, DECOMPOSITION_PERIOD);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|d| d.period)),
        }
        Ok(())
    }

    #[test]
    fn test_trend_plus_seasonal_reconstructs_400_days() -> Result<(), AirQualityError> {
        let values: Vec<f64> = (0..400)
            .map(|t| {
                let t = t as f64;
                50.0 + 0.1 * t + 20.0 * (2.0 * PI * (t - 199.5) / 365.0).sin()
            })
            .collect();
        let parts = additive_decompose(&values, DECOMPOSITION_PERIOD)?;

        assert_eq!(parts.trend[181], None);
        assert_eq!(parts.trend[218], None);
        assert_eq!(parts.residual[0], None);
        for i in 182..218 {
            let trend = parts.trend[i].ok_or(AirQualityError::InsufficientData {
                found: i,
                required: 182,
            })?;
            let seasonal = parts.seasonal[i].unwrap_or(f64::NAN);
            assert!((trend + seasonal - values[i]).abs() < 1e-9, "index {}", i);
            assert!((trend - (50.0 + 0.1 * i as f64)).abs() < 1e-9);
            assert!(parts.residual[i].is_some_and(|r| r.abs() < 1e-9));
        }
        Ok(())
    }

    #[test]
    fn test_multi_year_seasonal_is_centred() -> Result<(), AirQualityError> {
        let seasonal_part =
            |t: f64| 15.0 * (2.0 * PI * t / 365.0).sin() + 5.0 * (4.0 * PI * t / 365.0).cos();
        let values: Vec<f64> = (0..3 * 365)
            .map(|t| 10.0 + 0.05 * t as f64 + seasonal_part(t as f64))
            .collect();
        let parts = additive_decompose(&values, DECOMPOSITION_PERIOD)?;

        let one_period: f64 = parts.seasonal[..365].iter().flatten().sum();
        assert!(one_period.abs() < 1e-6);
        assert!(parts.seasonal.iter().all(Option::is_some));
        for i in 182..(3 * 365 - 182) {
            assert!(parts.residual[i].is_some_and(|r| r.abs() < 1e-9));
            assert!(parts.seasonal[i]
                .is_some_and(|s| (s - seasonal_part(i as f64)).abs() < 1e-9));
        }
        Ok(())
    }

    #[test]
    fn test_even_period_uses_half_weighted_ends() -> Result<(), AirQualityError> {
        let pattern = [2.0, 0.0, -2.0, 0.0];
        let values: Vec<f64> = (0..12).map(|i| i as f64 + pattern[i % 4]).collect();
        let parts = additive_decompose(&values, 4)?;

        assert_eq!(parts.trend[1], None);
        assert_eq!(parts.trend[10], None);
        for i in 2..10 {
            assert!(parts.trend[i].is_some_and(|t| (t - i as f64).abs() < 1e-12));
            assert!(parts.seasonal[i].is_some_and(|s| (s - pattern[i % 4]).abs() < 1e-12));
        }
        Ok(())
    }

    #[test]
    fn test_decompose_station_frame() -> Result<(), AirQualityError> {
        let rows = daily_rows("Dongsi", date(2014, 3, 1), 730, |i| {
            80.0 + 30.0 * (2.0 * PI * i as f64 / 365.0).cos()
        });
        let pre = preprocessed(&rows)?;
        let result = decompose(&pre.dongsi)?;

        assert_eq!(result.observed.len(), 730);
        assert_eq!(result.dates[0], date(2014, 3, 1));
        assert_eq!(result.trend[0], None);
        assert!(result.trend[182].is_some());
        assert!(result.trend[547].is_some());
        assert_eq!(result.trend[548], None);

        let frame = result.to_frame()?;
        assert_eq!(frame.height(), 730);
        assert!(frame.column(DATE).is_ok());
        Ok(())
    }
}
