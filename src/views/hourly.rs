//! Mean PM10 per hour of day.

use crate::error::AirQualityError;
use crate::preprocess::Preprocessed;
use crate::types::columns::{HOUR_OF_DAY, PM10};
use crate::types::frame::StationFrame;
use crate::types::station::Station;
use crate::views::{float_values, int_values};
use polars::df;
use polars::prelude::{col, DataFrame, IntoLazy, PolarsResult};
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

/// Mean PM10 for each hour 0..=23 of one station. `None` where the hour has no readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySeries {
    pub station: Station,
    pub year: Option<i32>,
    pub values: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Hour with the highest mean, first one on ties.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.defined()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
    }

    /// Hour with the lowest mean, first one on ties.
    pub fn trough(&self) -> Option<(usize, f64)> {
        self.defined()
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
    }

    fn defined(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(hour, value)| value.map(|v| (hour, v)))
    }
}

/// One hourly series per station, ready to be drawn on the same axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPair {
    pub dongsi: HourlySeries,
    pub wanliu: HourlySeries,
}

impl SeriesPair {
    /// Long table with one row per hour and one column per station.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            HOUR_OF_DAY => (0..HOURS_PER_DAY as i32).collect::<Vec<_>>(),
            Station::Dongsi.name() => self.dongsi.values.clone(),
            Station::Wanliu.name() => self.wanliu.values.clone()
        )
    }
}

/// Averages PM10 by hour of day for one station, optionally for a single year.
pub fn hourly_average(
    subset: &StationFrame,
    year: Option<i32>,
) -> Result<HourlySeries, AirQualityError> {
    let rows = match year {
        Some(year) => subset.data.for_year(year)?,
        None => subset.data.clone(),
    };

    let grouped = rows
        .frame
        .lazy()
        .group_by([col(HOUR_OF_DAY)])
        .agg([col(PM10).mean()])
        .collect()?;

    let mut values = vec![None; HOURS_PER_DAY];
    let hours = int_values(&grouped, HOUR_OF_DAY)?;
    let means = float_values(&grouped, PM10)?;
    for (hour, mean) in hours.into_iter().zip(means) {
        if let Some(slot) = hour
            .and_then(|h| usize::try_from(h).ok())
            .and_then(|h| values.get_mut(h))
        {
            *slot = mean.filter(|m| !m.is_nan());
        }
    }

    Ok(HourlySeries {
        station: subset.station,
        year,
        values,
    })
}

pub fn hourly_pattern(
    preprocessed: &Preprocessed,
    year: Option<i32>,
) -> Result<SeriesPair, AirQualityError> {
    Ok(SeriesPair {
        dongsi: hourly_average(&preprocessed.dongsi, year)?,
        wanliu: hourly_average(&preprocessed.wanliu, year)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{preprocessed, Row};

    #[test]
    fn test_one_row_per_hour_is_returned_exactly() -> Result<(), AirQualityError> {
        let rows: Vec<Row> = (0..24)
            .map(|h| Row::new("Dongsi", 2014, 6, 1, h).pm10(h as f64))
            .collect();
        let pre = preprocessed(&rows)?;
        let series = hourly_average(&pre.dongsi, None)?;

        let expected: Vec<Option<f64>> = (0..24).map(|h| Some(h as f64)).collect();
        assert_eq!(series.values, expected);
        assert_eq!(series.peak(), Some((23, 23.0)));
        assert_eq!(series.trough(), Some((0, 0.0)));
        Ok(())
    }

    #[test]
    fn test_empty_hours_are_undefined_not_zero() -> Result<(), AirQualityError> {
        let pre = preprocessed(&[
            Row::new("Wanliu", 2014, 6, 1, 3).pm10(30.0),
            Row::new("Wanliu", 2014, 6, 2, 3).pm10(50.0),
            Row::new("Wanliu", 2014, 6, 2, 5),
        ])?;
        let series = hourly_average(&pre.wanliu, None)?;
        assert_eq!(series.values.len(), 24);
        assert_eq!(series.values[3], Some(40.0));
        assert_eq!(series.values[5], None);
        assert_eq!(series.values[0], None);
        Ok(())
    }

    #[test]
    fn test_year_filter_and_pair() -> Result<(), AirQualityError> {
        let pre = preprocessed(&[
            Row::new("Dongsi", 2014, 6, 1, 8).pm10(100.0),
            Row::new("Dongsi", 2015, 6, 1, 8).pm10(20.0),
            Row::new("Wanliu", 2015, 6, 1, 8).pm10(60.0),
        ])?;

        let all_years = hourly_pattern(&pre, None)?;
        assert_eq!(all_years.dongsi.values[8], Some(60.0));

        let pair = hourly_pattern(&pre, Some(2015))?;
        assert_eq!(pair.dongsi.values[8], Some(20.0));
        assert_eq!(pair.wanliu.values[8], Some(60.0));
        assert_eq!(pair.wanliu.year, Some(2015));

        let frame = pair.to_frame()?;
        assert_eq!(frame.height(), 24);
        assert_eq!(frame.column("Wanliu")?.f64()?.get(8), Some(60.0));
        Ok(())
    }
}
