//! Yearly and monthly PM10 means per station, and the yearly summary statistics table.

use crate::error::AirQualityError;
use crate::stats::round2;
use crate::types::columns::{MONTH, PM10, STATION, YEAR};
use crate::types::frame::AirQualityFrame;
use crate::views::{float_values, int_values, string_values};
use polars::prelude::{col, DataFrame, Expr, IntoLazy};
use serde::Serialize;

/// Mean PM10 of one (year, station) or (year, month, station) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub year: i32,
    pub month: Option<u32>,
    pub station: String,
    pub pm10: Option<f64>,
}

fn grouped(table: &AirQualityFrame, keys: &[&str], aggs: Vec<Expr>) -> Result<DataFrame, AirQualityError> {
    let keys: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
    Ok(table
        .frame
        .clone()
        .lazy()
        .filter(col(STATION).is_not_null())
        .group_by(keys)
        .agg(aggs)
        .collect()?)
}

/// Mean PM10 per (year, station), sorted by year then station.
pub fn yearly_average(table: &AirQualityFrame) -> Result<Vec<GroupMean>, AirQualityError> {
    let df = grouped(table, &[YEAR, STATION], vec![col(PM10).mean()])?;
    let years = int_values(&df, YEAR)?;
    let stations = string_values(&df, STATION)?;
    let means = float_values(&df, PM10)?;

    let mut rows: Vec<GroupMean> = years
        .into_iter()
        .zip(stations)
        .zip(means)
        .filter_map(|((year, station), pm10)| {
            Some(GroupMean {
                year: year?,
                month: None,
                station: station?,
                pm10,
            })
        })
        .collect();
    rows.sort_by(|a, b| (a.year, &a.station).cmp(&(b.year, &b.station)));
    Ok(rows)
}

/// Mean PM10 per (month, station) within `year`, sorted by month then station.
pub fn monthly_average(
    table: &AirQualityFrame,
    year: i32,
) -> Result<Vec<GroupMean>, AirQualityError> {
    let df = grouped(
        &table.for_year(year)?,
        &[YEAR, MONTH, STATION],
        vec![col(PM10).mean()],
    )?;
    let years = int_values(&df, YEAR)?;
    let months = int_values(&df, MONTH)?;
    let stations = string_values(&df, STATION)?;
    let means = float_values(&df, PM10)?;

    let mut rows: Vec<GroupMean> = years
        .into_iter()
        .zip(months)
        .zip(stations)
        .zip(means)
        .filter_map(|(((year, month), station), pm10)| {
            Some(GroupMean {
                year: year?,
                month: month.and_then(|m| u32::try_from(m).ok()),
                station: station?,
                pm10,
            })
        })
        .collect();
    rows.sort_by(|a, b| (a.month, &a.station).cmp(&(b.month, &b.station)));
    Ok(rows)
}

/// Summary statistics of PM10 for one (year, station), rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStats {
    pub year: i32,
    pub station: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

const MEAN: &str = "mean";
const MEDIAN: &str = "median";
const STD: &str = "std";
const MIN: &str = "min";
const MAX: &str = "max";

pub fn yearly_summary(table: &AirQualityFrame) -> Result<Vec<YearlyStats>, AirQualityError> {
    let df = grouped(
        table,
        &[YEAR, STATION],
        vec![
            col(PM10).mean().alias(MEAN),
            col(PM10).median().alias(MEDIAN),
            col(PM10).std(1).alias(STD),
            col(PM10).min().alias(MIN),
            col(PM10).max().alias(MAX),
        ],
    )?;

    let years = int_values(&df, YEAR)?;
    let stations = string_values(&df, STATION)?;
    let columns = [MEAN, MEDIAN, STD, MIN, MAX]
        .iter()
        .map(|name| float_values(&df, name))
        .collect::<Result<Vec<_>, _>>()?;
    let value = |column: usize, row: usize| {
        columns[column][row]
            .filter(|v| !v.is_nan())
            .map(round2)
    };

    let mut rows: Vec<YearlyStats> = years
        .into_iter()
        .zip(stations)
        .enumerate()
        .filter_map(|(row, (year, station))| {
            Some(YearlyStats {
                year: year?,
                station: station?,
                mean: value(0, row),
                median: value(1, row),
                std: value(2, row),
                min: value(3, row),
                max: value(4, row),
            })
        })
        .collect();
    rows.sort_by(|a, b| (a.year, &a.station).cmp(&(b.year, &b.station)));
    Ok(rows)
}
