//! Builders for small in-memory tables used across the unit tests.

use crate::error::AirQualityError;
use crate::preprocess::{preprocess, Preprocessed};
use crate::types::frame::AirQualityFrame;
use chrono::{Datelike, Duration, NaiveDate};
use polars::df;

#[derive(Debug, Clone)]
pub struct Row {
    pub station: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub pm10: Option<f64>,
    pub temp: Option<f64>,
    pub dewp: Option<f64>,
    pub pres: Option<f64>,
}

impl Row {
    pub fn new(station: &str, year: i32, month: i32, day: i32, hour: i32) -> Self {
        Self {
            station: station.to_string(),
            year,
            month,
            day,
            hour,
            pm10: None,
            temp: None,
            dewp: None,
            pres: None,
        }
    }

    pub fn on(station: &str, date: NaiveDate, hour: i32) -> Self {
        Self::new(
            station,
            date.year(),
            date.month() as i32,
            date.day() as i32,
            hour,
        )
    }

    pub fn pm10(mut self, value: f64) -> Self {
        self.pm10 = Some(value);
        self
    }

    pub fn temp(mut self, value: f64) -> Self {
        self.temp = Some(value);
        self
    }

    pub fn dewp(mut self, value: f64) -> Self {
        self.dewp = Some(value);
        self
    }

    pub fn pres(mut self, value: f64) -> Self {
        self.pres = Some(value);
        self
    }
}

pub fn raw_frame(rows: &[Row]) -> Result<AirQualityFrame, AirQualityError> {
    let df = df!(
        "station" => rows.iter().map(|r| r.station.as_str()).collect::<Vec<_>>(),
        "year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "month" => rows.iter().map(|r| r.month).collect::<Vec<_>>(),
        "day" => rows.iter().map(|r| r.day).collect::<Vec<_>>(),
        "hour" => rows.iter().map(|r| r.hour).collect::<Vec<_>>(),
        "PM10" => rows.iter().map(|r| r.pm10).collect::<Vec<_>>(),
        "TEMP" => rows.iter().map(|r| r.temp).collect::<Vec<_>>(),
        "DEWP" => rows.iter().map(|r| r.dewp).collect::<Vec<_>>(),
        "PRES" => rows.iter().map(|r| r.pres).collect::<Vec<_>>()
    )?;
    Ok(AirQualityFrame::from_dataframe(df, "test")?)
}

pub fn preprocessed(rows: &[Row]) -> Result<Preprocessed, AirQualityError> {
    preprocess(&raw_frame(rows)?)
}

/// One noon reading per day for `days` consecutive days.
pub fn daily_rows(
    station: &str,
    start: NaiveDate,
    days: usize,
    pm10: impl Fn(usize) -> f64,
) -> Vec<Row> {
    (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            Row::on(station, date, 12).pm10(pm10(i))
        })
        .collect()
}

/// Renders rows the way the published CSV looks: a leading index column, `NA` for
/// missing values and an unrelated trailing column.
pub fn csv_text(rows: &[Row]) -> String {
    let cell = |value: Option<f64>| value.map_or_else(|| "NA".to_string(), |v| v.to_string());
    let mut text = String::from("No,year,month,day,hour,PM10,TEMP,DEWP,PRES,wd,station\n");
    for (i, row) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},NW,{}\n",
            i + 1,
            row.year,
            row.month,
            row.day,
            row.hour,
            cell(row.pm10),
            cell(row.temp),
            cell(row.dewp),
            cell(row.pres),
            row.station
        ));
    }
    text
}
