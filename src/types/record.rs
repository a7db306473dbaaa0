use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// One row of the measurement table with its timestamp resolved.
///
/// Measurements are `Option` because the source marks missing readings with `NA`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub station: Option<String>,
    pub timestamp: NaiveDateTime,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub pressure: Option<f64>,
}

impl Record {
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
