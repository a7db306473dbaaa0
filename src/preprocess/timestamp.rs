//! Calendar validation and the derived time fields.
//!
//! Every derived field is a pure function of the row's timestamp, which in turn is a pure
//! function of its year/month/day/hour components.

use crate::error::AirQualityError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Builds the timestamp of row `row` from its components.
///
/// # Errors
///
/// [`AirQualityError::MalformedTimestamp`] if a component is missing, negative, outside
/// its calendar range, or the date does not exist (e.g. February 30th).
pub(crate) fn resolve(
    row: usize,
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
    hour: Option<i32>,
) -> Result<NaiveDateTime, AirQualityError> {
    let malformed = |reason: String| AirQualityError::MalformedTimestamp { row, reason };

    let year = year.ok_or_else(|| malformed("missing year".to_string()))?;
    let month = component(month, "month").map_err(malformed)?;
    let day = component(day, "day").map_err(malformed)?;
    let hour = component(hour, "hour").map_err(malformed)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        malformed(format!(
            "{:04}-{:02}-{:02} is not a calendar date",
            year, month, day
        ))
    })?;
    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| malformed(format!("hour {} is outside 0-23", hour)))
}

fn component(value: Option<i32>, name: &str) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("missing {}", name))?;
    u32::try_from(value).map_err(|_| format!("negative {} ({})", name, value))
}

pub fn day_of_week(timestamp: &NaiveDateTime) -> &'static str {
    match timestamp.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn hour_of_day(timestamp: &NaiveDateTime) -> i32 {
    timestamp.hour() as i32
}

pub fn month_name(timestamp: &NaiveDateTime) -> &'static str {
    MONTH_NAMES[timestamp.month0() as usize]
}

pub fn year_month(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_valid_components() -> Result<(), AirQualityError> {
        let ts = resolve(0, Some(2016), Some(2), Some(29), Some(23))?;
        assert_eq!(day_of_week(&ts), "Monday");
        assert_eq!(hour_of_day(&ts), 23);
        assert_eq!(month_name(&ts), "February");
        assert_eq!(year_month(&ts), "2016-02");
        Ok(())
    }

    #[test]
    fn test_resolve_rejects_each_bad_component() {
        let cases = [
            (None, Some(1), Some(1), Some(0)),
            (Some(2013), None, Some(1), Some(0)),
            (Some(2013), Some(13), Some(1), Some(0)),
            (Some(2013), Some(1), Some(32), Some(0)),
            (Some(2013), Some(1), Some(0), Some(0)),
            (Some(2013), Some(1), Some(1), Some(24)),
            (Some(2013), Some(1), Some(1), Some(-1)),
            (Some(2013), Some(1), Some(1), None),
        ];
        for (i, (year, month, day, hour)) in cases.into_iter().enumerate() {
            match resolve(i, year, month, day, hour) {
                Err(AirQualityError::MalformedTimestamp { row, .. }) => assert_eq!(row, i),
                other => panic!("case {} should be malformed, got {:?}", i, other),
            }
        }
    }
}
