//! Derives the calendar fields once per table and cuts the per-station subsets.

pub mod timestamp;

use crate::error::AirQualityError;
use crate::types::columns::{DATE, DAY_OF_WEEK, HOUR_OF_DAY, MONTH_NAME, YEAR_MONTH};
use crate::types::frame::{AirQualityFrame, StationFrame};
use crate::types::station::Station;
use log::info;
use polars::prelude::{DatetimeChunked, IntoSeries, NamedFrom, Series, TimeUnit};

/// The augmented table together with the two station subsets.
///
/// Built once per session and shared read-only between views.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub full: AirQualityFrame,
    pub dongsi: StationFrame,
    pub wanliu: StationFrame,
}

impl Preprocessed {
    pub fn station(&self, station: Station) -> &StationFrame {
        match station {
            Station::Dongsi => &self.dongsi,
            Station::Wanliu => &self.wanliu,
        }
    }

    pub fn into_parts(self) -> (AirQualityFrame, StationFrame, StationFrame) {
        (self.full, self.dongsi, self.wanliu)
    }
}

/// Augments `table` with the derived time fields and splits it by station.
///
/// Rows of other stations stay in the full table but belong to neither subset.
/// Running this on its own output recomputes the derived columns in place, so the result
/// is identical to the first run.
///
/// # Errors
///
/// [`AirQualityError::MalformedTimestamp`] if any row's year/month/day/hour does not form
/// a valid timestamp.
pub fn preprocess(table: &AirQualityFrame) -> Result<Preprocessed, AirQualityError> {
    let full = augment(table)?;
    let dongsi = StationFrame::select(&full, Station::Dongsi)?;
    let wanliu = StationFrame::select(&full, Station::Wanliu)?;

    info!(
        "Preprocessed {} rows ({} Dongsi, {} Wanliu, {} other)",
        full.height(),
        dongsi.height(),
        wanliu.height(),
        full.height() - dongsi.height() - wanliu.height()
    );

    Ok(Preprocessed {
        full,
        dongsi,
        wanliu,
    })
}

/// Adds `date`, `day_of_week`, `hour_of_day`, `month_name` and `year_month`, all
/// computed from the year/month/day/hour components. Existing derived columns, including
/// a pre-existing `date`, are replaced in place, not duplicated.
pub fn augment(table: &AirQualityFrame) -> Result<AirQualityFrame, AirQualityError> {
    let timestamps = table.timestamps()?;
    let mut frame = table.frame.clone();

    let dates = DatetimeChunked::from_naive_datetime(
        DATE.into(),
        timestamps.iter().copied(),
        TimeUnit::Milliseconds,
    );
    frame.with_column(dates.into_series())?;

    let day_names: Vec<&str> = timestamps.iter().map(timestamp::day_of_week).collect();
    let hours: Vec<i32> = timestamps.iter().map(timestamp::hour_of_day).collect();
    let month_names: Vec<&str> = timestamps.iter().map(timestamp::month_name).collect();
    let year_months: Vec<String> = timestamps.iter().map(timestamp::year_month).collect();

    frame.with_column(Series::new(DAY_OF_WEEK.into(), day_names))?;
    frame.with_column(Series::new(HOUR_OF_DAY.into(), hours))?;
    frame.with_column(Series::new(MONTH_NAME.into(), month_names))?;
    frame.with_column(Series::new(YEAR_MONTH.into(), year_months))?;

    Ok(AirQualityFrame::new(frame))
}
