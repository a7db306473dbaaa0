//! Typed wrappers around the polars frames the pipeline passes between stages.

use crate::dataset::error::DatasetError;
use crate::error::AirQualityError;
use crate::preprocess::timestamp;
use crate::types::columns::{
    CALENDAR_COLUMNS, DAY, DERIVED_COLUMNS, DEWP, HOUR, MONTH, PM10, PRES, REQUIRED_COLUMNS, STATION, TEMP, YEAR,
};
use crate::types::feature::Feature;
use crate::types::record::Record;
use crate::types::station::Station;
use chrono::NaiveDateTime;
use polars::prelude::{col, lit, DataFrame, DataType, Expr, IntoLazy};

/// A measurement table with a validated, normalized schema.
///
/// Holds at least the columns in [`REQUIRED_COLUMNS`] with fixed types: `station` as
/// String, `year`/`month`/`day`/`hour` as Int32 and the four measurements as Float64.
/// After [`crate::preprocess`] it also carries the derived calendar columns.
///
/// Frames are never mutated once built; every operation returns a new frame.
#[derive(Debug, Clone)]
pub struct AirQualityFrame {
    /// The underlying polars frame.
    pub frame: DataFrame,
}

impl AirQualityFrame {
    /// Wraps a frame that already has the normalized schema.
    pub(crate) fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Validates that every required column exists and casts them to the normalized types.
    ///
    /// Columns outside the required set are dropped, except derived columns, which are
    /// kept so an already preprocessed table survives a round trip through the cache.
    /// Cells that cannot be cast (for example stray text in a numeric column) become
    /// missing values. Calendar components are never truncated: a float column must hold
    /// whole numbers only.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] naming the first absent required column, or
    /// [`DatasetError::MalformedTimestamp`] for the first fractional or non-finite calendar
    /// component.
    pub fn from_dataframe(frame: DataFrame, source_name: &str) -> Result<Self, DatasetError> {
        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .find(|name| frame.column(name).is_err())
        {
            return Err(DatasetError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            });
        }

        for name in CALENDAR_COLUMNS {
            reject_fractional(&frame, name, source_name)?;
        }

        let mut selection: Vec<Expr> = vec![
            col(STATION).cast(DataType::String),
            col(YEAR).cast(DataType::Int32),
            col(MONTH).cast(DataType::Int32),
            col(DAY).cast(DataType::Int32),
            col(HOUR).cast(DataType::Int32),
            col(PM10).cast(DataType::Float64),
            col(TEMP).cast(DataType::Float64),
            col(DEWP).cast(DataType::Float64),
            col(PRES).cast(DataType::Float64),
        ];
        selection.extend(
            DERIVED_COLUMNS
                .iter()
                .filter(|name| frame.column(name).is_ok())
                .map(|name| col(*name)),
        );

        let frame = frame.lazy().select(selection).collect()?;
        Ok(Self { frame })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// True once every derived calendar column is present.
    pub fn is_augmented(&self) -> bool {
        DERIVED_COLUMNS.iter().all(|name| self.has_column(name))
    }

    /// Returns the rows matching `predicate` as a new frame.
    pub fn filter(&self, predicate: Expr) -> Result<AirQualityFrame, AirQualityError> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(AirQualityFrame::new(frame))
    }

    /// Rows of a single year.
    pub fn for_year(&self, year: i32) -> Result<AirQualityFrame, AirQualityError> {
        self.filter(col(YEAR).eq(lit(year)))
    }

    pub fn feature(&self, feature: Feature) -> Result<Vec<Option<f64>>, AirQualityError> {
        self.float_column(feature.column())
    }

    pub fn float_column(&self, name: &str) -> Result<Vec<Option<f64>>, AirQualityError> {
        Ok(self.frame.column(name)?.f64()?.into_iter().collect())
    }

    pub fn int_column(&self, name: &str) -> Result<Vec<Option<i32>>, AirQualityError> {
        Ok(self.frame.column(name)?.i32()?.into_iter().collect())
    }

    pub fn string_column(&self, name: &str) -> Result<Vec<Option<String>>, AirQualityError> {
        Ok(self
            .frame
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_owned))
            .collect())
    }

    pub fn stations(&self) -> Result<Vec<Option<String>>, AirQualityError> {
        self.string_column(STATION)
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Result<Vec<i32>, AirQualityError> {
        let mut years: Vec<i32> = self.int_column(YEAR)?.into_iter().flatten().collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    /// Builds the timestamp of every row from its year/month/day/hour components.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::MalformedTimestamp`] for the first row with a missing or
    /// out-of-range component. Nothing is coerced.
    pub fn timestamps(&self) -> Result<Vec<NaiveDateTime>, AirQualityError> {
        let years = self.int_column(YEAR)?;
        let months = self.int_column(MONTH)?;
        let days = self.int_column(DAY)?;
        let hours = self.int_column(HOUR)?;

        years
            .into_iter()
            .zip(months)
            .zip(days)
            .zip(hours)
            .enumerate()
            .map(|(row, (((year, month), day), hour))| {
                timestamp::resolve(row, year, month, day, hour)
            })
            .collect()
    }

    /// Materializes the frame as typed rows.
    pub fn records(&self) -> Result<Vec<Record>, AirQualityError> {
        let timestamps = self.timestamps()?;
        let stations = self.stations()?;
        let pm10 = self.feature(Feature::Pm10)?;
        let temperature = self.feature(Feature::Temp)?;
        let dew_point = self.feature(Feature::Dewp)?;
        let pressure = self.feature(Feature::Pres)?;

        Ok(timestamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| Record {
                station: stations[i].clone(),
                timestamp,
                pm10: pm10[i],
                temperature: temperature[i],
                dew_point: dew_point[i],
                pressure: pressure[i],
            })
            .collect())
    }
}

/// Fails on the first value of a float calendar column that is not a whole number.
fn reject_fractional(
    frame: &DataFrame,
    name: &str,
    source_name: &str,
) -> Result<(), DatasetError> {
    let column = frame.column(name)?;
    if !column.dtype().is_float() {
        return Ok(());
    }
    let values = column.cast(&DataType::Float64)?;
    let fractional = values
        .f64()?
        .into_iter()
        .enumerate()
        .find_map(|(row, value)| value.filter(|v| v.fract() != 0.0).map(|v| (row, v)));

    match fractional {
        Some((row, value)) => Err(DatasetError::MalformedTimestamp {
            source_name: source_name.to_string(),
            row,
            reason: format!("{} {} is not a whole number", name, value),
        }),
        None => Ok(()),
    }
}

/// The rows of one station, cut from an augmented table.
#[derive(Debug, Clone)]
pub struct StationFrame {
    pub station: Station,
    pub data: AirQualityFrame,
}

impl StationFrame {
    /// Keeps the rows whose `station` equals the station name exactly (case-sensitive).
    pub fn select(table: &AirQualityFrame, station: Station) -> Result<Self, AirQualityError> {
        let data = table.filter(col(STATION).eq(lit(station.name())))?;
        Ok(Self { station, data })
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }
}
