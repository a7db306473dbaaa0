//! Pure view computations over the preprocessed tables.
//!
//! Every view returns a serializable artifact. Nothing here touches the network or disk.

pub mod correlation;
pub mod decomposition;
pub mod distribution;
pub mod hourly;
pub mod overview;
pub mod trends;

use crate::error::AirQualityError;
use polars::prelude::DataFrame;

pub(crate) fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>, AirQualityError> {
    Ok(df.column(name)?.i32()?.into_iter().collect())
}

pub(crate) fn float_values(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<f64>>, AirQualityError> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

pub(crate) fn string_values(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<String>>, AirQualityError> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}
