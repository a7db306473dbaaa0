use crate::dataset::error::DatasetError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AirQualityError {
    /// The source table could not be fetched, parsed or validated.
    #[error("Air quality data is unavailable: {0}")]
    DataUnavailable(#[source] DatasetError),

    #[error("Malformed timestamp in row {row}: {reason}")]
    MalformedTimestamp { row: usize, reason: String },

    #[error("Insufficient data for decomposition: {found} daily points, at least {required} required")]
    InsufficientData { found: usize, required: usize },

    #[error("Failed processing DataFrame: {0}")]
    PolarsError(#[from] PolarsError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}

impl From<DatasetError> for AirQualityError {
    fn from(error: DatasetError) -> Self {
        match error {
            DatasetError::MalformedTimestamp { row, reason, .. } => {
                AirQualityError::MalformedTimestamp { row, reason }
            }
            other => AirQualityError::DataUnavailable(other),
        }
    }
}
