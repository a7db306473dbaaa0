use crate::types::columns;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric measurement column: the pollutant itself or one of the meteorological covariates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    /// Particulate matter ≤10 µm.
    Pm10,
    /// Temperature.
    Temp,
    /// Dew point.
    Dewp,
    /// Air pressure.
    Pres,
}

impl Feature {
    /// The fixed feature set of the correlation matrix, in display order.
    pub const CORRELATION_SET: [Feature; 4] =
        [Feature::Pm10, Feature::Temp, Feature::Dewp, Feature::Pres];

    /// The factors a user can pick in the meteorological selectors.
    pub const METEOROLOGICAL: [Feature; 3] = [Feature::Temp, Feature::Dewp, Feature::Pres];

    pub fn column(&self) -> &'static str {
        match self {
            Feature::Pm10 => columns::PM10,
            Feature::Temp => columns::TEMP,
            Feature::Dewp => columns::DEWP,
            Feature::Pres => columns::PRES,
        }
    }

    pub fn is_meteorological(&self) -> bool {
        !matches!(self, Feature::Pm10)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::Pm10 => "PM10 concentration",
            Feature::Temp => "Temperature",
            Feature::Dewp => "Dew point",
            Feature::Pres => "Atmospheric pressure",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            columns::PM10 => Ok(Feature::Pm10),
            columns::TEMP => Ok(Feature::Temp),
            columns::DEWP => Ok(Feature::Dewp),
            columns::PRES => Ok(Feature::Pres),
            other => Err(format!("unknown feature '{}'", other)),
        }
    }
}
