//! Pearson correlation matrices and the factor-vs-PM10 scatter with its OLS line.
//!
//! Correlations use pairwise-complete observations: each pair of features only looks at
//! the rows where both values are present, so a gap in `PRES` never hides a `TEMP`/`PM10`
//! pair.

use crate::error::AirQualityError;
use crate::stats::{self, LinearFit};
use crate::types::feature::Feature;
use crate::types::frame::AirQualityFrame;
use serde::Serialize;

/// Square correlation matrix indexed in the order of `features`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<Feature>,
    /// `values[i][j]` is the correlation of `features[i]` and `features[j]`,
    /// `None` where it is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Feature, b: Feature) -> Option<f64> {
        let i = self.features.iter().position(|f| *f == a)?;
        let j = self.features.iter().position(|f| *f == b)?;
        self.values[i][j]
    }
}

/// Builds the symmetric Pearson matrix of `features` over `table`.
///
/// The diagonal is 1.0 for every feature with at least two values and non-zero variance,
/// otherwise `None`.
pub fn correlate(
    table: &AirQualityFrame,
    features: &[Feature],
) -> Result<CorrelationMatrix, AirQualityError> {
    let columns = features
        .iter()
        .map(|feature| table.feature(*feature))
        .collect::<Result<Vec<_>, _>>()?;

    let n = features.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = stats::pearson(&columns[i], &columns[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = stats::pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        features: features.to_vec(),
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub station: Option<String>,
    pub x: f64,
    pub pm10: f64,
}

/// One meteorological factor against PM10, with the least squares line over all points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrend {
    pub feature: Feature,
    pub points: Vec<ScatterPoint>,
    pub fit: Option<LinearFit>,
}

pub fn scatter_trend(
    table: &AirQualityFrame,
    feature: Feature,
) -> Result<ScatterTrend, AirQualityError> {
    let xs = table.feature(feature)?;
    let ys = table.feature(Feature::Pm10)?;
    let stations = table.stations()?;

    let points = stations
        .into_iter()
        .zip(xs.iter().zip(ys.iter()))
        .filter_map(|(station, (x, y))| match (x, y) {
            (Some(x), Some(pm10)) if !x.is_nan() && !pm10.is_nan() => Some(ScatterPoint {
                station,
                x: *x,
                pm10: *pm10,
            }),
            _ => None,
        })
        .collect();

    Ok(ScatterTrend {
        feature,
        points,
        fit: stats::linear_fit(&xs, &ys),
    })
}
