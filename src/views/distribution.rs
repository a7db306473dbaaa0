//! Histograms and box plot statistics of PM10 and the meteorological factors.

use crate::error::AirQualityError;
use crate::preprocess::Preprocessed;
use crate::stats::{self, BoxStats};
use crate::types::columns::{PM10, YEAR};
use crate::types::feature::Feature;
use crate::types::frame::AirQualityFrame;
use crate::types::station::Station;
use serde::Serialize;
use std::collections::BTreeMap;

pub const HISTOGRAM_BINS: usize = 50;

/// Equal-width histogram of one feature. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub feature: Feature,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Number of present samples.
    pub total: usize,
    pub mean: Option<f64>,
}

impl Histogram {
    /// Histogram with `bins` bins over the observed range of `feature`.
    /// Empty edges and counts if the feature has no values.
    pub fn build(
        table: &AirQualityFrame,
        feature: Feature,
        bins: usize,
    ) -> Result<Histogram, AirQualityError> {
        let values = stats::present(&table.feature(feature)?);
        let edges = stats::value_range(&values)
            .map(|(min, max)| stats::bin_edges(min, max, bins))
            .unwrap_or_default();
        Ok(Self::over(feature, &values, edges))
    }

    fn over(feature: Feature, values: &[f64], edges: Vec<f64>) -> Histogram {
        Histogram {
            feature,
            counts: stats::bin_counts(values, &edges),
            edges,
            total: values.len(),
            mean: stats::mean(values),
        }
    }
}

pub fn histogram(table: &AirQualityFrame, feature: Feature) -> Result<Histogram, AirQualityError> {
    Histogram::build(table, feature, HISTOGRAM_BINS)
}

/// Per-station histograms of the same feature, binned on one shared set of edges so the
/// bars can be overlaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationHistograms {
    pub feature: Feature,
    pub dongsi: Histogram,
    pub wanliu: Histogram,
}

impl StationHistograms {
    pub fn station(&self, station: Station) -> &Histogram {
        match station {
            Station::Dongsi => &self.dongsi,
            Station::Wanliu => &self.wanliu,
        }
    }
}

pub fn station_histograms(
    preprocessed: &Preprocessed,
    feature: Feature,
) -> Result<StationHistograms, AirQualityError> {
    let dongsi = stats::present(&preprocessed.dongsi.data.feature(feature)?);
    let wanliu = stats::present(&preprocessed.wanliu.data.feature(feature)?);

    let both: Vec<f64> = dongsi.iter().chain(wanliu.iter()).copied().collect();
    let edges = stats::value_range(&both)
        .map(|(min, max)| stats::bin_edges(min, max, HISTOGRAM_BINS))
        .unwrap_or_default();

    Ok(StationHistograms {
        feature,
        dongsi: Histogram::over(feature, &dongsi, edges.clone()),
        wanliu: Histogram::over(feature, &wanliu, edges),
    })
}

/// PM10 box statistics of one (year, station) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBox {
    pub year: i32,
    pub station: String,
    pub stats: BoxStats,
}

/// PM10 box statistics per (year, station), sorted by year then station.
/// Groups without any PM10 value are left out.
pub fn box_by_year_station(table: &AirQualityFrame) -> Result<Vec<GroupBox>, AirQualityError> {
    let years = table.int_column(YEAR)?;
    let stations = table.stations()?;
    let pm10 = table.float_column(PM10)?;

    let mut groups: BTreeMap<(i32, String), Vec<f64>> = BTreeMap::new();
    for ((year, station), value) in years.into_iter().zip(stations).zip(pm10) {
        if let (Some(year), Some(station), Some(value)) = (year, station, value) {
            if !value.is_nan() {
                groups.entry((year, station)).or_default().push(value);
            }
        }
    }

    Ok(groups
        .into_iter()
        .filter_map(|((year, station), values)| {
            stats::box_stats(&values).map(|stats| GroupBox {
                year,
                station,
                stats,
            })
        })
        .collect())
}
