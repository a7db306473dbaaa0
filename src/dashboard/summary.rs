//! Key findings, worded from the computed statistics rather than fixed prose.

use crate::error::AirQualityError;
use crate::preprocess::Preprocessed;
use crate::stats;
use crate::types::feature::Feature;
use crate::types::station::Station;
use crate::views::hourly::hourly_average;
use crate::views::trends::yearly_average;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    DailyPattern,
    StationComparison,
    Meteorology,
    AnnualTrend,
    Distribution,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Topic::DailyPattern => "Daily pattern",
            Topic::StationComparison => "Station comparison",
            Topic::Meteorology => "Meteorology",
            Topic::AnnualTrend => "Annual trend",
            Topic::Distribution => "Distribution",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub topic: Topic,
    pub text: String,
}

impl Finding {
    fn new(topic: Topic, text: String) -> Self {
        Self { topic, text }
    }
}

/// Conventional labels for |r|.
pub fn correlation_strength(r: f64) -> &'static str {
    match r.abs() {
        a if a < 0.1 => "negligible",
        a if a < 0.3 => "weak",
        a if a < 0.5 => "moderate",
        _ => "strong",
    }
}

/// Findings that cannot be computed (for example a station without PM10 values) are
/// left out.
pub fn findings(preprocessed: &Preprocessed) -> Result<Vec<Finding>, AirQualityError> {
    let mut findings = Vec::new();

    for station in Station::ALL {
        let series = hourly_average(preprocessed.station(station), None)?;
        if let (Some((peak, peak_value)), Some((trough, trough_value))) =
            (series.peak(), series.trough())
        {
            findings.push(Finding::new(
                Topic::DailyPattern,
                format!(
                    "{} PM10 peaks at {:02}:00 (mean {:.1}) and is lowest at {:02}:00 (mean {:.1}).",
                    station, peak, peak_value, trough, trough_value
                ),
            ));
        }
    }

    let dongsi_pm10 = stats::present(&preprocessed.dongsi.data.feature(Feature::Pm10)?);
    let wanliu_pm10 = stats::present(&preprocessed.wanliu.data.feature(Feature::Pm10)?);
    if let (Some(dongsi), Some(wanliu)) = (stats::mean(&dongsi_pm10), stats::mean(&wanliu_pm10)) {
        let text = if dongsi > wanliu {
            format!(
                "Dongsi has the higher mean PM10 ({:.1} vs {:.1} at Wanliu).",
                dongsi, wanliu
            )
        } else if wanliu > dongsi {
            format!(
                "Wanliu has the higher mean PM10 ({:.1} vs {:.1} at Dongsi).",
                wanliu, dongsi
            )
        } else {
            format!("Both stations have the same mean PM10 ({:.1}).", dongsi)
        };
        findings.push(Finding::new(Topic::StationComparison, text));
    }

    for station in Station::ALL {
        let data = &preprocessed.station(station).data;
        let pm10 = data.feature(Feature::Pm10)?;
        for factor in Feature::METEOROLOGICAL {
            if let Some(r) = stats::pearson(&data.feature(factor)?, &pm10) {
                let direction = if r >= 0.0 { "positive" } else { "negative" };
                findings.push(Finding::new(
                    Topic::Meteorology,
                    format!(
                        "{} shows a {} {} correlation with PM10 at {} (r = {:.2}).",
                        factor.description(),
                        correlation_strength(r),
                        direction,
                        station,
                        r
                    ),
                ));
            }
        }
    }

    let yearly = yearly_average(&preprocessed.full)?;
    for station in Station::ALL {
        let means: Vec<(i32, f64)> = yearly
            .iter()
            .filter(|row| row.station == station.name())
            .filter_map(|row| row.pm10.map(|m| (row.year, m)))
            .collect();
        let highest = means
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best });
        let lowest = means
            .iter()
            .copied()
            .reduce(|best, next| if next.1 < best.1 { next } else { best });
        if let (Some((high_year, high)), Some((low_year, low))) = (highest, lowest) {
            findings.push(Finding::new(
                Topic::AnnualTrend,
                format!(
                    "{}: highest yearly mean in {} ({:.1}), lowest in {} ({:.1}).",
                    station, high_year, high, low_year, low
                ),
            ));
        }
    }

    let all_pm10 = stats::sorted(stats::present(&preprocessed.full.feature(Feature::Pm10)?));
    if let (Some(mean), Some(median)) = (stats::mean(&all_pm10), stats::quantile(&all_pm10, 0.5)) {
        let shape = if mean > median {
            "right-skewed (mean above median)"
        } else if mean < median {
            "left-skewed (mean below median)"
        } else {
            "symmetric around its median"
        };
        findings.push(Finding::new(
            Topic::Distribution,
            format!(
                "The PM10 distribution is {}: mean {:.1}, median {:.1}.",
                shape, mean, median
            ),
        ));
    }

    Ok(findings)
}
