//! Dataset overview: descriptive statistics per numeric column and record counts.

use crate::error::AirQualityError;
use crate::stats;
use crate::types::columns::{DAY, DEWP, HOUR, MONTH, PM10, PRES, TEMP, YEAR};
use crate::types::frame::AirQualityFrame;
use serde::Serialize;
use std::collections::BTreeMap;

/// Numeric columns described on the overview page, in table order.
pub const DESCRIBED_COLUMNS: [&str; 8] = [YEAR, MONTH, DAY, HOUR, PM10, TEMP, DEWP, PRES];

/// count, mean, std, min, quartiles and max of one column. Missing values are not counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn of(column: &str, values: &[Option<f64>]) -> Self {
        let sorted = stats::sorted(stats::present(values));
        ColumnSummary {
            column: column.to_string(),
            count: sorted.len(),
            mean: stats::mean(&sorted),
            std: stats::sample_std(&sorted),
            min: sorted.first().copied(),
            q25: stats::quantile(&sorted, 0.25),
            median: stats::quantile(&sorted, 0.5),
            q75: stats::quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// Most frequent station first.
    pub stations: Vec<Count<String>>,
    pub years: Vec<Count<i32>>,
    pub months: Vec<Count<i32>>,
}

pub fn describe(table: &AirQualityFrame) -> Result<Vec<ColumnSummary>, AirQualityError> {
    DESCRIBED_COLUMNS
        .iter()
        .map(|name| {
            let values: Vec<Option<f64>> = match *name {
                YEAR | MONTH | DAY | HOUR => table
                    .int_column(name)?
                    .into_iter()
                    .map(|v| v.map(f64::from))
                    .collect(),
                _ => table.float_column(name)?,
            };
            Ok(ColumnSummary::of(name, &values))
        })
        .collect()
}

fn counts<K: Ord>(keys: impl IntoIterator<Item = Option<K>>) -> Vec<Count<K>> {
    let mut tally: BTreeMap<K, usize> = BTreeMap::new();
    for key in keys.into_iter().flatten() {
        *tally.entry(key).or_default() += 1;
    }
    tally
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect()
}

pub fn overview(table: &AirQualityFrame) -> Result<Overview, AirQualityError> {
    let mut stations = counts(table.stations()?);
    // Stable sort keeps names ascending among equal counts.
    stations.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Overview {
        rows: table.height(),
        columns: describe(table)?,
        stations,
        years: counts(table.int_column(YEAR)?),
        months: counts(table.int_column(MONTH)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{raw_frame, Row};

    #[test]
    fn test_overview_counts_and_describe() -> Result<(), AirQualityError> {
        let table = raw_frame(&[
            Row::new("Wanliu", 2013, 3, 1, 0).pm10(10.0),
            Row::new("Dongsi", 2013, 3, 1, 0).pm10(20.0),
            Row::new("Dongsi", 2014, 4, 1, 0).pm10(30.0),
            Row::new("Dongsi", 2014, 3, 1, 0),
            Row::new("Wanliu", 2015, 3, 1, 0).pm10(40.0),
        ])?;
        let overview = overview(&table)?;

        assert_eq!(overview.rows, 5);
        assert_eq!(
            overview.stations,
            vec![
                Count { key: "Dongsi".to_string(), count: 3 },
                Count { key: "Wanliu".to_string(), count: 2 },
            ]
        );
        let years: Vec<(i32, usize)> = overview.years.iter().map(|c| (c.key, c.count)).collect();
        assert_eq!(years, vec![(2013, 2), (2014, 2), (2015, 1)]);
        assert_eq!(overview.months[0], Count { key: 3, count: 4 });

        let pm10 = &overview.columns[4];
        assert_eq!(pm10.column, "PM10");
        assert_eq!(pm10.count, 4);
        assert_eq!(pm10.mean, Some(25.0));
        assert_eq!(pm10.min, Some(10.0));
        assert_eq!(pm10.q25, Some(17.5));
        assert_eq!(pm10.median, Some(25.0));
        assert_eq!(pm10.max, Some(40.0));

        let year = &overview.columns[0];
        assert_eq!(year.count, 5);
        assert_eq!(year.min, Some(2013.0));
        Ok(())
    }
}
