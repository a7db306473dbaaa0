use crate::types::feature::Feature;
use crate::types::station::Station;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven navigation destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    DailyPatterns,
    Correlations,
    AnnualTrends,
    Distribution,
    FurtherAnalysis,
    Summary,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 7] = [
        Page::Overview,
        Page::DailyPatterns,
        Page::Correlations,
        Page::AnnualTrends,
        Page::Distribution,
        Page::FurtherAnalysis,
        Page::Summary,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::DailyPatterns => "Daily PM10 Patterns",
            Page::Correlations => "Meteorological Correlations",
            Page::AnnualTrends => "Annual Trends",
            Page::Distribution => "Distribution Analysis",
            Page::FurtherAnalysis => "Further Analysis",
            Page::Summary => "Summary",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for Page {
    type Err = String;

    /// Parses a navigation title.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.title() == s)
            .ok_or_else(|| format!("unknown page '{}'", s))
    }
}

/// The selection controls a page can be parameterized with. Unset controls fall back to
/// the page's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub year: Option<i32>,
    pub factor: Option<Feature>,
    pub station: Option<Station>,
}

impl Selection {
    pub const DEFAULT_FACTOR: Feature = Feature::Temp;
    pub const DEFAULT_STATION: Station = Station::Dongsi;

    /// The selected year, or the first of `years`.
    pub fn year_or_first(&self, years: &[i32]) -> Option<i32> {
        self.year.or_else(|| years.first().copied())
    }

    /// The selected factor if it is meteorological, otherwise the default factor.
    pub fn factor(&self) -> Feature {
        self.factor
            .filter(Feature::is_meteorological)
            .unwrap_or(Self::DEFAULT_FACTOR)
    }

    pub fn station(&self) -> Station {
        self.station.unwrap_or(Self::DEFAULT_STATION)
    }
}
