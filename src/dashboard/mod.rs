//! Page-level assembly of the views, with degraded-mode handling.
//!
//! A [`Dashboard`] is opened from a session and never fails to open. If the table cannot
//! be loaded every page renders a message instead of data, and a page whose own
//! computation fails renders a message without affecting the other pages.

pub mod page;
pub mod summary;

use crate::air_quality::AirQuality;
use crate::error::AirQualityError;
use crate::preprocess::Preprocessed;
use crate::types::feature::Feature;
use crate::types::station::Station;
use crate::views::correlation::{correlate, scatter_trend, CorrelationMatrix, ScatterTrend};
use crate::views::decomposition::{daily_aggregate, decompose_daily, DailySeries, Decomposition};
use crate::views::distribution::{
    box_by_year_station, histogram, station_histograms, GroupBox, Histogram, StationHistograms,
};
use crate::views::hourly::{hourly_pattern, SeriesPair};
use crate::views::overview::{overview, Overview};
use crate::views::trends::{monthly_average, yearly_average, yearly_summary, GroupMean, YearlyStats};
use bon::bon;
use log::{info, warn};
use page::{Page, Selection};
use serde::Serialize;
use std::sync::Arc;
use summary::Finding;

/// The data behind one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Overview(Overview),
    DailyPatterns {
        years: Vec<i32>,
        selected_year: Option<i32>,
        overall: SeriesPair,
        for_year: Option<SeriesPair>,
    },
    Correlations {
        factor: Feature,
        overall: CorrelationMatrix,
        dongsi: CorrelationMatrix,
        wanliu: CorrelationMatrix,
        scatter: ScatterTrend,
    },
    AnnualTrends {
        years: Vec<i32>,
        selected_year: Option<i32>,
        yearly: Vec<GroupMean>,
        monthly: Vec<GroupMean>,
        summary: Vec<YearlyStats>,
    },
    Distribution {
        pm10: Histogram,
        pm10_by_station: StationHistograms,
        boxes: Vec<GroupBox>,
        factor: Feature,
        factor_by_station: StationHistograms,
    },
    FurtherAnalysis {
        station: Station,
        daily: DailySeries,
        decomposition: Option<Decomposition>,
        /// Why `decomposition` is absent.
        notice: Option<String>,
    },
    Summary {
        findings: Vec<Finding>,
    },
}

/// What a page shows: its data, or a message in place of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Rendered {
    View(PageView),
    Message { page: Page, text: String },
}

impl Rendered {
    pub fn view(&self) -> Option<&PageView> {
        match self {
            Rendered::View(view) => Some(view),
            Rendered::Message { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Rendered::View(_) => None,
            Rendered::Message { text, .. } => Some(text),
        }
    }
}

#[derive(Debug, Clone)]
enum State {
    Ready(Arc<Preprocessed>),
    Unavailable(String),
}

pub struct Dashboard {
    state: State,
}

#[bon]
impl Dashboard {
    /// Loads and preprocesses the session's table. Failures are kept and shown on every
    /// page instead of being returned.
    pub async fn open(session: &AirQuality) -> Self {
        match session.preprocessed().await {
            Ok(preprocessed) => {
                info!("Dashboard ready for {}", session.source().name());
                Self::from_preprocessed(preprocessed)
            }
            Err(e) => {
                warn!("Dashboard running without data: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn from_preprocessed(preprocessed: Arc<Preprocessed>) -> Self {
        Self {
            state: State::Ready(preprocessed),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            state: State::Unavailable(message.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Renders one page.
    ///
    /// # Arguments
    ///
    /// * `page`: **Required.** The destination to render.
    /// * `.year(i32)`: Optional. Year filter of the daily patterns and monthly trend views.
    ///   Defaults to the first year in the data.
    /// * `.factor(Feature)`: Optional. Meteorological factor of the scatter and factor
    ///   histograms. Defaults to temperature.
    /// * `.station(Station)`: Optional. Station of the decomposition. Defaults to Dongsi.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use airquality::{Dashboard, Feature, Page};
    /// # fn show(dashboard: &Dashboard) {
    /// let rendered = dashboard
    ///     .render(Page::Correlations)
    ///     .factor(Feature::Dewp)
    ///     .call();
    /// if let Some(text) = rendered.message() {
    ///     println!("{}", text);
    /// }
    /// # }
    /// ```
    #[builder(start_fn = render)]
    pub fn render_page(
        &self,
        #[builder(start_fn)] page: Page,
        year: Option<i32>,
        factor: Option<Feature>,
        station: Option<Station>,
    ) -> Rendered {
        self.render_selection(
            page,
            &Selection {
                year,
                factor,
                station,
            },
        )
    }

    pub fn render_selection(&self, page: Page, selection: &Selection) -> Rendered {
        let preprocessed = match &self.state {
            State::Ready(preprocessed) => preprocessed,
            State::Unavailable(reason) => {
                return Rendered::Message {
                    page,
                    text: format!("Data could not be loaded: {}", reason),
                }
            }
        };

        match build_view(preprocessed, page, selection) {
            Ok(view) => Rendered::View(view),
            Err(e) => {
                warn!("Page '{}' could not be rendered: {}", page, e);
                Rendered::Message {
                    page,
                    text: e.to_string(),
                }
            }
        }
    }
}

fn build_view(
    preprocessed: &Preprocessed,
    page: Page,
    selection: &Selection,
) -> Result<PageView, AirQualityError> {
    let full = &preprocessed.full;
    match page {
        Page::Overview => Ok(PageView::Overview(overview(full)?)),
        Page::DailyPatterns => {
            let years = full.years()?;
            let selected_year = selection.year_or_first(&years);
            let for_year = selected_year
                .map(|year| hourly_pattern(preprocessed, Some(year)))
                .transpose()?;
            Ok(PageView::DailyPatterns {
                overall: hourly_pattern(preprocessed, None)?,
                years,
                selected_year,
                for_year,
            })
        }
        Page::Correlations => {
            let factor = selection.factor();
            Ok(PageView::Correlations {
                factor,
                overall: correlate(full, &Feature::CORRELATION_SET)?,
                dongsi: correlate(&preprocessed.dongsi.data, &Feature::CORRELATION_SET)?,
                wanliu: correlate(&preprocessed.wanliu.data, &Feature::CORRELATION_SET)?,
                scatter: scatter_trend(full, factor)?,
            })
        }
        Page::AnnualTrends => {
            let years = full.years()?;
            let selected_year = selection.year_or_first(&years);
            let monthly = match selected_year {
                Some(year) => monthly_average(full, year)?,
                None => Vec::new(),
            };
            Ok(PageView::AnnualTrends {
                yearly: yearly_average(full)?,
                summary: yearly_summary(full)?,
                years,
                selected_year,
                monthly,
            })
        }
        Page::Distribution => {
            let factor = selection.factor();
            Ok(PageView::Distribution {
                pm10: histogram(full, Feature::Pm10)?,
                pm10_by_station: station_histograms(preprocessed, Feature::Pm10)?,
                boxes: box_by_year_station(full)?,
                factor,
                factor_by_station: station_histograms(preprocessed, factor)?,
            })
        }
        Page::FurtherAnalysis => {
            let station = selection.station();
            let daily = daily_aggregate(preprocessed.station(station))?;
            let (decomposition, notice) = match decompose_daily(daily.clone()) {
                Ok(decomposition) => (Some(decomposition), None),
                Err(e @ AirQualityError::InsufficientData { .. }) => {
                    info!("No decomposition for {}: {}", station, e);
                    (None, Some(e.to_string()))
                }
                Err(e) => return Err(e),
            };
            Ok(PageView::FurtherAnalysis {
                station,
                daily,
                decomposition,
                notice,
            })
        }
        Page::Summary => Ok(PageView::Summary {
            findings: summary::findings(preprocessed)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{daily_rows, preprocessed, Row};
    use chrono::NaiveDate;

    fn dashboard(rows: &[Row]) -> Result<Dashboard, AirQualityError> {
        Ok(Dashboard::from_preprocessed(Arc::new(preprocessed(rows)?)))
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            Row::new("Dongsi", 2014, 1, 1, 0).pm10(80.0).temp(-2.0).dewp(-15.0).pres(1030.0),
            Row::new("Dongsi", 2014, 1, 1, 1).pm10(95.0).temp(-3.0).dewp(-14.0).pres(1029.0),
            Row::new("Wanliu", 2014, 1, 1, 0).pm10(70.0).temp(-1.0).dewp(-16.0).pres(1031.0),
            Row::new("Wanliu", 2015, 6, 1, 12).pm10(40.0).temp(25.0).dewp(10.0).pres(1005.0),
        ]
    }

    #[test]
    fn test_every_page_renders_with_data() -> Result<(), AirQualityError> {
        let dashboard = dashboard(&sample_rows())?;
        assert!(dashboard.is_available());
        for page in Page::ALL {
            let rendered = dashboard.render(page).call();
            match page {
                // Two days of data cannot be decomposed, but the page still shows the series.
                Page::FurtherAnalysis => match rendered.view() {
                    Some(PageView::FurtherAnalysis {
                        decomposition,
                        notice,
                        daily,
                        ..
                    }) => {
                        assert!(decomposition.is_none());
                        assert!(notice.as_deref().is_some_and(|n| n.contains("Insufficient")));
                        assert_eq!(daily.len(), 1);
                    }
                    other => panic!("unexpected further analysis page: {:?}", other),
                },
                _ => assert!(rendered.view().is_some(), "page {} failed", page),
            }
        }
        Ok(())
    }

    #[test]
    fn test_selection_parameterizes_pages() -> Result<(), AirQualityError> {
        let dashboard = dashboard(&sample_rows())?;

        let rendered = dashboard.render(Page::DailyPatterns).call();
        match rendered.view() {
            Some(PageView::DailyPatterns {
                years,
                selected_year,
                for_year,
                ..
            }) => {
                assert_eq!(years, &vec![2014, 2015]);
                assert_eq!(*selected_year, Some(2014));
                let pair = for_year.as_ref().map(|p| p.wanliu.values[0]);
                assert_eq!(pair, Some(Some(70.0)));
            }
            other => panic!("unexpected page: {:?}", other),
        }

        let rendered = dashboard
            .render(Page::Correlations)
            .factor(Feature::Pres)
            .call();
        match rendered.view() {
            Some(PageView::Correlations {
                factor, scatter, ..
            }) => {
                assert_eq!(*factor, Feature::Pres);
                assert_eq!(scatter.points.len(), 4);
            }
            other => panic!("unexpected page: {:?}", other),
        }

        let rendered = dashboard
            .render(Page::AnnualTrends)
            .year(2015)
            .call();
        match rendered.view() {
            Some(PageView::AnnualTrends { monthly, .. }) => {
                assert_eq!(monthly.len(), 1);
                assert_eq!(monthly[0].station, "Wanliu");
                assert_eq!(monthly[0].month, Some(6));
            }
            other => panic!("unexpected page: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_further_analysis_decomposes_long_series() -> Result<(), AirQualityError> {
        let start = NaiveDate::from_ymd_opt(2013, 3, 1).expect("valid test date");
        let mut rows = daily_rows("Wanliu", start, 400, |i| 100.0 + (i % 7) as f64);
        rows.push(Row::new("Dongsi", 2013, 3, 1, 0).pm10(50.0));
        let dashboard = dashboard(&rows)?;

        let rendered = dashboard
            .render(Page::FurtherAnalysis)
            .station(Station::Wanliu)
            .call();
        match rendered.view() {
            Some(PageView::FurtherAnalysis {
                station,
                decomposition: Some(decomposition),
                notice: None,
                ..
            }) => {
                assert_eq!(*station, Station::Wanliu);
                assert_eq!(decomposition.observed.len(), 400);
            }
            other => panic!("unexpected page: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_unavailable_dashboard_renders_messages() {
        let dashboard = Dashboard::unavailable("network is down");
        assert!(!dashboard.is_available());
        for page in Page::ALL {
            let rendered = dashboard.render(page).call();
            assert!(rendered
                .message()
                .is_some_and(|text| text.contains("network is down")));
        }
    }

    #[tokio::test]
    async fn test_open_never_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let session = AirQuality::open()
            .cache_folder(dir.path().to_path_buf())
            .source(crate::dataset::source::DataSource::remote(
                "unreachable",
                "http://127.0.0.1:9/air_quality.csv",
            ))
            .call()
            .await?;
        let dashboard = Dashboard::open(&session).await;
        assert!(!dashboard.is_available());

        let rendered = dashboard.render(Page::Summary).call();
        let json = serde_json::to_value(&rendered)?;
        assert_eq!(json["kind"], "message");
        assert_eq!(json["body"]["page"], "summary");
        Ok(())
    }

    #[test]
    fn test_views_serialize_with_page_tag() -> Result<(), Box<dyn std::error::Error>> {
        let dashboard = dashboard(&sample_rows())?;
        let json = serde_json::to_value(dashboard.render(Page::Summary).call())?;
        assert_eq!(json["kind"], "view");
        assert_eq!(json["body"]["page"], "summary");
        assert!(json["body"]["findings"].is_array());
        Ok(())
    }
}
