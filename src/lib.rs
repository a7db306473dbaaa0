//! Load, preprocess and analyse hourly PM10 and weather records from the Dongsi and
//! Wanliu monitoring stations in Beijing.
//!
//! An [`AirQuality`] session fetches the table once (caching it on disk as parquet),
//! derives the calendar fields and station subsets once, and hands them to the views.
//! A [`Dashboard`] renders the seven pages from those views and degrades to messages when
//! data is missing.

mod air_quality;
mod dashboard;
mod dataset;
mod error;
mod preprocess;
mod stats;
mod types;
mod utils;
mod views;

#[cfg(test)]
mod test_support;

pub use air_quality::AirQuality;
pub use error::AirQualityError;

pub use dashboard::page::{Page, Selection};
pub use dashboard::summary::{correlation_strength, findings, Finding, Topic};
pub use dashboard::{Dashboard, PageView, Rendered};

pub use dataset::error::DatasetError;
pub use dataset::frame_fetcher::FrameFetcher;
pub use dataset::loader::DatasetLoader;
pub use dataset::source::{DataSource, DEFAULT_DATASET_NAME, DEFAULT_DATASET_URL};

pub use preprocess::{augment, preprocess, Preprocessed};
pub use stats::{BoxStats, LinearFit};

pub use types::columns;
pub use types::feature::Feature;
pub use types::frame::{AirQualityFrame, StationFrame};
pub use types::record::Record;
pub use types::station::Station;

pub use views::correlation::*;
pub use views::decomposition::*;
pub use views::distribution::*;
pub use views::hourly::*;
pub use views::overview::*;
pub use views::trends::*;
