//! The session context: which table to analyse, where to cache it, and the memoized
//! loaded and preprocessed tables.
//!
//! Everything a view needs is reached through an [`AirQuality`] value instead of global
//! state, and each expensive step runs at most once per [`DataSource`].

use crate::dataset::frame_fetcher::FrameFetcher;
use crate::dataset::source::DataSource;
use crate::error::AirQualityError;
use crate::preprocess::{preprocess, Preprocessed};
use crate::types::frame::AirQualityFrame;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::info;
use std::collections::{hash_map::Entry, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session-scoped access to the air quality table.
///
/// Create one with [`AirQuality::new()`] for the public dataset and the default cache
/// directory, or configure both through [`AirQuality::open()`].
///
/// # Examples
///
/// ```rust
/// # use airquality::{AirQuality, AirQualityError, DataSource};
/// # async fn run() -> Result<(), AirQualityError> {
/// let session = AirQuality::open()
///     .source(DataSource::file("data/air_quality.csv"))
///     .call()
///     .await?;
/// let preprocessed = session.preprocessed().await?;
/// println!("{} Dongsi rows", preprocessed.dongsi.height());
/// # Ok(())
/// # }
/// ```
pub struct AirQuality {
    source: DataSource,
    cache_folder: PathBuf,
    fetcher: FrameFetcher,
    preprocessed: Mutex<HashMap<DataSource, Arc<Preprocessed>>>,
}

#[bon]
impl AirQuality {
    /// Opens a session.
    ///
    /// # Arguments
    ///
    /// * `.cache_folder(PathBuf)`: Optional. Where downloaded tables are cached as parquet.
    ///   Defaults to `airquality_rs_cache` under the system cache directory. Created if missing.
    /// * `.source(DataSource)`: Optional. Defaults to the public Dongsi/Wanliu dataset.
    ///
    /// # Errors
    ///
    /// [`AirQualityError::CacheDirResolution`] if no system cache directory exists and none
    /// was given, [`AirQualityError::CacheDirCreation`] if the folder cannot be created.
    /// Nothing is downloaded here.
    #[builder]
    pub async fn open(
        cache_folder: Option<PathBuf>,
        source: Option<DataSource>,
    ) -> Result<Self, AirQualityError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(AirQualityError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| AirQualityError::CacheDirCreation(cache_folder.clone(), e))?;

        Ok(Self {
            source: source.unwrap_or_default(),
            fetcher: FrameFetcher::new(&cache_folder),
            cache_folder,
            preprocessed: Mutex::new(HashMap::new()),
        })
    }

    /// Opens a session on the public dataset with the default cache directory.
    pub async fn new() -> Result<Self, AirQualityError> {
        Self::open().call().await
    }

    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, AirQualityError> {
        Self::open().cache_folder(cache_folder).call().await
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    /// Loads the validated table, fetching it at most once per session.
    ///
    /// # Errors
    ///
    /// [`AirQualityError::DataUnavailable`] if the table cannot be fetched, parsed or
    /// validated, [`AirQualityError::MalformedTimestamp`] if a calendar component is not a
    /// whole number. The session stays usable; a later call retries.
    pub async fn load(&self) -> Result<AirQualityFrame, AirQualityError> {
        Ok(self.fetcher.get_cached_frame(&self.source).await?)
    }

    /// The augmented table and station subsets, computed once per session.
    pub async fn preprocessed(&self) -> Result<Arc<Preprocessed>, AirQualityError> {
        {
            let cache = self.preprocessed.lock().await;
            if let Some(cached) = cache.get(&self.source) {
                return Ok(Arc::clone(cached));
            }
        }

        let table = self.load().await?;
        let computed = Arc::new(preprocess(&table)?);

        let mut cache = self.preprocessed.lock().await;
        match cache.entry(self.source.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&computed));
                Ok(computed)
            }
        }
    }

    /// Forgets the memoized tables and deletes the on-disk cache of the source, so the
    /// next load fetches it again. Returns whether a cache file was removed.
    pub async fn clear_cache(&self) -> Result<bool, AirQualityError> {
        self.preprocessed.lock().await.remove(&self.source);
        self.fetcher.forget(&self.source).await;
        let removed = self.fetcher.loader().clear_cache(&self.source).await?;
        info!(
            "Cleared session cache for {} (on-disk cache removed: {})",
            self.source.name(),
            removed
        );
        Ok(removed)
    }
}
