use crate::dataset::error::DatasetError;
use crate::dataset::loader::DatasetLoader;
use crate::dataset::source::DataSource;
use crate::types::frame::AirQualityFrame;
use std::collections::{hash_map::Entry, HashMap};
use std::path::Path;
use tokio::sync::Mutex;

/// Session-level memo of loaded tables, keyed by source.
pub struct FrameFetcher {
    loader: DatasetLoader,
    frame_cache: Mutex<HashMap<DataSource, AirQualityFrame>>,
}

impl FrameFetcher {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            loader: DatasetLoader::new(cache_dir),
            frame_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    /// Returns the table for `source`, loading it on first use.
    pub async fn get_cached_frame(
        &self,
        source: &DataSource,
    ) -> Result<AirQualityFrame, DatasetError> {
        {
            let cache = self.frame_cache.lock().await;
            if let Some(cached) = cache.get(source) {
                return Ok(cached.clone());
            }
        }

        // Loading happens outside the lock.
        let loaded = self.loader.get_frame(source).await?;

        let mut cache = self.frame_cache.lock().await;
        match cache.entry(source.clone()) {
            // Another caller finished first, keep theirs.
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(loaded.clone());
                Ok(loaded)
            }
        }
    }

    /// Drops the memoized table for `source`. The next call reloads it.
    pub async fn forget(&self, source: &DataSource) -> bool {
        self.frame_cache.lock().await.remove(source).is_some()
    }

    /// Drops every memoized table.
    pub async fn clear(&self) {
        self.frame_cache.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{csv_text, Row};

    #[tokio::test]
    async fn test_memoizes_until_forgotten() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("records.csv");
        tokio::fs::write(&path, csv_text(&[Row::new("Dongsi", 2013, 3, 1, 0).pm10(9.0)]))
            .await?;

        let fetcher = FrameFetcher::new(dir.path());
        let source = DataSource::file(&path);
        assert_eq!(fetcher.get_cached_frame(&source).await?.height(), 1);

        // The memo wins over the changed file until the entry is dropped.
        tokio::fs::write(
            &path,
            csv_text(&[
                Row::new("Dongsi", 2013, 3, 1, 0).pm10(9.0),
                Row::new("Wanliu", 2013, 3, 1, 0).pm10(12.0),
            ]),
        )
        .await?;
        assert_eq!(fetcher.get_cached_frame(&source).await?.height(), 1);

        assert!(fetcher.forget(&source).await);
        assert!(!fetcher.forget(&source).await);
        assert_eq!(fetcher.get_cached_frame(&source).await?.height(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_drops_every_source() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        let rows = [Row::new("Dongsi", 2013, 3, 1, 0).pm10(9.0)];
        tokio::fs::write(&first, csv_text(&rows)).await?;
        tokio::fs::write(&second, csv_text(&rows)).await?;

        let fetcher = FrameFetcher::new(dir.path());
        let sources = [DataSource::file(&first), DataSource::file(&second)];
        for source in &sources {
            fetcher.get_cached_frame(source).await?;
        }

        fetcher.clear().await;
        for source in &sources {
            assert!(!fetcher.forget(source).await);
        }
        Ok(())
    }
}
