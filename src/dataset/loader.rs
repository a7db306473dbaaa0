use crate::dataset::error::DatasetError;
use crate::dataset::source::DataSource;
use crate::types::frame::AirQualityFrame;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::frame::DataFrame;
use polars::prelude::*;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

/// Token the published CSV uses for a missing measurement.
const NULL_TOKEN: &str = "NA";

pub struct DatasetLoader {
    cache_dir: PathBuf,
    download_client: Client,
}

impl DatasetLoader {
    pub fn new(cache_dir: &Path) -> DatasetLoader {
        let download_client = Client::new();
        DatasetLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Loads and validates the measurement table for `source`.
    ///
    /// Remote sources are downloaded once and cached as parquet; later calls read the cache
    /// without touching the network. Local files are parsed on every call.
    pub async fn get_frame(&self, source: &DataSource) -> Result<AirQualityFrame, DatasetError> {
        let source_name = source.name();
        match source {
            DataSource::File(path) => {
                info!("Reading {} from {}", source_name, path.display());
                let df = if source.is_gzip() {
                    let compressed = fs::read(path).await.map_err(|e| DatasetError::CsvReadIo {
                        source_name: source_name.clone(),
                        source: e,
                    })?;
                    let mut decoder = GzipDecoder::new(compressed.as_slice());
                    let mut bytes = Vec::new();
                    decoder.read_to_end(&mut bytes).await?;
                    Self::csv_to_dataframe(bytes, &source_name).await?
                } else {
                    Self::read_csv_file(path.clone(), &source_name).await?
                };
                AirQualityFrame::from_dataframe(df, &source_name)
            }
            DataSource::Remote { url, name } => {
                let parquet_path = self.cache_dir.join(super::source::cache_file_name(name));

                if fs::metadata(&parquet_path).await.is_ok() {
                    info!("Cache hit for {} at {:?}", source_name, parquet_path);
                } else {
                    warn!(
                        "Cache miss for {}. Downloading and processing.",
                        source_name
                    );
                    let raw_bytes = self.download(url, source.is_gzip()).await?;
                    let df = Self::csv_to_dataframe(raw_bytes, &source_name).await?;
                    // Validate before writing so a broken download never lands in the cache.
                    let table = AirQualityFrame::from_dataframe(df, &source_name)?;

                    fs::create_dir_all(&self.cache_dir)
                        .await
                        .map_err(|e| DatasetError::CacheDirCreation(self.cache_dir.clone(), e))?;

                    Self::cache_dataframe(table.frame, &parquet_path).await?;
                    info!("Cached {} to {:?}", source_name, parquet_path);
                }

                let df = LazyFrame::scan_parquet(&parquet_path, Default::default())
                    .and_then(|lf| lf.collect())
                    .map_err(|e| DatasetError::ParquetScan(parquet_path.clone(), e))?;
                AirQualityFrame::from_dataframe(df, &source_name)
            }
        }
    }

    /// Deletes the parquet cache of a remote source. Returns whether a file was removed.
    pub async fn clear_cache(&self, source: &DataSource) -> Result<bool, DatasetError> {
        let Some(file_name) = source.cache_file_name() else {
            return Ok(false);
        };
        let parquet_path = self.cache_dir.join(file_name);
        if fs::metadata(&parquet_path).await.is_err() {
            return Ok(false);
        }
        fs::remove_file(&parquet_path)
            .await
            .map_err(|e| DatasetError::CacheDeletion(parquet_path.clone(), e))?;
        info!("Removed cached table {:?}", parquet_path);
        Ok(true)
    }

    /// Downloads the raw CSV, decompressing on the fly when `gzip` is set.
    async fn download(&self, url: &str, gzip: bool) -> Result<Vec<u8>, DatasetError> {
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| DatasetError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    DatasetError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    DatasetError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut stream_reader = StreamReader::new(stream);
        let mut bytes = Vec::new();
        if gzip {
            let mut decoder = GzipDecoder::new(stream_reader);
            decoder.read_to_end(&mut bytes).await?;
        } else {
            stream_reader.read_to_end(&mut bytes).await?;
        }
        info!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }

    fn csv_options() -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .map_parse_options(|opts| {
                opts.with_null_values(Some(NullValues::AllColumnsSingle(NULL_TOKEN.into())))
            })
    }

    /// Parses CSV bytes (with header) into a DataFrame on a blocking task.
    async fn csv_to_dataframe(bytes: Vec<u8>, source_name: &str) -> Result<DataFrame, DatasetError> {
        let source_owned = source_name.to_string();

        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new().map_err(|e| DatasetError::CsvReadIo {
                source_name: source_owned.clone(),
                source: e,
            })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| DatasetError::CsvReadIo {
                    source_name: source_owned.clone(),
                    source: e,
                })?;
            temp_file.flush().map_err(|e| DatasetError::CsvReadIo {
                source_name: source_owned.clone(),
                source: e,
            })?;

            Self::parse_csv(temp_file.path().to_path_buf(), &source_owned)
        })
        .await?
    }

    async fn read_csv_file(path: PathBuf, source_name: &str) -> Result<DataFrame, DatasetError> {
        if let Err(e) = fs::metadata(&path).await {
            return Err(DatasetError::CsvReadIo {
                source_name: source_name.to_string(),
                source: e,
            });
        }
        let source_owned = source_name.to_string();
        task::spawn_blocking(move || Self::parse_csv(path, &source_owned)).await?
    }

    fn parse_csv(path: PathBuf, source_name: &str) -> Result<DataFrame, DatasetError> {
        Self::csv_options()
            .try_into_reader_with_file_path(Some(path))
            .map_err(|e| DatasetError::CsvReadPolars {
                source_name: source_name.to_string(),
                source: e,
            })?
            .finish()
            .map_err(|e| DatasetError::CsvReadPolars {
                source_name: source_name.to_string(),
                source: e,
            })
    }

    async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), DatasetError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| DatasetError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| DatasetError::ParquetWritePolars(path_buf, e))?;
            Ok::<(), DatasetError>(())
        })
        .await??;
        Ok(())
    }
}
