//! Identifies where the measurement table comes from.
//!
//! A [`DataSource`] is also the memoization key for everything derived from it within a
//! session, and names the on-disk cache file for remote sources.

use std::fmt;
use std::path::{Path, PathBuf};

/// Public download location of the combined Dongsi/Wanliu dataset (2013-2017).
pub const DEFAULT_DATASET_URL: &str =
    "https://drive.google.com/uc?id=11MUFnACVg1Lxh05u7RRb7bEaK-RJTJYh";

pub const DEFAULT_DATASET_NAME: &str = "air_quality_dongsi_wanliu";

/// Where to read the CSV table from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// A CSV downloaded over HTTP(S) and cached locally as parquet under `name`.
    /// URLs ending in `.gz` are decompressed while downloading.
    Remote { name: String, url: String },
    /// A CSV already on local disk. Read directly, never copied into the cache.
    File(PathBuf),
}

impl DataSource {
    pub fn remote(name: impl Into<String>, url: impl Into<String>) -> Self {
        DataSource::Remote {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        DataSource::File(path.as_ref().to_path_buf())
    }

    /// Short human-readable name used in logs and errors.
    pub fn name(&self) -> String {
        match self {
            DataSource::Remote { name, .. } => name.clone(),
            DataSource::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// Parquet cache file name for remote sources, `None` for local files.
    pub(crate) fn cache_file_name(&self) -> Option<String> {
        match self {
            DataSource::Remote { name, .. } => Some(cache_file_name(name)),
            DataSource::File(_) => None,
        }
    }

    pub(crate) fn is_gzip(&self) -> bool {
        match self {
            DataSource::Remote { url, .. } => url.ends_with(".gz"),
            DataSource::File(path) => path.extension().is_some_and(|ext| ext == "gz"),
        }
    }
}

/// `<name>.parquet`, with anything but ASCII alphanumerics, `-` and `_` replaced.
pub(crate) fn cache_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.parquet", sanitized)
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::remote(DEFAULT_DATASET_NAME, DEFAULT_DATASET_URL)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote { url, .. } => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
