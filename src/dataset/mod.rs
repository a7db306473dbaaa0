//! Fetching the raw measurement table: download, on-disk parquet cache and in-session memo.

pub mod error;
pub mod frame_fetcher;
pub mod loader;
pub mod source;
