use std::path::PathBuf;

use aozora_formatter::ConversionError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::index::IndexError;

/// Status line printed first on stdout.
pub mod status {
    pub const FOUND: u16 = 0;
    pub const PREPARATION_FAILED: u16 = 101;
    pub const INDEX_DOWNLOADED: u16 = 200;
    pub const INDEX_DOWNLOAD_FAILED: u16 = 201;
    pub const INDEX_UNREADABLE: u16 = 301;
    pub const AMBIGUOUS: u16 = 400;
    pub const NOT_FOUND: u16 = 401;
    pub const BOOK_FETCH_FAILED: u16 = 501;

    /// Statuses after which the process exits successfully.
    pub fn is_success(code: u16) -> bool {
        matches!(code, FOUND | INDEX_DOWNLOADED | AMBIGUOUS | NOT_FOUND)
    }
}

#[derive(Error, Debug)]
pub enum GetterError {
    #[error("no search terms given")]
    NoTerms,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("index download failed: {0}")]
    IndexDownload(#[source] IndexError),
    #[error("index could not be read: {0}")]
    IndexRead(#[source] IndexError),
    #[error("book fetch failed: {0}")]
    BookFetch(#[from] FetchError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl GetterError {
    pub fn status(&self) -> u16 {
        match self {
            GetterError::NoTerms
            | GetterError::Config(_)
            | GetterError::CacheDir { .. }
            | GetterError::Client(_)
            | GetterError::Conversion(_) => status::PREPARATION_FAILED,
            GetterError::IndexDownload(_) => status::INDEX_DOWNLOAD_FAILED,
            GetterError::IndexRead(_) => status::INDEX_UNREADABLE,
            GetterError::BookFetch(_) => status::BOOK_FETCH_FAILED,
        }
    }
}
