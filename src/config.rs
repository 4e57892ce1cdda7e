use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use aozora_formatter::DEFAULT_TEXT_BASE;
use aozora_formatter::dictionary::IPADIC_URL;

pub const CONFIG_FILE: &str = "aozora_getter.toml";

const INDEX_URL: &str =
    "https://www.aozora.gr.jp/index_pages/list_person_all_extended_utf8.zip";
const INDEX_FILE: &str = "list_person_all_extended_utf8.csv";
const TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `aozora_getter.toml`. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where the index lives. Defaults to the directory of the executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    pub index: IndexConfig,
    pub text: TextConfig,
    pub segmenter: SegmenterConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    pub url: String,
    pub file_name: String,
    /// Download the index again once it is older than this. Never when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: INDEX_URL.to_string(),
            file_name: INDEX_FILE.to_string(),
            max_age_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TextConfig {
    pub base_url: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TEXT_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Compiled vibrato dictionary. When unset, IPADIC is downloaded from
    /// `dictionary_url` into the cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,
    pub dictionary_url: String,
    /// Find ruby bases by script runs. Ignored when `dictionary` is set.
    pub script_only: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            dictionary: None,
            dictionary_url: IPADIC_URL.to_string(),
            script_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file gives the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
