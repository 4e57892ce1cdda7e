use std::{fs::File, io, path::Path, time::Duration};

use aozora_formatter::decode_shift_jis;
use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::HttpConfig;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not save {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },
}

pub fn client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

fn get(client: &Client, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
    log::info!("GET {}", url);
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
}

/// Streams the body of `url` into a new file at `path`.
pub fn download(client: &Client, url: &str, path: &Path) -> Result<u64, FetchError> {
    let mut response = get(client, url)?;
    let io_error = |source| FetchError::Io {
        url: url.to_string(),
        source,
    };
    let mut file = File::create(path).map_err(io_error)?;
    let written = io::copy(&mut response, &mut file).map_err(io_error)?;
    log::debug!("{} bytes written to {}", written, path.display());
    Ok(written)
}

/// Fetches a Shift_JIS text and decodes it with LF line ends.
pub fn fetch_book(client: &Client, url: &str) -> Result<String, FetchError> {
    let bytes = get(client, url)?.bytes().map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;
    log::debug!("{} bytes from {}", bytes.len(), url);
    Ok(decode_shift_jis(&bytes))
}
