//! Provisioning of the IPADIC dictionary used by default.
//!
//! vibrato publishes compiled dictionaries as `.tar.xz` archives holding a
//! zstd-compressed `system.dic.zst`. [`ensure`] downloads the archive once
//! and keeps that entry beside the executable (or in the cache directory),
//! where [`VibratoSegmenter::from_path`](crate::VibratoSegmenter::from_path)
//! reads it directly.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use uuid::Uuid;
use xz2::read::XzDecoder;

use crate::ConversionError;

/// IPADIC 2.7.0 as compiled for vibrato 0.5.
pub const IPADIC_URL: &str =
    "https://github.com/daac-tools/vibrato/releases/download/v0.5.0/ipadic-mecab-2_7_0.tar.xz";

/// File name the provisioned dictionary is kept under.
pub const IPADIC_FILE: &str = "ipadic-mecab-2_7_0.dic.zst";

const SYSTEM_DIC: &str = "system.dic.zst";

/// Returns the dictionary in `dir`, downloading it from `url` first when
/// it is not there yet.
pub fn ensure(dir: &Path, url: &str, client: &Client) -> Result<PathBuf, ConversionError> {
    let path = dir.join(IPADIC_FILE);
    if path.exists() {
        log::debug!("dictionary at {}", path.display());
        return Ok(path);
    }

    log::info!("downloading dictionary from {}", url);
    let response = client.get(url).send()?.error_for_status()?;
    unpack(response, &path)?;
    log::info!("dictionary saved to {}", path.display());
    Ok(path)
}

/// Copies the `system.dic.zst` entry of a `.tar.xz` archive to `dest`.
///
/// `dest` only appears once the entry has been copied completely.
pub fn unpack<R: Read>(archive: R, dest: &Path) -> Result<(), ConversionError> {
    let mut tar = tar::Archive::new(XzDecoder::new(archive));
    for entry in tar.entries()? {
        let mut entry = entry?;
        let is_dictionary = entry
            .path()?
            .file_name()
            .is_some_and(|name| name == SYSTEM_DIC);
        if !is_dictionary {
            continue;
        }

        let dir = dest.parent().unwrap_or(Path::new("."));
        let partial = dir.join(format!("{}.part", Uuid::new_v4()));
        let result = copy_to(&mut entry, &partial).and_then(|_| fs::rename(&partial, dest));
        if let Err(e) = result {
            if partial.exists() {
                if let Err(remove) = fs::remove_file(&partial) {
                    log::debug!("could not remove {}: {}", partial.display(), remove);
                }
            }
            return Err(e.into());
        }
        return Ok(());
    }
    Err(ConversionError::MissingDictionary)
}

fn copy_to<R: Read>(reader: &mut R, path: &Path) -> io::Result<u64> {
    let mut out = File::create(path)?;
    io::copy(reader, &mut out)
}
