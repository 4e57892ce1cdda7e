//! Local copy of the Aozora Bunko index (list_person_all_extended).

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use aozora_formatter::Candidate;
use chrono::{DateTime, Local, TimeDelta};
use reqwest::blocking::Client;
use thiserror::Error;
use uuid::Uuid;
use zip::ZipArchive;

use crate::config::IndexConfig;
use crate::fetch::{self, FetchError};

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("broken archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("no .csv entry in the index archive")]
    MissingCsv,
    #[error("broken index: {0}")]
    Csv(#[from] csv::Error),
}

pub struct IndexCache {
    path: PathBuf,
    config: IndexConfig,
}

impl IndexCache {
    pub fn new(dir: &Path, config: IndexConfig) -> Self {
        Self {
            path: dir.join(&config.file_name),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the index has to be downloaded: it is missing, or older than
    /// `max_age_days` at `now`.
    pub fn is_stale(&self, now: DateTime<Local>) -> bool {
        if !self.path.is_file() {
            return true;
        }
        let Some(days) = self.config.max_age_days else {
            return false;
        };
        let modified = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(time) => DateTime::<Local>::from(time),
            Err(e) => {
                log::warn!("no modification time for {}: {}", self.path.display(), e);
                return true;
            }
        };
        match TimeDelta::try_days(i64::from(days)) {
            Some(max_age) => now.signed_duration_since(modified) > max_age,
            None => false,
        }
    }

    /// Downloads the index archive next to the cache and unpacks its CSV.
    pub fn download(&self, client: &Client) -> Result<(), IndexError> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let archive = dir.join(format!("{}.zip", Uuid::new_v4()));

        let result = fetch::download(client, &self.config.url, &archive)
            .map_err(IndexError::from)
            .and_then(|_| extract_csv(&archive, &self.path));
        if let Err(e) = fs::remove_file(&archive) {
            log::debug!("could not remove {}: {}", archive.display(), e);
        }
        result?;

        log::info!("index saved to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<Candidate>, IndexError> {
        load_csv(&self.path)
    }
}

/// Copies the first `.csv` entry of the zip at `archive` to `dest`.
///
/// The entry is written to a temporary file beside `dest` and renamed into
/// place once complete, so a failed extraction never leaves a partial index.
pub fn extract_csv(archive: &Path, dest: &Path) -> Result<(), IndexError> {
    let dir = dest.parent().unwrap_or(Path::new("."));
    let partial = dir.join(format!("{}.part", Uuid::new_v4()));

    let result = copy_csv_entry(archive, &partial).and_then(|_| Ok(fs::rename(&partial, dest)?));
    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::debug!("could not remove {}: {}", partial.display(), e);
        }
    }
    result
}

fn copy_csv_entry(archive: &Path, out_path: &Path) -> Result<(), IndexError> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if !entry.is_file() || !entry.name().ends_with(".csv") {
            continue;
        }
        log::debug!("extracting {}", entry.name());
        let mut out = File::create(out_path)?;
        io::copy(&mut entry, &mut out)?;
        return Ok(());
    }
    Err(IndexError::MissingCsv)
}

/// Reads the index. The header row is skipped, and so are rows without the
/// fields a candidate needs.
pub fn load_csv(path: &Path) -> Result<Vec<Candidate>, IndexError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut candidates = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let fields: Vec<&str> = record.iter().collect();
        match Candidate::from_fields(&fields[..]) {
            Some(candidate) => candidates.push(candidate),
            None => log::warn!("index row {} has only {} fields, skipped", i + 2, fields.len()),
        }
    }
    log::debug!("{} works in the index", candidates.len());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const HEADER: &str = "作品ID,作品名";

    fn row(title: &str, last: &str, first: &str, url: &str) -> String {
        let mut fields = vec![String::new(); 55];
        fields[1] = title.to_string();
        fields[15] = last.to_string();
        fields[16] = first.to_string();
        fields[27] = "新潮文庫".to_string();
        fields[45] = url.to_string();
        fields.join(",")
    }

    fn index_csv() -> String {
        [
            HEADER.to_string(),
            row(
                "吾輩は猫である",
                "夏目",
                "漱石",
                "https://www.aozora.gr.jp/cards/000148/files/789_ruby_5639.zip",
            ),
            "000001,短すぎる行".to_string(),
            row(
                "猫町",
                "萩原",
                "朔太郎",
                "https://www.aozora.gr.jp/cards/000067/files/1778_ruby_19993.zip",
            ),
        ]
        .join("\n")
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_load_csv_skips_header_and_short_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.csv");
        fs::write(&path, index_csv()).unwrap();

        let candidates = load_csv(&path).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "吾輩は猫である");
        assert_eq!(candidates[0].author(), "夏目漱石");
        assert_eq!(candidates[0].edition, "新潮文庫");
        assert_eq!(candidates[1].to_string(), "「猫町」萩原朔太郎(新潮文庫)");
    }

    #[test]
    fn test_load_csv_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(load_csv(&dir.path().join("none.csv")), Err(IndexError::Csv(_))));
    }

    #[test]
    fn test_extract_csv() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("index.zip");
        let csv = index_csv();
        write_zip(&archive, &[("readme.txt", "index"), ("list.csv", csv.as_str())]);

        let dest = dir.path().join("list.csv");
        extract_csv(&archive, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), csv);
    }

    #[test]
    fn test_corrupt_entry_leaves_no_index() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("index.zip");
        let csv = index_csv();
        let mut zip = ZipWriter::new(File::create(&archive).unwrap());
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("list.csv", stored).unwrap();
        zip.write_all(csv.as_bytes()).unwrap();
        zip.finish().unwrap();

        // Damage the stored data so the checksum fails while copying.
        let mut bytes = fs::read(&archive).unwrap();
        let needle = "吾輩は猫".as_bytes();
        let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
        bytes[at..at + needle.len()].copy_from_slice("猫は吾輩".as_bytes());
        fs::write(&archive, bytes).unwrap();

        let dest = dir.path().join("list.csv");
        assert!(extract_csv(&archive, &dest).is_err());
        assert!(!dest.exists());
        let left: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().map(|e| e.file_name()).collect();
        assert_eq!(left, vec![std::ffi::OsString::from("index.zip")]);
    }

    #[test]
    fn test_failed_extraction_keeps_previous_index() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("index.zip");
        write_zip(&archive, &[("readme.txt", "index")]);
        let dest = dir.path().join("list.csv");
        fs::write(&dest, "old").unwrap();

        assert!(extract_csv(&archive, &dest).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_extract_csv_without_csv_entry() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("index.zip");
        write_zip(&archive, &[("readme.txt", "index")]);
        let err = extract_csv(&archive, &dir.path().join("list.csv")).unwrap_err();
        assert!(matches!(err, IndexError::MissingCsv));
    }

    #[test]
    fn test_missing_index_is_stale() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new(dir.path(), IndexConfig::default());
        assert!(cache.is_stale(Local::now()));
    }

    #[test]
    fn test_index_without_max_age_never_expires() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new(dir.path(), IndexConfig::default());
        fs::write(cache.path(), index_csv()).unwrap();
        assert!(!cache.is_stale(Local::now() + TimeDelta::days(3650)));
    }

    #[test]
    fn test_index_expires_after_max_age() {
        let dir = tempdir().unwrap();
        let config = IndexConfig {
            max_age_days: Some(7),
            ..IndexConfig::default()
        };
        let cache = IndexCache::new(dir.path(), config);
        fs::write(cache.path(), index_csv()).unwrap();

        assert!(!cache.is_stale(Local::now()));
        assert!(!cache.is_stale(Local::now() + TimeDelta::days(6)));
        assert!(cache.is_stale(Local::now() + TimeDelta::days(8)));
    }
}
