//! aozora_getter - finds a work in the Aozora Bunko index, fetches its text
//! and prints it formatted for the renderer.
//!
//! The first line on stdout is always a status code (see [`error::status`]),
//! followed by the formatted text or the list of candidates. Logs go to
//! stderr.

mod config;
mod error;
mod fetch;
mod index;

use aozora_formatter::{
    Candidate, ConversionError, ScriptSegmenter, SearchMatcher, Segmenter, VibratoSegmenter,
    dictionary, format_text,
};
use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use reqwest::blocking::Client;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use crate::config::{CONFIG_FILE, Config, SegmenterConfig};
use crate::error::{GetterError, status};
use crate::index::IndexCache;

#[derive(Parser, Debug)]
#[command(name = "aozora_getter")]
#[command(author, version, about = "Fetches a work from Aozora Bunko and formats it")]
struct Cli {
    /// Words matched against titles and author names, narrowing in order
    terms: Vec<String>,

    /// Config file (default: aozora_getter.toml in the cache directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the index (default: next to the executable)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Compiled vibrato dictionary used to find ruby bases
    /// (default: IPADIC, downloaded into the cache directory)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Find ruby bases by script runs instead of a dictionary
    #[arg(long, conflicts_with = "dictionary")]
    script_only: bool,

    /// Suppress log output
    #[arg(short, long)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Found(String),
    IndexDownloaded,
    Ambiguous(Vec<Candidate>),
    NotFound,
}

impl Outcome {
    fn status(&self) -> u16 {
        match self {
            Outcome::Found(_) => status::FOUND,
            Outcome::IndexDownloaded => status::INDEX_DOWNLOADED,
            Outcome::Ambiguous(_) => status::AMBIGUOUS,
            Outcome::NotFound => status::NOT_FOUND,
        }
    }

    /// Lines printed after the status.
    fn payload(&self) -> Option<String> {
        match self {
            Outcome::Found(text) => Some(text.clone()),
            Outcome::Ambiguous(candidates) => Some(candidates.iter().join("\n")),
            Outcome::IndexDownloaded | Outcome::NotFound => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = match run(&cli) {
        Ok(outcome) => {
            println!("{}", outcome.status());
            if let Some(payload) = outcome.payload() {
                println!("{}", payload);
            }
            outcome.status()
        }
        Err(e) => {
            log::error!("{}", e);
            println!("{}", e.status());
            e.status()
        }
    };

    if status::is_success(code) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if !quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }
}

fn run(cli: &Cli) -> Result<Outcome, GetterError> {
    let config = load_config(cli)?;
    let cache_dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => executable_dir()?,
    };
    fs::create_dir_all(&cache_dir).map_err(|source| GetterError::CacheDir {
        path: cache_dir.clone(),
        source,
    })?;

    let client = fetch::client(&config.http)?;
    let index = IndexCache::new(&cache_dir, config.index.clone());
    log::debug!("index at {}", index.path().display());
    if index.is_stale(Local::now()) {
        index.download(&client).map_err(GetterError::IndexDownload)?;
        return Ok(Outcome::IndexDownloaded);
    }

    if cli.terms.is_empty() {
        return Err(GetterError::NoTerms);
    }

    let candidates = index.load().map_err(GetterError::IndexRead)?;
    let result = SearchMatcher::new(config.text.base_url.as_str()).narrow_all(&cli.terms, &candidates);
    if result.matches.len() > 1 {
        return Ok(Outcome::Ambiguous(result.matches));
    }
    let Some(url) = result.url else {
        return Ok(Outcome::NotFound);
    };

    let book = fetch::fetch_book(&client, &url)?;
    let segmenter = load_segmenter(&config.segmenter, &cache_dir, &client)?;
    Ok(Outcome::Found(format_text(&book, segmenter.as_ref())?))
}

/// Reads the config file and applies the command line overrides.
fn load_config(cli: &Cli) -> Result<Config, GetterError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let dir = match &cli.cache_dir {
                Some(dir) => dir.clone(),
                None => executable_dir()?,
            };
            Config::load_or_default(&dir.join(CONFIG_FILE))?
        }
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(dictionary) = &cli.dictionary {
        config.segmenter.dictionary = Some(dictionary.clone());
    }
    if cli.script_only {
        config.segmenter.script_only = true;
    }
    Ok(config)
}

fn executable_dir() -> Result<PathBuf, GetterError> {
    let exe = std::env::current_exe().map_err(|source| GetterError::CacheDir {
        path: PathBuf::from("."),
        source,
    })?;
    Ok(exe
        .parent()
        .map(|dir| dir.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn load_segmenter(
    config: &SegmenterConfig,
    cache_dir: &Path,
    client: &Client,
) -> Result<Box<dyn Segmenter>, ConversionError> {
    let path = match &config.dictionary {
        Some(path) => path.clone(),
        None if config.script_only => {
            log::info!("finding ruby bases by script runs");
            return Ok(Box::new(ScriptSegmenter));
        }
        None => dictionary::ensure(cache_dir, &config.dictionary_url, client)?,
    };
    Ok(Box::new(VibratoSegmenter::from_path(path)?))
}
