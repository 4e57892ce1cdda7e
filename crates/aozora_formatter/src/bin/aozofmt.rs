//! aozofmt - Aozora Bunko text formatter
//!
//! Usage:
//!   aozofmt format <path>  - Format a text file for the renderer
//!                            (IPADIC is downloaded on first use; pass
//!                            --script-only to skip it)
//!   aozofmt check <path>   - Check layout annotations without writing output

use aozora_formatter::{
    ConversionError, ScriptSegmenter, Segmenter, VibratoSegmenter, decode_shift_jis, dictionary,
    format, format_text,
};
use clap::{Parser, Subcommand};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "aozofmt")]
#[command(author, version, about = "Aozora Bunko text formatter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a text file
    Format {
        /// Path to the input text file (Shift_JIS or UTF-8)
        path: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Compiled vibrato dictionary used to find ruby bases
        /// (default: IPADIC, downloaded next to the executable)
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Find ruby bases by script runs instead of a dictionary
        #[arg(long, conflicts_with = "dictionary")]
        script_only: bool,
    },
    /// Check layout annotations without writing output
    Check {
        /// Path to the input text file
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Format {
            path,
            output,
            dictionary,
            script_only,
        } => format_command(&path, output.as_deref(), dictionary.as_deref(), script_only),
        Commands::Check { path } => check_command(&path),
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

fn format_command(
    path: &Path,
    output: Option<&Path>,
    dictionary: Option<&Path>,
    script_only: bool,
) -> ExitCode {
    eprintln!("  \x1b[1;32mFormatting\x1b[0m {}", path.display());

    let text = match read_aozora_file(path) {
        Ok(t) => t,
        Err(e) => {
            print_error(&format!("could not read file: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let segmenter = match load_segmenter(dictionary, script_only) {
        Ok(s) => s,
        Err(e) => {
            print_error(&format!("could not load dictionary: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let formatted = match format_text(&text, segmenter.as_ref()) {
        Ok(f) => f,
        Err(e) => {
            print_conversion_error(&e, path);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(out) => {
            if let Err(e) = fs::write(out, formatted) {
                print_error(&format!("could not write {}: {}", out.display(), e));
                return ExitCode::FAILURE;
            }
            eprintln!("    \x1b[1;32mFinished\x1b[0m {}", out.display());
        }
        None => print!("{}", formatted),
    }
    ExitCode::SUCCESS
}

fn check_command(path: &Path) -> ExitCode {
    eprintln!("    \x1b[1;32mChecking\x1b[0m {}", path.display());

    let text = match read_aozora_file(path) {
        Ok(t) => t,
        Err(e) => {
            print_error(&format!("could not read file: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match format(&text) {
        Ok(_) => {
            eprintln!("    \x1b[1;32mFinished\x1b[0m no errors");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_conversion_error(&e.into(), path);
            ExitCode::FAILURE
        }
    }
}

fn load_segmenter(
    explicit: Option<&Path>,
    script_only: bool,
) -> Result<Box<dyn Segmenter>, ConversionError> {
    if let Some(dic) = explicit {
        return Ok(Box::new(VibratoSegmenter::from_path(dic)?));
    }
    if script_only {
        return Ok(Box::new(ScriptSegmenter));
    }

    let exe = std::env::current_exe()?;
    let dir = exe.parent().unwrap_or(Path::new("."));
    let client = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
    let path = dictionary::ensure(dir, dictionary::IPADIC_URL, &client)?;
    Ok(Box::new(VibratoSegmenter::from_path(path)?))
}

fn read_aozora_file(path: &Path) -> Result<String, std::io::Error> {
    let bytes = fs::read(path)?;
    Ok(decode_shift_jis(&bytes))
}

fn print_error(msg: &str) {
    eprintln!("\x1b[1;31merror\x1b[0m: {}", msg);
}

fn print_conversion_error(e: &ConversionError, path: &Path) {
    eprintln!("\x1b[1;31merror\x1b[0m: {}", e);
    eprintln!("  \x1b[1;34m-->\x1b[0m {}", path.display());
}
