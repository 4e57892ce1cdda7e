//! # aozora_formatter
//!
//! Turns Aozora Bunko plain text into the markup of a small text renderer:
//! layout annotations become padding and alignment sentinels, inline
//! annotations become style toggles, and ruby is rewritten as
//! `《base,reading》`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use aozora_formatter::{decode_shift_jis, format_text, ScriptSegmenter};
//!
//! let text = decode_shift_jis(&bytes);
//! let formatted = format_text(&text, &ScriptSegmenter)?;
//! ```
//!
//! ## Advanced Usage
//!
//! Ruby bases are found best with a dictionary. [`dictionary::ensure`]
//! downloads IPADIC once; the two passes can then be run separately:
//!
//! ```ignore
//! use aozora_formatter::{dictionary, resegment, LineFormatter, RuleTable, VibratoSegmenter};
//!
//! let path = dictionary::ensure(&cache_dir, dictionary::IPADIC_URL, &client)?;
//! let segmenter = VibratoSegmenter::from_path(path)?;
//! let formatted = LineFormatter::new(RuleTable::default()).format(&text)?;
//! let output = resegment(&formatted, &segmenter);
//! ```

use encoding_rs::SHIFT_JIS;
use thiserror::Error;

pub mod command;
pub mod dictionary;
pub mod markup;
mod formatter;
mod rules;
mod ruby;
mod search;
mod tokenizer;

pub use formatter::{FULL_WIDTH_BYTES, FormatError, FormatState, LineFormatter, format};
pub use ruby::{resegment, resegment_tokens};
pub use rules::{EmphasisForm, EmphasisStyle, HeadingForm, MarkupRule, RuleTable};
pub use search::{Candidate, DEFAULT_TEXT_BASE, SearchMatcher, SearchResult, narrow};
pub use tokenizer::{
    ScriptSegmenter, Segmenter, TextKind, TextToken, VibratoSegmenter, is_kanji, is_kanji_token,
};

/// Error type for high-level conversion functions.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dictionary error: {0}")]
    Dictionary(#[from] vibrato::errors::VibratoError),
    #[error("dictionary download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("archive has no system.dic.zst")]
    MissingDictionary,
}

/// Formats the annotations of `text`, then resegments its ruby with
/// `segmenter`.
pub fn format_text(text: &str, segmenter: &dyn Segmenter) -> Result<String, ConversionError> {
    let formatted = format(text)?;
    Ok(resegment(&formatted, segmenter))
}

/// Decodes a Shift_JIS text, falling back to UTF-8 when the bytes are not
/// valid Shift_JIS. CRLF line ends become LF.
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let (cow, _, had_errors) = SHIFT_JIS.decode(bytes);
    let text = if had_errors {
        match std::str::from_utf8(bytes) {
            Ok(utf8) => utf8.to_string(),
            Err(_) => cow.into_owned(),
        }
    } else {
        cow.into_owned()
    };
    text.replace("\r\n", "\n")
}
