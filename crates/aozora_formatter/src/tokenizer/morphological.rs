//! Morphological segmentation backed by a compiled vibrato dictionary.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ::vibrato::{Dictionary, Tokenizer};

use super::Segmenter;
use crate::ConversionError;

/// Segments text with a vibrato tokenizer (IPADIC, UniDic, ...).
///
/// Text is fed one line at a time; each newline becomes a token of its own.
pub struct VibratoSegmenter {
    tokenizer: Tokenizer,
}

impl VibratoSegmenter {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            tokenizer: Tokenizer::new(dictionary),
        }
    }

    /// Loads a `system.dic`, or a zstd-compressed `system.dic.zst` as
    /// vibrato releases them.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        log::info!("loading dictionary {}", path.display());
        let file = File::open(path)?;
        let dictionary = if path.extension().is_some_and(|ext| ext == "zst") {
            Dictionary::read(zstd::stream::read::Decoder::new(file)?)?
        } else {
            Dictionary::read(BufReader::new(file))?
        };
        Ok(Self::new(dictionary))
    }
}

impl Segmenter for VibratoSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut worker = self.tokenizer.new_worker();
        let mut tokens = Vec::new();

        for line in text.split_inclusive('\n') {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, true),
                None => (line, false),
            };
            if !body.is_empty() {
                worker.reset_sentence(body);
                worker.tokenize();
                tokens.extend((0..worker.num_tokens()).map(|i| worker.token(i).surface().to_string()));
            }
            if newline {
                tokens.push("\n".to_string());
            }
        }
        tokens
    }
}
