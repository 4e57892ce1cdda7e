pub mod morphological;

use unicode_script::{Script, UnicodeScript};

pub use morphological::VibratoSegmenter;

fn is_hiragana(c: char) -> bool {
    (0x3040 <= (c as u32)) && ((c as u32) <= 0x309F)
}

fn is_katakana(c: char) -> bool {
    (0x30A0 <= (c as u32)) && ((c as u32) <= 0x30FF) && !is_kanji(c)
}

/// 漢字（Han script）かどうかを判定します．
///
/// 「八ヶ岳」のように漢字列の一部として扱われる「ヶ」と「〆」も含めます．
pub fn is_kanji(c: char) -> bool {
    matches!(c, '々' | '〆' | 'ヶ') || c.script() == Script::Han
}

/// Whether every character of a non-empty token is a kanji.
pub fn is_kanji_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_kanji)
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '《' | '》' | '｜' | '\n')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Hiragana,
    Katakana,
    Kanji,
    Delimiter,
    Other,
}

impl TextKind {
    fn of(c: char) -> TextKind {
        if is_delimiter(c) {
            TextKind::Delimiter
        } else if is_kanji(c) {
            TextKind::Kanji
        } else if is_hiragana(c) {
            TextKind::Hiragana
        } else if is_katakana(c) {
            TextKind::Katakana
        } else {
            TextKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    pub content: String,
    pub kind: TextKind,
}

/// Word segmentation consumed by the ruby resegmenter.
///
/// Implementations must be lossless: concatenating the returned tokens gives
/// back `text` exactly, whitespace and newlines included.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Splits text into runs of one character class.
///
/// Kanji, hiragana, katakana and everything else form separate runs, and the
/// ruby delimiters `《` `》` `｜` as well as newlines are tokens of their own.
/// Without a dictionary this is the closest approximation of word boundaries
/// for ruby bases, which are almost always whole kanji runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSegmenter;

impl ScriptSegmenter {
    pub fn tokenize(&self, text: &str) -> Vec<TextToken> {
        let mut tokens: Vec<TextToken> = Vec::new();
        for c in text.chars() {
            let kind = TextKind::of(c);
            match tokens.last_mut() {
                Some(last) if last.kind == kind && kind != TextKind::Delimiter => {
                    last.content.push(c);
                }
                _ => tokens.push(TextToken {
                    content: c.to_string(),
                    kind,
                }),
            }
        }
        tokens
    }
}

impl Segmenter for ScriptSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|t| t.content).collect()
    }
}
