//! Ruby resegmentation.
//!
//! Aozora Bunko writes ruby in two ways:
//!
//! ```text
//! ｜青空文庫《あおぞらぶんこ》   explicit: the base starts after ｜
//! 青空文庫《あおぞらぶんこ》     implicit: the base is the kanji before 《
//! ```
//!
//! Both are rewritten to `《base,reading》`. For the implicit form the base is
//! recovered from word tokens: the longest run of kanji-only tokens right
//! before `《`. A reading with no kanji in front of it gets an empty base.

use itertools::Itertools;

use crate::markup::{RUBY_BASE_MARKER, RUBY_CLOSE, RUBY_OPEN, RUBY_SEPARATOR};
use crate::tokenizer::{Segmenter, is_kanji_token};

/// Splits tokens so that `｜`, `《` and `》` are always tokens of their own.
fn isolate_delimiters(tokens: Vec<String>) -> Vec<String> {
    let is_delimiter = |c: char| matches!(c, '｜' | '《' | '》');
    let mut result = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.chars().count() <= 1 || !token.contains(is_delimiter) {
            result.push(token);
            continue;
        }
        let mut buffer = String::new();
        for c in token.chars() {
            if is_delimiter(c) {
                if !buffer.is_empty() {
                    result.push(std::mem::take(&mut buffer));
                }
                result.push(c.to_string());
            } else {
                buffer.push(c);
            }
        }
        if !buffer.is_empty() {
            result.push(buffer);
        }
    }
    result
}

/// Copies tokens from `pos` up to and including the closing `》` on the same
/// line and returns the position after it.
fn copy_reading(tokens: &[String], mut pos: usize, out: &mut Vec<String>) -> usize {
    while pos < tokens.len() {
        let token = &tokens[pos];
        if token.contains('\n') {
            break;
        }
        out.push(token.clone());
        pos += 1;
        if token == RUBY_CLOSE {
            break;
        }
    }
    pos
}

/// Rewrites a token stream into `《base,reading》` form.
pub fn resegment_tokens(tokens: Vec<String>) -> Vec<String> {
    let tokens = isolate_delimiters(tokens);
    let mut out: Vec<String> = Vec::with_capacity(tokens.len() + tokens.len() / 8);
    let mut pos = 0;

    while pos < tokens.len() {
        let token = &tokens[pos];

        if token == RUBY_BASE_MARKER {
            let open = tokens[pos + 1..]
                .iter()
                .take_while(|t| !t.contains('\n'))
                .position(|t| t == RUBY_OPEN)
                .map(|offset| pos + 1 + offset);
            match open {
                Some(open) => {
                    out.push(RUBY_OPEN.to_string());
                    out.extend(tokens[pos + 1..open].iter().cloned());
                    out.push(RUBY_SEPARATOR.to_string());
                    pos = copy_reading(&tokens, open + 1, &mut out);
                }
                None => {
                    log::debug!("｜ without a reading, kept as text");
                    out.push(token.clone());
                    pos += 1;
                }
            }
            continue;
        }

        if token == RUBY_OPEN {
            let base_len = out.iter().rev().take_while(|t| is_kanji_token(t)).count();
            let base = out.split_off(out.len() - base_len);
            if base.is_empty() {
                log::debug!("reading without a kanji base at token {}", pos);
            }
            out.push(RUBY_OPEN.to_string());
            out.extend(base);
            out.push(RUBY_SEPARATOR.to_string());
            pos = copy_reading(&tokens, pos + 1, &mut out);
            continue;
        }

        out.push(token.clone());
        pos += 1;
    }
    out
}

/// Segments `text` and rewrites every ruby gloss in it.
pub fn resegment(text: &str, segmenter: &dyn Segmenter) -> String {
    resegment_tokens(segmenter.segment(text)).iter().join("")
}
