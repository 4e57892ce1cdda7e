use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::formatter::FormatError;

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"［＃(?P<body>[^］]*)］").expect("annotation pattern"));

/// Widest indent or raise accepted, in full-width characters.
pub const MAX_WIDTH: usize = 200;

static FULL_WIDTH_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[０-９]+").expect("digit pattern"));

/// 字下げ，字上げ，地付きを表します．
///
/// `*Begin` と `*End` はブロック注記（ここから〜／ここで〜終わり）で，
/// それ以外は注記を含む一行だけに効きます．詳細は以下のURLを参照してください．
///
/// https://www.aozora.gr.jp/annotation/layout_2.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCommand {
    /// ここからＮ字下げ
    IndentBegin(usize),
    /// ここで字下げ終わり
    IndentEnd,
    /// Ｎ字下げ
    Indent(usize),

    /// ここから地付き
    GroundBegin,
    /// ここで地付き終わり
    GroundEnd,
    /// 地付き
    Ground,

    /// ここからＮ字上げ
    RaiseBegin(usize),
    /// ここで字上げ終わり
    RaiseEnd,
    /// Ｎ字上げ
    Raise(usize),
    /// 地からＮ字上げ
    RaiseFromGround(usize),
}

impl LayoutCommand {
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            LayoutCommand::IndentBegin(_)
                | LayoutCommand::IndentEnd
                | LayoutCommand::GroundBegin
                | LayoutCommand::GroundEnd
                | LayoutCommand::RaiseBegin(_)
                | LayoutCommand::RaiseEnd
        )
    }
}

/// A line split into its layout commands and the text left once they are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    pub commands: Vec<LayoutCommand>,
    pub rest: String,
}

impl LayoutLine {
    pub fn has_block_command(&self) -> bool {
        self.commands.iter().any(LayoutCommand::is_block)
    }
}

/// Parses the width of an annotation such as `ここから３字下げ`.
///
/// The first run of full-width digits is NFKC-normalised and read as a
/// decimal number, which must not exceed [`MAX_WIDTH`]. `line` is 1-based
/// and only used for the error.
pub fn parse_width(body: &str, line: usize) -> Result<usize, FormatError> {
    let invalid = || FormatError::InvalidWidth {
        line,
        annotation: body.to_string(),
    };
    let digits = FULL_WIDTH_DIGITS.find(body).ok_or_else(invalid)?;
    let normalized: String = digits.as_str().nfkc().collect();
    match normalized.parse::<usize>() {
        Ok(width) if width <= MAX_WIDTH => Ok(width),
        _ => Err(invalid()),
    }
}

fn classify(body: &str, at_line_start: bool, line: usize) -> Result<Option<LayoutCommand>, FormatError> {
    let command = match body {
        // Block ends only count at the start of a line.
        "ここで字下げ終わり" | "ここで地付き終わり" | "ここで字上げ終わり" if !at_line_start => {
            return Ok(None);
        }
        "ここで字下げ終わり" => LayoutCommand::IndentEnd,
        "ここから地付き" => LayoutCommand::GroundBegin,
        "ここで地付き終わり" => LayoutCommand::GroundEnd,
        "地付き" => LayoutCommand::Ground,
        "ここで字上げ終わり" => LayoutCommand::RaiseEnd,
        b if b.ends_with("字下げ") => {
            let width = parse_width(b, line)?;
            if at_line_start && b.starts_with("ここから") {
                LayoutCommand::IndentBegin(width)
            } else {
                LayoutCommand::Indent(width)
            }
        }
        b if b.ends_with("字上げ") => {
            let width = parse_width(b, line)?;
            if at_line_start && b.starts_with("ここから") {
                LayoutCommand::RaiseBegin(width)
            } else if b.starts_with("地から") {
                LayoutCommand::RaiseFromGround(width)
            } else {
                LayoutCommand::Raise(width)
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// Extracts the layout annotations of one line.
///
/// Annotations that are not about layout stay in `rest` untouched, and so do
/// gaiji descriptions (`※［＃...］`).
pub fn parse_layout(text: &str, line: usize) -> Result<LayoutLine, FormatError> {
    let mut commands = Vec::new();
    let mut rest = String::with_capacity(text.len());
    let mut last = 0;

    for caps in ANNOTATION.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if text[..whole.start()].ends_with('※') {
            continue;
        }
        let body = &caps["body"];
        if let Some(command) = classify(body, whole.start() == 0, line)? {
            log::trace!("line {}: {:?}", line, command);
            commands.push(command);
            rest.push_str(&text[last..whole.start()]);
            last = whole.end();
        }
    }
    rest.push_str(&text[last..]);

    Ok(LayoutLine { commands, rest })
}
