use thiserror::Error;

use crate::command::{self, LayoutCommand};
use crate::markup;
use crate::rules::RuleTable;

/// Bytes taken by one full-width character in the legacy multi-byte encoding.
pub const FULL_WIDTH_BYTES: usize = 3;

/// Lines starting with this open and close the bibliographic header block.
const SEPARATOR: &str = "----------";

/// 底本：, the start of the colophon.
const COLOPHON: &str = "底本：";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The width of an indent or raise annotation is not a full-width number.
    #[error("line {line}: invalid width in annotation ［＃{annotation}］")]
    InvalidWidth { line: usize, annotation: String },
}

/// Layout carried from one line to the next.
///
/// `block_*` fields last until the matching end annotation, `line_*` fields
/// and `trailing_pad` are cleared after every line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatState {
    pub block_indent: String,
    pub line_indent: String,
    pub block_align: String,
    pub line_align: String,
    pub block_raise: String,
    pub line_raise: String,
    pub trailing_pad: usize,
}

fn spaces(width: usize) -> String {
    std::iter::repeat_n(markup::FULL_WIDTH_SPACE, width).collect()
}

impl FormatState {
    pub fn apply(&mut self, command: LayoutCommand) {
        match command {
            LayoutCommand::IndentBegin(width) => self.block_indent = spaces(width),
            LayoutCommand::IndentEnd => self.block_indent.clear(),
            LayoutCommand::Indent(width) => self.line_indent = spaces(width),
            LayoutCommand::GroundBegin => self.block_align = markup::ALIGN_RIGHT.to_string(),
            LayoutCommand::GroundEnd => self.block_align = markup::ALIGN_LEFT.to_string(),
            LayoutCommand::Ground => self.line_align = markup::ALIGN_RIGHT.to_string(),
            LayoutCommand::RaiseBegin(width) => self.block_raise = spaces(width),
            LayoutCommand::RaiseEnd => self.block_raise.clear(),
            LayoutCommand::Raise(width) => self.line_raise = spaces(width),
            LayoutCommand::RaiseFromGround(width) => {
                self.line_raise = spaces(width);
                self.trailing_pad = width.checked_mul(FULL_WIDTH_BYTES).unwrap_or(usize::MAX);
            }
        }
    }

    fn leading(&self) -> String {
        [
            self.line_align.as_str(),
            self.block_align.as_str(),
            self.line_indent.as_str(),
            self.block_indent.as_str(),
        ]
        .concat()
    }

    /// Renders one line with the current padding around it.
    ///
    /// When the leading padding is longer than `trailing_pad` bytes, that many
    /// bytes are cut from the front of the result. Otherwise, or when the cut
    /// would split a character, the line is returned whole.
    pub fn compose(&self, body: &str, terminator: &str) -> String {
        let leading = self.leading();
        let composed = [
            leading.as_str(),
            body,
            self.line_raise.as_str(),
            self.block_raise.as_str(),
            terminator,
        ]
        .concat();

        if self.trailing_pad > 0 && leading.len() > self.trailing_pad {
            if let Some(trimmed) = composed.get(self.trailing_pad..) {
                return trimmed.to_string();
            }
        }
        composed
    }

    pub fn reset_line(&mut self) {
        self.line_indent.clear();
        self.line_align.clear();
        self.line_raise.clear();
        self.trailing_pad = 0;
    }
}

/// Line-oriented annotation formatter.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    rules: RuleTable,
}

impl LineFormatter {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// Rewrites the layout and inline annotations of `text`.
    ///
    /// The bibliographic block between dash separators is dropped and output
    /// stops at the colophon. Ruby is left as it is for [`crate::resegment`].
    pub fn format(&self, text: &str) -> Result<String, FormatError> {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut state = FormatState::default();
        let mut result = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            let (line, terminator) = split_terminator(lines[i]);
            let line_no = i + 1;

            if line.starts_with(SEPARATOR) {
                match lines[i + 1..].iter().position(|l| l.starts_with(SEPARATOR)) {
                    Some(offset) => {
                        log::debug!("skipping header block, lines {}-{}", line_no, line_no + offset + 1);
                        i += offset + 2;
                    }
                    None => {
                        log::debug!("unclosed separator at line {}", line_no);
                        i += 1;
                    }
                }
                continue;
            }

            if line.starts_with(COLOPHON) {
                log::debug!("colophon at line {}", line_no);
                break;
            }

            let layout = command::parse_layout(line, line_no)?;
            for command in &layout.commands {
                state.apply(*command);
            }

            if layout.has_block_command() && layout.rest.trim_end_matches('\r').is_empty() {
                state.reset_line();
                i += 1;
                continue;
            }

            let body = self.rules.apply(&layout.rest);
            result.push_str(&state.compose(&body, terminator));
            state.reset_line();
            i += 1;
        }

        Ok(result)
    }
}

fn split_terminator(line: &str) -> (&str, &str) {
    match line.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (line, ""),
    }
}

/// Formats `text` with the default rule table.
pub fn format(text: &str) -> Result<String, FormatError> {
    LineFormatter::default().format(text)
}

#[cfg(test)]
mod tests;
