//! Tokens of the target renderer markup.
//!
//! The renderer understands `\f[...]` commands embedded in the text, two
//! character sentinels at the start of a line, and ruby written as
//! `《base,reading》`.

pub const ALIGN_RIGHT: &str = "\\f[align,right]";
pub const ALIGN_LEFT: &str = "\\f[align,left]";

pub const BOLD_ON: &str = "\\f[bold,on]";
pub const BOLD_OFF: &str = "\\f[bold,off]";
pub const ITALIC_ON: &str = "\\f[italic,on]";
pub const ITALIC_OFF: &str = "\\f[italic,off]";
pub const UNDERLINE_ON: &str = "\\f[underline,on]";
pub const UNDERLINE_OFF: &str = "\\f[underline,off]";

/// 改ページ・改段: start a new page without clearing.
pub const PAGE_BREAK: &str = "□■";
/// 改丁・改見開き: start a new sheet.
pub const SHEET_BREAK: &str = "■□";
/// ページの左右中央
pub const CENTERED_PAGE: &str = "◆◇";

/// Stand-in for a character that has no Unicode code point (外字).
pub const GAIJI: &str = "□";

/// Full-width space used for every kind of padding.
pub const FULL_WIDTH_SPACE: char = '　';

pub const RUBY_OPEN: &str = "《";
pub const RUBY_CLOSE: &str = "》";
pub const RUBY_SEPARATOR: &str = ",";
/// Marks the start of a ruby base explicitly in the source notation.
pub const RUBY_BASE_MARKER: &str = "｜";
