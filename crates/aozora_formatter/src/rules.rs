//! Inline markup rules.
//!
//! Each [`MarkupRule`] recognises one annotation family on a single line and
//! rewrites it into renderer markup. [`RuleTable`] applies them in a fixed
//! order; a rule sees the output of every rule before it.
//!
//! Emphasis is matched textually. Overlapping or nested spans are not
//! detected and may render wrongly.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup;

/// 傍線・太字・斜体．詳細は以下のURLを参照してください．
///
/// https://www.aozora.gr.jp/annotation/emphasis.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisStyle {
    /// 傍線，二重傍線，鎖線，破線，波線
    Underline,
    /// 太字
    Bold,
    /// 斜体
    Italic,
}

impl EmphasisStyle {
    fn tokens(&self) -> (&'static str, &'static str) {
        match self {
            EmphasisStyle::Underline => (markup::UNDERLINE_ON, markup::UNDERLINE_OFF),
            EmphasisStyle::Bold => (markup::BOLD_ON, markup::BOLD_OFF),
            EmphasisStyle::Italic => (markup::ITALIC_ON, markup::ITALIC_OFF),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisForm {
    /// ［＃「X」は太字］
    Quoted,
    /// ［＃太字］, ［＃ここから太字］
    Begin,
    /// ［＃太字終わり］, ［＃ここで太字終わり］
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingForm {
    /// ［＃「X」は大見出し］
    Quoted,
    /// ［＃大見出し］, ［＃ここから中見出し］
    Begin,
    /// ［＃大見出し終わり］, ［＃ここで中見出し終わり］
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupRule {
    /// ※［＃...］
    Gaiji,
    /// 改丁，改見開き
    SheetBreak,
    /// 改ページ，改段
    PageBreak,
    /// ページの左右中央
    CenteredPage,
    Emphasis { style: EmphasisStyle, form: EmphasisForm },
    Heading(HeadingForm),
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("invalid pattern ", stringify!($name))));
    };
}

pattern!(GAIJI, r"※［[^］]*］");
pattern!(SHEET_BREAK, r"［＃(?:改丁|改見開き)］");
pattern!(PAGE_BREAK, r"［＃(?:改ページ|改段)］");
pattern!(CENTERED_PAGE, r"［＃ページの左右中央］");

pattern!(UNDERLINE_QUOTED, r"［＃「(?P<target>[^」]+)」(?:に|は)(?:二重傍線|傍線|鎖線|破線|波線)］");
pattern!(UNDERLINE_BEGIN, r"［＃(?:ここから)?(?:二重傍線|傍線|鎖線|破線|波線)］");
pattern!(UNDERLINE_END, r"［＃(?:ここで)?(?:二重傍線|傍線|鎖線|破線|波線)終わり］");
pattern!(BOLD_QUOTED, r"［＃「(?P<target>[^」]+)」(?:に|は)太字］");
pattern!(BOLD_BEGIN, r"［＃(?:ここから)?太字］");
pattern!(BOLD_END, r"［＃(?:ここで)?太字終わり］");
pattern!(ITALIC_QUOTED, r"［＃「(?P<target>[^」]+)」(?:に|は)斜体］");
pattern!(ITALIC_BEGIN, r"［＃(?:ここから)?斜体］");
pattern!(ITALIC_END, r"［＃(?:ここで)?斜体終わり］");

pattern!(HEADING_QUOTED, r"［＃「[^」]+」は(?:同行|窓)?[大中小]見出し］");
pattern!(HEADING_BEGIN, r"［＃(?:ここから)?(?:同行|窓)?[大中小]見出し］");
pattern!(HEADING_END, r"［＃(?:ここで)?(?:同行|窓)?[大中小]見出し終わり］");

impl MarkupRule {
    pub fn pattern(&self) -> &'static Regex {
        use EmphasisForm as F;
        use EmphasisStyle as S;
        match self {
            MarkupRule::Gaiji => &*GAIJI,
            MarkupRule::SheetBreak => &*SHEET_BREAK,
            MarkupRule::PageBreak => &*PAGE_BREAK,
            MarkupRule::CenteredPage => &*CENTERED_PAGE,
            MarkupRule::Emphasis { style, form } => match (style, form) {
                (S::Underline, F::Quoted) => &*UNDERLINE_QUOTED,
                (S::Underline, F::Begin) => &*UNDERLINE_BEGIN,
                (S::Underline, F::End) => &*UNDERLINE_END,
                (S::Bold, F::Quoted) => &*BOLD_QUOTED,
                (S::Bold, F::Begin) => &*BOLD_BEGIN,
                (S::Bold, F::End) => &*BOLD_END,
                (S::Italic, F::Quoted) => &*ITALIC_QUOTED,
                (S::Italic, F::Begin) => &*ITALIC_BEGIN,
                (S::Italic, F::End) => &*ITALIC_END,
            },
            MarkupRule::Heading(HeadingForm::Quoted) => &*HEADING_QUOTED,
            MarkupRule::Heading(HeadingForm::Begin) => &*HEADING_BEGIN,
            MarkupRule::Heading(HeadingForm::End) => &*HEADING_END,
        }
    }

    /// Rewrites every match of this rule in `line`.
    pub fn apply(&self, line: &str) -> String {
        let re = self.pattern();
        if !re.is_match(line) {
            return line.to_string();
        }
        match self {
            MarkupRule::Gaiji => re.replace_all(line, markup::GAIJI).into_owned(),
            MarkupRule::SheetBreak => prefix_line(re, line, markup::SHEET_BREAK),
            MarkupRule::PageBreak => prefix_line(re, line, markup::PAGE_BREAK),
            MarkupRule::CenteredPage => prefix_line(re, line, markup::CENTERED_PAGE),
            MarkupRule::Emphasis { style, form } => {
                let (on, off) = style.tokens();
                match form {
                    EmphasisForm::Quoted => wrap_targets(re, line, on, off),
                    EmphasisForm::Begin => re.replace_all(line, on).into_owned(),
                    EmphasisForm::End => re.replace_all(line, off).into_owned(),
                }
            }
            MarkupRule::Heading(HeadingForm::Quoted) => {
                let body = re.replace_all(line, "");
                format!("{}{}{}", markup::BOLD_ON, body, markup::BOLD_OFF)
            }
            MarkupRule::Heading(HeadingForm::Begin) => re.replace_all(line, markup::BOLD_ON).into_owned(),
            MarkupRule::Heading(HeadingForm::End) => re.replace_all(line, markup::BOLD_OFF).into_owned(),
        }
    }
}

fn prefix_line(re: &Regex, line: &str, sentinel: &str) -> String {
    format!("{}{}", sentinel, re.replace_all(line, ""))
}

/// Removes each quoted annotation and wraps the first occurrence of its
/// target. An annotation whose target is not in the line is kept as is.
fn wrap_targets(re: &Regex, line: &str, on: &str, off: &str) -> String {
    let annotations: Vec<(String, String)> = re
        .captures_iter(line)
        .map(|caps| (caps[0].to_string(), caps["target"].to_string()))
        .collect();

    let mut result = line.to_string();
    for (annotation, target) in annotations {
        let without = result.replacen(&annotation, "", 1);
        match wrap_first(&without, &target, on, off) {
            Some(wrapped) => result = wrapped,
            None => log::debug!("emphasis target 「{}」 not found, left unconverted", target),
        }
    }
    result
}

/// Wraps the first occurrence of `target` in `line`.
///
/// A ruby gloss right after the target (`吾輩《わがはい》`) and a base
/// marker right before it (`｜吾輩`) are kept inside the span, so the
/// ruby base stays next to its reading.
fn wrap_first(line: &str, target: &str, on: &str, off: &str) -> Option<String> {
    let found = line.find(target)?;
    let mut start = found;
    let mut end = found + target.len();

    if line[..start].ends_with(markup::RUBY_BASE_MARKER) {
        start -= markup::RUBY_BASE_MARKER.len();
    }
    if line[end..].starts_with(markup::RUBY_OPEN) {
        if let Some(close) = line[end..].find(markup::RUBY_CLOSE) {
            end += close + markup::RUBY_CLOSE.len();
        }
    }

    Some(format!(
        "{}{}{}{}{}",
        &line[..start],
        on,
        &line[start..end],
        off,
        &line[end..]
    ))
}

/// The ordered list of markup rules applied to each line.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<MarkupRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        // Headings wrap the whole line, so they go before the rules that
        // prefix it with a sentinel.
        let mut rules = vec![
            MarkupRule::Gaiji,
            MarkupRule::Heading(HeadingForm::Quoted),
            MarkupRule::Heading(HeadingForm::Begin),
            MarkupRule::Heading(HeadingForm::End),
            MarkupRule::SheetBreak,
            MarkupRule::PageBreak,
            MarkupRule::CenteredPage,
        ];
        for form in [EmphasisForm::Quoted, EmphasisForm::Begin, EmphasisForm::End] {
            for style in [EmphasisStyle::Underline, EmphasisStyle::Bold, EmphasisStyle::Italic] {
                rules.push(MarkupRule::Emphasis { style, form });
            }
        }
        Self { rules }
    }
}

impl RuleTable {
    pub fn rules(&self) -> &[MarkupRule] {
        &self.rules
    }

    pub fn apply(&self, line: &str) -> String {
        self.rules
            .iter()
            .fold(line.to_string(), |acc, rule| rule.apply(&acc))
    }
}
