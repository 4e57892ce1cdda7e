//! Narrowing the Aozora Bunko index down to one work.

use std::fmt;

/// Where plain-text editions of the works are mirrored.
pub const DEFAULT_TEXT_BASE: &str = "https://aozorahack.org/aozorabunko_text";

const TITLE_FIELD: usize = 1;
const LAST_NAME_FIELD: usize = 15;
const FIRST_NAME_FIELD: usize = 16;
const EDITION_FIELD: usize = 27;
const URL_FIELD: usize = 45;

/// One row of the index (list_person_all_extended).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub last_name: String,
    pub first_name: String,
    /// 底本名
    pub edition: String,
    /// Address of the zipped text on aozora.gr.jp.
    pub url: String,
}

impl Candidate {
    /// Picks the fields of an index row. Rows that are too short are not
    /// candidates.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        let field = |i: usize| fields.get(i).map(|f| f.as_ref().to_string());
        Some(Self {
            title: field(TITLE_FIELD)?,
            last_name: field(LAST_NAME_FIELD)?,
            first_name: field(FIRST_NAME_FIELD)?,
            edition: field(EDITION_FIELD)?,
            url: field(URL_FIELD)?,
        })
    }

    pub fn author(&self) -> String {
        format!("{}{}", self.last_name, self.first_name)
    }

    pub fn matches(&self, query: &str) -> bool {
        self.title.contains(query) || self.author().contains(query)
    }

    /// Address of the plain-text edition under `text_base`.
    ///
    /// `https://www.aozora.gr.jp/cards/000148/files/789_ruby_5639.zip` maps to
    /// `{text_base}/cards/000148/files/789_ruby_5639/789_ruby_5639.txt`.
    /// `None` when the URL has no `/card` segment or no `.zip` suffix.
    pub fn book_url(&self, text_base: &str) -> Option<String> {
        let url = self.url.as_str();
        let start = url.find("/card")?;
        let end = url.rfind(".zip")?;
        let name_start = url.rfind('/')? + 1;
        if start >= end || name_start > end {
            return None;
        }
        let base = text_base.trim_end_matches('/');
        Some(format!("{}{}/{}.txt", base, &url[start..end], &url[name_start..end]))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "「{}」{}({})", self.title, self.author(), self.edition)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Text address of the first match, if it has a valid one.
    pub url: Option<String>,
    pub matches: Vec<Candidate>,
}

#[derive(Debug, Clone)]
pub struct SearchMatcher {
    text_base: String,
}

impl Default for SearchMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_BASE)
    }
}

impl SearchMatcher {
    pub fn new(text_base: impl Into<String>) -> Self {
        Self {
            text_base: text_base.into(),
        }
    }

    /// Keeps the candidates whose title or author contains `query`.
    ///
    /// The URL of the first match is resolved as soon as it is found. If that
    /// fails the matches collected so far are thrown away and the scan goes
    /// on, so a candidate with a broken URL never becomes the first match.
    pub fn narrow(&self, query: &str, candidates: &[Candidate]) -> SearchResult {
        let mut result = SearchResult::default();
        for candidate in candidates.iter().filter(|c| c.matches(query)) {
            result.matches.push(candidate.clone());
            if result.matches.len() == 1 {
                result.url = candidate.book_url(&self.text_base);
                if result.url.is_none() {
                    log::warn!("no text URL for {}: {}", candidate, candidate.url);
                    result.matches.clear();
                }
            }
        }
        log::debug!("「{}」: {} candidates", query, result.matches.len());
        result
    }

    /// Applies [`SearchMatcher::narrow`] once per term, each on the previous
    /// matches.
    pub fn narrow_all<S: AsRef<str>>(&self, terms: &[S], candidates: &[Candidate]) -> SearchResult {
        let mut result = SearchResult {
            url: None,
            matches: candidates.to_vec(),
        };
        for term in terms {
            result = self.narrow(term.as_ref(), &result.matches);
        }
        result
    }
}

/// [`SearchMatcher::narrow`] against the default text mirror.
pub fn narrow(query: &str, candidates: &[Candidate]) -> SearchResult {
    SearchMatcher::default().narrow(query, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, last: &str, first: &str, url: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            last_name: last.to_string(),
            first_name: first.to_string(),
            edition: "ちくま文庫".to_string(),
            url: url.to_string(),
        }
    }

    fn index() -> Vec<Candidate> {
        vec![
            candidate(
                "吾輩は猫である",
                "夏目",
                "漱石",
                "https://www.aozora.gr.jp/cards/000148/files/789_ruby_5639.zip",
            ),
            candidate(
                "坊っちゃん",
                "夏目",
                "漱石",
                "https://www.aozora.gr.jp/cards/000148/files/752_ruby_2438.zip",
            ),
            candidate(
                "猫町",
                "萩原",
                "朔太郎",
                "https://www.aozora.gr.jp/cards/000067/files/1778_ruby_19993.zip",
            ),
        ]
    }

    #[test]
    fn test_book_url() {
        let c = &index()[0];
        assert_eq!(
            c.book_url(DEFAULT_TEXT_BASE).unwrap(),
            "https://aozorahack.org/aozorabunko_text/cards/000148/files/789_ruby_5639/789_ruby_5639.txt"
        );
    }

    #[test]
    fn test_book_url_rejects_malformed() {
        let no_card = candidate("x", "", "", "https://example.com/files/1.zip");
        assert_eq!(no_card.book_url(DEFAULT_TEXT_BASE), None);
        let no_zip = candidate("x", "", "", "https://www.aozora.gr.jp/cards/000148/card789.html");
        assert_eq!(no_zip.book_url(DEFAULT_TEXT_BASE), None);
        let empty = candidate("x", "", "", "");
        assert_eq!(empty.book_url(DEFAULT_TEXT_BASE), None);
    }

    #[test]
    fn test_narrow_by_title_and_author() {
        let result = narrow("猫", &index());
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].title, "吾輩は猫である");
        assert_eq!(result.matches[1].title, "猫町");
        assert!(result.url.unwrap().ends_with("789_ruby_5639.txt"));

        let result = narrow("夏目漱石", &index());
        assert_eq!(result.matches.len(), 2);
    }

    #[test]
    fn test_narrowing_is_monotonic() {
        let all = index();
        let cat = narrow("猫", &all);
        let soseki = narrow("漱石", &all);
        let both = narrow("漱石", &cat.matches);
        assert!(both.matches.iter().all(|c| cat.matches.contains(c)));
        assert!(both.matches.iter().all(|c| soseki.matches.contains(c)));
        assert_eq!(both.matches.len(), 1);
        assert_eq!(both.matches[0].title, "吾輩は猫である");
    }

    #[test]
    fn test_narrow_all() {
        let matcher = SearchMatcher::default();
        let result = matcher.narrow_all(&["猫", "萩原"], &index());
        assert_eq!(result.matches.len(), 1);
        assert!(result.url.unwrap().ends_with("1778_ruby_19993.txt"));
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(narrow("猫", &[]), SearchResult::default());
    }

    #[test]
    fn test_no_match() {
        let result = narrow("芥川", &index());
        assert_eq!(result.url, None);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_first_match_with_broken_url_is_dropped() {
        let mut candidates = index();
        candidates[0].url = "broken".to_string();
        let result = narrow("夏目", &candidates);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].title, "坊っちゃん");
        assert!(result.url.unwrap().ends_with("752_ruby_2438.txt"));

        let lone = vec![candidates[0].clone()];
        assert_eq!(narrow("夏目", &lone), SearchResult::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(index()[2].to_string(), "「猫町」萩原朔太郎(ちくま文庫)");
    }

    #[test]
    fn test_from_fields() {
        let mut row: Vec<String> = (0..55).map(|i| i.to_string()).collect();
        row[1] = "猫町".to_string();
        let c = Candidate::from_fields(&row[..]).unwrap();
        assert_eq!(c.title, "猫町");
        assert_eq!(c.last_name, "15");
        assert_eq!(c.url, "45");
        assert!(Candidate::from_fields(&row[..40]).is_none());
    }
}
