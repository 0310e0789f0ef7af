//! Small pure extractors used by the action parser. None of these fail:
//! the absence of a match is `None`, never an error.

use regex::Regex;
use std::sync::LazyLock;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'](.+?)["']"#).expect("valid regex"));
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9 ._-]{2,80}").expect("valid regex"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid regex"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid regex"));
static DATE_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("valid regex"));
static DATE_WORDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\s+[A-Za-z]{3,9}\s*\d{0,4}").expect("valid regex"));

/// First single- or double-quoted substring, quotes stripped.
pub fn quoted(s: &str) -> Option<String> {
    QUOTED
        .captures(s)
        .map(|c| c[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clickable label: a quoted substring, else the first bare run of
/// label-ish characters (2 to 80 long).
pub fn label(s: &str) -> Option<String> {
    if let Some(q) = quoted(s) {
        return Some(q);
    }
    LABEL
        .find(s)
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First email-shaped substring.
pub fn email(s: &str) -> Option<String> {
    EMAIL.find(s).map(|m| m.as_str().to_string())
}

/// First unsigned integer.
pub fn first_number(s: &str) -> Option<u64> {
    NUMBER.find(s).and_then(|m| m.as_str().parse().ok())
}

/// First URL-shaped substring (`http(s)://...` or `www....`).
pub fn url(s: &str) -> Option<String> {
    URL.find(s).map(|m| m.as_str().to_string())
}

/// Last whitespace-delimited token of the sentence.
pub fn last_token(s: &str) -> Option<String> {
    s.split_whitespace().last().map(|t| t.to_string())
}

/// A date-shaped substring: `D[D][/-]M[M][/-]YY[YY]`, else `D[D] Month[ YYYY]`.
pub fn date(s: &str) -> Option<String> {
    if let Some(m) = DATE_NUMERIC.find(s) {
        return Some(m.as_str().to_string());
    }
    DATE_WORDED.find(s).map(|m| m.as_str().trim().to_string())
}

/// Field names recognized anywhere in a clause, scanned in this order.
const TARGET_WORDS: [&str; 8] = [
    "username", "user", "email", "password", "search", "country", "exam", "date",
];

/// Guess which field a clause refers to: the first known field word found in
/// sentence + remainder, else the remainder itself when it is short enough to
/// plausibly be a descriptor.
pub fn guess_target(sentence: &str, remainder: &str) -> Option<String> {
    let haystack = format!("{} {}", sentence.to_lowercase(), remainder.to_lowercase());
    for word in TARGET_WORDS {
        if haystack.contains(word) {
            return Some(word.to_string());
        }
    }
    let trimmed = remainder.trim();
    if !trimmed.is_empty() && trimmed.split_whitespace().count() <= 4 {
        return Some(trimmed.to_string());
    }
    None
}
