//! Ticker symbol extraction from free-text labels.
//!
//! Three strategies are tried in order and the first hit wins:
//!
//! 1. **Leading run**: 1-5 uppercase ASCII letters at the start of the
//!    left-trimmed label (`"VST (Vistra)"`). A single letter directly
//!    followed by a lowercase letter is a capitalized word, not a symbol,
//!    and falls through (`"Vistra"`).
//! 2. **Parenthesized**: `(VST)` anywhere in the label.
//! 3. **Standalone token**: the first word-bounded run of 1-5 uppercase
//!    letters anywhere in the label (`"Buy VST on dips"`).

use regex_lite::Regex;
use std::sync::OnceLock;

/// Leading run of 1-5 capitals that ends at a word boundary or a non-capital.
const LEADING_RUN: &str = r"^([A-Z]{1,5})(?:\b|[^A-Z])";
/// Capitals wrapped in parentheses.
const PARENTHESIZED: &str = r"\(([A-Z]{1,5})\)";
/// Word-bounded run of capitals.
const STANDALONE: &str = r"\b([A-Z]{1,5})\b";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("ticker patterns are valid regexes"))
}

fn leading_run() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, LEADING_RUN)
}

fn parenthesized() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, PARENTHESIZED)
}

fn standalone() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, STANDALONE)
}

/// Extract a plausible ticker symbol from a label.
///
/// Pure and total: returns `None` when no strategy matches.
///
/// ```
/// use causal_layout::extract_ticker;
///
/// assert_eq!(extract_ticker("VST (Vistra)").as_deref(), Some("VST"));
/// assert_eq!(extract_ticker("Vistra (VST)").as_deref(), Some("VST"));
/// assert_eq!(extract_ticker("Buy VST on dips").as_deref(), Some("VST"));
/// assert_eq!(extract_ticker("vistra"), None);
/// ```
pub fn extract_ticker(label: &str) -> Option<String> {
    from_leading_run(label)
        .or_else(|| first_capture(parenthesized(), label))
        .or_else(|| first_capture(standalone(), label))
        .map(str::to_string)
}

fn from_leading_run(label: &str) -> Option<&str> {
    let trimmed = label.trim_start();
    let candidate = first_capture(leading_run(), trimmed)?;

    let next = trimmed[candidate.len()..].chars().next();
    let capitalized_word = candidate.len() == 1 && next.is_some_and(|c| c.is_ascii_lowercase());
    if capitalized_word {
        None
    } else {
        Some(candidate)
    }
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
