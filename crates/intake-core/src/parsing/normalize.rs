use regex::Regex;
use std::sync::LazyLock;

static QUESTION_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:q(?:uestion)?\s*)?\d{1,3}\s*[.):]\s*").unwrap()
});

/// Normalize a questionnaire label (or header line) to a lookup key.
///
/// Steps:
/// 1. Drop parenthetical hints: "Weight (kg)" -> "Weight"
/// 2. Drop leading question numbering: "3. Age", "Q3) Age" -> "Age"
/// 3. Lowercase
/// 4. Every run of non-alphanumeric characters becomes a single space
pub fn normalize_label(raw: &str) -> String {
    let without_parens = strip_parentheticals(raw.trim());
    let s = QUESTION_NUMBER_RE.replace(without_parens.trim(), "");

    let mut result = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_space && !result.is_empty() {
                result.push(' ');
            }
            pending_space = false;
            result.push(c);
        } else {
            pending_space = true;
        }
    }

    result
}

/// Remove "( ... )" groups. An unbalanced "(" keeps the rest of the text.
fn strip_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    let mut since_open = String::new();

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                since_open.push(c);
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    since_open.clear();
                } else {
                    since_open.push(c);
                }
            }
            _ if depth > 0 => since_open.push(c),
            _ => out.push(c),
        }
    }

    out.push_str(&since_open);
    out
}

/// True if `phrase` (already normalized) occurs in `haystack` (already
/// normalized) on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack
        .match_indices(phrase)
        .any(|(idx, _)| {
            let before_ok = idx == 0 || haystack[..idx].ends_with(' ');
            let end = idx + phrase.len();
            let after_ok = end == haystack.len() || haystack[end..].starts_with(' ');
            before_ok && after_ok
        })
}
