use crate::extraction::RawDocument;
use crate::model::SourceRef;
use crate::template::CompiledTemplate;
use regex::Regex;
use std::sync::LazyLock;

/// "Something short:" at the start of a line, even when the label is unknown.
static GENERIC_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]{1,40}):").unwrap());

/// A gap wide enough to separate form columns in `pdftotext -layout` output.
static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t|\s{3,}").unwrap());

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[•\-*–·]|\d{1,3}[.)])\s").unwrap());

/// A cleaned line of questionnaire text, possibly joined from several wrapped
/// physical lines. Carries the origin of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Position in the whole document, from 0.
    pub ordinal: usize,
    pub page_number: usize,
    /// 1-based line number on the page.
    pub line_index: usize,
    pub text: String,
}

impl LogicalLine {
    pub fn source(&self) -> SourceRef {
        SourceRef {
            page_number: self.page_number,
            line_index: self.line_index,
        }
    }
}

/// Turn raw page text into logical lines.
///
/// Each physical line is split into form columns, stripped of control and
/// zero-width characters and whitespace-collapsed; empty lines are dropped.
/// A line is merged into the previous one when it looks like a wrapped
/// continuation: same page, the previous line does not end a statement, and
/// this line does not open with a label, checkbox, header or list marker.
pub fn normalize_lines(doc: &RawDocument, template: &CompiledTemplate) -> Vec<LogicalLine> {
    let mut out: Vec<LogicalLine> = Vec::new();

    for page in doc.pages() {
        for (i, raw) in page.lines.iter().enumerate() {
            for text in split_columns(raw, template) {
                if let Some(prev) = out.last_mut() {
                    if prev.page_number == page.page_number
                        && continues(&prev.text, &text, template)
                    {
                        join_wrapped(&mut prev.text, &text);
                        continue;
                    }
                }

                out.push(LogicalLine {
                    ordinal: out.len(),
                    page_number: page.page_number,
                    line_index: i + 1,
                    text,
                });
            }
        }
    }

    out
}

/// Split "Name:   Jane Roe     Age: 30" into one piece per labelled column.
/// A column that does not open with a label or checkbox stays with the one
/// before it ("Fitness level      6").
fn split_columns(raw: &str, template: &CompiledTemplate) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    for chunk in COLUMN_GAP_RE.split(raw) {
        let chunk = clean_line(chunk);
        if chunk.is_empty() {
            continue;
        }
        match pieces.last_mut() {
            Some(prev) if !looks_like_label(&chunk) && !template.is_checkbox_line(&chunk) => {
                prev.push(' ');
                prev.push_str(&chunk);
            }
            _ => pieces.push(chunk),
        }
    }
    pieces
}

/// Strip invisible characters and collapse whitespace.
pub fn clean_line(raw: &str) -> String {
    let visible: String = raw
        .chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| !is_invisible(*c))
        .collect();
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_invisible(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}' | '\u{FFFD}'
        )
}

fn continues(prev: &str, next: &str, template: &CompiledTemplate) -> bool {
    if closes_logical_line(prev, template) || opens_logical_line(next, template) {
        return false;
    }
    // A wrapped option label resumes in lower case. One that wraps before a
    // proper noun ("[x] Train for the" / "Boston marathon") stays split.
    !(template.is_checkbox_line(prev) && next.starts_with(char::is_uppercase))
}

fn closes_logical_line(prev: &str, template: &CompiledTemplate) -> bool {
    prev.ends_with(['.', '!', '?', ':', ';'])
        || is_title_like(prev)
        || template.match_header(prev).is_some()
}

fn opens_logical_line(line: &str, template: &CompiledTemplate) -> bool {
    template.is_checkbox_line(line)
        || LIST_MARKER_RE.is_match(line)
        || is_title_like(line)
        || looks_like_label(line)
        || template.starts_with_known_label(line)
        || template.match_header(line).is_some()
}

fn looks_like_label(line: &str) -> bool {
    GENERIC_LABEL_RE.captures(line).is_some_and(|caps| {
        let left = &caps[1];
        left.chars().any(char::is_alphabetic) && left.split_whitespace().count() <= 6
    })
}

/// Letters present and none of them lowercase: "GOALS", "JOHN DOE".
fn is_title_like(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

/// Join a continuation, healing words hyphenated across the break.
fn join_wrapped(prev: &mut String, next: &str) {
    let mut rev = prev.chars().rev();
    let hyphenated = rev.next() == Some('-') && rev.next().is_some_and(char::is_alphabetic);
    if hyphenated {
        prev.pop();
    } else {
        prev.push(' ');
    }
    prev.push_str(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PageContent;
    use crate::template::builtin::load_preset;

    fn fitness() -> CompiledTemplate {
        CompiledTemplate::new(load_preset("fitness").unwrap()).unwrap()
    }

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("  Name:\tJohn   Doe \u{200B}"), "Name: John Doe");
        assert_eq!(clean_line("\x07\x0c"), "");
        assert_eq!(clean_line("\u{f0fe} Dumbbells"), "\u{f0fe} Dumbbells");
    }

    #[test]
    fn test_empty_lines_dropped() {
        let doc = RawDocument::from_lines(&["", "   ", "Name: Ann", "\t"]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(texts(&lines), vec!["Name: Ann"]);
        assert_eq!(lines[0].line_index, 3);
    }

    #[test]
    fn test_wrapped_narrative_merged() {
        let doc = RawDocument::from_lines(&[
            "Medical conditions:",
            "Mild asthma, managed with an inhaler and",
            "occasional knee pain after long runs.",
            "Age: 30",
        ]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(
            texts(&lines),
            vec![
                "Medical conditions:",
                "Mild asthma, managed with an inhaler and occasional knee pain after long runs.",
                "Age: 30",
            ]
        );
        assert_eq!(lines[1].line_index, 2);
        assert_eq!(lines[2].ordinal, 2);
    }

    #[test]
    fn test_hyphenated_wrap_healed() {
        let doc = RawDocument::from_lines(&["I would like to improve my endur-", "ance for hiking"]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(texts(&lines), vec!["I would like to improve my endurance for hiking"]);
    }

    #[test]
    fn test_labels_and_checkboxes_not_merged() {
        let doc = RawDocument::from_lines(&[
            "Name: John Doe",
            "Age 30",
            "Occupation: teacher",
            "[x] Lose weight",
            "☐ Gain muscle",
            "- walking daily",
        ]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_no_merge_after_header_or_terminal_punctuation() {
        let doc = RawDocument::from_lines(&["GOALS", "get stronger.", "next thing"]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(texts(&lines), vec!["GOALS", "get stronger.", "next thing"]);
    }

    #[test]
    fn test_checkbox_followed_by_sentence() {
        let doc = RawDocument::from_lines(&[
            "[x] Improve endurance for",
            "trail running",
            "I also cycle to work.",
        ]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(
            texts(&lines),
            vec!["[x] Improve endurance for trail running", "I also cycle to work."]
        );
    }

    #[test]
    fn test_checkbox_wrap_before_capital_stays_split() {
        let doc = RawDocument::from_lines(&["[x] Train for the", "Boston marathon"]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(texts(&lines), vec!["[x] Train for the", "Boston marathon"]);
    }

    #[test]
    fn test_layout_columns_split() {
        let doc = RawDocument::from_lines(&[
            "  Name:    Jane Roe          Age:   41",
            "  Fitness level         6",
            "  [x] Morning      [ ] Evening",
        ]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(
            texts(&lines),
            vec!["Name: Jane Roe", "Age: 41", "Fitness level 6", "[x] Morning", "[ ] Evening"]
        );
        assert_eq!(lines[1].line_index, 1);
        assert_eq!(lines[2].line_index, 2);
    }

    #[test]
    fn test_no_merge_across_pages() {
        let doc = RawDocument::from_pages(vec![
            PageContent {
                page_number: 1,
                lines: vec!["I like running and".into()],
            },
            PageContent {
                page_number: 2,
                lines: vec!["swimming".into()],
            },
        ]);
        let lines = normalize_lines(&doc, &fitness());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].page_number, 2);
        assert_eq!(lines[1].line_index, 1);
    }

    #[test]
    fn test_empty_document() {
        let lines = normalize_lines(&RawDocument::default(), &fitness());
        assert!(lines.is_empty());
    }
}
