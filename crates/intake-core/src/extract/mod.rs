pub mod checkbox;
pub mod free_text;
pub mod key_value;
pub mod scale;

use crate::model::{Confidence, FieldCategory, SourceRef};
use crate::parsing::lines::LogicalLine;
use crate::parsing::sections::Section;
use crate::parsing::values::{looks_like_rating, looks_numeric};
use crate::template::compiled::LabelSplit;
use crate::template::schema::{FieldDef, ValueType};
use crate::template::CompiledTemplate;
use std::collections::BTreeSet;
use tracing::{debug, trace};

pub use checkbox::CheckboxExtractor;
pub use free_text::FreeTextExtractor;
pub use key_value::KeyValueExtractor;
pub use scale::ScaleExtractor;

/// A raw answer as an extractor saw it, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateValue {
    Text(String),
    /// Already rounded and clamped to 1-10.
    Rating(u8),
    /// Checked options, in line order.
    Options(Vec<String>),
}

impl CandidateValue {
    /// The value as it reads in the document, for diagnostics.
    pub fn raw(&self) -> String {
        match self {
            CandidateValue::Text(s) => s.clone(),
            CandidateValue::Rating(v) => v.to_string(),
            CandidateValue::Options(items) => items.join(", "),
        }
    }
}

/// One possible answer for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate {
    pub field: String,
    pub category: FieldCategory,
    pub value: CandidateValue,
    pub confidence: Confidence,
    /// Ordinal of the logical line the answer was found on.
    pub position: usize,
    pub source: SourceRef,
    /// Adjustment made while extracting, e.g. "clamped from 13".
    pub note: Option<String>,
}

impl FieldCandidate {
    pub(crate) fn new(
        field: &FieldDef,
        value: CandidateValue,
        confidence: Confidence,
        line: &LogicalLine,
    ) -> Self {
        FieldCandidate {
            field: field.id.clone(),
            category: field.category,
            value,
            confidence,
            position: line.ordinal,
            source: line.source(),
            note: None,
        }
    }

    pub(crate) fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// What one extractor found in one section.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub candidates: Vec<FieldCandidate>,
    /// Ordinals of lines this extractor consumed.
    pub claimed: BTreeSet<usize>,
}

/// A matcher for one category of answers.
pub trait FieldExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, section: &Section) -> Extraction;
}

/// Everything the extractors produced for one document.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub candidates: Vec<FieldCandidate>,
    /// Ordinals of data lines no extractor used.
    pub unclaimed: BTreeSet<usize>,
}

/// Run every extractor over every section.
///
/// Extractors run in a fixed order (key-value, scale, checkbox, free text)
/// and each one sees only the lines the earlier ones left unclaimed. Lines
/// still unclaimed at the end are reported, and noted on the section's
/// selection answer when there is one.
pub fn extract_all(sections: &[Section], template: &CompiledTemplate) -> Extracted {
    let key_value = KeyValueExtractor::new(template);
    let scale = ScaleExtractor::new(template);
    let checkbox = CheckboxExtractor::new(template);
    let free_text = FreeTextExtractor::new(template);
    let extractors: [&dyn FieldExtractor; 4] = [&key_value, &scale, &checkbox, &free_text];

    let mut out = Extracted::default();
    for section in sections {
        let first_candidate = out.candidates.len();
        let mut claimed = BTreeSet::new();
        for extractor in extractors {
            let remaining = section.retain_lines(|l| !claimed.contains(&l.ordinal));
            let found = extractor.extract(&remaining);
            log_found(extractor.name(), section, &found);
            claimed.extend(found.claimed);
            out.candidates.extend(found.candidates);
        }

        let unused: Vec<usize> = section
            .lines
            .iter()
            .map(|l| l.ordinal)
            .filter(|o| !claimed.contains(o))
            .collect();
        if unused.is_empty() {
            continue;
        }
        debug!(section = %section.kind, lines = unused.len(), "unclaimed lines dropped");

        let selection = template
            .section(section.kind)
            .and_then(|s| s.selection_field.as_deref());
        if let Some(id) = selection {
            let note = format!(
                "{} unlabeled line(s) under {} not used",
                unused.len(),
                section.kind
            );
            if let Some(c) = out.candidates[first_candidate..]
                .iter_mut()
                .find(|c| c.field == id)
            {
                c.note = Some(match c.note.take() {
                    Some(prev) => format!("{prev}; {note}"),
                    None => note,
                });
            }
        }
        out.unclaimed.extend(unused);
    }

    out
}

fn log_found(extractor: &str, section: &Section, found: &Extraction) {
    for c in &found.candidates {
        trace!(
            extractor,
            section = %section.kind,
            field = %c.field,
            value = %c.value.raw(),
            confidence = ?c.confidence,
            "candidate"
        );
    }
}

/// Split a line on a known label: "Label: value", or "Label value" when the
/// value has the shape the field expects (a number, a rating).
pub(crate) fn label_split<'t, 'l>(
    template: &'t CompiledTemplate,
    text: &'l str,
) -> Option<LabelSplit<'t, 'l>> {
    if let Some(split) = template.split_colon(text) {
        return Some(split);
    }
    template
        .split_keyword(text)
        .filter(|s| match s.field.value_type {
            ValueType::Integer | ValueType::Decimal => looks_numeric(s.value),
            ValueType::Scale => looks_like_rating(s.value),
            _ => false,
        })
}
