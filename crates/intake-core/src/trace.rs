use crate::extract::FieldCandidate;
use crate::model::{Confidence, SectionKind};
use crate::parsing::sections::Section;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// What validation did with a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Disposition {
    /// Became the field's value.
    Selected,
    /// Usable, but lost to a higher-confidence or later answer.
    Superseded,
    /// Blank or placeholder answer.
    NoAnswer,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTrace {
    pub kind: SectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub line_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    /// Lines no extractor used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unclaimed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTrace {
    pub candidate_id: String,
    pub field: String,
    pub raw_value: String,
    pub confidence: Confidence,
    pub page_number: usize,
    pub line_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub disposition: Disposition,
}

/// Diagnostic record of one parse: what each stage saw and decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTrace {
    pub trace_schema_version: String,
    pub raw_line_count: usize,
    pub logical_line_count: usize,
    pub sections: Vec<SectionTrace>,
    pub candidates: Vec<CandidateTrace>,
}

impl Default for ParseTrace {
    fn default() -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            raw_line_count: 0,
            logical_line_count: 0,
            sections: Vec::new(),
            candidates: Vec::new(),
        }
    }
}

impl ParseTrace {
    /// Candidates for one field, in document order.
    pub fn candidates_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a CandidateTrace> {
        self.candidates.iter().filter(move |c| c.field == field)
    }
}

pub fn build_section_traces(
    sections: &[Section],
    unclaimed: &BTreeSet<usize>,
) -> Vec<SectionTrace> {
    sections
        .iter()
        .map(|s| SectionTrace {
            kind: s.kind,
            header: s.header.as_ref().map(|h| h.text.clone()),
            line_count: s.lines.len(),
            page_number: s.page_number(),
            unclaimed: s
                .lines
                .iter()
                .filter(|l| unclaimed.contains(&l.ordinal))
                .map(|l| l.text.clone())
                .collect(),
        })
        .collect()
}

pub fn build_candidate_traces(
    candidates: &[FieldCandidate],
    dispositions: &[Disposition],
) -> Vec<CandidateTrace> {
    candidates
        .iter()
        .zip(dispositions)
        .enumerate()
        .map(|(idx, (c, d))| CandidateTrace {
            candidate_id: format!("cand_{}", idx),
            field: c.field.clone(),
            raw_value: c.value.raw(),
            confidence: c.confidence,
            page_number: c.source.page_number,
            line_index: c.source.line_index,
            note: c.note.clone(),
            disposition: d.clone(),
        })
        .collect()
}
