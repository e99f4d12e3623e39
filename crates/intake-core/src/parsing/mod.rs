pub mod lines;
pub mod normalize;
pub mod sections;
pub mod values;

use crate::assemble::assemble;
use crate::error::IntakeError;
use crate::extract::extract_all;
use crate::extraction::RawDocument;
use crate::model::StructuredRecord;
use crate::template::builtin::load_preset;
use crate::template::schema::TemplateDef;
use crate::template::CompiledTemplate;
use crate::trace::{build_candidate_traces, build_section_traces, ParseTrace, TRACE_SCHEMA_VERSION};
use crate::validate::validate;
use lines::normalize_lines;
use sections::segment;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one parse: the record and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestionnaire {
    pub record: StructuredRecord,
    pub trace: ParseTrace,
}

/// The extraction engine for one template.
///
/// Holds no per-document state; one parser can serve any number of parses,
/// concurrently if needed.
#[derive(Debug, Clone)]
pub struct QuestionnaireParser {
    template: CompiledTemplate,
}

impl QuestionnaireParser {
    pub fn new(template: TemplateDef) -> Result<Self, IntakeError> {
        Ok(QuestionnaireParser {
            template: CompiledTemplate::new(template)?,
        })
    }

    pub fn with_preset(name: &str) -> Result<Self, IntakeError> {
        Self::new(load_preset(name)?)
    }

    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    /// Run the whole pipeline over one document. Never fails; unreadable
    /// answers show up in the manifest instead.
    pub fn parse(&self, doc: &RawDocument) -> ParsedQuestionnaire {
        let raw_line_count = doc.line_count();
        let logical = normalize_lines(doc, &self.template);
        let logical_line_count = logical.len();
        debug!(raw_line_count, logical_line_count, "normalized lines");

        let sections = segment(logical, &self.template);
        debug!(
            sections = sections.len(),
            kinds = ?sections.iter().map(|s| s.kind).collect::<Vec<_>>(),
            "segmented"
        );

        let extracted = extract_all(&sections, &self.template);
        let candidates = extracted.candidates;
        debug!(
            candidates = candidates.len(),
            unclaimed = extracted.unclaimed.len(),
            "extracted"
        );

        let validation = validate(&candidates, &self.template);
        let trace = ParseTrace {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            raw_line_count,
            logical_line_count,
            sections: build_section_traces(&sections, &extracted.unclaimed),
            candidates: build_candidate_traces(&candidates, &validation.dispositions),
        };

        let record = assemble(self.template.name(), validation.fields);
        debug!(
            template = %record.template,
            resolved = record.manifest.entries.values().filter(|e| e.status.is_resolved()).count(),
            "assembled record"
        );

        ParsedQuestionnaire { record, trace }
    }
}
