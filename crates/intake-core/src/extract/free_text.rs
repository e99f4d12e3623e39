use super::{CandidateValue, Extraction, FieldCandidate, FieldExtractor};
use crate::model::Confidence;
use crate::parsing::sections::Section;
use crate::template::CompiledTemplate;

/// Narrative sections: whatever lines are left once the other extractors have
/// claimed theirs, joined in order with single spaces. The answer is only
/// placed by position, so it is `Inferred` and loses to a labelled one.
pub struct FreeTextExtractor<'t> {
    template: &'t CompiledTemplate,
}

impl<'t> FreeTextExtractor<'t> {
    pub fn new(template: &'t CompiledTemplate) -> Self {
        FreeTextExtractor { template }
    }
}

impl FieldExtractor for FreeTextExtractor<'_> {
    fn name(&self) -> &'static str {
        "free_text"
    }

    /// Expects a section already reduced to its unclaimed lines.
    fn extract(&self, section: &Section) -> Extraction {
        let mut out = Extraction::default();

        let Some(field) = self
            .template
            .section(section.kind)
            .and_then(|s| s.narrative_field.as_deref())
            .and_then(|id| self.template.field(id))
        else {
            return out;
        };
        let Some(first) = section.lines.first() else {
            return out;
        };

        let text = section
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        out.claimed.extend(section.lines.iter().map(|l| l.ordinal));
        out.candidates.push(FieldCandidate::new(
            field,
            CandidateValue::Text(text),
            Confidence::Inferred,
            first,
        ));
        out
    }
}
