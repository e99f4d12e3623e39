use super::{label_split, CandidateValue, Extraction, FieldCandidate, FieldExtractor};
use crate::model::{Confidence, SectionKind};
use crate::parsing::sections::Section;
use crate::parsing::values::parse_rating;
use crate::template::schema::ValueType;
use crate::template::CompiledTemplate;

/// 1-10 self-assessment answers: "Energy level: 7", "Sleep quality 6/10".
///
/// Only an exact in-range rating inside the assessment-scales section is
/// `Matched`. Ratings found elsewhere, clamped ratings and rounded fractions
/// are `Inferred`. An unreadable rating is passed on as text so validation
/// can record why it was dropped.
pub struct ScaleExtractor<'t> {
    template: &'t CompiledTemplate,
}

impl<'t> ScaleExtractor<'t> {
    pub fn new(template: &'t CompiledTemplate) -> Self {
        ScaleExtractor { template }
    }
}

impl FieldExtractor for ScaleExtractor<'_> {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn extract(&self, section: &Section) -> Extraction {
        let mut out = Extraction::default();
        let in_scales = section.kind == SectionKind::AssessmentScales;

        for line in &section.lines {
            if self.template.is_checkbox_line(&line.text) {
                continue;
            }
            let Some(split) = label_split(self.template, &line.text) else {
                continue;
            };
            if split.field.value_type != ValueType::Scale {
                continue;
            }
            out.claimed.insert(line.ordinal);

            let section_confidence = if in_scales {
                Confidence::Matched
            } else {
                Confidence::Inferred
            };

            let candidate = match parse_rating(split.value) {
                Ok(Some(rating)) => {
                    let confidence = if rating.is_exact() {
                        section_confidence
                    } else {
                        Confidence::Inferred
                    };
                    FieldCandidate::new(
                        split.field,
                        CandidateValue::Rating(rating.value),
                        confidence,
                        line,
                    )
                    .with_note(rating.note())
                }
                Ok(None) | Err(_) => FieldCandidate::new(
                    split.field,
                    CandidateValue::Text(split.value.to_string()),
                    section_confidence,
                    line,
                ),
            };
            out.candidates.push(candidate);
        }

        out
    }
}
