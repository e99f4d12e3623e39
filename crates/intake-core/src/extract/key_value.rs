use super::{label_split, CandidateValue, Extraction, FieldCandidate, FieldExtractor};
use crate::model::{Confidence, FieldCategory};
use crate::parsing::lines::LogicalLine;
use crate::parsing::sections::Section;
use crate::template::schema::ValueType;
use crate::template::CompiledTemplate;

/// Labelled answers: "Name: John Doe", "Age 30", "Medical conditions:" with
/// the answer on the following line(s), plus the positional fallback for
/// fields that declare one.
///
/// Scale fields are left to [`super::ScaleExtractor`].
pub struct KeyValueExtractor<'t> {
    template: &'t CompiledTemplate,
}

impl<'t> KeyValueExtractor<'t> {
    pub fn new(template: &'t CompiledTemplate) -> Self {
        KeyValueExtractor { template }
    }

    /// An unlabeled, non-checkbox line that can serve as a detached answer.
    fn is_bare(&self, line: &LogicalLine) -> bool {
        !self.template.is_checkbox_line(&line.text)
            && label_split(self.template, &line.text).is_none()
    }

    fn fallback(&self, section: &Section, out: &mut Extraction) {
        for field in self.template.fields() {
            if field.fallback_section != Some(section.kind) {
                continue;
            }
            let answered = out
                .candidates
                .iter()
                .any(|c| c.field == field.id && c.confidence == Confidence::Matched);
            if answered {
                continue;
            }

            let line = section.lines.iter().find(|l| {
                !out.claimed.contains(&l.ordinal) && !l.text.contains(':') && self.is_bare(l)
            });
            if let Some(line) = line {
                out.claimed.insert(line.ordinal);
                out.candidates.push(
                    FieldCandidate::new(
                        field,
                        CandidateValue::Text(line.text.clone()),
                        Confidence::Inferred,
                        line,
                    )
                    .with_note(Some(format!("positional answer in {}", section.kind))),
                );
            }
        }
    }
}

impl FieldExtractor for KeyValueExtractor<'_> {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn extract(&self, section: &Section) -> Extraction {
        let mut out = Extraction::default();
        let lines = &section.lines;

        for (i, line) in lines.iter().enumerate() {
            if out.claimed.contains(&line.ordinal) || self.template.is_checkbox_line(&line.text) {
                continue;
            }
            let Some(split) = label_split(self.template, &line.text) else {
                continue;
            };
            if split.field.value_type == ValueType::Scale {
                continue;
            }
            out.claimed.insert(line.ordinal);

            if !split.value.is_empty() {
                out.candidates.push(FieldCandidate::new(
                    split.field,
                    CandidateValue::Text(split.value.to_string()),
                    Confidence::Matched,
                    line,
                ));
                continue;
            }

            // "Label:" with the answer below it
            let take = if split.field.category == FieldCategory::FreeText {
                usize::MAX
            } else {
                1
            };
            let answer: Vec<&LogicalLine> = lines[i + 1..]
                .iter()
                .take_while(|l| self.is_bare(l))
                .take(take)
                .collect();

            if answer.is_empty() {
                // Keep the blank answer visible to validation.
                out.candidates.push(FieldCandidate::new(
                    split.field,
                    CandidateValue::Text(String::new()),
                    Confidence::Matched,
                    line,
                ));
                continue;
            }

            let text = answer
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            out.claimed.extend(answer.iter().map(|l| l.ordinal));
            out.candidates.push(
                FieldCandidate::new(
                    split.field,
                    CandidateValue::Text(text),
                    Confidence::Inferred,
                    line,
                )
                .with_note(Some("answer on following line".into())),
            );
        }

        self.fallback(section, &mut out);
        out
    }
}
