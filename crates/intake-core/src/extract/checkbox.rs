use super::{label_split, CandidateValue, Extraction, FieldCandidate, FieldExtractor};
use crate::model::Confidence;
use crate::parsing::lines::LogicalLine;
use crate::parsing::sections::Section;
use crate::parsing::values::{is_none_answer, split_list};
use crate::template::schema::FieldDef;
use crate::template::CompiledTemplate;
use tracing::debug;

/// Checkbox groups. Every checkbox line is claimed; checked options go to the
/// section's selection field, or failing that to whichever multi-select
/// field lists the option in its vocabulary.
///
/// A selection section without any boxes may hold the choices written out
/// ("Dumbbells, yoga mat"); such lines become an `Inferred` selection.
pub struct CheckboxExtractor<'t> {
    template: &'t CompiledTemplate,
}

impl<'t> CheckboxExtractor<'t> {
    pub fn new(template: &'t CompiledTemplate) -> Self {
        CheckboxExtractor { template }
    }

    /// Unlabeled lines naming at least one known option of `field`, or
    /// answering "none".
    fn written_list(&self, section: &Section, field: &FieldDef, out: &mut Extraction) {
        let mut first_line: Option<&LogicalLine> = None;
        let mut options = Vec::new();

        for line in &section.lines {
            if label_split(self.template, &line.text).is_some() {
                continue;
            }
            if !is_none_answer(&line.text) {
                let items = split_list(&line.text);
                let known = items
                    .iter()
                    .any(|item| self.template.canonical_option(&field.id, item).is_some());
                if !known {
                    continue;
                }
                options.extend(items);
            }
            out.claimed.insert(line.ordinal);
            first_line.get_or_insert(line);
        }

        if let Some(line) = first_line {
            out.candidates.push(
                FieldCandidate::new(
                    field,
                    CandidateValue::Options(options),
                    Confidence::Inferred,
                    line,
                )
                .with_note(Some(format!("written list under {}", section.kind))),
            );
        }
    }
}

impl FieldExtractor for CheckboxExtractor<'_> {
    fn name(&self) -> &'static str {
        "checkbox"
    }

    fn extract(&self, section: &Section) -> Extraction {
        let mut out = Extraction::default();
        let mut first_line: Option<&LogicalLine> = None;
        let mut checked: Vec<(String, &LogicalLine)> = Vec::new();

        for line in &section.lines {
            let Some(items) = self.template.checkbox_items(&line.text) else {
                continue;
            };
            out.claimed.insert(line.ordinal);
            first_line.get_or_insert(line);
            checked.extend(
                items
                    .into_iter()
                    .filter(|item| item.checked)
                    .map(|item| (item.label, line)),
            );
        }

        let target = self
            .template
            .section(section.kind)
            .and_then(|s| s.selection_field.as_deref())
            .and_then(|id| self.template.field(id));

        let Some(first_line) = first_line else {
            if let Some(field) = target {
                self.written_list(section, field, &mut out);
            }
            return out;
        };

        if let Some(field) = target {
            let options = checked.into_iter().map(|(label, _)| label).collect();
            out.candidates.push(FieldCandidate::new(
                field,
                CandidateValue::Options(options),
                Confidence::Matched,
                first_line,
            ));
            return out;
        }

        // No declared target: route each option by vocabulary.
        let mut routed: Vec<(&str, Vec<String>, &LogicalLine)> = Vec::new();
        for (label, line) in checked {
            let Some(owner) = self.template.option_owner(&label) else {
                debug!(section = %section.kind, option = %label, "checked option with no owning field");
                continue;
            };
            match routed.iter_mut().find(|(id, _, _)| *id == owner.id) {
                Some((_, options, _)) => options.push(label),
                None => routed.push((owner.id.as_str(), vec![label], line)),
            }
        }

        for (id, options, line) in routed {
            if let Some(field) = self.template.field(id) {
                out.candidates.push(FieldCandidate::new(
                    field,
                    CandidateValue::Options(options),
                    Confidence::Inferred,
                    line,
                ));
            }
        }

        out
    }
}
