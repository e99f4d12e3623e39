use crate::extract::{CandidateValue, FieldCandidate};
use crate::model::{Confidence, FieldValue, ManifestEntry, RecoveryStatus, SCALE_DEFAULT};
use crate::parsing::values::{
    is_none_answer, is_placeholder, parse_decimal, parse_integer, parse_rating, split_list,
};
use crate::template::schema::{FieldDef, ValueType};
use crate::template::CompiledTemplate;
use crate::trace::Disposition;
use rust_decimal::Decimal;

/// Outcome of checking one candidate against its field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Accepted(FieldValue),
    /// Blank or placeholder answer.
    NoAnswer,
    Rejected(String),
}

/// The value and manifest entry chosen for one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub id: String,
    pub value: FieldValue,
    pub entry: ManifestEntry,
}

#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// One per template field, in template order.
    pub fields: Vec<ResolvedField>,
    /// Parallel to the candidate slice that was validated.
    pub dispositions: Vec<Disposition>,
}

/// Coerce every candidate to its field's type and pick one value per field.
///
/// Usable candidates compete on confidence first (`Matched` beats
/// `Inferred`), then on document position (the later answer wins). Fields
/// without a usable candidate get a substitute: the scale midpoint for
/// ratings, an empty list for selections, `Unknown` otherwise.
pub fn validate(candidates: &[FieldCandidate], template: &CompiledTemplate) -> Validation {
    let mut dispositions = vec![Disposition::NoAnswer; candidates.len()];
    let mut fields = Vec::with_capacity(template.fields().len());

    for field in template.fields() {
        let mut accepted: Vec<(usize, FieldValue)> = Vec::new();
        let mut notes = Vec::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            if candidate.field != field.id {
                continue;
            }
            match check(field, &candidate.value, template) {
                Verdict::Accepted(value) => accepted.push((idx, value)),
                Verdict::NoAnswer => dispositions[idx] = Disposition::NoAnswer,
                Verdict::Rejected(reason) => {
                    notes.push(format!(
                        "discarded '{}' at {}: {}",
                        candidate.value.raw(),
                        candidate.source,
                        reason
                    ));
                    dispositions[idx] = Disposition::Rejected { reason };
                }
            }
        }

        let winner = accepted
            .iter()
            .enumerate()
            .max_by_key(|(_, (idx, _))| (candidates[*idx].confidence, candidates[*idx].position))
            .map(|(n, _)| n);

        let resolved = match winner {
            Some(n) => {
                let (idx, value) = accepted.swap_remove(n);
                for (other, _) in &accepted {
                    dispositions[*other] = Disposition::Superseded;
                }
                dispositions[idx] = Disposition::Selected;

                let winner = &candidates[idx];
                if let Some(ref note) = winner.note {
                    notes.insert(0, note.clone());
                }
                match accepted.len() {
                    0 => {}
                    1 => notes.push("1 other answer superseded".into()),
                    n => notes.push(format!("{n} other answers superseded")),
                }

                let status = match winner.confidence {
                    Confidence::Matched => RecoveryStatus::Recovered,
                    Confidence::Inferred => RecoveryStatus::Inferred,
                };
                ResolvedField {
                    id: field.id.clone(),
                    value,
                    entry: ManifestEntry {
                        status,
                        confidence: Some(winner.confidence),
                        source: Some(winner.source),
                        notes,
                    },
                }
            }
            None => unresolved(field, notes),
        };
        fields.push(resolved);
    }

    Validation {
        fields,
        dispositions,
    }
}

fn unresolved(field: &FieldDef, notes: Vec<String>) -> ResolvedField {
    let (value, status) = match field.value_type {
        ValueType::Scale => (FieldValue::Scale(SCALE_DEFAULT), RecoveryStatus::Defaulted),
        ValueType::Selection if field.required => {
            (FieldValue::Selection(Vec::new()), RecoveryStatus::MissingRequired)
        }
        ValueType::Selection => (FieldValue::Selection(Vec::new()), RecoveryStatus::Missing),
        _ if field.required => (FieldValue::Unknown, RecoveryStatus::MissingRequired),
        _ => (FieldValue::Unknown, RecoveryStatus::Missing),
    };
    ResolvedField {
        id: field.id.clone(),
        value,
        entry: ManifestEntry {
            status,
            confidence: None,
            source: None,
            notes,
        },
    }
}

fn check(field: &FieldDef, value: &CandidateValue, template: &CompiledTemplate) -> Verdict {
    let text = match value {
        CandidateValue::Rating(v) if field.value_type == ValueType::Scale => {
            return Verdict::Accepted(FieldValue::Scale(*v));
        }
        CandidateValue::Options(items) if field.value_type == ValueType::Selection => {
            return Verdict::Accepted(FieldValue::Selection(clean_selection(
                field, items, template,
            )));
        }
        CandidateValue::Options(_) => {
            return Verdict::Rejected("checkbox answer for a field that takes a single value".into())
        }
        CandidateValue::Rating(v) => v.to_string(),
        CandidateValue::Text(s) => s.trim().to_string(),
    };

    if is_placeholder(&text) {
        return Verdict::NoAnswer;
    }

    match field.value_type {
        ValueType::Text => check_text(field, &text, template),
        ValueType::Integer => match parse_integer(&text) {
            Ok(Some(v)) => in_range(field, Decimal::from(v), FieldValue::Integer(v)),
            Ok(None) => Verdict::NoAnswer,
            Err(e) => Verdict::Rejected(e.to_string()),
        },
        ValueType::Decimal => match parse_decimal(&text) {
            Ok(Some(v)) => in_range(field, v, FieldValue::Number(v.normalize())),
            Ok(None) => Verdict::NoAnswer,
            Err(e) => Verdict::Rejected(e.to_string()),
        },
        ValueType::Choice => match template.choice_option(&field.id, &text) {
            Some(option) => Verdict::Accepted(FieldValue::Text(option.to_string())),
            None => Verdict::Rejected(format!(
                "'{}' is not one of: {}",
                text,
                field.options.join(", ")
            )),
        },
        ValueType::Scale => match parse_rating(&text) {
            Ok(Some(r)) => Verdict::Accepted(FieldValue::Scale(r.value)),
            Ok(None) => Verdict::NoAnswer,
            Err(e) => Verdict::Rejected(e.to_string()),
        },
        ValueType::Selection => {
            if is_none_answer(&text) {
                Verdict::Accepted(FieldValue::Selection(Vec::new()))
            } else {
                Verdict::Accepted(FieldValue::Selection(clean_selection(
                    field,
                    &split_list(&text),
                    template,
                )))
            }
        }
    }
}

fn check_text(field: &FieldDef, text: &str, template: &CompiledTemplate) -> Verdict {
    // An answer that opens with another field's label is two answers run together.
    if let Some(split) = template.split_colon(text) {
        if split.field.id != field.id {
            return Verdict::Rejected(format!("runs into the '{}' label", split.field.id));
        }
    }
    if let Some(re) = template.pattern(&field.id) {
        if !re.is_match(text) {
            return Verdict::Rejected(format!("does not match the expected format {}", re.as_str()));
        }
    }
    Verdict::Accepted(FieldValue::Text(text.to_string()))
}

fn in_range(field: &FieldDef, v: Decimal, value: FieldValue) -> Verdict {
    let below = field.min.is_some_and(|min| v < min);
    let above = field.max.is_some_and(|max| v > max);
    if below || above {
        let bound = |b: Option<Decimal>| b.map_or_else(|| "..".to_string(), |d| d.to_string());
        return Verdict::Rejected(format!(
            "{} is outside the allowed range {} to {}",
            v.normalize(),
            bound(field.min),
            bound(field.max)
        ));
    }
    Verdict::Accepted(value)
}

/// Trim, map to the template's spelling where the option is known, and drop
/// case-insensitive duplicates keeping the first.
fn clean_selection(field: &FieldDef, items: &[String], template: &CompiledTemplate) -> Vec<String> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let canonical = template
            .canonical_option(&field.id, item)
            .unwrap_or(item)
            .to_string();
        let key = canonical.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(canonical);
        }
    }
    out
}
