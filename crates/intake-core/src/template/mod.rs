pub mod builtin;
pub mod compiled;
pub mod schema;

use crate::error::IntakeError;
use crate::model::{FieldCategory, SectionKind};
use crate::parsing::normalize::normalize_label;
use regex::Regex;
use schema::{TemplateDef, ValueType};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub use compiled::CompiledTemplate;

/// Load a template from a JSON file.
pub fn load_template(path: &Path) -> Result<TemplateDef, IntakeError> {
    let content = std::fs::read_to_string(path).map_err(|e| IntakeError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_template(&content, path)
}

/// Parse a template from a JSON string.
pub fn parse_template(json: &str, source: &Path) -> Result<TemplateDef, IntakeError> {
    let template: TemplateDef =
        serde_json::from_str(json).map_err(|e| IntakeError::TemplateLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_template(&template)?;
    Ok(template)
}

/// Parse a template from a JSON string (no file path context).
pub fn parse_template_str(json: &str) -> Result<TemplateDef, IntakeError> {
    let template: TemplateDef = serde_json::from_str(json).map_err(IntakeError::Json)?;
    validate_template(&template)?;
    Ok(template)
}

/// Validate that a template is well-formed.
pub fn validate_template(template: &TemplateDef) -> Result<(), IntakeError> {
    if template.fields.is_empty() {
        return Err(IntakeError::TemplateInvalid("fields must not be empty".into()));
    }

    let glyphs = &template.checkbox;
    if glyphs.checked.is_empty() || glyphs.unchecked.is_empty() {
        return Err(IntakeError::TemplateInvalid(
            "checkbox glyph sets must not be empty".into(),
        ));
    }
    if let Some(g) = glyphs.checked.iter().find(|g| glyphs.unchecked.contains(*g)) {
        return Err(IntakeError::TemplateInvalid(format!(
            "glyph '{}' is both checked and unchecked",
            g
        )));
    }

    let mut ids = HashSet::new();
    for field in &template.fields {
        if field.id.trim().is_empty() {
            return Err(IntakeError::TemplateInvalid("field id must not be empty".into()));
        }
        if !ids.insert(field.id.as_str()) {
            return Err(IntakeError::TemplateInvalid(format!(
                "duplicate field id '{}'",
                field.id
            )));
        }
    }

    let mut section_kinds = HashSet::new();
    for section in &template.sections {
        if section.kind == SectionKind::Unsectioned {
            return Err(IntakeError::TemplateInvalid(
                "'unsectioned' is implicit and cannot be declared".into(),
            ));
        }
        if !section_kinds.insert(section.kind) {
            return Err(IntakeError::TemplateInvalid(format!(
                "section '{}' declared twice",
                section.kind
            )));
        }
        if section.headers.iter().all(|h| normalize_label(h).is_empty()) {
            return Err(IntakeError::TemplateInvalid(format!(
                "section '{}' has no header phrases",
                section.kind
            )));
        }
        if let Some(ref id) = section.selection_field {
            match template.field(id) {
                Some(f) if f.value_type == ValueType::Selection => {}
                _ => {
                    return Err(IntakeError::TemplateInvalid(format!(
                        "section '{}' selection_field '{}' is not a selection field",
                        section.kind, id
                    )))
                }
            }
        }
        if let Some(ref id) = section.narrative_field {
            match template.field(id) {
                Some(f) if f.value_type == ValueType::Text => {}
                _ => {
                    return Err(IntakeError::TemplateInvalid(format!(
                        "section '{}' narrative_field '{}' is not a text field",
                        section.kind, id
                    )))
                }
            }
        }
    }

    let mut label_owner: HashMap<String, &str> = HashMap::new();
    for field in &template.fields {
        let expected_type = match field.category {
            FieldCategory::ScaleRating => Some(ValueType::Scale),
            FieldCategory::MultiSelect => Some(ValueType::Selection),
            FieldCategory::FreeText => Some(ValueType::Text),
            FieldCategory::Identity | FieldCategory::NumericMetric => None,
        };
        let type_ok = match expected_type {
            Some(t) => field.value_type == t,
            None => !matches!(field.value_type, ValueType::Scale | ValueType::Selection),
        };
        if !type_ok {
            return Err(IntakeError::TemplateInvalid(format!(
                "field '{}' has value type {:?} which does not fit category {:?}",
                field.id, field.value_type, field.category
            )));
        }

        let section_target = template.sections.iter().any(|s| {
            s.selection_field.as_deref() == Some(field.id.as_str())
                || s.narrative_field.as_deref() == Some(field.id.as_str())
        });
        if field.labels.is_empty() && !section_target {
            return Err(IntakeError::TemplateInvalid(format!(
                "field '{}' has no labels and is not a section target",
                field.id
            )));
        }

        for label in &field.labels {
            let key = normalize_label(label);
            if key.is_empty() {
                return Err(IntakeError::TemplateInvalid(format!(
                    "field '{}' has an empty label",
                    field.id
                )));
            }
            if let Some(owner) = label_owner.insert(key.clone(), field.id.as_str()) {
                if owner != field.id {
                    return Err(IntakeError::TemplateInvalid(format!(
                        "label '{}' is used by both '{}' and '{}'",
                        key, owner, field.id
                    )));
                }
            }
        }

        if field.value_type == ValueType::Choice && field.options.is_empty() {
            return Err(IntakeError::TemplateInvalid(format!(
                "choice field '{}' has no options",
                field.id
            )));
        }

        if let Some(ref pattern) = field.pattern {
            Regex::new(pattern).map_err(|e| {
                IntakeError::TemplateInvalid(format!(
                    "field '{}' has an invalid pattern: {}",
                    field.id, e
                ))
            })?;
        }

        if let (Some(min), Some(max)) = (field.min, field.max) {
            if min > max {
                return Err(IntakeError::TemplateInvalid(format!(
                    "field '{}' has min {} greater than max {}",
                    field.id, min, max
                )));
            }
        }

        if let Some(kind) = field.fallback_section {
            if kind != SectionKind::Unsectioned && !section_kinds.contains(&kind) {
                return Err(IntakeError::TemplateInvalid(format!(
                    "field '{}' falls back to undeclared section '{}'",
                    field.id, kind
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(fields: &str) -> String {
        format!(
            r#"{{
                "name": "Test",
                "version": "1.0",
                "sections": [
                    {{ "kind": "goals", "headers": ["goals"], "selection_field": "multiselect.goals" }}
                ],
                "fields": {fields}
            }}"#
        )
    }

    #[test]
    fn test_parse_valid_template() {
        let json = minimal(
            r#"[
                { "id": "identity.name", "category": "identity", "value_type": "text", "labels": ["Name", "Full name"] },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        let t = parse_template_str(&json).unwrap();
        assert_eq!(t.name, "Test");
        assert_eq!(t.fields.len(), 2);
        assert!(!t.checkbox.checked.is_empty());
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(parse_template_str(&minimal("[]")).is_err());
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let json = minimal(
            r#"[
                { "id": "identity.name", "category": "identity", "value_type": "text", "labels": ["Name"] },
                { "id": "identity.nickname", "category": "identity", "value_type": "text", "labels": ["name:"] },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_scale_category_requires_scale_type() {
        let json = minimal(
            r#"[
                { "id": "scale.mood", "category": "scale_rating", "value_type": "integer", "labels": ["Mood"] },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_selection_target_must_exist() {
        let json = minimal(
            r#"[
                { "id": "identity.name", "category": "identity", "value_type": "text", "labels": ["Name"] }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let json = minimal(
            r#"[
                { "id": "identity.email", "category": "identity", "value_type": "text", "labels": ["Email"], "pattern": "([a-z" },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_min_greater_than_max_rejected() {
        let json = minimal(
            r#"[
                { "id": "identity.age", "category": "identity", "value_type": "integer", "labels": ["Age"], "min": "130", "max": "0" },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_choice_without_options_rejected() {
        let json = minimal(
            r#"[
                { "id": "metric.activity_level", "category": "numeric_metric", "value_type": "choice", "labels": ["Activity level"] },
                { "id": "multiselect.goals", "category": "multi_select", "value_type": "selection" }
            ]"#,
        );
        assert!(parse_template_str(&json).is_err());
    }

    #[test]
    fn test_unsectioned_cannot_be_declared() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "sections": [ { "kind": "unsectioned", "headers": ["misc"] } ],
            "fields": [
                { "id": "identity.name", "category": "identity", "value_type": "text", "labels": ["Name"] }
            ]
        }"#;
        assert!(parse_template_str(json).is_err());
    }
}
