use intake_core::error::IntakeError;
use intake_core::model::SCALE_DEFAULT;
use intake_core::template::builtin;
use intake_core::template::schema::{TemplateDef, ValueType};
use std::path::Path;

pub fn list() -> Result<(), IntakeError> {
    println!("Available predefined templates:\n");
    for name in builtin::PRESETS {
        let def = builtin::load_preset(name)?;
        println!("  {:<10} {} (v{})", name, def.name, def.version);
        if let Some(ref desc) = def.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), IntakeError> {
    let def = builtin::load_preset(preset)?;

    println!("{} (version {})\n", def.name, def.version);
    if let Some(ref desc) = def.description {
        println!("{}\n", desc);
    }

    println!("Sections (recognized by header line):\n");
    for section in &def.sections {
        println!("  {}", section.kind);
        println!("    headers: {}", section.headers.join(" | "));
        if let Some(ref f) = section.selection_field {
            println!("    checked boxes -> {}", f);
        }
        if let Some(ref f) = section.narrative_field {
            println!("    other lines   -> {}", f);
        }
    }
    println!();

    let width = def.fields.iter().map(|f| f.id.len()).max().unwrap_or(20);
    println!("Fields:\n");
    for field in &def.fields {
        let required = if field.required { " (required)" } else { "" };
        println!(
            "  {:<width$}  {:<9}{}",
            field.id,
            value_type_name(field.value_type),
            required
        );
        if !field.labels.is_empty() {
            println!("  {:<width$}  labels: {}", "", field.labels.join(", "));
        }
        if let Some(range) = range_text(field.min, field.max) {
            println!("  {:<width$}  range: {}", "", range);
        }
        if !field.options.is_empty() {
            println!("  {:<width$}  options: {}", "", field.options.join(", "));
        }
    }
    println!();

    println!("Unanswered scales default to {SCALE_DEFAULT}; unanswered selections are empty.");
    println!(
        "Checkbox glyphs: checked {} / unchecked {}\n",
        def.checkbox.checked.join(" "),
        def.checkbox.unchecked.join(" ")
    );
    Ok(())
}

fn value_type_name(t: ValueType) -> &'static str {
    match t {
        ValueType::Text => "text",
        ValueType::Integer => "integer",
        ValueType::Decimal => "decimal",
        ValueType::Choice => "choice",
        ValueType::Scale => "scale",
        ValueType::Selection => "selection",
    }
}

fn range_text(
    min: Option<rust_decimal::Decimal>,
    max: Option<rust_decimal::Decimal>,
) -> Option<String> {
    match (min, max) {
        (None, None) => None,
        (Some(lo), None) => Some(format!(">= {lo}")),
        (None, Some(hi)) => Some(format!("<= {hi}")),
        (Some(lo), Some(hi)) => Some(format!("{lo} to {hi}")),
    }
}

pub fn schema() -> Result<(), IntakeError> {
    print!(
        r#"JSON Template Schema
====================

A template tells `intake parse` which section headers, field labels and
checkbox glyphs to look for, and what type each answer must have.

Top-level fields:
  name          (string, required)  Human-readable name of the template
  description   (string, optional)  What this template is for
  version       (string, required)  Version identifier (e.g., "2025.1")
  checkbox      (object, optional)  Glyphs opening a checkbox line:
                                    {{ "checked": [...], "unchecked": [...] }}
                                    Default: [x], [ ], ☑, ☐ and the common
                                    Wingdings glyphs.
  sections      (array, required)   Section headers, in priority order
  fields        (array, required)   Expected answers (see below)

Each entry in "sections":
  kind          (string, required)  personal_info, health_metrics,
                                    assessment_scales, goals, equipment,
                                    schedule, experience, dietary, free_text
  headers       (array, required)   Header phrases, matched case-insensitively
                                    on whole words
  selection_field
                (string, optional)  Selection field receiving this section's
                                    checked boxes
  narrative_field
                (string, optional)  Text field receiving this section's
                                    unlabeled lines

Each entry in "fields":
  id            (string, required)  Namespaced identifier, e.g. "identity.age"
  category      (string, required)  identity, numeric_metric, scale_rating,
                                    free_text, multi_select
  value_type    (string, required)  text, integer, decimal, choice, scale,
                                    selection
  labels        (array)             Label synonyms as written on the form
  required      (bool, optional)    Flag the record incomplete when missing
  options       (array, optional)   Allowed answers (choice) or known
                                    checkbox options (selection)
  pattern       (string, optional)  Regex a text answer must match
  min, max      (string, optional)  Decimal bounds for numeric answers
  fallback_section
                (string, optional)  Section whose first unlabeled line is
                                    taken as an inferred answer
  description   (string, optional)  Shown by `intake template explain`

Example:
{{
  "name": "Studio intake",
  "version": "1.0",
  "sections": [
    {{ "kind": "personal_info", "headers": ["About you"] }},
    {{ "kind": "goals", "headers": ["Your goals"],
      "selection_field": "multiselect.goals" }}
  ],
  "fields": [
    {{ "id": "identity.name", "category": "identity", "value_type": "text",
      "labels": ["Name", "Full name"], "required": true }},
    {{ "id": "metric.weight", "category": "numeric_metric",
      "value_type": "decimal", "labels": ["Weight"], "min": "20", "max": "400" }},
    {{ "id": "scale.motivation", "category": "scale_rating",
      "value_type": "scale", "labels": ["Motivation"] }},
    {{ "id": "multiselect.goals", "category": "multi_select",
      "value_type": "selection", "options": ["Lose weight", "Build muscle"] }}
  ]
}}

Note: bounds are quoted strings, not bare numbers, to keep exact decimal
precision (e.g., "24.5" not 24.5).
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), IntakeError> {
    let def = intake_core::template::load_template(file)?;

    println!("Template '{}' (v{}) is valid.", def.name, def.version);
    println!("  Sections: {}", def.sections.len());
    println!(
        "  Fields: {} ({} required)",
        def.fields.len(),
        def.fields.iter().filter(|f| f.required).count()
    );

    let warnings = lint(&def);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Things that load fine but will never fill a field.
fn lint(def: &TemplateDef) -> Vec<String> {
    let mut warnings = Vec::new();
    for field in &def.fields {
        if field.value_type != ValueType::Selection || !field.options.is_empty() {
            continue;
        }
        let targeted = def
            .sections
            .iter()
            .any(|s| s.selection_field.as_deref() == Some(field.id.as_str()));
        if !targeted && field.labels.is_empty() {
            warnings.push(format!(
                "selection '{}' has no options, labels or section and can never be filled",
                field.id
            ));
        }
    }
    if !def.fields.iter().any(|f| f.required) {
        warnings.push("no field is required; every record will count as complete".into());
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_no_warnings() {
        let def = builtin::load_preset("fitness").unwrap();
        assert!(lint(&def).is_empty());
    }

    #[test]
    fn test_lint_no_required() {
        let mut def = builtin::load_preset("fitness").unwrap();
        for f in &mut def.fields {
            f.required = false;
        }
        assert_eq!(lint(&def).len(), 1);
    }

    #[test]
    fn test_range_text() {
        use rust_decimal::Decimal;
        assert_eq!(range_text(None, None), None);
        assert_eq!(
            range_text(Some(Decimal::from(30)), Some(Decimal::from(220))).as_deref(),
            Some("30 to 220")
        );
    }
}
