use intake_core::model::{FieldCategory, RecoveryStatus, StructuredRecord};
use intake_core::template::schema::TemplateDef;
use intake_core::trace::{Disposition, ParseTrace};
use std::fmt::Write;

const CATEGORIES: [FieldCategory; 5] = [
    FieldCategory::Identity,
    FieldCategory::NumericMetric,
    FieldCategory::ScaleRating,
    FieldCategory::FreeText,
    FieldCategory::MultiSelect,
];

/// Plain-text report of a record, grouped by field category in template order.
pub fn format_record(record: &StructuredRecord, template: &TemplateDef) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", template.name);

    let width = template.fields.iter().map(|f| f.id.len()).max().unwrap_or(20);

    for category in CATEGORIES {
        let fields: Vec<_> = template
            .fields
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if fields.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{category}\n");
        for field in fields {
            let value = record
                .get(&field.id)
                .map(ToString::to_string)
                .unwrap_or_default();
            let Some(entry) = record.manifest.entries.get(&field.id) else {
                let _ = writeln!(out, "  {:<width$}  {}", field.id, value);
                continue;
            };
            let origin = entry.source.map(|s| s.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "  {:<width$}  {:<32}  {:<16} {}",
                field.id,
                truncate(&value, 32),
                entry.status.to_string(),
                origin
            );
            for note in &entry.notes {
                let _ = writeln!(out, "  {:<width$}    {}", "", note);
            }
        }
    }

    let m = &record.manifest;
    let _ = writeln!(
        out,
        "\n  {} recovered, {} inferred, {} defaulted, {} missing",
        m.count(RecoveryStatus::Recovered),
        m.count(RecoveryStatus::Inferred),
        m.count(RecoveryStatus::Defaulted),
        m.count(RecoveryStatus::Missing) + m.count(RecoveryStatus::MissingRequired),
    );
    let missing = m.missing_required();
    if !missing.is_empty() {
        let _ = writeln!(out, "  Missing required: {}", missing.join(", "));
    }
    out
}

/// Sections found and every candidate answer with what became of it.
pub fn format_trace(trace: &ParseTrace) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Trace ===\n\n  {} raw line(s), {} logical line(s)\n\nSections:\n",
        trace.raw_line_count, trace.logical_line_count
    );
    for section in &trace.sections {
        let page = section
            .page_number
            .map(|p| format!("p{p}"))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "  {:<18} {:<4} {:>3} line(s)  {}",
            section.kind.to_string(),
            page,
            section.line_count,
            section.header.as_deref().unwrap_or("")
        );
        for line in &section.unclaimed {
            let _ = writeln!(out, "    unused: {}", truncate(line, 60));
        }
    }

    let _ = writeln!(out, "\nCandidates:\n");
    let width = trace
        .candidates
        .iter()
        .map(|c| c.field.len())
        .max()
        .unwrap_or(20);
    for c in &trace.candidates {
        let disposition = match &c.disposition {
            Disposition::Selected => "selected".to_string(),
            Disposition::Superseded => "superseded".to_string(),
            Disposition::NoAnswer => "no answer".to_string(),
            Disposition::Rejected { reason } => format!("rejected: {reason}"),
        };
        let _ = writeln!(
            out,
            "  p{}:l{:<4} {:<width$}  {:<32}  {:?}  {}",
            c.page_number,
            c.line_index,
            c.field,
            truncate(&c.raw_value, 32),
            c.confidence,
            disposition
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
