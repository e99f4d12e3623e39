use crate::model::{RecoveryManifest, RecoveryStatus, StructuredRecord};
use crate::validate::ResolvedField;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::warn;

/// Build the record and its manifest from the resolved fields. Never fails:
/// a document with nothing recognizable still yields every field, each
/// flagged as missing or defaulted.
pub fn assemble(template_name: &str, resolved: Vec<ResolvedField>) -> StructuredRecord {
    let mut fields = BTreeMap::new();
    let mut manifest = RecoveryManifest::default();

    for field in resolved {
        fields.insert(field.id.clone(), field.value);
        manifest.entries.insert(field.id, field.entry);
    }

    let missing = manifest.missing_required();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "required fields not found");
    }

    StructuredRecord {
        template: template_name.to_string(),
        fields,
        manifest,
    }
}

/// Human-readable `key = value` dump of a record with each field's status,
/// origin and notes.
pub fn render_dump(record: &StructuredRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# template: {}", record.template);

    for (id, value) in &record.fields {
        let _ = write!(out, "{} = {}", id, value);
        if let Some(entry) = record.manifest.entries.get(id) {
            let mut annotation = entry.status.to_string();
            if let Some(source) = entry.source {
                let _ = write!(annotation, " {}", source);
            }
            for note in &entry.notes {
                let _ = write!(annotation, "; {}", note);
            }
            let _ = write!(out, "  [{}]", annotation);
        }
        out.push('\n');
    }

    let m = &record.manifest;
    let _ = writeln!(
        out,
        "# {} recovered, {} inferred, {} defaulted, {} missing, {} missing-required",
        m.count(RecoveryStatus::Recovered),
        m.count(RecoveryStatus::Inferred),
        m.count(RecoveryStatus::Defaulted),
        m.count(RecoveryStatus::Missing),
        m.count(RecoveryStatus::MissingRequired),
    );
    out
}
