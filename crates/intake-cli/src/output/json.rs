use intake_core::error::IntakeError;
use intake_core::parsing::ParsedQuestionnaire;

/// Pretty JSON of the record, or of record and trace together.
pub fn format(parsed: &ParsedQuestionnaire, with_trace: bool) -> Result<String, IntakeError> {
    let json = if with_trace {
        serde_json::to_string_pretty(parsed)?
    } else {
        serde_json::to_string_pretty(&parsed.record)?
    };
    Ok(json)
}
