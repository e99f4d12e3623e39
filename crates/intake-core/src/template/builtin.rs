use crate::error::IntakeError;
use crate::template::parse_template_str;
use crate::template::schema::TemplateDef;

const FITNESS_JSON: &str = include_str!("../../../../templates/fitness.json");

/// Available predefined templates.
pub const PRESETS: &[&str] = &["fitness"];

/// Preset used when none is named.
pub const DEFAULT_PRESET: &str = "fitness";

/// Load a predefined template by name.
pub fn load_preset(name: &str) -> Result<TemplateDef, IntakeError> {
    match name {
        "fitness" => parse_template_str(FITNESS_JSON),
        _ => Err(IntakeError::TemplateInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
