use intake_core::assemble::render_dump;
use intake_core::error::IntakeError;
use intake_core::model::RecoveryStatus;
use std::path::PathBuf;

use super::{load_parser, read_document};
use crate::output;

pub struct ParseArgs {
    pub input_file: PathBuf,
    pub output_format: String,
    pub output_file: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub preset: Option<String>,
    pub trace: bool,
    pub require_complete: bool,
}

pub fn run(args: ParseArgs) -> Result<(), IntakeError> {
    let parser = load_parser(args.template.as_deref(), args.preset.as_deref())?;
    let doc = read_document(&args.input_file)?;
    let parsed = intake_core::parse_document(&doc, &parser);
    let record = &parsed.record;

    match args.output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = output::json::format(&parsed, args.trace)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} field(s) ({} recovered, {} inferred), written to {}",
                record.fields.len(),
                record.manifest.count(RecoveryStatus::Recovered),
                record.manifest.count(RecoveryStatus::Inferred),
                path.display()
            );
            for id in record.manifest.missing_required() {
                eprintln!("  warning: required field '{id}' not found");
            }
        }
        None => {
            let output_str = match args.output_format.as_str() {
                "json" => output::json::format(&parsed, args.trace)?,
                "dump" => render_dump(record),
                "scales" => serde_json::to_string_pretty(&record.scale_ratings())?,
                _ => {
                    let mut table = output::table::format_record(record, parser.template().def());
                    if args.trace {
                        table.push('\n');
                        table.push_str(&output::table::format_trace(&parsed.trace));
                    }
                    table
                }
            };
            println!("{output_str}");
        }
    }

    if args.require_complete {
        let missing = record.manifest.missing_required();
        if !missing.is_empty() {
            return Err(IntakeError::IncompleteRecord { missing });
        }
    }

    Ok(())
}
