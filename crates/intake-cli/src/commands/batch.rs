use intake_core::error::IntakeError;
use intake_core::parsing::QuestionnaireParser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{is_supported, load_parser, read_document};

/// Outcome for one input file.
struct FileResult {
    input: PathBuf,
    outcome: Result<PathBuf, IntakeError>,
}

pub fn run(
    input_dir: &Path,
    output_dir: &Path,
    template: Option<PathBuf>,
    preset: Option<String>,
    jobs: Option<usize>,
) -> Result<(), IntakeError> {
    let parser = load_parser(template.as_deref(), preset.as_deref())?;

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    inputs.sort();

    if inputs.is_empty() {
        return Err(IntakeError::UnsupportedInput(format!(
            "no .pdf, .txt or .json files in {}",
            input_dir.display()
        )));
    }

    std::fs::create_dir_all(output_dir)?;

    if let Some(n) = jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            warn!(error = %e, "could not size thread pool, using default");
        }
    }

    info!(files = inputs.len(), "batch started");
    let results: Vec<FileResult> = inputs
        .par_iter()
        .map(|input| FileResult {
            input: input.clone(),
            outcome: process_file(input, output_dir, &parser),
        })
        .collect();

    let mut succeeded = 0;
    for r in &results {
        let name = r.input.file_name().unwrap_or_default().to_string_lossy();
        match &r.outcome {
            Ok(out) => {
                succeeded += 1;
                println!("  ✓ {} -> {}", name, out.display());
            }
            Err(e) => println!("  ✗ {}: {}", name, e),
        }
    }
    println!("\n{} of {} file(s) parsed", succeeded, results.len());

    if succeeded == 0 {
        return Err(IntakeError::Extraction(format!(
            "none of the {} file(s) in {} could be parsed",
            results.len(),
            input_dir.display()
        )));
    }
    Ok(())
}

fn process_file(
    input: &Path,
    output_dir: &Path,
    parser: &QuestionnaireParser,
) -> Result<PathBuf, IntakeError> {
    let doc = read_document(input)?;
    let parsed = intake_core::parse_document(&doc, parser);

    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let out = output_dir.join(format!("{stem}.json"));
    std::fs::write(&out, serde_json::to_string_pretty(&parsed.record)?)?;
    Ok(out)
}
