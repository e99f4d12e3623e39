mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "intake",
    version,
    about = "Extract structured answers from health and fitness intake questionnaires"
)]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one questionnaire (PDF, plain text or JSON array of lines)
    Parse {
        /// Path to .pdf, .txt or .json file
        input_file: PathBuf,

        /// Output format: table (default), json, dump or scales
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the record as JSON to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Custom JSON template file
        #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
        template: Option<PathBuf>,

        /// Built-in template (default: fitness)
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// Include the parse trace (sections and every candidate answer)
        #[arg(long)]
        trace: bool,

        /// Fail when a required field could not be recovered
        #[arg(long)]
        require_complete: bool,
    },
    /// Parse every questionnaire in a directory, one JSON record per file
    Batch {
        /// Directory with .pdf, .txt or .json files
        input_dir: PathBuf,

        /// Directory receiving <name>.json records
        output_dir: PathBuf,

        /// Custom JSON template file
        #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
        template: Option<PathBuf>,

        /// Built-in template (default: fitness)
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// Worker threads (default: one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Manage and inspect questionnaire templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List built-in templates
    List,
    /// Describe the fields and sections of a template
    Explain {
        /// Preset name (e.g., "fitness")
        preset: String,
    },
    /// Print the JSON template schema with field descriptions
    Schema,
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            template,
            preset,
            trace,
            require_complete,
        } => commands::parse::run(commands::parse::ParseArgs {
            input_file,
            output_format: output,
            output_file: out,
            template,
            preset,
            trace,
            require_complete,
        }),
        Commands::Batch {
            input_dir,
            output_dir,
            template,
            preset,
            jobs,
        } => commands::batch::run(&input_dir, &output_dir, template, preset, jobs),
        Commands::Template { action } => match action {
            TemplateAction::List => commands::template::list(),
            TemplateAction::Explain { preset } => commands::template::explain(&preset),
            TemplateAction::Schema => commands::template::schema(),
            TemplateAction::Validate { file } => commands::template::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
