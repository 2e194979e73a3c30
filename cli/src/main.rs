use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use spec_validator_discovery::locate::locate_spec_files;
use spec_validator_discovery::output::write_report;
use spec_validator_discovery::progress::{StatusAwareWriter, StatusLine};
use spec_validator_discovery::{
    FileConfig, OutputFormat, ProgressObserver, TerminalProgress, ValidationSummary,
    validate_files,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CATEGORY_HELP: &str = "\
Categories:
  SchemaValidationFailed               document violates the Swagger 2.0 schema (off by default)
  IncorrectSchemaVersion               version directory differs from info.version
  PreviewSchemaWithoutPreviewVersion   preview directory, info.version without 'preview'
  StableSchemaWithPreviewVersion       stable directory, info.version with 'preview'
  ListOperationUsingPost               list operation exposed through POST
  DocumentLoadFailed                   document cannot be read or parsed (always on)
  InvalidSourcePath                    path does not follow the directory convention (always on)";

#[derive(Debug, Parser)]
#[command(name = "az-spec-validator")]
#[command(version, about = "Validate Resource Manager API specifications")]
struct Cli {
    /// Source directory containing API specifications [default: ./azure-rest-api-specs]
    #[arg(short, long, global = true, env = "AZ_SPEC_VALIDATOR_SOURCE")]
    source: Option<PathBuf>,
    /// YAML file with default settings; flags and environment variables take precedence.
    #[arg(long, global = true, env = "AZ_SPEC_VALIDATOR_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate API specifications.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(subcommand)]
    target: ValidateTarget,
}

#[derive(Debug, Subcommand)]
enum ValidateTarget {
    /// Validate all API specifications.
    #[command(after_help = CATEGORY_HELP)]
    All(AllArgs),
}

#[derive(Debug, Args)]
struct AllArgs {
    /// Output file, overwritten if it exists [default: validation-errors.json]
    #[arg(short, long, env = "AZ_SPEC_VALIDATOR_OUTPUT")]
    output: Option<PathBuf>,
    /// Comma-separated categories to enable; replaces the default selection.
    #[arg(long, value_delimiter = ',', env = "AZ_SPEC_VALIDATOR_CATEGORIES")]
    categories: Option<Vec<String>>,
    /// Report format [default: json]
    #[arg(long, value_enum, env = "AZ_SPEC_VALIDATOR_FORMAT")]
    format: Option<OutputFormat>,
    /// JSON Schema used instead of the embedded Swagger 2.0 structure schema.
    #[arg(long, env = "AZ_SPEC_VALIDATOR_SCHEMA_FILE")]
    schema_file: Option<PathBuf>,
    /// Do not display the progress line.
    #[arg(long, env = "AZ_SPEC_VALIDATOR_NO_PROGRESS")]
    no_progress: bool,
}

fn main() {
    let cli = Cli::parse();
    let status_line = StatusLine::new();
    init_tracing(status_line.clone());

    let result = match cli.command {
        Command::Validate(args) => match args.target {
            ValidateTarget::All(all) => {
                run_validate_all(cli.source, cli.config.as_deref(), all, status_line)
            }
        },
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr, erasing the progress line drawn there first.
fn init_tracing(status_line: StatusLine) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || StatusAwareWriter::new(status_line.clone(), std::io::stderr()))
        .init();
}

fn run_validate_all(
    source: Option<PathBuf>,
    config_path: Option<&Path>,
    args: AllArgs,
    status_line: StatusLine,
) -> Result<(), String> {
    let file_config = match config_path {
        Some(path) => FileConfig::load(path).map_err(|e| e.to_string())?,
        None => FileConfig::default(),
    };
    let flags = FileConfig {
        source,
        output: args.output,
        categories: args.categories.map(normalize_categories),
        format: args.format,
        schema_file: args.schema_file,
    };
    let config = flags.layered_over(file_config).resolve();
    debug!(?config, "resolved configuration");

    println!("Validating all API specifications...");
    println!("Source directory: {}", config.source.display());
    let files = locate_spec_files(&config.source).map_err(|e| e.to_string())?;
    println!("Total number of files to validate: {}", files.len());
    println!("Validating files...");

    let progress: Option<Box<dyn ProgressObserver>> = if args.no_progress {
        None
    } else {
        Some(Box::new(TerminalProgress::stderr().with_status_line(status_line)))
    };
    let run = validate_files(&config, &files, progress).map_err(|e| e.to_string())?;
    write_report(&config.output, &run.report, config.format).map_err(|e| e.to_string())?;

    print!("{}", summary_text(&run.summary));
    println!("Report written to {}", config.output.display());
    Ok(())
}

fn normalize_categories(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn summary_text(summary: &ValidationSummary) -> String {
    let mut out = format!(
        "{} files validated, {} files with errors found\n",
        summary.total_files, summary.files_with_findings
    );
    for (category, count) in &summary.by_category {
        out.push_str(&format!("  {category}: {count}\n"));
    }
    out
}
