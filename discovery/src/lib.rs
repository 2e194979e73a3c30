//! Discovery, concurrent validation and reporting for Azure REST API
//! specification trees.
//!
//! The pipeline has four stages:
//!
//! 1. [`locate::locate_spec_files`] walks `<source>/specification` and lists
//!    every Resource Manager document.
//! 2. A [`pool::Coordinator`] validates the documents on a fixed-size rayon
//!    pool, running the [`ConsistencyChecker`] and, when
//!    `SchemaValidationFailed` is enabled, a [`schema::JsonSchemaValidator`].
//! 3. A [`report::Aggregator`] on the calling thread collects one
//!    [`ResultRecord`](spec_validator_core::ResultRecord) per file and
//!    publishes [`progress::ProgressEvent`]s to an optional observer.
//! 4. [`output::write_report`] serializes the findings map.
//!
//! # Main entry points
//!
//! - [`validate_all`] runs all four stages for a [`PipelineConfig`].
//! - [`validate_files`] runs stages 2 and 3 for an explicit file list.
//!
//! # Example
//!
//! ```
//! use spec_validator_discovery::{PipelineConfig, validate_all};
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let dir = tmp
//!     .path()
//!     .join("specification/foo/resource-manager/Microsoft.Foo/stable/2020-01-01");
//! std::fs::create_dir_all(&dir).unwrap();
//! std::fs::write(dir.join("foo.json"), r#"{ "info": { "version": "2020-01-02" } }"#).unwrap();
//!
//! let config = PipelineConfig {
//!     source: tmp.path().to_path_buf(),
//!     output: tmp.path().join("validation-errors.json"),
//!     ..PipelineConfig::default()
//! };
//! let run = validate_all(&config, None).unwrap();
//! assert_eq!(run.summary.total_files, 1);
//! assert_eq!(run.summary.files_with_findings, 1);
//! assert!(config.output.exists());
//! ```

pub mod config;
pub mod error;
pub mod locate;
pub mod output;
pub mod pool;
pub mod progress;
pub mod report;
pub mod schema;

use std::path::PathBuf;

use spec_validator_core::{Category, ConsistencyChecker};
use tracing::{debug, info};

pub use config::{FileConfig, PipelineConfig};
pub use error::{ConfigError, DiscoveryError, SchemaError, ValidationError};
pub use output::OutputFormat;
pub use pool::Coordinator;
pub use progress::{ProgressEvent, ProgressObserver, ProgressSubscriber, TerminalProgress};
pub use report::{Aggregator, ReportMap, ValidationSummary};
pub use schema::JsonSchemaValidator;

/// Outcome of a completed validation run.
#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub report: ReportMap,
    pub summary: ValidationSummary,
}

/// Builds the coordinator for `config`.
///
/// The schema is only read and compiled when `SchemaValidationFailed` is
/// enabled, so a bad schema file cannot fail a run that never uses it.
///
/// # Errors
///
/// Returns [`ValidationError::Schema`] if the schema cannot be prepared.
pub fn build_coordinator(config: &PipelineConfig) -> Result<Coordinator, ValidationError> {
    let categories = config.category_set();
    let enabled: Vec<&str> = categories.enabled().map(Category::as_str).collect();
    debug!(categories = ?enabled, "resolved enabled categories");

    let coordinator =
        Coordinator::new(ConsistencyChecker::new(categories)).with_workers(config.workers);
    if !categories.is_enabled(Category::SchemaValidationFailed) {
        return Ok(coordinator);
    }

    let schema = match &config.schema_file {
        Some(path) => JsonSchemaValidator::from_file(path)?,
        None => JsonSchemaValidator::embedded()?,
    };
    info!(schema = schema.source_name(), "schema validation enabled");
    Ok(coordinator.with_schema(Box::new(schema)))
}

/// Validates `files` and returns the aggregated report without writing it.
///
/// `progress`, when given, runs on its own thread and sees one event per
/// file.
///
/// # Errors
///
/// Fails if the schema cannot be prepared, the worker pool cannot start, or
/// the workers stop before every file reported.
pub fn validate_files(
    config: &PipelineConfig,
    files: &[PathBuf],
    progress: Option<Box<dyn ProgressObserver>>,
) -> Result<ValidationRun, ValidationError> {
    let coordinator = build_coordinator(config)?;

    let subscriber = progress.map(ProgressSubscriber::spawn);
    let mut aggregator = Aggregator::new(subscriber.as_ref().map(ProgressSubscriber::sender));
    let outcome = coordinator.run(files, &mut aggregator);
    let report = aggregator.finish();
    if let Some(subscriber) = subscriber {
        subscriber.finish();
    }
    outcome?;

    let summary = ValidationSummary::new(files.len(), &report);
    info!(
        files = summary.total_files,
        files_with_findings = summary.files_with_findings,
        findings = summary.total_findings,
        "validation finished"
    );
    Ok(ValidationRun { report, summary })
}

/// Locates, validates and reports every document under `config.source`.
///
/// The report is written to `config.output` in `config.format`.
///
/// # Errors
///
/// Returns [`ValidationError::Discovery`] if the tree cannot be walked, any
/// error from [`validate_files`], or [`ValidationError::Output`] if the
/// report cannot be written.
pub fn validate_all(
    config: &PipelineConfig,
    progress: Option<Box<dyn ProgressObserver>>,
) -> Result<ValidationRun, ValidationError> {
    let files = locate::locate_spec_files(&config.source)?;
    let run = validate_files(config, &files, progress)?;
    output::write_report(&config.output, &run.report, config.format)?;
    Ok(run)
}
