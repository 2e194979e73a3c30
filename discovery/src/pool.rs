//! Concurrent validation of discovered documents.
//!
//! A fixed-size rayon pool pulls paths from its work-stealing queues; every
//! path yields exactly one [`ResultRecord`] on a bounded channel that the
//! calling thread drains through an [`Aggregator`].

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rayon::prelude::*;
use spec_validator_core::{
    Category, ConsistencyChecker, DocumentOutcome, ResultRecord, SchemaValidator, SourcePath,
    schema_findings,
};
use tracing::{debug, error, warn};

use crate::config::DEFAULT_WORKERS;
use crate::error::ValidationError;
use crate::report::Aggregator;

/// Runs the checker (and optional schema validator) over a set of files.
///
/// Everything here is built before the first worker starts and only read
/// afterwards.
pub struct Coordinator {
    checker: ConsistencyChecker,
    schema: Option<Box<dyn SchemaValidator>>,
    workers: usize,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("checker", &self.checker)
            .field("schema", &self.schema.is_some())
            .field("workers", &self.workers)
            .finish()
    }
}

impl Coordinator {
    pub fn new(checker: ConsistencyChecker) -> Self {
        Self {
            checker,
            schema: None,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Attaches a schema validator, used while `SchemaValidationFailed` is enabled.
    pub fn with_schema(mut self, schema: Box<dyn SchemaValidator>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the pool size; zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Loads and checks a single document.
    ///
    /// Never fails: load problems become findings.
    pub fn process_file(&self, path: &Path) -> ResultRecord {
        let source = SourcePath::from(path);
        let outcome = DocumentOutcome::load(path);
        if let DocumentOutcome::LoadFailed(err) = &outcome {
            warn!(path = %source, error = %err, "failed to load specification");
        }

        let mut findings = self.checker.check(&source, &outcome);

        let schema_enabled = self
            .checker
            .categories()
            .is_enabled(Category::SchemaValidationFailed);
        if let (true, Some(schema), Some(document)) =
            (schema_enabled, self.schema.as_deref(), outcome.document())
        {
            findings.extend(schema_findings(schema, document));
        }

        ResultRecord::new(source, findings)
    }

    /// Validates every path in `paths`, feeding results into `aggregator`.
    ///
    /// Blocks until one record per path has been aggregated.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ThreadPool`] if the pool cannot start and
    /// [`ValidationError::IncompleteResults`] if workers stop early.
    pub fn run(&self, paths: &[PathBuf], aggregator: &mut Aggregator) -> Result<(), ValidationError> {
        let total = paths.len();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("spec-validator-{index}"))
            .build()?;
        debug!(files = total, workers = self.workers, "starting validation workers");

        let (results, received) = mpsc::sync_channel::<ResultRecord>(total.max(1));

        std::thread::scope(|scope| {
            let producer = scope.spawn(move || {
                pool.install(|| {
                    paths.par_iter().for_each_with(results, |results, path| {
                        let record = self.process_file(path);
                        // The aggregator only hangs up after a failure of its own.
                        let _ = results.send(record);
                    });
                });
            });

            let collected = aggregator.collect(received, total);
            if producer.join().is_err() {
                error!("validation worker panicked");
            }
            collected
        })
    }
}
