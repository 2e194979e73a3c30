//! Aggregation of per-file results into the final report.

use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender};

use serde::{Deserialize, Serialize};
use spec_validator_core::{Category, Finding, ResultRecord, SourcePath};
use tracing::debug;

use crate::error::ValidationError;
use crate::progress::ProgressEvent;

/// Findings keyed by document path. Files without findings never appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportMap(BTreeMap<SourcePath, Vec<Finding>>);

impl ReportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record` if it carries findings; returns whether it was added.
    pub fn insert(&mut self, record: ResultRecord) -> bool {
        if record.findings.is_empty() {
            return false;
        }
        self.0.insert(record.path, record.findings);
        true
    }

    pub fn get(&self, path: &SourcePath) -> Option<&[Finding]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// Number of files with findings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourcePath, &[Finding])> {
        self.0.iter().map(|(path, findings)| (path, findings.as_slice()))
    }

    pub fn total_findings(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Finding counts per category, for categories that occurred.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.0.values().flatten() {
            *counts.entry(finding.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_files: usize,
    pub files_with_findings: usize,
    pub total_findings: usize,
    pub by_category: BTreeMap<Category, usize>,
}

impl ValidationSummary {
    pub fn new(total_files: usize, report: &ReportMap) -> Self {
        Self {
            total_files,
            files_with_findings: report.len(),
            total_findings: report.total_findings(),
            by_category: report.category_counts(),
        }
    }
}

/// Collects [`ResultRecord`]s on the coordinating thread.
#[derive(Debug, Default)]
pub struct Aggregator {
    report: ReportMap,
    processed: usize,
    progress: Option<Sender<ProgressEvent>>,
}

impl Aggregator {
    /// `progress`, when given, receives an event after every record.
    pub fn new(progress: Option<Sender<ProgressEvent>>) -> Self {
        Self {
            report: ReportMap::new(),
            processed: 0,
            progress,
        }
    }

    /// Number of records consumed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Consumes one record and publishes progress against `total`.
    pub fn record(&mut self, record: ResultRecord, total: usize) {
        self.processed += 1;
        debug!(
            path = %record.path,
            findings = record.findings.len(),
            "aggregated validation result"
        );
        self.report.insert(record);

        if let Some(progress) = &self.progress {
            let event = ProgressEvent {
                processed: self.processed,
                total,
                with_findings: self.report.len(),
            };
            // A closed display is not a reason to stop aggregating.
            if progress.send(event).is_err() {
                self.progress = None;
            }
        }
    }

    /// Receives exactly `expected` records from `results`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteResults`] if every sender is
    /// dropped before `expected` records arrived.
    pub fn collect(
        &mut self,
        results: Receiver<ResultRecord>,
        expected: usize,
    ) -> Result<(), ValidationError> {
        let start = self.processed;
        for _ in 0..expected {
            match results.recv() {
                Ok(record) => self.record(record, expected),
                Err(_) => {
                    return Err(ValidationError::IncompleteResults {
                        expected,
                        received: self.processed - start,
                    });
                }
            }
        }
        Ok(())
    }

    /// Finalizes the report, closing the progress channel.
    pub fn finish(self) -> ReportMap {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn record(path: &str, categories: &[Category]) -> ResultRecord {
        ResultRecord::new(
            SourcePath::new(path),
            categories
                .iter()
                .map(|c| Finding::new(*c, format!("{c} in {path}")))
                .collect(),
        )
    }

    #[test]
    fn test_report_map_skips_clean_files() {
        let mut report = ReportMap::new();
        assert!(!report.insert(record("a.json", &[])));
        assert!(report.insert(record("b.json", &[Category::ListOperationUsingPost])));
        assert_eq!(report.len(), 1);
        assert!(report.get(&SourcePath::new("a.json")).is_none());
    }

    #[test]
    fn test_report_map_serializes_sorted_by_path() {
        let mut report = ReportMap::new();
        report.insert(record("z.json", &[Category::IncorrectSchemaVersion]));
        report.insert(record("a.json", &[Category::ListOperationUsingPost]));

        let json = serde_json::to_string(&report).unwrap();
        let a = json.find("a.json").unwrap();
        let z = json.find("z.json").unwrap();
        assert!(a < z);

        let back: ReportMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_collect_consumes_exactly_expected_records() {
        let (tx, rx) = mpsc::sync_channel(4);
        tx.send(record("b.json", &[Category::IncorrectSchemaVersion])).unwrap();
        tx.send(record("a.json", &[])).unwrap();
        tx.send(record(
            "c.json",
            &[Category::IncorrectSchemaVersion, Category::ListOperationUsingPost],
        ))
        .unwrap();

        let (progress_tx, progress_rx) = mpsc::channel();
        let mut aggregator = Aggregator::new(Some(progress_tx));
        aggregator.collect(rx, 3).unwrap();
        assert_eq!(aggregator.processed(), 3);

        let report = aggregator.finish();
        let events: Vec<ProgressEvent> = progress_rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent {
                processed: 3,
                total: 3,
                with_findings: 2,
            })
        );

        let summary = ValidationSummary::new(3, &report);
        assert_eq!(summary.files_with_findings, 2);
        assert_eq!(summary.total_findings, 3);
        assert_eq!(summary.by_category[&Category::IncorrectSchemaVersion], 2);
        drop(tx);
    }

    #[test]
    fn test_collect_fails_when_senders_disconnect_early() {
        let (tx, rx) = mpsc::sync_channel(2);
        tx.send(record("a.json", &[])).unwrap();
        drop(tx);

        let mut aggregator = Aggregator::new(None);
        let err = aggregator.collect(rx, 2).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::IncompleteResults {
                expected: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn test_closed_progress_channel_does_not_stop_aggregation() {
        let (progress_tx, progress_rx) = mpsc::channel();
        drop(progress_rx);
        let mut aggregator = Aggregator::new(Some(progress_tx));
        aggregator.record(record("a.json", &[Category::IncorrectSchemaVersion]), 2);
        aggregator.record(record("b.json", &[Category::IncorrectSchemaVersion]), 2);
        assert_eq!(aggregator.finish().len(), 2);
    }
}
