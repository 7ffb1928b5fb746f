//! Per-file accumulation of classified rows and the cross-file merge.

use std::path::{Path, PathBuf};

use averager_core::models::{
    DateRange, FileFailure, Record, RunResult, SkipReason, SkippedRow, StepTable,
    TimingRecord,
};
use averager_core::statistics::StatisticsCalculator;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::classifier::RowClassifier;
use crate::reader::RawRow;

// ── FileAggregate ─────────────────────────────────────────────────────────────

/// Everything extracted from a single log file.
#[derive(Debug, Clone, Default)]
pub struct FileAggregate {
    /// Duration samples and error counts per step.
    pub steps: StepTable,
    /// Batch-class names in row order, duplicates kept.
    pub batch_classes: Vec<String>,
    /// Rows that produced no record, with the reason.
    pub skipped: Vec<SkippedRow>,
    earliest_start: Option<NaiveDateTime>,
    latest_end: Option<NaiveDateTime>,
}

impl FileAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every row of a file and accumulate the outcomes.
    pub fn from_rows(rows: &[RawRow], classifier: &RowClassifier) -> Self {
        let mut aggregate = Self::new();
        for row in rows {
            aggregate.add_outcome(row.line, classifier.classify(&row.fields));
        }
        aggregate
    }

    /// Accumulate the outcome of one row.
    pub fn add_outcome(&mut self, line: u64, outcome: Result<Record, SkipReason>) {
        match outcome {
            Ok(Record::Timing(record)) => self.add_timing(&record),
            Ok(Record::BatchClass(record)) => self.batch_classes.push(record.name),
            Err(reason) => {
                if reason.is_malformed() {
                    debug!("Skipping line {}: {}", line, reason);
                }
                self.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    fn add_timing(&mut self, record: &TimingRecord) {
        self.steps.record(
            &record.step,
            record.duration_seconds() as f64,
            record.has_error,
        );
        self.earliest_start = Some(match self.earliest_start {
            Some(current) => current.min(record.start),
            None => record.start,
        });
        self.latest_end = Some(match self.latest_end {
            Some(current) => current.max(record.end),
            None => record.end,
        });
    }

    /// Calendar dates spanned by this file's timing records, if any.
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.earliest_start, self.latest_end) {
            (Some(start), Some(end)) => Some(DateRange::from_timestamps(start, end)),
            _ => None,
        }
    }

    /// Number of rows that looked like records but could not be extracted.
    pub fn malformed_rows(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason.is_malformed())
            .count()
    }

    /// `true` when the file yielded neither timing nor batch-class records.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.batch_classes.is_empty()
    }
}

// ── RunAggregate ──────────────────────────────────────────────────────────────

/// Merged aggregates of all files in a run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunAggregate {
    pub steps: StepTable,
    pub batch_classes: Vec<String>,
    pub date_range: Option<DateRange>,
    pub files_analyzed: usize,
    pub rows_skipped: usize,
    pub failures: Vec<FileFailure>,
}

impl RunAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's aggregate into the run.
    pub fn merge_file(&mut self, file: FileAggregate) {
        let date_range = file.date_range();
        self.rows_skipped += file.malformed_rows();
        self.steps.merge(file.steps);
        self.batch_classes.extend(file.batch_classes);
        self.date_range = DateRange::combine(self.date_range, date_range);
        self.files_analyzed += 1;
    }

    /// Record a file that could not be read or decoded.
    pub fn record_failure(&mut self, path: &Path, message: impl Into<String>) {
        self.failures.push(FileFailure {
            path: PathBuf::from(path),
            message: message.into(),
        });
    }

    /// `true` when no step has a sample and no batch class was seen.
    pub fn has_no_data(&self) -> bool {
        let no_samples = self.steps.iter().all(|(_, s)| s.durations.is_empty());
        no_samples && self.steps.total_errors() == 0 && self.batch_classes.is_empty()
    }

    /// Reduce the merged samples to reportable statistics.
    pub fn finish(self) -> RunResult {
        RunResult {
            averages: StatisticsCalculator::compute_averages(&self.steps),
            errors: StatisticsCalculator::collect_errors(&self.steps),
            batch_classes: StatisticsCalculator::tally_batch_classes(&self.batch_classes),
            date_range: self.date_range,
            files_analyzed: self.files_analyzed,
            rows_skipped: self.rows_skipped,
            failures: self.failures,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
