use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// How timing rows whose end precedes their start are treated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NegativeDurationPolicy {
    /// Keep the negative sample in the step statistics.
    #[default]
    Keep,
    /// Drop the row with [`SkipReason::NegativeDuration`].
    Skip,
}

// ── Records ───────────────────────────────────────────────────────────────────

/// A `05` row: one execution of a processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    /// Step name taken from field 5.
    pub step: String,
    /// Start timestamp (fields 1 and 2).
    pub start: NaiveDateTime,
    /// End timestamp (fields 3 and 4).
    pub end: NaiveDateTime,
    /// `true` when any field of the row mentions "error" in any case.
    pub has_error: bool,
}

impl TimingRecord {
    /// Whole seconds between start and end. Negative when the row is
    /// out of order.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// A `04` row naming the class of a processing batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchClassRecord {
    pub name: String,
}

/// A classified log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Timing(TimingRecord),
    BatchClass(BatchClassRecord),
}

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The row has no fields, or only one empty field.
    EmptyRow,
    /// Field 0 is neither the batch nor the timing marker.
    UnknownDiscriminator { value: String },
    /// A batch row without a usable class name.
    MissingBatchClass,
    /// A timing row shorter than the six fields it needs.
    MissingField { index: usize },
    /// A date/time pair that does not match `YYYY-MM-DD HH:MM:SS`.
    InvalidTimestamp { value: String },
    /// End before start under [`NegativeDurationPolicy::Skip`].
    NegativeDuration { seconds: i64 },
}

impl SkipReason {
    /// Rows that looked like records but could not be extracted.
    ///
    /// Empty rows and foreign discriminators are expected noise and do not
    /// count as malformed.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            SkipReason::EmptyRow | SkipReason::UnknownDiscriminator { .. }
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRow => write!(f, "empty row"),
            SkipReason::UnknownDiscriminator { value } => {
                write!(f, "unknown discriminator \"{}\"", value)
            }
            SkipReason::MissingBatchClass => write!(f, "batch row without class name"),
            SkipReason::MissingField { index } => write!(f, "missing field {}", index),
            SkipReason::InvalidTimestamp { value } => {
                write!(f, "invalid timestamp \"{}\"", value)
            }
            SkipReason::NegativeDuration { seconds } => {
                write!(f, "negative duration of {}s", seconds)
            }
        }
    }
}

/// A skipped row and its 1-based line number in the decoded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

// ── StepTable ─────────────────────────────────────────────────────────────────

/// Duration samples and error count collected for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSamples {
    /// Durations in seconds, in the order they were observed.
    pub durations: Vec<f64>,
    /// Number of timing rows for this step flagged as errors.
    pub errors: u32,
}

/// Per-step samples keyed by step name, iterated in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct StepTable {
    entries: Vec<(String, StepSamples)>,
    index: HashMap<String, usize>,
}

impl StepTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples for `step`, inserting an empty entry on first sight.
    pub fn entry(&mut self, step: &str) -> &mut StepSamples {
        let idx = match self.index.get(step) {
            Some(&idx) => idx,
            None => {
                self.entries.push((step.to_string(), StepSamples::default()));
                let idx = self.entries.len() - 1;
                self.index.insert(step.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    /// Append one duration sample and count the error flag.
    pub fn record(&mut self, step: &str, duration_seconds: f64, has_error: bool) {
        let samples = self.entry(step);
        samples.durations.push(duration_seconds);
        if has_error {
            samples.errors += 1;
        }
    }

    /// Append `other`'s samples after ours, step by step.
    ///
    /// Steps new to `self` are added in `other`'s order after the existing
    /// ones.
    pub fn merge(&mut self, other: StepTable) {
        for (step, samples) in other.entries {
            let target = self.entry(&step);
            target.durations.extend(samples.durations);
            target.errors += samples.errors;
        }
    }

    pub fn get(&self, step: &str) -> Option<&StepSamples> {
        self.index.get(step).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepSamples)> {
        self.entries.iter().map(|(step, s)| (step.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of error counts across all steps.
    pub fn total_errors(&self) -> u32 {
        self.entries.iter().map(|(_, s)| s.errors).sum()
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Calendar dates spanned by a set of timing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Reduce an earliest-start / latest-end pair to calendar dates.
    pub fn from_timestamps(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: start.date(),
            end: end.date(),
        }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(self, other: DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Combine two optional ranges; an absent side is ignored.
    pub fn combine(a: Option<DateRange>, b: Option<DateRange>) -> Option<DateRange> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

// ── Run result ────────────────────────────────────────────────────────────────

/// Mean duration of one step over every sample in the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepAverage {
    pub step: String,
    pub average_seconds: f64,
    pub samples: usize,
}

/// Number of error-flagged timing rows for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepErrors {
    pub step: String,
    pub count: u32,
}

/// One batch class with its share of all batch-class rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchClassShare {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

/// Batch-class frequencies, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchClassTally {
    pub total: usize,
    pub classes: Vec<BatchClassShare>,
}

impl BatchClassTally {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count_for(&self, name: &str) -> usize {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// A file that contributed nothing because it could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Everything one run produces for the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Per-step averages in first-appearance order.
    pub averages: Vec<StepAverage>,
    /// Steps with at least one error, in first-appearance order.
    pub errors: Vec<StepErrors>,
    pub batch_classes: BatchClassTally,
    pub date_range: Option<DateRange>,
    /// Files that were decoded successfully.
    pub files_analyzed: usize,
    /// Rows that looked like records but were skipped.
    pub rows_skipped: usize,
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    pub fn average_for(&self, step: &str) -> Option<f64> {
        self.averages
            .iter()
            .find(|a| a.step == step)
            .map(|a| a.average_seconds)
    }

    pub fn errors_for(&self, step: &str) -> u32 {
        self.errors
            .iter()
            .find(|e| e.step == step)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub fn total_errors(&self) -> u32 {
        self.errors.iter().map(|e| e.count).sum()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
