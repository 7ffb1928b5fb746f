//! Turns raw rows into typed [`Record`]s.
//!
//! Field 0 of a row is its discriminator: [`BATCH_MARKER`] rows carry a batch
//! class, [`TIMING_MARKER`] rows carry a step with start and end timestamps.
//! Every other row is skipped with a [`SkipReason`].

use averager_core::models::{
    BatchClassRecord, NegativeDurationPolicy, Record, SkipReason, TimingRecord,
};
use averager_core::timestamps::TimestampProcessor;

/// Discriminator of batch-class rows.
pub const BATCH_MARKER: &str = "04";

/// Discriminator of step timing rows.
pub const TIMING_MARKER: &str = "05";

/// Case-insensitive substring that flags a timing row as an error.
pub const ERROR_NEEDLE: &str = "error";

// Positions within a timing row.
const START_DATE: usize = 1;
const START_TIME: usize = 2;
const END_DATE: usize = 3;
const END_TIME: usize = 4;
const STEP_NAME: usize = 5;

/// Classifies rows under a fixed negative-duration policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowClassifier {
    policy: NegativeDurationPolicy,
}

impl RowClassifier {
    pub fn new(policy: NegativeDurationPolicy) -> Self {
        Self { policy }
    }

    /// Classify one row. Never panics; anything unusable becomes a
    /// [`SkipReason`].
    pub fn classify<S: AsRef<str>>(&self, fields: &[S]) -> Result<Record, SkipReason> {
        let fields: Vec<&str> = fields.iter().map(|f| strip_quotes(f.as_ref())).collect();

        match fields.as_slice() {
            [] | [""] => Err(SkipReason::EmptyRow),
            [marker, ..] if *marker == BATCH_MARKER => classify_batch(&fields),
            [marker, ..] if *marker == TIMING_MARKER => self.classify_timing(&fields),
            [marker, ..] => Err(SkipReason::UnknownDiscriminator {
                value: marker.to_string(),
            }),
        }
    }

    fn classify_timing(&self, fields: &[&str]) -> Result<Record, SkipReason> {
        let field = |index: usize| {
            fields
                .get(index)
                .copied()
                .ok_or(SkipReason::MissingField { index })
        };

        let start = parse_timestamp(field(START_DATE)?, field(START_TIME)?)?;
        let end = parse_timestamp(field(END_DATE)?, field(END_TIME)?)?;
        let step = field(STEP_NAME)?;

        let record = TimingRecord {
            step: step.to_string(),
            start,
            end,
            has_error: mentions_error(fields),
        };

        let seconds = record.duration_seconds();
        if seconds < 0 && self.policy == NegativeDurationPolicy::Skip {
            return Err(SkipReason::NegativeDuration { seconds });
        }

        Ok(Record::Timing(record))
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn classify_batch(fields: &[&str]) -> Result<Record, SkipReason> {
    match fields.get(1) {
        Some(name) if !name.is_empty() => Ok(Record::BatchClass(BatchClassRecord {
            name: name.to_string(),
        })),
        _ => Err(SkipReason::MissingBatchClass),
    }
}

fn parse_timestamp(
    date: &str,
    time: &str,
) -> Result<chrono::NaiveDateTime, SkipReason> {
    TimestampProcessor::parse_parts(date, time).map_err(|_| SkipReason::InvalidTimestamp {
        value: format!("{} {}", date, time),
    })
}

/// Remove every leading and trailing `"` from a field.
fn strip_quotes(field: &str) -> &str {
    field.trim_matches('"')
}

/// Join the fields with spaces and look for [`ERROR_NEEDLE`] in any case.
fn mentions_error(fields: &[&str]) -> bool {
    fields.join(" ").to_lowercase().contains(ERROR_NEEDLE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
