//! Main analysis pipeline.
//!
//! Reads each selected file in order, aggregates its rows and merges the
//! per-file results into one [`RunResult`] ready for the reporting layer.

use std::path::PathBuf;

use averager_core::models::{FileFailure, NegativeDurationPolicy, RunResult};
use averager_core::settings::Settings;
use tracing::{debug, info, warn};

use crate::aggregator::{FileAggregate, RunAggregate};
use crate::classifier::RowClassifier;
use crate::reader::read_log_file;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub negative_durations: NegativeDurationPolicy,
}

impl From<&Settings> for AnalysisOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            negative_durations: settings.negative_durations,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// No files were given; nothing was read.
    NoSelection,
    /// Files were processed but none yielded a duration, error or batch
    /// class.
    NoData { failures: Vec<FileFailure> },
    /// At least one record was found.
    Completed(RunResult),
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline over `paths`, in order.
///
/// 1. Read and decode each file; failures are recorded and skipped.
/// 2. Classify the rows and aggregate them per file.
/// 3. Merge the file aggregates.
/// 4. Reduce to averages and tallies, or report that nothing was found.
pub fn analyze(paths: &[PathBuf], options: &AnalysisOptions) -> AnalysisOutcome {
    if paths.is_empty() {
        return AnalysisOutcome::NoSelection;
    }

    let classifier = RowClassifier::new(options.negative_durations);
    let mut run = RunAggregate::new();

    for path in paths {
        let decoded = match read_log_file(path) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                run.record_failure(path, e.to_string());
                continue;
            }
        };

        let file = FileAggregate::from_rows(&decoded.rows, &classifier);
        debug!(
            "File {}: {} steps, {} batch rows, {} skipped rows",
            path.display(),
            file.steps.len(),
            file.batch_classes.len(),
            file.skipped.len()
        );
        run.merge_file(file);
    }

    info!(
        "Analysed {} of {} files ({} failed)",
        run.files_analyzed,
        paths.len(),
        run.failures.len()
    );

    if run.has_no_data() {
        return AnalysisOutcome::NoData {
            failures: run.failures,
        };
    }

    AnalysisOutcome::Completed(run.finish())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
