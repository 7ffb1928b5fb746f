use std::collections::HashMap;

use crate::formatting::percentage;
use crate::models::{BatchClassShare, BatchClassTally, StepAverage, StepErrors, StepTable};

// ── StatisticsCalculator ──────────────────────────────────────────────────────

/// Stateless reductions from accumulated samples to reportable figures.
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Arithmetic mean of `samples`, or `None` for an empty slice.
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// One average per step, in step order.
    ///
    /// Steps without samples are left out rather than reported as zero.
    pub fn compute_averages(steps: &StepTable) -> Vec<StepAverage> {
        steps
            .iter()
            .filter_map(|(step, samples)| {
                Self::mean(&samples.durations).map(|average_seconds| StepAverage {
                    step: step.to_string(),
                    average_seconds,
                    samples: samples.durations.len(),
                })
            })
            .collect()
    }

    /// Error counts for every step that has at least one error.
    pub fn collect_errors(steps: &StepTable) -> Vec<StepErrors> {
        steps
            .iter()
            .filter(|(_, samples)| samples.errors > 0)
            .map(|(step, samples)| StepErrors {
                step: step.to_string(),
                count: samples.errors,
            })
            .collect()
    }

    /// Count batch-class occurrences and their share of the total.
    ///
    /// Classes are ordered by descending count; equal counts keep the order
    /// in which the classes were first seen.
    pub fn tally_batch_classes(names: &[String]) -> BatchClassTally {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for name in names {
            match positions.get(name.as_str()) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(name.as_str(), counts.len());
                    counts.push((name.as_str(), 1));
                }
            }
        }

        // Stable sort keeps first-seen order among ties.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total = names.len();
        let classes = counts
            .into_iter()
            .map(|(name, count)| BatchClassShare {
                name: name.to_string(),
                count,
                percentage: percentage(count as f64, total as f64),
            })
            .collect();

        BatchClassTally { total, classes }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── mean ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_mean_basic() {
        assert_eq!(StatisticsCalculator::mean(&[10.0, 20.0, 30.0, 60.0]), Some(30.0));
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(StatisticsCalculator::mean(&[]), None);
    }

    #[test]
    fn test_mean_keeps_fraction() {
        let m = StatisticsCalculator::mean(&[1.0, 2.0]).unwrap();
        assert!((m - 1.5).abs() < 1e-12);
    }

    // ── compute_averages ─────────────────────────────────────────────────────

    #[test]
    fn test_compute_averages_in_step_order() {
        let mut table = StepTable::new();
        table.record("Extract", 4.0, false);
        table.record("Load", 10.0, false);
        table.record("Extract", 8.0, false);

        let averages = StatisticsCalculator::compute_averages(&table);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].step, "Extract");
        assert!((averages[0].average_seconds - 6.0).abs() < 1e-12);
        assert_eq!(averages[0].samples, 2);
        assert_eq!(averages[1].step, "Load");
    }

    #[test]
    fn test_compute_averages_omits_steps_without_samples() {
        let mut table = StepTable::new();
        table.entry("Idle");
        table.record("Load", 5.0, false);

        let averages = StatisticsCalculator::compute_averages(&table);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].step, "Load");
        assert!(averages.iter().all(|a| a.average_seconds.is_finite()));
    }

    #[test]
    fn test_compute_averages_empty_table() {
        assert!(StatisticsCalculator::compute_averages(&StepTable::new()).is_empty());
    }

    // ── collect_errors ───────────────────────────────────────────────────────

    #[test]
    fn test_collect_errors_skips_clean_steps() {
        let mut table = StepTable::new();
        table.record("Load", 1.0, false);
        table.record("Export", 1.0, true);
        table.record("Export", 1.0, true);

        let errors = StatisticsCalculator::collect_errors(&table);
        assert_eq!(
            errors,
            vec![StepErrors {
                step: "Export".to_string(),
                count: 2
            }]
        );
    }

    // ── tally_batch_classes ──────────────────────────────────────────────────

    #[test]
    fn test_tally_single_class() {
        let tally = StatisticsCalculator::tally_batch_classes(&names(&["Standard", "Standard"]));
        assert_eq!(tally.total, 2);
        assert_eq!(tally.classes.len(), 1);
        assert_eq!(tally.classes[0].count, 2);
        assert!((tally.classes[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tally_sorted_by_count_desc() {
        let tally = StatisticsCalculator::tally_batch_classes(&names(&[
            "Rush", "Standard", "Standard", "Bulk", "Standard", "Bulk",
        ]));
        let order: Vec<&str> = tally.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["Standard", "Bulk", "Rush"]);
        assert_eq!(tally.count_for("Bulk"), 2);
        assert_eq!(tally.count_for("Missing"), 0);
    }

    #[test]
    fn test_tally_ties_keep_first_seen_order() {
        let tally =
            StatisticsCalculator::tally_batch_classes(&names(&["Zeta", "Alpha", "Alpha", "Zeta"]));
        let order: Vec<&str> = tally.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_tally_percentages_sum_to_hundred() {
        let tally =
            StatisticsCalculator::tally_batch_classes(&names(&["A", "B", "B", "C", "C", "C", "D"]));
        let sum: f64 = tally.classes.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn test_tally_empty() {
        let tally = StatisticsCalculator::tally_batch_classes(&[]);
        assert_eq!(tally.total, 0);
        assert!(tally.classes.is_empty());
        assert!(tally.is_empty());
    }
}
