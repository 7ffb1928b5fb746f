use averager_core::formatting::{format_duration, format_number};
use averager_core::models::{FileFailure, RunResult};

/// Render the human-readable report.
pub fn render_text(result: &RunResult) -> String {
    let mut lines = vec!["Average processing times:".to_string()];
    for avg in &result.averages {
        let mut line = format!("- {}: {}", avg.step, format_duration(avg.average_seconds));
        let errors = result.errors_for(&avg.step);
        if errors > 0 {
            line.push_str(&format!(" ({} errors)", errors));
        }
        lines.push(line);
    }

    let total_errors = result.total_errors();
    if total_errors > 0 {
        lines.push(String::new());
        lines.push(format!("Total errors: {}", total_errors));
    }

    if !result.batch_classes.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Batch classes ({} total):",
            format_number(result.batch_classes.total as f64, 0)
        ));
        for class in &result.batch_classes.classes {
            lines.push(format!(
                "- {}: {} ({}%)",
                class.name,
                format_number(class.count as f64, 0),
                format_number(class.percentage, 1)
            ));
        }
    }

    if let Some(range) = result.date_range {
        lines.push(String::new());
        lines.push(format!(
            "Date range: {} to {}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        ));
    }

    if !result.failures.is_empty() {
        lines.push(String::new());
        lines.extend(render_failures(&result.failures));
    }

    lines.join("\n")
}

/// Render the full result as pretty-printed JSON.
pub fn render_json(result: &RunResult) -> averager_core::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// One `Skipped <path>: <message>` line per failed file.
pub fn render_failures(failures: &[FileFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|f| format!("Skipped {}: {}", f.path.display(), f.message))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
