mod bootstrap;
mod report;

use std::process::ExitCode;

use anyhow::Result;
use averager_core::settings::{OutputFormat, Settings};
use averager_data::analysis::{analyze, AnalysisOptions, AnalysisOutcome};
use averager_data::reader::expand_inputs;

const EXIT_NO_SELECTION: u8 = 2;
const EXIT_NO_DATA: u8 = 3;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Log Time Averager v{} starting", env!("CARGO_PKG_VERSION"));

    // Held until the end of `run`; dropping it removes the lock file.
    let _lock = if settings.no_lock {
        None
    } else {
        Some(bootstrap::InstanceLock::acquire(&bootstrap::default_lock_dir())?)
    };

    let paths = expand_inputs(&settings.paths);
    let options = AnalysisOptions::from(&settings);

    match analyze(&paths, &options) {
        AnalysisOutcome::NoSelection => {
            eprintln!("No files selected.");
            Ok(ExitCode::from(EXIT_NO_SELECTION))
        }
        AnalysisOutcome::NoData { failures } => {
            for line in report::render_failures(&failures) {
                eprintln!("{}", line);
            }
            eprintln!("No valid data or errors found.");
            Ok(ExitCode::from(EXIT_NO_DATA))
        }
        AnalysisOutcome::Completed(result) => {
            let rendered = match settings.format {
                OutputFormat::Text => report::render_text(&result),
                OutputFormat::Json => report::render_json(&result)?,
            };
            println!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
    }
}
