use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::NegativeDurationPolicy;

// ── OutputFormat ───────────────────────────────────────────────────────────────

/// How the run result is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Pretty-printed JSON of the full run result.
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Average step durations and tally batch classes from batch-tool logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "log-time-averager",
    about = "Average step durations and tally batch classes from batch-tool logs",
    version
)]
pub struct Settings {
    /// Log files, or directories to search for *.log and *.txt files
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Treatment of timing rows whose end precedes their start
    #[arg(long, value_enum, default_value_t = NegativeDurationPolicy::Keep)]
    pub negative_durations: NegativeDurationPolicy,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Do not take the single-instance lock
    #[arg(long)]
    pub no_lock: bool,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
