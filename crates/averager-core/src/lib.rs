//! Shared types and pure computations for the log time averager.
//!
//! Holds the record and result model, the error type, command-line settings,
//! timestamp parsing, and the statistics and formatting helpers used to turn
//! accumulated samples into a report.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod statistics;
pub mod timestamps;

pub use error::{AveragerError, Result};
