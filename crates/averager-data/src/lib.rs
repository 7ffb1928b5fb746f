//! Data ingestion layer for the log time averager.
//!
//! Responsible for discovering and decoding batch-tool log files, classifying
//! their rows, aggregating per-file statistics and running the top-level
//! analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod reader;

pub use averager_core as core;
