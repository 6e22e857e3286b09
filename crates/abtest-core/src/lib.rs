#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! abtest Core Library
//!
//! Data loading, cleaning and statistics for conversion-rate A/B tests.

pub mod analysis;
pub mod config;
pub mod conversions;
pub mod dataset;
pub mod error;
pub mod interval;
pub mod power;
mod proptests;
pub mod stats;
pub mod wrangle;

// Re-exports for convenience
pub use analysis::{AnalysisReport, analyze};
pub use config::{AbConfig, ConfigManager};
pub use conversions::{ConversionReport, report_conversions};
pub use dataset::{ColumnNames, Dataset};
pub use error::{Error, Result};
pub use interval::{ConfidenceInterval, ab_test_ci};
pub use power::{SampleSizeCheck, SampleSizeParams, SampleSizeVerdict, check_sample_sizes};
pub use wrangle::{Assignment, CleanSummary, clean};
