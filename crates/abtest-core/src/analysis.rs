//! End-to-end evaluation of a cleaned experiment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AbConfig;
use crate::conversions::{ConversionReport, report_conversions};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::interval::{ConfidenceInterval, ab_test_ci};
use crate::power::{SampleSizeCheck, check_sample_sizes};

/// Everything the analysis learned about an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Control group conversions.
    pub control: ConversionReport,
    /// Treatment group conversions.
    pub treatment: ConversionReport,
    /// Baseline rate used for the power analysis.
    pub baseline_rate: f64,
    /// Required versus actual group sizes.
    pub sample_size: SampleSizeCheck,
    /// Interval for the difference in conversion rates.
    pub interval: ConfidenceInterval,
    /// Whether the difference is significant at the configured alpha.
    pub significant: bool,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.control)?;
        writeln!(
            f,
            "  conversions: {} / {} ({:.4})",
            self.control.conversions, self.control.total_users, self.control.rate
        )?;
        writeln!(f, "{}", self.treatment)?;
        writeln!(
            f,
            "  conversions: {} / {} ({:.4})",
            self.treatment.conversions, self.treatment.total_users, self.treatment.rate
        )?;
        writeln!(
            f,
            "Required sample size: {} per group (baseline rate {:.4})",
            self.sample_size.required.round(),
            self.baseline_rate
        )?;
        writeln!(f, "{}", self.sample_size.verdict)?;
        writeln!(f, "{}", self.interval)?;
        if self.significant {
            write!(f, "Reject H0: conversion rates differ")
        } else {
            write!(f, "Fail to reject H0: no significant difference in conversion rates")
        }
    }
}

/// Report both groups, check sample sizes and build the confidence interval.
///
/// The baseline rate for the power analysis is the configured one, or the
/// observed control conversion rate when none is configured.
pub fn analyze(dataset: &Dataset, config: &AbConfig) -> Result<AnalysisReport> {
    let control = report_conversions(dataset, &config.assignment.control_group)?;
    let treatment = report_conversions(dataset, &config.assignment.treatment_group)?;

    let params = config.experiment.sample_size_params(control.rate);
    let sample_size = check_sample_sizes(control.total_users, treatment.total_users, &params)?;

    let interval = ab_test_ci(
        control.conversions,
        treatment.conversions,
        control.total_users,
        treatment.total_users,
        config.experiment.alpha,
    )?;
    let significant = interval.excludes_zero();
    tracing::info!(significant, difference = interval.difference, "analysis complete");

    Ok(AnalysisReport {
        control,
        treatment,
        baseline_rate: params.baseline_rate,
        sample_size,
        interval,
        significant,
    })
}
