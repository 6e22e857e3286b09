//! Confidence interval for the difference in conversion rates.
//!
//! Tests the two-sided hypothesis
//!
//! - H0: `p_treatment - p_control = 0`
//! - H1: `p_treatment - p_control != 0`
//!
//! using the unpooled normal approximation. H0 is rejected at level `alpha`
//! when the interval does not contain zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::norm_ppf;

/// A `1 - alpha` confidence interval for `p_treatment - p_control`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Point estimate of the difference.
    pub difference: f64,
    /// Standard error of the difference.
    pub std_error: f64,
    /// Critical value used.
    pub z: f64,
    /// Significance level.
    pub alpha: f64,
}

impl ConfidenceInterval {
    /// Whether zero lies outside the interval, i.e. H0 is rejected.
    pub fn excludes_zero(&self) -> bool {
        !self.contains(0.0)
    }

    /// Whether `value` lies inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% CI for treatment - control: [{:.6}, {:.6}] (difference {:.6})",
            (1.0 - self.alpha) * 100.0,
            self.lower,
            self.upper,
            self.difference
        )
    }
}

/// Build the confidence interval from raw counts.
pub fn ab_test_ci(
    conversions_control: u64,
    conversions_treatment: u64,
    total_users_control: u64,
    total_users_treatment: u64,
    alpha: f64,
) -> Result<ConfidenceInterval> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::validation_field("alpha", "must be in (0, 1)"));
    }
    let rate_c = rate("control", conversions_control, total_users_control)?;
    let rate_t = rate("treatment", conversions_treatment, total_users_treatment)?;

    let difference = rate_t - rate_c;
    let variance = rate_t * (1.0 - rate_t) / total_users_treatment as f64
        + rate_c * (1.0 - rate_c) / total_users_control as f64;
    let std_error = variance.sqrt();
    let z = norm_ppf(1.0 - alpha / 2.0);

    let ci = ConfidenceInterval {
        lower: difference - z * std_error,
        upper: difference + z * std_error,
        difference,
        std_error,
        z,
        alpha,
    };
    tracing::debug!(lower = ci.lower, upper = ci.upper, "computed confidence interval");
    Ok(ci)
}

fn rate(group: &str, conversions: u64, total: u64) -> Result<f64> {
    if total == 0 {
        return Err(Error::validation_field(
            format!("total_users_{group}"),
            "must be positive",
        ));
    }
    if conversions > total {
        return Err(Error::validation_field(
            format!("conversions_{group}"),
            "cannot exceed the number of users",
        ));
    }
    Ok(conversions as f64 / total as f64)
}
