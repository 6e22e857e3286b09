//! Power analysis for two-proportion experiments.
//!
//! Answers "how many users per group do we need?" for a given baseline
//! conversion rate and the smallest lift worth detecting:
//!
//! 1. Convert the two proportions into Cohen's h ([`proportion_effect_size`]).
//! 2. Solve the two-sided normal power equation for the group size
//!    ([`solve_sample_size`]).
//!
//! # Example
//!
//! ```
//! use abtest_core::power::SampleSizeParams;
//!
//! let n = SampleSizeParams::new(0.1204).required_sample_size().unwrap();
//! assert_eq!(n.round(), 17210.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::{norm_cdf, norm_ppf, norm_sf};

/// Default minimum change in the conversion rate worth detecting.
pub const DEFAULT_PRACTICAL_SIGNIFICANCE: f64 = 0.01;
/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default statistical power.
pub const DEFAULT_POWER: f64 = 0.8;

const MAX_BISECTIONS: usize = 200;
const MAX_NOBS: f64 = 1e15;

/// Cohen's h effect size between two proportions.
pub fn proportion_effect_size(p1: f64, p2: f64) -> f64 {
    2.0 * p1.sqrt().asin() - 2.0 * p2.sqrt().asin()
}

/// Power of a two-sided, two-sample z-test.
///
/// `nobs1` is the size of the first group and `ratio` the size of the
/// second group relative to the first.
pub fn normal_ind_power(effect_size: f64, nobs1: f64, alpha: f64, ratio: f64) -> f64 {
    let nobs2 = nobs1 * ratio;
    let nobs = 1.0 / (1.0 / nobs1 + 1.0 / nobs2);
    let crit = norm_ppf(1.0 - alpha / 2.0);
    let shift = effect_size.abs() * nobs.sqrt();
    norm_sf(crit - shift) + norm_cdf(-crit - shift)
}

/// Size of the first group needed to reach `power`.
///
/// Power grows monotonically with the group size, so the root is bracketed
/// by doubling and then found by bisection.
pub fn solve_sample_size(effect_size: f64, power: f64, alpha: f64, ratio: f64) -> Result<f64> {
    check_open_unit("alpha", alpha)?;
    check_open_unit("power", power)?;
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(Error::validation_field("ratio", "must be positive"));
    }
    if !effect_size.is_finite() || effect_size == 0.0 {
        return Err(Error::validation_field(
            "effect_size",
            "must be finite and non-zero",
        ));
    }
    if power <= alpha {
        return Err(Error::validation_field("power", "must exceed alpha"));
    }

    let gap = |n: f64| normal_ind_power(effect_size, n, alpha, ratio) - power;

    let mut lo = f64::MIN_POSITIVE.sqrt();
    let mut hi = 2.0;
    while gap(hi) < 0.0 {
        lo = hi;
        hi *= 2.0;
        if hi > MAX_NOBS {
            return Err(Error::validation("effect size too small to reach requested power"));
        }
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if gap(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= f64::EPSILON * hi {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

fn check_open_unit(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::validation_field(field, "must be in (0, 1)"))
    }
}

fn check_rate(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::validation_field(field, "must be in [0, 1]"))
    }
}

/// Inputs to a sample size calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeParams {
    /// Conversion rate before any change.
    pub baseline_rate: f64,
    /// Smallest change to the baseline rate worth detecting.
    pub practical_significance: f64,
    /// Probability of rejecting a true null hypothesis.
    pub alpha: f64,
    /// Probability of rejecting a false null hypothesis.
    pub power: f64,
}

impl SampleSizeParams {
    /// Parameters with the default significance level, power and lift.
    pub fn new(baseline_rate: f64) -> Self {
        Self {
            baseline_rate,
            practical_significance: DEFAULT_PRACTICAL_SIGNIFICANCE,
            alpha: DEFAULT_ALPHA,
            power: DEFAULT_POWER,
        }
    }

    /// Sets the minimum detectable change.
    pub fn with_practical_significance(mut self, value: f64) -> Self {
        self.practical_significance = value;
        self
    }

    /// Sets the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the target power.
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Users needed per group, assuming equally sized groups.
    pub fn required_sample_size(&self) -> Result<f64> {
        check_rate("baseline_rate", self.baseline_rate)?;
        check_rate(
            "practical_significance",
            self.baseline_rate + self.practical_significance,
        )?;
        let effect = proportion_effect_size(
            self.baseline_rate,
            self.baseline_rate + self.practical_significance,
        );
        let n = solve_sample_size(effect, self.power, self.alpha, 1.0)?;
        tracing::info!("Required sample size: {} per group", n.round());
        Ok(n)
    }
}

/// Outcome of comparing group sizes against the required sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSizeVerdict {
    /// Both groups are large enough.
    Sufficient,
    /// Only the treatment group is too small.
    TreatmentInsufficient,
    /// Only the control group is too small.
    ControlInsufficient,
    /// Neither group is large enough.
    BothInsufficient,
}

impl SampleSizeVerdict {
    /// Whether hypothesis testing can proceed.
    pub fn is_sufficient(self) -> bool {
        self == SampleSizeVerdict::Sufficient
    }

    /// A group is large enough when it has at least `required` users.
    fn compare(control_users: u64, treatment_users: u64, required: f64) -> Self {
        let control_ok = control_users as f64 >= required;
        let treatment_ok = treatment_users as f64 >= required;
        match (control_ok, treatment_ok) {
            (true, true) => SampleSizeVerdict::Sufficient,
            (true, false) => SampleSizeVerdict::TreatmentInsufficient,
            (false, true) => SampleSizeVerdict::ControlInsufficient,
            (false, false) => SampleSizeVerdict::BothInsufficient,
        }
    }
}

impl fmt::Display for SampleSizeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SampleSizeVerdict::Sufficient => {
                "Control and treatment groups are sufficiently large to conduct hypothesis testing"
            }
            SampleSizeVerdict::TreatmentInsufficient => {
                "Treatment group not sufficiently large to conduct hypothesis testing."
            }
            SampleSizeVerdict::ControlInsufficient => {
                "Control group not sufficiently large to conduct hypothesis testing."
            }
            SampleSizeVerdict::BothInsufficient => {
                "Control and treatment groups not sufficiently large to conduct hypothesis testing."
            }
        };
        f.write_str(msg)
    }
}

/// Required size and verdict for a pair of groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeCheck {
    /// Users required per group.
    pub required: f64,
    /// Users in the control group.
    pub control_users: u64,
    /// Users in the treatment group.
    pub treatment_users: u64,
    /// Whether the groups are large enough.
    pub verdict: SampleSizeVerdict,
}

/// Check whether both groups meet the required sample size.
pub fn check_sample_sizes(
    control_users: u64,
    treatment_users: u64,
    params: &SampleSizeParams,
) -> Result<SampleSizeCheck> {
    let required = params.required_sample_size()?;
    let verdict = SampleSizeVerdict::compare(control_users, treatment_users, required);
    if verdict.is_sufficient() {
        tracing::info!(control_users, treatment_users, "{verdict}");
    } else {
        tracing::warn!(control_users, treatment_users, required, "{verdict}");
    }
    Ok(SampleSizeCheck {
        required,
        control_users,
        treatment_users,
        verdict,
    })
}
