//! Standard normal distribution helpers.
//!
//! The CDF uses Hart's double-precision rational approximation and the
//! inverse CDF uses Acklam's approximation refined with one Halley step,
//! which together are accurate to roughly 1e-14 over the useful range.

use std::f64::consts::PI;

const SQRT_2PI: f64 = 2.506_628_274_631;

// Acklam's coefficients for the inverse normal CDF.
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const P_LOW: f64 = 0.024_25;

// Beyond this |x| the lower tail is below the smallest normal f64.
const TAIL_CUTOFF: f64 = 37.0;

/// Probability density of the standard normal distribution.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Cumulative distribution function of the standard normal distribution.
pub fn norm_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let tail = lower_tail_abs(x.abs());
    if x > 0.0 { 1.0 - tail } else { tail }
}

/// Survival function `1 - cdf(x)`, computed without cancellation for large `x`.
pub fn norm_sf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let tail = lower_tail_abs(x.abs());
    if x > 0.0 { tail } else { 1.0 - tail }
}

/// Inverse of [`norm_cdf`].
///
/// Returns `-inf` at 0, `+inf` at 1 and NaN outside `[0, 1]`.
///
/// # Examples
///
/// ```
/// use abtest_core::stats::norm_ppf;
///
/// assert!((norm_ppf(0.975) - 1.959_963_984_540_054).abs() < 1e-12);
/// assert_eq!(norm_ppf(0.5), 0.0);
/// ```
pub fn norm_ppf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    let x = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail_ratio(q)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail_ratio(q)
    };

    // Halley refinement against the accurate CDF. Past the cutoff the CDF
    // saturates and the density underflows, so Acklam's estimate stands.
    if x.abs() > TAIL_CUTOFF {
        return x;
    }
    let u = (norm_cdf(x) - p) / norm_pdf(x);
    if !u.is_finite() {
        return x;
    }
    x - u / (1.0 + x * u / 2.0)
}

fn tail_ratio(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

/// `P(Z <= -x)` for `x >= 0`.
fn lower_tail_abs(x: f64) -> f64 {
    if x > TAIL_CUTOFF {
        return 0.0;
    }
    let e = (-x * x / 2.0).exp();
    if x < 7.071_067_811_865_47 {
        let mut num = 3.526_249_659_989_11e-2 * x + 0.700_383_064_443_688;
        num = num * x + 6.373_962_203_531_65;
        num = num * x + 33.912_866_078_383;
        num = num * x + 112.079_291_497_871;
        num = num * x + 221.213_596_169_931;
        num = num * x + 220.206_867_912_376;

        let mut den = 8.838_834_764_831_84e-2 * x + 1.755_667_163_182_64;
        den = den * x + 16.064_177_579_207;
        den = den * x + 86.780_732_202_946_1;
        den = den * x + 296.564_248_779_674;
        den = den * x + 637.333_633_378_831;
        den = den * x + 793.826_512_519_948;
        den = den * x + 440.413_735_824_752;

        e * num / den
    } else {
        let mut b = x + 0.65;
        b = x + 4.0 / b;
        b = x + 3.0 / b;
        b = x + 2.0 / b;
        b = x + 1.0 / b;
        e / b / SQRT_2PI
    }
}
