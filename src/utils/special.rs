//! Special functions used by the mass profiles.
//!
//! Gamma-family functions come from `statrs`; the Gauss hypergeometric
//! function is evaluated here by power series after a Pfaff transformation.

use crate::error::{GalkinError, Result};
use crate::utils::roots::{brent, RootFindingConfig};
use statrs::function::gamma;

/// Relative size of the last series term at which the sum is accepted.
const SERIES_TOLERANCE: f64 = 1e-17;

/// Iteration cap for the hypergeometric series.
const SERIES_MAX_TERMS: usize = 200_000;

/// Gamma function Γ(x).
pub fn gamma_fn(x: f64) -> f64 {
    gamma::gamma(x)
}

/// Natural logarithm of the gamma function, ln Γ(x).
pub fn ln_gamma(x: f64) -> f64 {
    gamma::ln_gamma(x)
}

/// Regularized lower incomplete gamma function P(a, x).
///
/// Defined as 0 for `x <= 0` and 1 for `x = +inf`. Returns NaN when `a` is
/// not a positive finite number or either argument is NaN.
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if a.is_nan() || x.is_nan() || a <= 0.0 || a.is_infinite() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return 1.0;
    }
    gamma::gamma_lr(a, x)
}

/// Gauss hypergeometric function ₂F₁(a, b; c; z) for real `z < 1`.
///
/// Negative arguments are mapped into `[0, 1)` with the Pfaff transformation
/// ₂F₁(a, b; c; z) = (1 − z)^(−a) ₂F₁(a, c − b; c; z / (z − 1)).
///
/// # Errors
///
/// * `InvalidInput` if `c` is a non-positive integer or `z >= 1`
/// * `ConvergenceFailure` if the series does not converge within the term budget
pub fn hyp2f1(a: f64, b: f64, c: f64, z: f64) -> Result<f64> {
    if c <= 0.0 && c.fract() == 0.0 {
        return Err(GalkinError::InvalidInput(format!(
            "hyp2f1 undefined for non-positive integer c = {}",
            c
        )));
    }
    if !(z < 1.0) {
        return Err(GalkinError::InvalidInput(format!(
            "hyp2f1 series requires z < 1, got {}",
            z
        )));
    }

    if z < 0.0 {
        let w = z / (z - 1.0);
        let inner = hyp2f1_series(a, c - b, c, w)?;
        return Ok((1.0 - z).powf(-a) * inner);
    }

    hyp2f1_series(a, b, c, z)
}

fn hyp2f1_series(a: f64, b: f64, c: f64, z: f64) -> Result<f64> {
    if z == 0.0 {
        return Ok(1.0);
    }

    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 0..SERIES_MAX_TERMS {
        let kf = k as f64;
        term *= (a + kf) * (b + kf) / ((c + kf) * (kf + 1.0)) * z;
        sum += term;

        if !sum.is_finite() {
            return Err(GalkinError::ConvergenceFailure(format!(
                "hyp2f1({}, {}; {}; {}) diverged",
                a, b, c, z
            )));
        }
        if term.abs() <= SERIES_TOLERANCE * sum.abs() {
            return Ok(sum);
        }
    }

    Err(GalkinError::ConvergenceFailure(format!(
        "hyp2f1({}, {}; {}; {}) did not converge in {} terms",
        a, b, c, z, SERIES_MAX_TERMS
    )))
}

/// Sersic `b_n`: the solution of P(2n, b_n) = 0.5, so that half of the
/// projected light lies inside the effective radius.
pub fn sersic_bn(n: f64) -> Result<f64> {
    if !(n > 0.0) || !n.is_finite() {
        return Err(GalkinError::InvalidInput(format!(
            "Sersic index must be positive and finite, got {}",
            n
        )));
    }

    let two_n = 2.0 * n;
    let config = RootFindingConfig {
        tolerance: 1e-14,
        max_iterations: 200,
        ..RootFindingConfig::default()
    };
    brent(
        |b| Ok(regularized_lower_gamma(two_n, b) - 0.5),
        1e-10,
        two_n + 1.0,
        &config,
        "sersic b_n",
    )
}
