//! Finite difference methods for numerical differentiation.

use crate::error::{GalkinError, Result};

/// Default relative step for finite differences in log space.
const DEFAULT_EPSILON: f64 = 1e-5;

/// Logarithmic derivative d ln f / d ln x by central differences in ln x.
///
/// # Arguments
///
/// * `f` - Positive-valued function to differentiate
/// * `x` - Positive point at which to evaluate the derivative
/// * `epsilon` - Step in ln x (optional)
///
/// # Returns
///
/// * `Result<f64>` - The logarithmic slope; 0 if `f` vanishes on either side
pub fn log_derivative<F>(f: F, x: f64, epsilon: Option<f64>) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if !(x > 0.0) {
        return Err(GalkinError::InvalidInput(format!(
            "logarithmic derivative requires x > 0, got {}",
            x
        )));
    }
    let h = epsilon.unwrap_or(DEFAULT_EPSILON);
    let x_hi = x * h.exp();
    let x_lo = x * (-h).exp();

    let f_hi = f(x_hi)?;
    let f_lo = f(x_lo)?;
    if f_hi <= 0.0 || f_lo <= 0.0 {
        return Ok(0.0);
    }

    Ok((f_hi.ln() - f_lo.ln()) / (2.0 * h))
}
