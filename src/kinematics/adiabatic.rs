//! Adiabatic contraction of the dark matter halo.
//!
//! For each radius `r` the initial radius `r'` of the dark matter shell that
//! ends up at `r` solves
//!
//! ```text
//! r + r (r v_bar(r)²) / (r' v_dm(r')²) - r' = 0
//! ```
//!
//! where `v_dm` is the uncontracted halo rotation curve, tabulated on a
//! regular grid and interpolated. The contracted halo velocity at `r` is the
//! tabulated velocity at `r'`.

use super::config::AdiabaticContractionConfig;
use crate::error::{GalkinError, Result};
use crate::utils::interp::LinearInterpolator;
use crate::utils::roots::{brent, BracketPolicy, RootFindingConfig};

/// Contracted halo velocities and the initial radii they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractionResult {
    /// Initial radius r' for each requested radius
    pub rprime: Vec<f64>,

    /// Contracted dark matter velocity in km/s
    pub vdm: Vec<f64>,

    /// Number of radii that needed a root solve
    pub solved: usize,
}

/// Contract a halo rotation curve.
///
/// # Arguments
///
/// * `r` - Radii in kpc
/// * `vbar` - Baryonic circular velocity at each radius
/// * `vdm_profile` - Uncontracted halo circular velocity as a function of radius
/// * `config` - Table spacing and solver budget
///
/// # Errors
///
/// * `DimensionMismatch` if `r` and `vbar` differ in length
/// * `InvalidConfiguration` if the table step is not positive
/// * `ConvergenceFailure` if the objective is not finite at the inner edge of
///   the search, no bracket is found within the expansion budget, or the root
///   finder does not converge
pub fn contract<F>(
    r: &[f64],
    vbar: &[f64],
    vdm_profile: F,
    config: &AdiabaticContractionConfig,
) -> Result<ContractionResult>
where
    F: Fn(f64) -> Result<f64>,
{
    if r.len() != vbar.len() {
        return Err(GalkinError::DimensionMismatch(format!(
            "{} radii but {} baryonic velocities",
            r.len(),
            vbar.len()
        )));
    }
    if !(config.step > 0.0) {
        return Err(GalkinError::InvalidConfiguration(format!(
            "adiabatic contraction step must be positive, got {}",
            config.step
        )));
    }

    let rmax = r.iter().copied().filter(|x| x.is_finite()).fold(0.0, f64::max);
    let nsteps = ((rmax / config.step).ceil() as usize + 1).max(2);
    let r1d: Vec<f64> = (1..=nsteps).map(|i| i as f64 * config.step).collect();
    let v1d = r1d.iter().map(|&x| vdm_profile(x)).collect::<Result<Vec<f64>>>()?;

    if v1d.iter().all(|&v| v == 0.0) {
        return Ok(ContractionResult {
            rprime: r.to_vec(),
            vdm: vec![0.0; r.len()],
            solved: 0,
        });
    }

    let rmin = r1d[1];
    let table = LinearInterpolator::new(r1d, v1d)?;
    let root_config = RootFindingConfig {
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        bracket_policy: BracketPolicy::Raise,
    };

    let mut rprime = Vec::with_capacity(r.len());
    let mut vdm = Vec::with_capacity(r.len());
    let mut solved = 0;

    for (&ri, &vbi) in r.iter().zip(vbar) {
        if !(ri > 0.0) {
            rprime.push(ri);
            vdm.push(0.0);
            continue;
        }

        let objective = |rp: f64| -> Result<f64> {
            let rp = rp.max(rmin);
            let vi = table.eval(rp);
            Ok(ri + ri * (ri * vbi * vbi) / (rp * vi * vi) - rp)
        };

        let lo = ri.max(rmin);
        let f_lo = objective(lo)?;
        if !f_lo.is_finite() {
            return Err(GalkinError::ConvergenceFailure(format!(
                "adiabatic contraction: objective is {} at r' = {} for r = {}",
                f_lo, lo, ri
            )));
        }
        let rp = if f_lo <= 0.0 {
            lo
        } else {
            let hi = expand_bracket(&objective, lo, config.max_bracket_expansions).ok_or_else(|| {
                GalkinError::ConvergenceFailure(format!(
                    "adiabatic contraction: no bracket for r = {} within {} expansions",
                    ri, config.max_bracket_expansions
                ))
            })?;
            solved += 1;
            brent(&objective, lo, hi, &root_config, "adiabatic contraction radius")?
        };

        rprime.push(rp);
        vdm.push(table.eval(rp));
    }

    Ok(ContractionResult { rprime, vdm, solved })
}

/// Double `lo` until the objective turns negative.
fn expand_bracket<F>(objective: &F, lo: f64, max_expansions: usize) -> Option<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let mut hi = lo;
    for _ in 0..max_expansions {
        hi *= 2.0;
        match objective(hi) {
            Ok(value) if value.is_finite() && value < 0.0 => return Some(hi),
            _ => continue,
        }
    }
    None
}
