//! Pressure support (asymmetric drift) corrections.
//!
//! A dispersion-supported disk rotates slower than the circular velocity:
//! v_rot² = v_circ² − v_ad²(r). Each correction type supplies v_ad².

use super::config::PressureSupportType;
use crate::error::{GalkinError, Result};
use crate::model::MassModel;
use std::fmt::Debug;

/// Log density slope of a self-gravitating Sersic profile.
///
/// Implementations typically interpolate precomputed tables; registering one
/// with a model set enables [`PressureSupportType::ExactSersic`].
pub trait SersicSlopeProvider: Debug + Send + Sync {
    /// d ln ρ / d ln r at radius `r` for a profile with effective radius `re` and index `n`.
    fn dlnrho_dlnr(&self, r: f64, re: f64, n: f64) -> Result<f64>;
}

/// Inputs shared by all correction types at one radius.
#[derive(Debug, Clone, Copy)]
pub struct PressureInputs {
    /// Velocity dispersion in km/s
    pub sigma: f64,

    /// Effective radius in kpc
    pub re: f64,

    /// Sersic index (exact Sersic correction only)
    pub n: f64,
}

/// Squared asymmetric drift velocity v_ad² at radius `r`.
///
/// # Arguments
///
/// * `kind` - Correction type
/// * `r` - Radius in kpc
/// * `inputs` - Dispersion, effective radius and Sersic index
/// * `provider` - Self-gravitating Sersic slopes, required by `ExactSersic`
/// * `baryon_slope` - Density-weighted baryonic log slope, used by `PressureGradient`
///
/// # Errors
///
/// `FeatureUnavailable` when `ExactSersic` is requested without a provider.
pub fn asymmetric_drift_sq<S>(
    kind: PressureSupportType,
    r: f64,
    inputs: &PressureInputs,
    provider: Option<&dyn SersicSlopeProvider>,
    baryon_slope: S,
) -> Result<f64>
where
    S: FnOnce() -> Result<f64>,
{
    let sigma_sq = inputs.sigma * inputs.sigma;
    match kind {
        PressureSupportType::ExponentialSelfGravity => Ok(3.36 * sigma_sq * (r / inputs.re)),
        PressureSupportType::ExactSersic => {
            let provider = provider.ok_or_else(|| {
                GalkinError::FeatureUnavailable(
                    "exact Sersic pressure support requires a Sersic slope provider".to_string(),
                )
            })?;
            Ok(-sigma_sq * provider.dlnrho_dlnr(r, inputs.re, inputs.n)?)
        }
        PressureSupportType::PressureGradient => Ok(-sigma_sq * baryon_slope()?),
    }
}

/// Rotation velocity after subtracting `vad_sq`, clipped at zero.
pub fn rotation_velocity(vcirc: f64, vad_sq: f64) -> f64 {
    (vcirc * vcirc - vad_sq).max(0.0).sqrt()
}

/// Density-weighted log slope Σ ρ_i s_i / Σ ρ_i of a set of components.
///
/// Zero where the total density vanishes.
pub fn density_weighted_slope<'a, I, M>(components: I, r: f64) -> Result<f64>
where
    I: IntoIterator<Item = &'a M>,
    M: MassModel + 'a,
{
    let mut rho_total = 0.0;
    let mut weighted = 0.0;
    for component in components {
        let rho = component.density(r)?;
        if rho > 0.0 && rho.is_finite() {
            rho_total += rho;
            weighted += rho * component.dlnrho_dlnr(r)?;
        }
    }
    Ok(if rho_total > 0.0 { weighted / rho_total } else { 0.0 })
}
