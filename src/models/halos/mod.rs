//! Dark matter halo profiles.
//!
//! All halos share a virial mass `mvirial` (log10 Msun unless stated
//! otherwise), a redshift and a cosmology used to derive the virial radius,
//! and an `fdm` parameter holding the dark matter fraction used by the
//! inversions below.
//!
//! # Dark matter fraction inversion
//!
//! Given a baryonic component and a radius `r_fdm`, the dark matter circular
//! velocity that realises the halo's `fdm` is
//! `v_dm² = v_bar(r_fdm)² / (1/fdm - 1)`. A halo parameter is then sampled on
//! a coarse grid, bracketed at the first sign change of
//! `v_halo(r_fdm)² - v_dm²`, and refined with Brent's method.

mod burkert;
mod dekel_zhao;
mod einasto;
mod nfw;
mod two_power;

pub use burkert::Burkert;
pub use dekel_zhao::DekelZhao;
pub use einasto::{Einasto, EinastoShape};
pub use nfw::{LinearNfw, Nfw};
pub use two_power::TwoPowerHalo;

use crate::constants::G_PC_MSUN_KMS2;
use crate::cosmology::{Cosmology, FlatLambdaCdm};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink, TracingSink};
use crate::error::{GalkinError, Result};
use crate::kinematics::config::AdiabaticContractionConfig;
use crate::model::MassModel;
use crate::model_set::ModelSet;
use crate::models::{bounded_parameter, MassComponent};
use crate::parameters::Parameter;
use crate::utils::roots::{arange, solve_on_grid, RootFindingConfig};
use std::sync::Arc;

/// Fractions below this are treated as "no halo".
const FDM_ZERO_THRESHOLD: f64 = 1e-10;

/// Redshift and cosmology a halo is evaluated in.
#[derive(Debug, Clone)]
pub struct HaloContext {
    pub z: f64,
    pub cosmology: Arc<dyn Cosmology>,
}

impl Default for HaloContext {
    fn default() -> Self {
        Self {
            z: 0.0,
            cosmology: Arc::new(FlatLambdaCdm::default()),
        }
    }
}

/// Virial radius in kpc of a halo of `mass` Msun at redshift `z`.
///
/// # Notes
///
/// Solves M_vir = 100 H(z)² R_vir³ / G, i.e. a mean density of 200 ρ_crit.
pub fn calc_rvir(mass: f64, z: f64, cosmology: &dyn Cosmology) -> f64 {
    let g_kpc = G_PC_MSUN_KMS2 * 1e-3;
    let hz_kpc = cosmology.hubble_parameter(z) * 1e-3;
    (mass * g_kpc / (10.0 * hz_kpc).powi(2)).cbrt()
}

/// Settings for the dark matter fraction inversions.
#[derive(Debug, Clone)]
pub struct InversionOptions {
    /// Match the adiabatically contracted halo velocity instead of the bare profile
    pub adiabatic_contract: bool,

    pub root_finding: RootFindingConfig,

    /// Contraction settings used when `adiabatic_contract` is set
    pub contraction: AdiabaticContractionConfig,

    pub diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Default for InversionOptions {
    fn default() -> Self {
        Self {
            adiabatic_contract: false,
            root_finding: RootFindingConfig::default(),
            contraction: AdiabaticContractionConfig::default(),
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl InversionOptions {
    pub fn with_adiabatic_contraction(mut self, enabled: bool) -> Self {
        self.adiabatic_contract = enabled;
        self
    }

    pub fn with_root_finding(mut self, config: RootFindingConfig) -> Self {
        self.root_finding = config;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    fn reject_contraction(&self, target: &str) -> Result<()> {
        if self.adiabatic_contract {
            return Err(GalkinError::NotImplemented(format!(
                "adiabatic contraction when solving for {}",
                target
            )));
        }
        Ok(())
    }
}

/// Common interface of dark matter halos.
pub trait DarkMatterHalo: MassModel {
    fn redshift(&self) -> f64;

    fn cosmology(&self) -> &dyn Cosmology;

    /// The `mvirial` parameter as stored.
    fn mvirial(&self) -> Result<f64> {
        self.param("mvirial")
    }

    /// Virial mass in Msun.
    fn virial_mass(&self) -> Result<f64> {
        Ok(10f64.powf(self.mvirial()?))
    }

    /// Virial radius in kpc.
    fn calc_rvir(&self) -> Result<f64> {
        Ok(calc_rvir(self.virial_mass()?, self.redshift(), self.cosmology()))
    }

    /// Density normalization in Msun kpc⁻³.
    fn calc_rho0(&self) -> Result<f64>;

    /// The `fdm` parameter.
    fn fdm(&self) -> Result<f64> {
        self.param("fdm")
    }

    /// Virial mass (log10 Msun) reproducing the halo's `fdm` at `r_fdm`.
    ///
    /// # Arguments
    ///
    /// * `baryons` - Baryonic component the fraction is measured against
    /// * `r_fdm` - Radius in kpc at which the fraction applies
    /// * `options` - Root finding, contraction and diagnostics settings
    ///
    /// # Returns
    ///
    /// The virial mass; NaN for an out-of-range `fdm`, a non-positive radius
    /// or baryons without velocity at `r_fdm`, +inf for `fdm == 1` and -inf
    /// for a vanishing `fdm`.
    ///
    /// # Errors
    ///
    /// Errors from the halo, the baryons or the contraction are returned as is.
    fn calc_mvirial_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        Self: Sized + Clone + Into<MassComponent>,
        B: MassModel + Clone + Into<MassComponent>,
    {
        solve_mvirial(self, baryons, r_fdm, options, |x| x)
    }
}

/// Squared dark matter velocity required at `r_fdm`, or the value to return directly.
pub(crate) enum FdmTarget {
    Sentinel(f64),
    Vsq(f64),
}

pub(crate) fn fdm_target<H, B>(halo: &H, baryons: &B, r_fdm: f64, sink: &dyn DiagnosticsSink) -> Result<FdmTarget>
where
    H: DarkMatterHalo + ?Sized,
    B: MassModel + ?Sized,
{
    let fdm = halo.fdm()?;
    let in_bounds = halo
        .parameters()
        .get("fdm")
        .map(|p| p.bounds().is_within_bounds(fdm))
        .unwrap_or(false);

    let sentinel = if !in_bounds {
        Some((f64::NAN, "outside its bounds"))
    } else if fdm == 1.0 {
        Some((f64::INFINITY, "equal to one"))
    } else if fdm < FDM_ZERO_THRESHOLD {
        Some((f64::NEG_INFINITY, "zero"))
    } else if !(r_fdm > 0.0) {
        Some((f64::NAN, "paired with a non-positive radius"))
    } else {
        None
    };

    if let Some((value, reason)) = sentinel {
        sink.emit(Diagnostic::info(
            DiagnosticKind::FdmEdgeCase,
            format!("{} halo: fdm={} is {}; returning {}", halo.kind_name(), fdm, reason, value),
        ));
        return Ok(FdmTarget::Sentinel(value));
    }

    let vbar = baryons.circular_velocity(r_fdm)?;
    let vsq = vbar * vbar / (1.0 / fdm - 1.0);
    // A zero target would be met by any massless halo trial
    if !(vbar > 0.0) || !vsq.is_finite() {
        sink.emit(Diagnostic::info(
            DiagnosticKind::FdmEdgeCase,
            format!(
                "{} halo: baryonic velocity {} at r={} gives no target; returning NaN",
                halo.kind_name(),
                vbar,
                r_fdm
            ),
        ));
        return Ok(FdmTarget::Sentinel(f64::NAN));
    }
    Ok(FdmTarget::Vsq(vsq))
}

/// Solve for the halo parameter value at which `trial` reproduces the fdm target.
///
/// `trial(x)` is the halo circular velocity at `r_fdm` for parameter value `x`.
pub(crate) fn invert_fdm<H, B, F>(
    halo: &H,
    baryons: &B,
    r_fdm: f64,
    grid: &[f64],
    target: &str,
    options: &InversionOptions,
    mut trial: F,
) -> Result<f64>
where
    H: DarkMatterHalo + ?Sized,
    B: MassModel + ?Sized,
    F: FnMut(f64) -> Result<f64>,
{
    let vsq_target = match fdm_target(halo, baryons, r_fdm, options.diagnostics.as_ref())? {
        FdmTarget::Sentinel(value) => return Ok(value),
        FdmTarget::Vsq(vsq) => vsq,
    };

    let solution = solve_on_grid(
        grid,
        |x| {
            let v = trial(x)?;
            Ok(v * v - vsq_target)
        },
        &options.root_finding,
        target,
    )?;

    if !solution.bracket.verified {
        options.diagnostics.emit(Diagnostic::warn(
            DiagnosticKind::BracketFallback,
            format!(
                "{}: no sign change on grid, using forced bracket [{}, {}]",
                target, solution.bracket.lower, solution.bracket.upper
            ),
        ));
    }
    Ok(solution.value)
}

/// Shared virial mass inversion; `to_param` maps the log10 search variable
/// onto the stored `mvirial` parameter.
pub(crate) fn solve_mvirial<H, B>(
    halo: &H,
    baryons: &B,
    r_fdm: f64,
    options: &InversionOptions,
    to_param: fn(f64) -> f64,
) -> Result<f64>
where
    H: DarkMatterHalo + Clone + Into<MassComponent>,
    B: MassModel + Clone + Into<MassComponent>,
{
    let grid = arange(-5.0, 50.0, 1.0);
    let log_mass = if options.adiabatic_contract {
        invert_fdm(halo, baryons, r_fdm, &grid, "mvirial", options, |x| {
            contracted_halo_velocity(halo, baryons, to_param(x), r_fdm, options)
        })?
    } else {
        invert_fdm(halo, baryons, r_fdm, &grid, "mvirial", options, |x| {
            let mut trial = halo.clone();
            trial.parameters_mut().set_value("mvirial", to_param(x))?;
            trial.circular_velocity(r_fdm)
        })?
    };
    Ok(to_param(log_mass))
}

/// Contracted dark matter velocity at `r` for a halo copy with `mvirial` replaced.
fn contracted_halo_velocity<H, B>(halo: &H, baryons: &B, mvirial: f64, r: f64, options: &InversionOptions) -> Result<f64>
where
    H: DarkMatterHalo + Clone + Into<MassComponent>,
    B: MassModel + Clone + Into<MassComponent>,
{
    let mut trial = halo.clone();
    trial.parameters_mut().set_value("mvirial", mvirial)?;

    let mut model_set = ModelSet::new().with_diagnostics(options.diagnostics.clone());
    model_set.kinematic_options_mut().adiabatic_contract = true;
    model_set.kinematic_options_mut().adiabatic_contraction = options.contraction;
    let baryons: MassComponent = baryons.clone().into();
    let trial: MassComponent = trial.into();
    model_set.add_component(baryons.detached(), Some("baryons"))?;
    model_set.add_component(trial.detached(), Some("halo"))?;

    let (_, _, vdm) = model_set.circular_velocity_components(r)?;
    Ok(vdm)
}

/// Parameters every halo carries besides its shape parameters.
pub(crate) fn mvirial_parameter(mvirial: f64) -> Parameter {
    bounded_parameter("mvirial", mvirial, 5.0, 20.0)
}

pub(crate) fn conc_parameter(conc: f64) -> Parameter {
    bounded_parameter("conc", conc, 2.0, 20.0)
}

pub(crate) fn fdm_parameter() -> Parameter {
    bounded_parameter("fdm", -99.9, 0.0, 1.0).with_fixed(true)
}

/// Redshift and cosmology builders shared by every halo type.
macro_rules! impl_halo_context {
    ($halo:ty) => {
        impl $halo {
            /// Set the redshift used for the virial radius.
            pub fn with_redshift(mut self, z: f64) -> Self {
                self.context.z = z;
                self
            }

            /// Set the cosmology used for the virial radius.
            pub fn with_cosmology(mut self, cosmology: std::sync::Arc<dyn crate::cosmology::Cosmology>) -> Self {
                self.context.cosmology = cosmology;
                self
            }
        }
    };
}

pub(crate) use impl_halo_context;
