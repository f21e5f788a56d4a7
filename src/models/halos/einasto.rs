//! Einasto halo.
//!
//! Following Retana-Montenegro et al. (2012), ρ = ρ0 exp(−(r/h)^{1/n}) with
//! scale length h = rs / (2n)^n and rs = rvir / conc. The shape can be
//! parameterized by `nEinasto` or by `alphaEinasto = 1/n`; only one of them
//! is free and the other is tied to its reciprocal.

use super::{conc_parameter, fdm_parameter, invert_fdm, mvirial_parameter, DarkMatterHalo, HaloContext, InversionOptions};
use crate::cosmology::Cosmology;
use crate::error::{GalkinError, Result};
use crate::model::{MassModel, MassSubtype, Model};
use crate::parameters::{Parameter, Parameters, Tie};
use crate::utils::roots::arange;
use crate::utils::special::{ln_gamma, regularized_lower_gamma};
use serde::{Deserialize, Serialize};
use std::f64::consts::{LN_10, PI};

/// Which Einasto shape parameter is the primary (fit) variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EinastoShape {
    /// `nEinasto` is primary
    N,
    /// `alphaEinasto` is primary
    Alpha,
}

/// Einasto halo.
///
/// Parameters: `mvirial` (log10 Msun), `conc`, `nEinasto`, `alphaEinasto`, `fdm`.
#[derive(Debug, Clone)]
pub struct Einasto {
    params: Parameters,
    context: HaloContext,
    primary: EinastoShape,
}

impl Einasto {
    /// Create an Einasto halo.
    ///
    /// # Arguments
    ///
    /// * `mvirial` - log10 virial mass in Msun
    /// * `conc` - Concentration rvir / rs
    /// * `n` - Einasto index, if given
    /// * `alpha` - Einasto slope 1/n, if given
    /// * `fit` - Which shape parameter is primary; required when both are given
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if neither shape is given, or both are given
    /// without choosing the primary one.
    pub fn new(
        mvirial: f64,
        conc: f64,
        n: Option<f64>,
        alpha: Option<f64>,
        fit: Option<EinastoShape>,
    ) -> Result<Self> {
        let primary = match (n, alpha, fit) {
            (None, None, _) => {
                return Err(GalkinError::InvalidConfiguration(
                    "Einasto halo needs at least one of nEinasto and alphaEinasto".to_string(),
                ))
            }
            (Some(_), Some(_), None) => {
                return Err(GalkinError::InvalidConfiguration(
                    "Einasto halo given both nEinasto and alphaEinasto; choose which one is fit".to_string(),
                ))
            }
            (_, _, Some(shape)) => shape,
            (Some(_), None, None) => EinastoShape::N,
            (None, Some(_), None) => EinastoShape::Alpha,
        };

        // Fill the missing shape from the given one
        let n_value = n.or(alpha.map(|a| 1.0 / a)).unwrap_or(f64::NAN);
        let alpha_value = alpha.or(n.map(|n| 1.0 / n)).unwrap_or(f64::NAN);

        let mut n_param = Parameter::new("nEinasto", n_value);
        let mut alpha_param = Parameter::new("alphaEinasto", alpha_value);
        match primary {
            EinastoShape::N => alpha_param.set_tie(Some(Tie::expression("1 / nEinasto")?)),
            EinastoShape::Alpha => n_param.set_tie(Some(Tie::expression("1 / alphaEinasto")?)),
        }

        let params = [
            mvirial_parameter(mvirial),
            conc_parameter(conc),
            n_param,
            alpha_param,
            fdm_parameter(),
        ]
        .into_iter()
        .collect();

        Ok(Self {
            params,
            context: HaloContext::default(),
            primary,
        })
    }

    pub fn primary_shape(&self) -> EinastoShape {
        self.primary
    }

    /// Einasto index n taken from the primary shape parameter.
    pub fn shape_n(&self) -> Result<f64> {
        match self.primary {
            EinastoShape::N => self.param("nEinasto"),
            EinastoShape::Alpha => Ok(1.0 / self.param("alphaEinasto")?),
        }
    }

    /// Scale radius rs and scale length h in kpc.
    fn radii(&self, n: f64) -> Result<(f64, f64)> {
        let rs = self.calc_rvir()? / self.param("conc")?;
        Ok((rs, rs / (2.0 * n).powf(n)))
    }

    /// Einasto index `nEinasto` reproducing the halo's `fdm` at `r_fdm`.
    ///
    /// Only positive indices are searched. Adiabatic contraction is not
    /// supported for this inversion.
    pub fn calc_n_einasto_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        B: MassModel + ?Sized,
    {
        options.reject_contraction("nEinasto")?;
        let grid = arange(0.25, 50.25, 0.25);
        invert_fdm(self, baryons, r_fdm, &grid, "nEinasto", options, |n| {
            let mut trial = self.clone();
            trial.params.set_value("nEinasto", n)?;
            trial.params.set_value("alphaEinasto", 1.0 / n)?;
            trial.circular_velocity(r_fdm)
        })
    }

    /// Einasto slope `alphaEinasto` reproducing the halo's `fdm` at `r_fdm`.
    ///
    /// NaN whenever the index inversion yields a non-finite value.
    pub fn calc_alpha_einasto_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        B: MassModel + ?Sized,
    {
        let n = self.calc_n_einasto_from_fdm(baryons, r_fdm, options)?;
        Ok(if n.is_finite() { 1.0 / n } else { f64::NAN })
    }
}

super::impl_halo_context!(Einasto);

impl Model for Einasto {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "einasto"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for Einasto {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if r <= 0.0 {
            return Ok(0.0);
        }
        let n = self.shape_n()?;
        let (rs, _) = self.radii(n)?;
        let conc = self.param("conc")?;

        let inner = regularized_lower_gamma(3.0 * n, 2.0 * n * (r / rs).powf(1.0 / n));
        let total = regularized_lower_gamma(3.0 * n, 2.0 * n * conc.powf(1.0 / n));
        Ok(self.virial_mass()? * inner / total)
    }

    fn density(&self, r: f64) -> Result<f64> {
        let n = self.shape_n()?;
        let (_, h) = self.radii(n)?;
        Ok(self.calc_rho0()? * (-(r / h).powf(1.0 / n)).exp())
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        let n = self.shape_n()?;
        let (_, h) = self.radii(n)?;
        Ok(-(r / h).powf(1.0 / n) / n)
    }
}

impl DarkMatterHalo for Einasto {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    /// Central density, evaluated in log space to survive large n.
    fn calc_rho0(&self) -> Result<f64> {
        let n = self.shape_n()?;
        let (rs, _) = self.radii(n)?;
        let conc = self.param("conc")?;

        let p = regularized_lower_gamma(3.0 * n, 2.0 * n * conc.powf(1.0 / n));
        let ln_rho0 = self.mvirial()? * LN_10 - (4.0 * PI * n).ln() - 3.0 * rs.ln() + 3.0 * n * (2.0 * n).ln()
            - p.ln()
            - ln_gamma(3.0 * n);
        Ok(ln_rho0.exp())
    }
}
