//! Generalized NFW halo with free inner and outer slopes.

use super::{conc_parameter, fdm_parameter, invert_fdm, mvirial_parameter, DarkMatterHalo, HaloContext, InversionOptions};
use crate::cosmology::Cosmology;
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::parameters::{Parameter, Parameters};
use crate::utils::roots::arange;
use crate::utils::special::hyp2f1;
use std::f64::consts::PI;

/// Two-power density halo.
///
/// ρ = ρ0 / ((r/rs)^α (1 + r/rs)^(β−α)), which reduces to [`Nfw`](super::Nfw)
/// for α = 1, β = 3.
///
/// Parameters: `mvirial` (log10 Msun), `conc`, `alpha`, `beta`, `fdm`.
#[derive(Debug, Clone)]
pub struct TwoPowerHalo {
    params: Parameters,
    context: HaloContext,
}

impl TwoPowerHalo {
    pub fn new(mvirial: f64, conc: f64, alpha: f64, beta: f64) -> Self {
        let params = [
            mvirial_parameter(mvirial),
            conc_parameter(conc),
            Parameter::new("alpha", alpha),
            Parameter::new("beta", beta),
            fdm_parameter(),
        ]
        .into_iter()
        .collect();
        Self {
            params,
            context: HaloContext::default(),
        }
    }

    fn shape(&self) -> Result<(f64, f64, f64)> {
        Ok((self.param("conc")?, self.param("alpha")?, self.param("beta")?))
    }

    /// ₂F₁(3−α, β−α; 4−α; z), the radial part of the enclosed mass.
    fn mass_kernel(alpha: f64, beta: f64, z: f64) -> Result<f64> {
        hyp2f1(3.0 - alpha, beta - alpha, 4.0 - alpha, z)
    }

    /// Inner slope `alpha` reproducing the halo's `fdm` at `r_fdm`.
    ///
    /// Adiabatic contraction is not supported for this inversion.
    pub fn calc_alpha_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        B: MassModel + ?Sized,
    {
        options.reject_contraction("alpha")?;
        let grid = arange(-50.0, 50.0, 1.0);
        invert_fdm(self, baryons, r_fdm, &grid, "alpha", options, |alpha| {
            let mut trial = self.clone();
            trial.params.set_value("alpha", alpha)?;
            trial.circular_velocity(r_fdm)
        })
    }
}

super::impl_halo_context!(TwoPowerHalo);

impl Model for TwoPowerHalo {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "two_power_halo"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for TwoPowerHalo {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if r <= 0.0 {
            return Ok(0.0);
        }
        let (conc, alpha, beta) = self.shape()?;
        let rvir = self.calc_rvir()?;
        let rs = rvir / conc;

        let aa = self.virial_mass()? * (r / rvir).powf(3.0 - alpha);
        let bb = Self::mass_kernel(alpha, beta, -r / rs)? / Self::mass_kernel(alpha, beta, -conc)?;
        Ok(aa * bb)
    }

    fn density(&self, r: f64) -> Result<f64> {
        let (conc, alpha, beta) = self.shape()?;
        let x = r * conc / self.calc_rvir()?;
        Ok(self.calc_rho0()? / (x.powf(alpha) * (1.0 + x).powf(beta - alpha)))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        let (conc, alpha, beta) = self.shape()?;
        let x = r * conc / self.calc_rvir()?;
        Ok(-alpha - (beta - alpha) * x / (1.0 + x))
    }
}

impl DarkMatterHalo for TwoPowerHalo {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    fn calc_rho0(&self) -> Result<f64> {
        let (conc, alpha, beta) = self.shape()?;
        let rs = self.calc_rvir()? / conc;
        let aa = -self.virial_mass()? / (4.0 * PI * conc.powf(3.0 - alpha) * rs.powi(3));
        let bb = (alpha - 3.0) / Self::mass_kernel(alpha, beta, -conc)?;
        Ok(aa * bb)
    }
}
