//! Cored Burkert (1995) halo.

use super::{fdm_parameter, invert_fdm, mvirial_parameter, DarkMatterHalo, HaloContext, InversionOptions};
use crate::cosmology::Cosmology;
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::parameters::{Parameter, Parameters};
use crate::utils::roots::arange;
use std::f64::consts::PI;

/// Burkert halo, ρ = ρ0 / ((1 + r/rB)(1 + (r/rB)²)).
///
/// Parameters: `mvirial` (log10 Msun), `rB` (core radius in kpc), `fdm`.
#[derive(Debug, Clone)]
pub struct Burkert {
    params: Parameters,
    context: HaloContext,
}

impl Burkert {
    pub fn new(mvirial: f64, rb: f64) -> Self {
        let params = [mvirial_parameter(mvirial), Parameter::new("rB", rb), fdm_parameter()]
            .into_iter()
            .collect();
        Self {
            params,
            context: HaloContext::default(),
        }
    }

    pub fn core_radius(&self) -> Result<f64> {
        self.param("rB")
    }

    /// Mass profile integral, so that M(<r) ∝ I(r).
    fn mass_integral(r: f64, rb: f64) -> f64 {
        0.25 * ((r * r + rb * rb).ln() + 2.0 * (r + rb).ln() - 2.0 * (r / rb).atan() - 4.0 * rb.ln())
    }

    /// Equivalent concentration rvir / rB.
    pub fn calc_conc(&self) -> Result<f64> {
        Ok(self.calc_rvir()? / self.core_radius()?)
    }

    /// Core radius `rB` reproducing the halo's `fdm` at `r_fdm`.
    ///
    /// Adiabatic contraction is not supported for this inversion.
    pub fn calc_rb_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        B: MassModel + ?Sized,
    {
        options.reject_contraction("rB")?;
        let grid = arange(0.0, 250.0, 5.0);
        invert_fdm(self, baryons, r_fdm, &grid, "rB", options, |rb| {
            let mut trial = self.clone();
            trial.params.set_value("rB", rb)?;
            trial.circular_velocity(r_fdm)
        })
    }
}

super::impl_halo_context!(Burkert);

impl Model for Burkert {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "burkert"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for Burkert {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if r <= 0.0 {
            return Ok(0.0);
        }
        let rb = self.core_radius()?;
        let i_rvir = Self::mass_integral(self.calc_rvir()?, rb);
        Ok(self.virial_mass()? / i_rvir * Self::mass_integral(r, rb))
    }

    fn density(&self, r: f64) -> Result<f64> {
        let x = r / self.core_radius()?;
        Ok(self.calc_rho0()? / ((1.0 + x) * (1.0 + x * x)))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        let x = r / self.core_radius()?;
        Ok(-x / (1.0 + x) - 2.0 * x * x / (1.0 + x * x))
    }
}

impl DarkMatterHalo for Burkert {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    fn calc_rho0(&self) -> Result<f64> {
        let rb = self.core_radius()?;
        let i_rvir = Self::mass_integral(self.calc_rvir()?, rb);
        Ok(self.virial_mass()? / (4.0 * PI * rb.powi(3)) / i_rvir)
    }
}
