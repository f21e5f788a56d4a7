//! Dekel-Zhao halo with the (s1, c2) parameterization of Freundlich et al. (2020).

use super::{fdm_parameter, mvirial_parameter, DarkMatterHalo, HaloContext};
use crate::cosmology::Cosmology;
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::models::bounded_parameter;
use crate::parameters::Parameters;
use std::f64::consts::PI;

/// sqrt(r1 / rvir) for the resolution radius r1 = 0.01 rvir.
const R12: f64 = 0.1;

/// Dekel-Zhao halo with b = 2, ḡ = 3.
///
/// ρ = ρc / (x^a (1 + √x)^(2(3.5 − a))) with x = r c / rvir, where the inner
/// slope `a` and concentration `c` follow from the logarithmic slope `s1` at
/// 0.01 rvir and the concentration `c2`.
///
/// Parameters: `mvirial` (log10 Msun), `s1`, `c2`, `fdm`.
#[derive(Debug, Clone)]
pub struct DekelZhao {
    params: Parameters,
    context: HaloContext,
}

impl DekelZhao {
    pub fn new(mvirial: f64, s1: f64, c2: f64) -> Self {
        let params = [
            mvirial_parameter(mvirial),
            bounded_parameter("s1", s1, 0.0, 2.0),
            bounded_parameter("c2", c2, 0.0, 40.0),
            fdm_parameter(),
        ]
        .into_iter()
        .collect();
        Self {
            params,
            context: HaloContext::default(),
        }
    }

    /// Inner asymptotic slope `a` and concentration `c`.
    pub fn calc_a_c(&self) -> Result<(f64, f64)> {
        let s1 = self.param("s1")?;
        let c12 = self.param("c2")?.sqrt();
        let a = (1.5 * s1 - 2.0 * (3.5 - s1) * R12 * c12) / (1.5 - (3.5 - s1) * R12 * c12);
        let c = ((s1 - 2.0) / ((3.5 - s1) * R12 - 1.5 / c12)).powi(2);
        Ok((a, c))
    }

    /// Ratio of the virial mass to the mass scale of the profile.
    pub fn calc_mu(&self) -> Result<f64> {
        let (a, c) = self.calc_a_c()?;
        Ok(c.powf(a - 3.0) * (1.0 + c.sqrt()).powf(2.0 * (3.0 - a)))
    }

    /// Mean density inside the virial radius in Msun kpc⁻³.
    pub fn calc_rhovirbar(&self) -> Result<f64> {
        Ok(3.0 * self.virial_mass()? / (4.0 * PI * self.calc_rvir()?.powi(3)))
    }

    fn scaled_radius(&self, r: f64) -> Result<(f64, f64, f64)> {
        let (a, c) = self.calc_a_c()?;
        Ok((a, c, r * c / self.calc_rvir()?))
    }
}

super::impl_halo_context!(DekelZhao);

impl Model for DekelZhao {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "dekel_zhao"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for DekelZhao {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if r <= 0.0 {
            return Ok(0.0);
        }
        let (a, _, x) = self.scaled_radius(r)?;
        let mu = self.calc_mu()?;
        Ok(mu * self.virial_mass()? / (x.powf(a - 3.0) * (1.0 + x.sqrt()).powf(2.0 * (3.0 - a))))
    }

    fn density(&self, r: f64) -> Result<f64> {
        let (a, _, x) = self.scaled_radius(r)?;
        Ok(self.calc_rho0()? / (x.powf(a) * (1.0 + x.sqrt()).powf(2.0 * (3.5 - a))))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        let (a, _, x) = self.scaled_radius(r)?;
        let sx = x.sqrt();
        Ok(-a - (3.5 - a) * sx / (1.0 + sx))
    }
}

impl DarkMatterHalo for DekelZhao {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    fn calc_rho0(&self) -> Result<f64> {
        let (a, c) = self.calc_a_c()?;
        let rhocbar = c.powi(3) * self.calc_mu()? * self.calc_rhovirbar()?;
        Ok((1.0 - a / 3.0) * rhocbar)
    }
}
