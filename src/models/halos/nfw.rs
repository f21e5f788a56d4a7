//! Navarro-Frenk-White halos.

use super::{
    conc_parameter, fdm_parameter, mvirial_parameter, solve_mvirial, DarkMatterHalo, HaloContext,
    InversionOptions,
};
use crate::cosmology::Cosmology;
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::models::{bounded_parameter, MassComponent};
use crate::parameters::Parameters;
use std::f64::consts::PI;

fn nfw_rho0(mvir: f64, rvir: f64, conc: f64) -> f64 {
    mvir / (4.0 * PI * rvir.powi(3)) * conc.powi(3) / ((1.0 + conc).ln() - conc / (1.0 + conc))
}

fn nfw_enclosed_mass(rho0: f64, rvir: f64, conc: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    let rs = rvir / conc;
    let aa = 4.0 * PI * rho0 * rvir.powi(3) / conc.powi(3);
    // Cancellation can make the bracket slightly negative at tiny r
    let bb = (((rs + r) / rs).ln() - r / (rs + r)).abs();
    aa * bb
}

fn nfw_density(rho0: f64, rs: f64, r: f64) -> f64 {
    let x = r / rs;
    rho0 / (x * (1.0 + x).powi(2))
}

fn nfw_slope(rs: f64, r: f64) -> f64 {
    let x = r / rs;
    -1.0 - 2.0 * x / (1.0 + x)
}

/// NFW halo with the virial mass in log10 Msun.
///
/// The density follows Navarro, Frenk & White (1995),
/// ρ = ρ0 / ((r/rs)(1 + r/rs)²) with rs = rvir / conc.
#[derive(Debug, Clone)]
pub struct Nfw {
    params: Parameters,
    context: HaloContext,
}

impl Nfw {
    /// Create an NFW halo.
    ///
    /// # Arguments
    ///
    /// * `mvirial` - log10 virial mass in Msun
    /// * `conc` - Concentration rvir / rs
    pub fn new(mvirial: f64, conc: f64) -> Self {
        let params = [mvirial_parameter(mvirial), conc_parameter(conc), fdm_parameter()]
            .into_iter()
            .collect();
        Self {
            params,
            context: HaloContext::default(),
        }
    }

    /// Scale radius in kpc.
    pub fn scale_radius(&self) -> Result<f64> {
        Ok(self.calc_rvir()? / self.param("conc")?)
    }
}

super::impl_halo_context!(Nfw);

impl Model for Nfw {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "nfw"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for Nfw {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        Ok(nfw_enclosed_mass(self.calc_rho0()?, self.calc_rvir()?, self.param("conc")?, r))
    }

    fn density(&self, r: f64) -> Result<f64> {
        Ok(nfw_density(self.calc_rho0()?, self.scale_radius()?, r))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        Ok(nfw_slope(self.scale_radius()?, r))
    }
}

impl DarkMatterHalo for Nfw {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    fn calc_rho0(&self) -> Result<f64> {
        Ok(nfw_rho0(self.virial_mass()?, self.calc_rvir()?, self.param("conc")?))
    }
}

/// NFW halo with the virial mass in linear Msun.
///
/// Identical to [`Nfw`] except that `mvirial` is not logarithmic. Do not mix
/// the two conventions when tying parameters across components.
#[derive(Debug, Clone)]
pub struct LinearNfw {
    params: Parameters,
    context: HaloContext,
}

impl LinearNfw {
    /// Create a linear-mass NFW halo.
    ///
    /// # Arguments
    ///
    /// * `mvirial` - Virial mass in Msun
    /// * `conc` - Concentration rvir / rs
    pub fn new(mvirial: f64, conc: f64) -> Self {
        let params = [
            bounded_parameter("mvirial", mvirial, 1e5, 1e20),
            conc_parameter(conc),
            fdm_parameter(),
        ]
        .into_iter()
        .collect();
        Self {
            params,
            context: HaloContext::default(),
        }
    }

    pub fn scale_radius(&self) -> Result<f64> {
        Ok(self.calc_rvir()? / self.param("conc")?)
    }
}

super::impl_halo_context!(LinearNfw);

impl Model for LinearNfw {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "linear_nfw"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("halo")
    }
}

impl MassModel for LinearNfw {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::DarkMatter
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        Ok(nfw_enclosed_mass(self.calc_rho0()?, self.calc_rvir()?, self.param("conc")?, r))
    }

    fn density(&self, r: f64) -> Result<f64> {
        Ok(nfw_density(self.calc_rho0()?, self.scale_radius()?, r))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        Ok(nfw_slope(self.scale_radius()?, r))
    }
}

impl DarkMatterHalo for LinearNfw {
    fn redshift(&self) -> f64 {
        self.context.z
    }

    fn cosmology(&self) -> &dyn Cosmology {
        self.context.cosmology.as_ref()
    }

    fn virial_mass(&self) -> Result<f64> {
        self.mvirial()
    }

    fn calc_rho0(&self) -> Result<f64> {
        Ok(nfw_rho0(self.virial_mass()?, self.calc_rvir()?, self.param("conc")?))
    }

    /// Virial mass in linear Msun; the search itself runs over log10 mass.
    fn calc_mvirial_from_fdm<B>(&self, baryons: &B, r_fdm: f64, options: &InversionOptions) -> Result<f64>
    where
        Self: Sized + Clone + Into<MassComponent>,
        B: MassModel + Clone + Into<MassComponent>,
    {
        solve_mvirial(self, baryons, r_fdm, options, |x| 10f64.powf(x))
    }
}
