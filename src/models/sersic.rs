//! Sersic mass profiles for stellar disks and bulges.
//!
//! This module provides the single [`Sersic`] component and the combined
//! [`DiskBulge`] component (a Sersic disk plus a Sersic bulge sharing one
//! total mass).

use crate::constants::{menc_from_vcirc, v_circular};
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::models::bounded_parameter;
use crate::models::flattening::FlatteningTable;
use crate::parameters::Parameters;
use crate::utils::special::{gamma_fn, regularized_lower_gamma, sersic_bn};
use std::f64::consts::PI;
use std::sync::Arc;

/// Mass within radius `r` of a spherical Sersic profile of total mass `mass` (Msun).
pub fn sersic_enclosed_mass(mass: f64, r_eff: f64, n: f64, r: f64) -> Result<f64> {
    if r <= 0.0 {
        return Ok(0.0);
    }
    let bn = sersic_bn(n)?;
    Ok(mass * regularized_lower_gamma(2.0 * n, bn * (r / r_eff).powf(1.0 / n)))
}

/// Sersic profile amplitude at radius `r`.
///
/// # Notes
///
/// ρ(r) = M / (2π α² n Γ(2n)) exp(-b_n (r/r_eff)^{1/n}) with α = r_eff / b_n^n.
pub fn sersic_density(mass: f64, r_eff: f64, n: f64, r: f64) -> Result<f64> {
    let bn = sersic_bn(n)?;
    let alpha = r_eff / bn.powf(n);
    let amp = mass / (2.0 * PI) / (alpha * alpha) / n / gamma_fn(2.0 * n);
    Ok(amp * (-bn * (r.abs() / r_eff).powf(1.0 / n)).exp())
}

/// Closed-form log slope of the Sersic profile.
pub fn sersic_dlnrho_dlnr(r_eff: f64, n: f64, r: f64) -> Result<f64> {
    let bn = sersic_bn(n)?;
    Ok(-(bn / n) * (r.abs() / r_eff).powf(1.0 / n))
}

/// Sersic profile with total mass, effective radius and index.
///
/// Parameters:
/// - `total_mass`: log10 of the total mass in Msun
/// - `r_eff`: effective (half-mass) radius in kpc
/// - `n`: Sersic index
///
/// The inverse axis ratio `invq` is a property of the component, not a
/// parameter; it only matters in flattened mode.
#[derive(Debug, Clone)]
pub struct Sersic {
    params: Parameters,
    invq: f64,
    flattening: Option<Arc<dyn FlatteningTable>>,
}

impl Sersic {
    /// Create a spherical Sersic component.
    ///
    /// # Arguments
    ///
    /// * `total_mass` - log10 total mass in Msun
    /// * `r_eff` - Effective radius in kpc
    /// * `n` - Sersic index
    pub fn new(total_mass: f64, r_eff: f64, n: f64) -> Self {
        let params = [
            bounded_parameter("total_mass", total_mass, 5.0, 14.0),
            bounded_parameter("r_eff", r_eff, 0.0, 50.0),
            bounded_parameter("n", n, 0.0, 8.0),
        ]
        .into_iter()
        .collect();

        Self {
            params,
            invq: 1.0,
            flattening: None,
        }
    }

    /// Set the inverse axis ratio used in flattened mode.
    pub fn with_invq(mut self, invq: f64) -> Self {
        self.invq = invq;
        self
    }

    /// Use tabulated flattened rotation curves instead of the spherical profile.
    pub fn with_flattening(mut self, table: Arc<dyn FlatteningTable>) -> Self {
        self.flattening = Some(table);
        self
    }

    pub fn invq(&self) -> f64 {
        self.invq
    }

    /// Whether circular velocities come from a flattening table.
    pub fn noord_flat(&self) -> bool {
        self.flattening.is_some()
    }

    pub fn r_eff(&self) -> Result<f64> {
        self.param("r_eff")
    }

    pub fn sersic_index(&self) -> Result<f64> {
        self.param("n")
    }

    /// Total mass in Msun.
    pub fn total_mass_linear(&self) -> Result<f64> {
        Ok(10f64.powf(self.param("total_mass")?))
    }

    /// b_n for the current Sersic index.
    pub fn bn(&self) -> Result<f64> {
        sersic_bn(self.sersic_index()?)
    }
}

impl Model for Sersic {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "sersic"
    }
}

impl MassModel for Sersic {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::Baryonic
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if self.noord_flat() {
            return Ok(menc_from_vcirc(self.circular_velocity(r)?, r));
        }
        sersic_enclosed_mass(self.total_mass_linear()?, self.r_eff()?, self.sersic_index()?, r)
    }

    fn density(&self, r: f64) -> Result<f64> {
        sersic_density(self.total_mass_linear()?, self.r_eff()?, self.sersic_index()?, r)
    }

    fn circular_velocity(&self, r: f64) -> Result<f64> {
        match &self.flattening {
            Some(table) => flattened_velocity(
                table.as_ref(),
                self.total_mass_linear()?,
                self.r_eff()?,
                self.sersic_index()?,
                self.invq,
                r,
            ),
            None => Ok(v_circular(self.enclosed_mass(r)?, r)),
        }
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        sersic_dlnrho_dlnr(self.r_eff()?, self.sersic_index()?, r)
    }
}

fn flattened_velocity(
    table: &dyn FlatteningTable,
    mass: f64,
    r_eff: f64,
    n: f64,
    invq: f64,
    r: f64,
) -> Result<f64> {
    if r <= 0.0 {
        return Ok(0.0);
    }
    Ok(table.lookup(n, invq)?.scaled_velocity(r, mass, r_eff))
}

/// Sersic disk plus Sersic bulge with a shared total mass.
///
/// Parameters:
/// - `total_mass`: log10 of the combined mass in Msun
/// - `r_eff_disk`, `n_disk`: disk effective radius (kpc) and index
/// - `r_eff_bulge`, `n_bulge`: bulge effective radius (kpc) and index
/// - `bt`: bulge-to-total mass ratio
#[derive(Debug, Clone)]
pub struct DiskBulge {
    params: Parameters,
    invq_disk: f64,
    invq_bulge: f64,
    flattening: Option<Arc<dyn FlatteningTable>>,
}

impl DiskBulge {
    pub fn new(total_mass: f64, r_eff_disk: f64, n_disk: f64, r_eff_bulge: f64, n_bulge: f64, bt: f64) -> Self {
        let params = [
            bounded_parameter("total_mass", total_mass, 5.0, 14.0),
            bounded_parameter("r_eff_disk", r_eff_disk, 0.0, 50.0),
            bounded_parameter("n_disk", n_disk, 0.0, 8.0),
            bounded_parameter("r_eff_bulge", r_eff_bulge, 0.0, 50.0),
            bounded_parameter("n_bulge", n_bulge, 0.0, 8.0),
            bounded_parameter("bt", bt, 0.0, 1.0),
        ]
        .into_iter()
        .collect();

        Self {
            params,
            invq_disk: 5.0,
            invq_bulge: 1.0,
            flattening: None,
        }
    }

    /// Set the inverse axis ratios of the disk and bulge for flattened mode.
    pub fn with_invq(mut self, invq_disk: f64, invq_bulge: f64) -> Self {
        self.invq_disk = invq_disk;
        self.invq_bulge = invq_bulge;
        self
    }

    pub fn with_flattening(mut self, table: Arc<dyn FlatteningTable>) -> Self {
        self.flattening = Some(table);
        self
    }

    pub fn noord_flat(&self) -> bool {
        self.flattening.is_some()
    }

    /// Disk and bulge masses in Msun.
    pub fn component_masses(&self) -> Result<(f64, f64)> {
        let mtot = 10f64.powf(self.param("total_mass")?);
        let bt = self.param("bt")?;
        Ok((mtot * (1.0 - bt), mtot * bt))
    }

    pub fn disk_circular_velocity(&self, r: f64) -> Result<f64> {
        let (mdisk, _) = self.component_masses()?;
        let (re, n) = (self.param("r_eff_disk")?, self.param("n_disk")?);
        match &self.flattening {
            Some(table) => flattened_velocity(table.as_ref(), mdisk, re, n, self.invq_disk, r),
            None => Ok(v_circular(sersic_enclosed_mass(mdisk, re, n, r)?, r)),
        }
    }

    pub fn bulge_circular_velocity(&self, r: f64) -> Result<f64> {
        let (_, mbulge) = self.component_masses()?;
        let (re, n) = (self.param("r_eff_bulge")?, self.param("n_bulge")?);
        match &self.flattening {
            Some(table) => flattened_velocity(table.as_ref(), mbulge, re, n, self.invq_bulge, r),
            None => Ok(v_circular(sersic_enclosed_mass(mbulge, re, n, r)?, r)),
        }
    }
}

impl Model for DiskBulge {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "disk_bulge"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("disk+bulge")
    }
}

impl MassModel for DiskBulge {
    fn subtype(&self) -> MassSubtype {
        MassSubtype::Baryonic
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        if self.noord_flat() {
            return Ok(menc_from_vcirc(self.circular_velocity(r)?, r));
        }
        let (mdisk, mbulge) = self.component_masses()?;
        let disk = sersic_enclosed_mass(mdisk, self.param("r_eff_disk")?, self.param("n_disk")?, r)?;
        let bulge = sersic_enclosed_mass(mbulge, self.param("r_eff_bulge")?, self.param("n_bulge")?, r)?;
        Ok(disk + bulge)
    }

    fn density(&self, r: f64) -> Result<f64> {
        let (mdisk, mbulge) = self.component_masses()?;
        let disk = sersic_density(mdisk, self.param("r_eff_disk")?, self.param("n_disk")?, r)?;
        let bulge = sersic_density(mbulge, self.param("r_eff_bulge")?, self.param("n_bulge")?, r)?;
        Ok(disk + bulge)
    }

    fn circular_velocity(&self, r: f64) -> Result<f64> {
        if self.noord_flat() {
            let vd = self.disk_circular_velocity(r)?;
            let vb = self.bulge_circular_velocity(r)?;
            return Ok((vd * vd + vb * vb).sqrt());
        }
        Ok(v_circular(self.enclosed_mass(r)?, r))
    }
}
