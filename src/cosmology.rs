//! Cosmology providers used to derive halo virial radii.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Supplies the Hubble parameter as a function of redshift.
pub trait Cosmology: Debug + Send + Sync {
    /// Hubble parameter H(z) in km s⁻¹ Mpc⁻¹.
    fn hubble_parameter(&self, z: f64) -> f64;
}

/// Flat ΛCDM cosmology without radiation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatLambdaCdm {
    /// Hubble constant in km s⁻¹ Mpc⁻¹
    pub h0: f64,

    /// Matter density parameter at z = 0
    pub omega_m: f64,
}

impl Default for FlatLambdaCdm {
    fn default() -> Self {
        Self {
            h0: 70.0,
            omega_m: 0.3,
        }
    }
}

impl FlatLambdaCdm {
    /// Create a new flat ΛCDM cosmology.
    pub fn new(h0: f64, omega_m: f64) -> Self {
        Self { h0, omega_m }
    }

    /// Dark energy density parameter implied by flatness.
    pub fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_m
    }
}

impl Cosmology for FlatLambdaCdm {
    fn hubble_parameter(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        self.h0 * (self.omega_m * zp1.powi(3) + self.omega_lambda()).sqrt()
    }
}
