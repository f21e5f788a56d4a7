//! Model traits shared by all components.
//!
//! Every component of a model set exposes its [`Parameters`] through
//! [`Model`]. Components that carry mass additionally implement
//! [`MassModel`], which provides density, enclosed mass and circular
//! velocity at a radius in kpc.

use crate::constants::v_circular;
use crate::error::{GalkinError, Result};
use crate::parameters::Parameters;
use crate::utils::finite_difference::log_derivative;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A component with named parameters.
pub trait Model {
    /// Returns a reference to the model's parameters.
    fn parameters(&self) -> &Parameters;

    /// Returns a mutable reference to the model's parameters.
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Short name of the component type, e.g. `"nfw"`.
    fn kind_name(&self) -> &'static str;

    /// Name used when the component is added to a model set without one.
    fn default_name(&self) -> Option<&'static str> {
        None
    }

    /// Current value of a parameter.
    ///
    /// # Errors
    ///
    /// `ParameterNotFound` naming this component type if the parameter does not exist.
    fn param(&self, name: &str) -> Result<f64> {
        self.parameters()
            .value(name)
            .ok_or_else(|| GalkinError::parameter_not_found(self.kind_name(), name))
    }

    /// Returns the names of all parameters in the model.
    fn parameter_names(&self) -> Vec<String> {
        self.parameters().names()
    }

    /// Returns the names of the free (neither fixed nor tied) parameters.
    fn free_parameter_names(&self) -> Vec<String> {
        self.parameters()
            .iter()
            .filter(|p| p.is_free())
            .map(|p| p.name.clone())
            .collect()
    }
}

/// Whether a mass component is made of baryons or dark matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassSubtype {
    Baryonic,
    DarkMatter,
}

/// A component that contributes mass.
///
/// Radii are in kpc, masses in Msun, densities in Msun kpc⁻³ and
/// velocities in km/s.
pub trait MassModel: Model {
    fn subtype(&self) -> MassSubtype;

    /// Mass enclosed within radius `r`.
    fn enclosed_mass(&self, r: f64) -> Result<f64>;

    /// Local mass density at radius `r`.
    fn density(&self, r: f64) -> Result<f64>;

    /// Circular velocity of a test particle at radius `r`.
    fn circular_velocity(&self, r: f64) -> Result<f64> {
        Ok(v_circular(self.enclosed_mass(r)?, r))
    }

    /// Logarithmic density slope d ln ρ / d ln r.
    ///
    /// The default uses central differences; profiles with a closed form override it.
    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        log_derivative(|x| self.density(x), r, None)
    }

    fn enclosed_mass_array(&self, r: &Array1<f64>) -> Result<Array1<f64>> {
        map_radii(r, |x| self.enclosed_mass(x))
    }

    fn circular_velocity_array(&self, r: &Array1<f64>) -> Result<Array1<f64>> {
        map_radii(r, |x| self.circular_velocity(x))
    }

    fn density_array(&self, r: &Array1<f64>) -> Result<Array1<f64>> {
        map_radii(r, |x| self.density(x))
    }
}

/// Apply a fallible scalar function elementwise.
pub(crate) fn map_radii<F>(r: &Array1<f64>, f: F) -> Result<Array1<f64>>
where
    F: Fn(f64) -> Result<f64>,
{
    r.iter()
        .map(|&x| f(x))
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from_vec)
}
