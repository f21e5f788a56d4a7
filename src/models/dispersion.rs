//! Velocity dispersion profiles.

use crate::error::Result;
use crate::model::Model;
use crate::models::bounded_parameter;
use crate::parameters::Parameters;

/// Radially constant intrinsic velocity dispersion.
///
/// Parameter: `sigma0` in km/s.
#[derive(Debug, Clone)]
pub struct DispersionConst {
    params: Parameters,
}

impl DispersionConst {
    pub fn new(sigma0: f64) -> Self {
        Self {
            params: [bounded_parameter("sigma0", sigma0, 0.0, f64::INFINITY)]
                .into_iter()
                .collect(),
        }
    }

    /// Dispersion in km/s at radius `r`; independent of `r`.
    pub fn sigma(&self, _r: f64) -> Result<f64> {
        self.param("sigma0")
    }
}

impl Model for DispersionConst {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "dispersion_const"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("dispprof")
    }
}
