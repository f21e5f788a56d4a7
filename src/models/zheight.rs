//! Vertical light/mass distribution of the disk.

use crate::error::Result;
use crate::model::Model;
use crate::models::bounded_parameter;
use crate::parameters::Parameters;

/// Gaussian vertical profile, exp(-z² / 2σz²), unnormalized.
///
/// Parameter: `sigmaz` in kpc.
#[derive(Debug, Clone)]
pub struct ZHeightGauss {
    params: Parameters,
}

impl ZHeightGauss {
    pub fn new(sigmaz: f64) -> Self {
        Self {
            params: [bounded_parameter("sigmaz", sigmaz, 0.0, f64::INFINITY)]
                .into_iter()
                .collect(),
        }
    }

    /// Relative weight at height `z` above the midplane.
    pub fn evaluate(&self, z: f64) -> Result<f64> {
        let sigmaz = self.param("sigmaz")?;
        Ok((-0.5 * (z / sigmaz).powi(2)).exp())
    }
}

impl Model for ZHeightGauss {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "zheight_gauss"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("zheightgaus")
    }
}
