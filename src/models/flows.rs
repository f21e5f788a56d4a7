//! Non-circular kinematic flows.

use crate::error::Result;
use crate::model::Model;
use crate::models::geometry::{Geometry, Vec3};
use crate::parameters::{Parameter, Parameters};

/// Spherically radial flow with a constant speed.
///
/// Parameter: `vr` in km/s, positive for outflow.
#[derive(Debug, Clone)]
pub struct UniformRadialFlow {
    params: Parameters,
}

impl UniformRadialFlow {
    pub fn new(vr: f64) -> Self {
        Self {
            params: [Parameter::new("vr", vr)].into_iter().collect(),
        }
    }

    /// Flow speed in km/s at a galaxy-frame position.
    pub fn velocity(&self, _pos: Vec3) -> Result<f64> {
        self.param("vr")
    }

    /// Unit vector of the flow at a galaxy-frame position; zero at the origin.
    pub fn direction(&self, pos: Vec3) -> Vec3 {
        let r = (pos.0 * pos.0 + pos.1 * pos.1 + pos.2 * pos.2).sqrt();
        if r == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (pos.0 / r, pos.1 / r, pos.2 / r)
    }

    /// Line-of-sight velocity of the flow as seen through `geometry`.
    pub fn los_velocity(&self, geometry: &Geometry, pos: Vec3) -> Result<f64> {
        geometry.project_velocity_along_los(self.velocity(pos)?, self.direction(pos))
    }
}

impl Model for UniformRadialFlow {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "uniform_radial_flow"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("radial_flow")
    }
}
