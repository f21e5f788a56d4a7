//! Transformation between sky and galaxy frames.
//!
//! The sky frame has x and y on the plane of the sky and z along the line of
//! sight. The galaxy frame has its disk in the x-y plane. Angles are stored in
//! degrees; the position angle is measured East of North to the blueshifted
//! side.

use crate::error::Result;
use crate::model::Model;
use crate::models::bounded_parameter;
use crate::parameters::{Parameter, Parameters};

/// A point or vector in Cartesian coordinates.
pub type Vec3 = (f64, f64, f64);

/// Galaxy orientation and centering.
///
/// Parameters: `inc` (degrees), `pa` (degrees), `xshift`, `yshift` (pixels)
/// and `vel_shift` (systemic velocity offset in km/s, fixed by default).
#[derive(Debug, Clone)]
pub struct Geometry {
    params: Parameters,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(45.0, 0.0)
    }
}

impl Geometry {
    pub fn new(inc: f64, pa: f64) -> Self {
        let params = [
            bounded_parameter("inc", inc, 0.0, 90.0),
            bounded_parameter("pa", pa, -180.0, 180.0),
            Parameter::new("xshift", 0.0),
            Parameter::new("yshift", 0.0),
            Parameter::new("vel_shift", 0.0).with_fixed(true),
        ]
        .into_iter()
        .collect();
        Self { params }
    }

    /// Offset of the kinematic center on the sky.
    pub fn with_shift(mut self, xshift: f64, yshift: f64) -> Result<Self> {
        self.params.set_value("xshift", xshift)?;
        self.params.set_value("yshift", yshift)?;
        Ok(self)
    }

    /// Inclination and rotated position angle in radians.
    fn angles(&self) -> Result<(f64, f64)> {
        let inc = self.param("inc")?.to_radians();
        let pa = (self.param("pa")? - 90.0).to_radians();
        Ok((inc, pa))
    }

    /// Sky coordinates to galaxy coordinates.
    pub fn coord_transform(&self, sky: Vec3) -> Result<Vec3> {
        let (inc, pa) = self.angles()?;
        let xsky = sky.0 - self.param("xshift")?;
        let ysky = sky.1 - self.param("yshift")?;
        let zsky = sky.2;

        let xtmp = xsky * pa.cos() + ysky * pa.sin();
        let ytmp = -xsky * pa.sin() + ysky * pa.cos();

        Ok((
            xtmp,
            ytmp * inc.cos() - zsky * inc.sin(),
            ytmp * inc.sin() + zsky * inc.cos(),
        ))
    }

    /// Galaxy coordinates to sky coordinates.
    pub fn inverse_coord_transform(&self, gal: Vec3) -> Result<Vec3> {
        let (inc, pa) = self.angles()?;
        let (xgal, ygal, zgal) = gal;

        let ytmp = ygal * inc.cos() + zgal * inc.sin();
        let ztmp = -ygal * inc.sin() + zgal * inc.cos();

        Ok((
            xgal * pa.cos() - ytmp * pa.sin() + self.param("xshift")?,
            xgal * pa.sin() + ytmp * pa.cos() + self.param("yshift")?,
            ztmp,
        ))
    }

    /// Unit vector of the line of sight expressed in the galaxy frame.
    pub fn zsky_direction(&self) -> Result<Vec3> {
        let inc = self.param("inc")?.to_radians();
        Ok((0.0, -inc.sin(), inc.cos()))
    }

    /// Line-of-sight component of a velocity of magnitude `speed` along the
    /// galaxy-frame unit vector `direction`.
    pub fn project_velocity_along_los(&self, speed: f64, direction: Vec3) -> Result<f64> {
        let zhat = self.zsky_direction()?;
        Ok(speed * (direction.0 * zhat.0 + direction.1 * zhat.1 + direction.2 * zhat.2))
    }

    /// Observed velocity of circular rotation with speed `vrot` at galaxy-frame position `gal`.
    ///
    /// Rotation is counter-clockwise in the disk plane; the systemic offset
    /// `vel_shift` is added. The disk center contributes only the offset.
    pub fn los_velocity(&self, vrot: f64, gal: Vec3) -> Result<f64> {
        let rcyl = (gal.0 * gal.0 + gal.1 * gal.1).sqrt();
        let vel_shift = self.param("vel_shift")?;
        if rcyl == 0.0 {
            return Ok(vel_shift);
        }
        let direction = (-gal.1 / rcyl, gal.0 / rcyl, 0.0);
        Ok(self.project_velocity_along_los(vrot, direction)? + vel_shift)
    }
}

impl Model for Geometry {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn kind_name(&self) -> &'static str {
        "geometry"
    }

    fn default_name(&self) -> Option<&'static str> {
        Some("geom")
    }
}
