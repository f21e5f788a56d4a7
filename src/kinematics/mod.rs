//! Combination of mass components into rotation curves.
//!
//! The [`KinematicsCombiner`] adds up enclosed masses of the mass components
//! of a model set, optionally contracts the dark matter halo adiabatically and
//! optionally applies a pressure support correction:
//!
//! 1. per-component enclosed mass, split into baryons and dark matter
//! 2. adiabatic contraction of the dark matter (if enabled)
//! 3. total circular velocity from the total enclosed mass
//! 4. asymmetric drift correction (if enabled)

pub mod adiabatic;
pub mod config;
pub mod pressure;

pub use adiabatic::{contract, ContractionResult};
pub use config::{AdiabaticContractionConfig, KinematicOptions, PressureSupportType};
pub use pressure::{PressureInputs, SersicSlopeProvider};

use crate::constants::{menc_from_vcirc, v_circular};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink};
use crate::error::Result;
use crate::model::{MassModel, MassSubtype, Model};
use crate::models::MassComponent;
use std::sync::Arc;

/// Circular velocity split by mass type, in km/s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityComponents {
    pub vtot: Vec<f64>,
    pub vbaryon: Vec<f64>,
    pub vdm: Vec<f64>,
}

/// Everything a pressure support correction needs besides the radius.
#[derive(Debug, Clone)]
pub struct PressureSetup {
    pub kind: PressureSupportType,
    pub inputs: PressureInputs,
    pub provider: Option<Arc<dyn SersicSlopeProvider>>,
}

/// Rotation curve evaluation over a set of named mass components.
#[derive(Debug)]
pub struct KinematicsCombiner<'a> {
    components: Vec<(&'a str, &'a MassComponent)>,
    options: &'a KinematicOptions,
    diagnostics: &'a dyn DiagnosticsSink,
}

impl<'a> KinematicsCombiner<'a> {
    pub fn new(options: &'a KinematicOptions, diagnostics: &'a dyn DiagnosticsSink) -> Self {
        Self {
            components: Vec::new(),
            options,
            diagnostics,
        }
    }

    pub fn add(&mut self, name: &'a str, component: &'a MassComponent) {
        self.components.push((name, component));
    }

    pub fn with_component(mut self, name: &'a str, component: &'a MassComponent) -> Self {
        self.add(name, component);
        self
    }

    fn of_subtype(&self, subtype: MassSubtype) -> impl Iterator<Item = &(&'a str, &'a MassComponent)> {
        self.components.iter().filter(move |(_, c)| c.subtype() == subtype)
    }

    /// Summed enclosed mass of one subtype; non-finite contributions are zeroed.
    fn subtype_mass(&self, subtype: MassSubtype, r: f64) -> Result<f64> {
        let mut total = 0.0;
        for (name, component) in self.of_subtype(subtype) {
            let menc = component.enclosed_mass(r)?;
            if menc.is_finite() {
                total += menc;
            } else {
                self.diagnostics.emit(Diagnostic::warn(
                    DiagnosticKind::NonFiniteZeroed,
                    format!("{} ({}) enclosed mass at r={} is {}; using 0", name, component.kind_name(), r, menc),
                ));
            }
        }
        Ok(total)
    }

    /// Total, baryonic and dark matter circular velocities.
    ///
    /// With adiabatic contraction enabled the dark matter velocity is the
    /// contracted one.
    pub fn circular_velocity_components(&self, r: &[f64]) -> Result<VelocityComponents> {
        let vbaryon = r
            .iter()
            .map(|&x| Ok(v_circular(self.subtype_mass(MassSubtype::Baryonic, x)?, x)))
            .collect::<Result<Vec<f64>>>()?;

        let halo_velocity = |x: f64| -> Result<f64> { Ok(v_circular(self.subtype_mass(MassSubtype::DarkMatter, x)?, x)) };

        let vdm = if self.options.adiabatic_contract {
            let contracted = contract(r, &vbaryon, halo_velocity, &self.options.adiabatic_contraction)?;
            self.diagnostics.emit(Diagnostic::debug(
                DiagnosticKind::AdiabaticContraction,
                format!("contracted halo at {} radii ({} solved)", r.len(), contracted.solved),
            ));
            contracted.vdm
        } else {
            r.iter().map(|&x| halo_velocity(x)).collect::<Result<Vec<f64>>>()?
        };

        let vtot = vbaryon
            .iter()
            .zip(&vdm)
            .map(|(vb, vd)| (vb * vb + vd * vd).sqrt())
            .collect();

        Ok(VelocityComponents { vtot, vbaryon, vdm })
    }

    pub fn circular_velocity(&self, r: &[f64]) -> Result<Vec<f64>> {
        Ok(self.circular_velocity_components(r)?.vtot)
    }

    /// Total enclosed mass in Msun.
    pub fn enclosed_mass(&self, r: &[f64]) -> Result<Vec<f64>> {
        if self.options.adiabatic_contract {
            let components = self.circular_velocity_components(r)?;
            return Ok(r
                .iter()
                .zip(&components.vtot)
                .map(|(&x, &v)| menc_from_vcirc(v, x))
                .collect());
        }
        r.iter()
            .map(|&x| Ok(self.subtype_mass(MassSubtype::Baryonic, x)? + self.subtype_mass(MassSubtype::DarkMatter, x)?))
            .collect()
    }

    /// Dark matter fraction v_dm² / v_tot²; zero where the total velocity vanishes.
    pub fn dark_matter_fraction(&self, r: &[f64]) -> Result<Vec<f64>> {
        let components = self.circular_velocity_components(r)?;
        Ok(components
            .vtot
            .iter()
            .zip(&components.vdm)
            .map(|(&vt, &vd)| if vt > 0.0 { (vd * vd) / (vt * vt) } else { 0.0 })
            .collect())
    }

    /// Rotation velocity after the pressure support correction, if any.
    pub fn velocity_profile(&self, r: &[f64], pressure: Option<&PressureSetup>) -> Result<Vec<f64>> {
        let vcirc = self.circular_velocity(r)?;
        let setup = match pressure {
            Some(setup) => setup,
            None => return Ok(vcirc),
        };

        r.iter()
            .zip(vcirc)
            .map(|(&x, vc)| {
                if !(x > 0.0) {
                    return Ok(0.0);
                }
                let vad_sq = pressure::asymmetric_drift_sq(
                    setup.kind,
                    x,
                    &setup.inputs,
                    setup.provider.as_deref(),
                    || pressure::density_weighted_slope(self.of_subtype(MassSubtype::Baryonic).map(|(_, c)| *c), x),
                )?;
                Ok(pressure::rotation_velocity(vc, vad_sq))
            })
            .collect()
    }
}
