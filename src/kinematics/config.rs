//! Configuration options for rotation curve evaluation.
//!
//! This module defines the per-model-set kinematic options: whether the halo
//! is adiabatically contracted, and which pressure support (asymmetric drift)
//! correction is applied to the circular velocity.

use crate::error::{GalkinError, Result};
use serde::{Deserialize, Serialize};

/// Asymmetric drift correction applied to the circular velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PressureSupportType {
    /// Self-gravitating exponential disk, v² = 3.36 σ² (r / r_e)
    #[default]
    ExponentialSelfGravity,

    /// Exact self-gravitating Sersic profile; needs a slope provider
    ExactSersic,

    /// Pressure gradient of the baryonic density, v² = −σ² d ln ρ / d ln r
    PressureGradient,
}

impl TryFrom<u8> for PressureSupportType {
    type Error = GalkinError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(PressureSupportType::ExponentialSelfGravity),
            2 => Ok(PressureSupportType::ExactSersic),
            3 => Ok(PressureSupportType::PressureGradient),
            other => Err(GalkinError::InvalidConfiguration(format!(
                "pressure_support_type must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }
}

impl From<PressureSupportType> for u8 {
    fn from(kind: PressureSupportType) -> Self {
        match kind {
            PressureSupportType::ExponentialSelfGravity => 1,
            PressureSupportType::ExactSersic => 2,
            PressureSupportType::PressureGradient => 3,
        }
    }
}

/// Settings of the adiabatic contraction solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdiabaticContractionConfig {
    /// Spacing of the dark matter rotation curve table in kpc. Default: 0.2
    pub step: f64,

    /// Maximum number of bracket doublings per radius. Default: 60
    pub max_bracket_expansions: usize,

    /// Absolute tolerance on the contracted radius in kpc. Default: 1e-8
    pub tolerance: f64,

    /// Iteration budget of the root finder per radius. Default: 200
    pub max_iterations: usize,
}

impl Default for AdiabaticContractionConfig {
    fn default() -> Self {
        Self {
            step: 0.2,
            max_bracket_expansions: 60,
            tolerance: 1e-8,
            max_iterations: 200,
        }
    }
}

/// Kinematic options of a model set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicOptions {
    /// Contract the dark matter halo in response to the baryons. Default: false
    pub adiabatic_contract: bool,

    /// Contraction solver settings
    pub adiabatic_contraction: AdiabaticContractionConfig,

    /// Subtract an asymmetric drift term from the circular velocity. Default: false
    pub pressure_support: bool,

    /// Which correction to apply. Default: ExponentialSelfGravity
    pub pressure_support_type: PressureSupportType,

    /// Effective radius in kpc; taken from a baryonic Sersic component if unset
    pub pressure_support_re: Option<f64>,

    /// Sersic index for the exact Sersic correction; taken from the component if unset
    pub pressure_support_n: Option<f64>,

    /// Baryonic component supplying `re` and `n`; the first Sersic-like one if unset
    pub pressure_support_component: Option<String>,
}

impl Default for KinematicOptions {
    fn default() -> Self {
        Self {
            adiabatic_contract: false,
            adiabatic_contraction: AdiabaticContractionConfig::default(),
            pressure_support: false,
            pressure_support_type: PressureSupportType::default(),
            pressure_support_re: None,
            pressure_support_n: None,
            pressure_support_component: None,
        }
    }
}

impl KinematicOptions {
    pub fn with_adiabatic_contraction(mut self, enabled: bool) -> Self {
        self.adiabatic_contract = enabled;
        self
    }

    pub fn with_pressure_support(mut self, kind: PressureSupportType) -> Self {
        self.pressure_support = true;
        self.pressure_support_type = kind;
        self
    }
}
