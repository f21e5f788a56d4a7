//! # galkin
//!
//! `galkin` composes parametric galaxy mass models and turns them into
//! rotation curves.
//!
//! The library provides:
//! - Analytic mass profiles: Sersic disks and bulges, NFW, two-power,
//!   Burkert, Einasto and Dekel-Zhao halos
//! - A parameter system with bounds, fixed flags and tied parameters
//! - A model set that tracks free parameters across components and resolves
//!   ties in dependency order
//! - Rotation curves with optional adiabatic contraction and pressure support
//! - Halo parameter inversion from a target dark matter fraction
//!
//! ## Basic Usage
//!
//! ```
//! use galkin::model_set::ModelSet;
//! use galkin::models::{Nfw, Sersic};
//!
//! let mut model_set = ModelSet::new();
//! model_set.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
//! model_set.add_component(Nfw::new(12.0, 5.0).with_redshift(1.613), None).unwrap();
//!
//! let (vtot, vbar, vdm) = model_set.circular_velocity_components(5.0).unwrap();
//! assert!((vtot * vtot - vbar * vbar - vdm * vdm).abs() < 1e-8);
//!
//! // Samplers see only the free parameters
//! let theta = model_set.get_free_parameters();
//! model_set.update_parameters(&theta).unwrap();
//! ```

// Public modules
pub mod constants;
pub mod cosmology;
pub mod diagnostics;
pub mod error;
pub mod kinematics;
pub mod model;
pub mod model_set;
pub mod models;

// Parameter system
pub mod parameters;

pub mod utils;

// Re-exports for convenience
pub use error::{GalkinError, Result};
pub use model::{MassModel, MassSubtype, Model};
pub use model_set::ModelSet;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
