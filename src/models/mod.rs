//! Built-in galaxy model components.
//!
//! Mass profiles (Sersic disks and bulges, dark matter halos) and the
//! non-mass components a model set needs to turn a rotation curve into an
//! observable: geometry, velocity dispersion, vertical structure and radial
//! flows.

pub mod dispersion;
pub mod flattening;
pub mod flows;
pub mod geometry;
pub mod halos;
pub mod sersic;
pub mod zheight;

pub use dispersion::DispersionConst;
pub use flattening::{FlattenedCurve, FlatteningTable, NoordermeerTable};
pub use flows::UniformRadialFlow;
pub use geometry::Geometry;
pub use halos::{
    Burkert, DarkMatterHalo, DekelZhao, Einasto, EinastoShape, HaloContext, InversionOptions, LinearNfw, Nfw,
    TwoPowerHalo,
};
pub use sersic::{DiskBulge, Sersic};
pub use zheight::ZHeightGauss;

use crate::error::{GalkinError, Result};
use crate::model::{MassModel, MassSubtype, Model};
use crate::parameters::{Bounds, Parameter, Parameters};

/// Parameter with admissible range `[min, max]`.
pub(crate) fn bounded_parameter(name: &str, value: f64, min: f64, max: f64) -> Parameter {
    Parameter::new(name, value).bounded(Bounds { min, max })
}

/// Any mass component a model set can hold.
#[derive(Debug, Clone)]
pub enum MassComponent {
    Sersic(Sersic),
    DiskBulge(DiskBulge),
    Nfw(Nfw),
    LinearNfw(LinearNfw),
    TwoPowerHalo(TwoPowerHalo),
    Burkert(Burkert),
    Einasto(Einasto),
    DekelZhao(DekelZhao),
}

macro_rules! for_each_mass {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            MassComponent::Sersic($inner) => $body,
            MassComponent::DiskBulge($inner) => $body,
            MassComponent::Nfw($inner) => $body,
            MassComponent::LinearNfw($inner) => $body,
            MassComponent::TwoPowerHalo($inner) => $body,
            MassComponent::Burkert($inner) => $body,
            MassComponent::Einasto($inner) => $body,
            MassComponent::DekelZhao($inner) => $body,
        }
    };
}

macro_rules! impl_from_mass {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for MassComponent {
                fn from(model: $variant) -> Self {
                    MassComponent::$variant(model)
                }
            }
        )*
    };
}

impl_from_mass!(Sersic, DiskBulge, Nfw, LinearNfw, TwoPowerHalo, Burkert, Einasto, DekelZhao);

impl MassComponent {
    /// The component as a dark matter halo, if it is one.
    pub fn as_halo(&self) -> Option<&dyn DarkMatterHalo> {
        match self {
            MassComponent::Sersic(_) | MassComponent::DiskBulge(_) => None,
            MassComponent::Nfw(h) => Some(h as &dyn DarkMatterHalo),
            MassComponent::LinearNfw(h) => Some(h as &dyn DarkMatterHalo),
            MassComponent::TwoPowerHalo(h) => Some(h as &dyn DarkMatterHalo),
            MassComponent::Burkert(h) => Some(h as &dyn DarkMatterHalo),
            MassComponent::Einasto(h) => Some(h as &dyn DarkMatterHalo),
            MassComponent::DekelZhao(h) => Some(h as &dyn DarkMatterHalo),
        }
    }

    pub fn is_halo(&self) -> bool {
        self.as_halo().is_some()
    }

    /// Effective radius of a Sersic-like component, for pressure support.
    ///
    /// For a disk+bulge this is the disk effective radius.
    pub fn effective_radius(&self) -> Option<f64> {
        match self {
            MassComponent::Sersic(s) => s.r_eff().ok(),
            MassComponent::DiskBulge(db) => db.param("r_eff_disk").ok(),
            _ => None,
        }
    }

    /// Sersic index of a Sersic-like component (the disk's for a disk+bulge).
    pub fn sersic_index(&self) -> Option<f64> {
        match self {
            MassComponent::Sersic(s) => s.sersic_index().ok(),
            MassComponent::DiskBulge(db) => db.param("n_disk").ok(),
            _ => None,
        }
    }

    /// Copy with every tie removed, keeping current values.
    pub fn detached(&self) -> Self {
        let mut copy = self.clone();
        for param in copy.parameters_mut().iter_mut() {
            param.set_tie(None);
        }
        copy
    }

    /// Virial mass reproducing the halo's `fdm` against `baryons` at `r_fdm`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if this component is not a halo.
    pub fn calc_mvirial_from_fdm(
        &self,
        baryons: &MassComponent,
        r_fdm: f64,
        options: &InversionOptions,
    ) -> Result<f64> {
        match self {
            MassComponent::Nfw(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::LinearNfw(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::TwoPowerHalo(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::Burkert(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::Einasto(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::DekelZhao(h) => h.calc_mvirial_from_fdm(baryons, r_fdm, options),
            MassComponent::Sersic(_) | MassComponent::DiskBulge(_) => Err(GalkinError::InvalidConfiguration(
                format!("{} is not a dark matter halo", self.kind_name()),
            )),
        }
    }
}

impl Model for MassComponent {
    fn parameters(&self) -> &Parameters {
        for_each_mass!(self, m => m.parameters())
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        for_each_mass!(self, m => m.parameters_mut())
    }

    fn kind_name(&self) -> &'static str {
        for_each_mass!(self, m => m.kind_name())
    }

    fn default_name(&self) -> Option<&'static str> {
        for_each_mass!(self, m => m.default_name())
    }
}

impl MassModel for MassComponent {
    fn subtype(&self) -> MassSubtype {
        for_each_mass!(self, m => m.subtype())
    }

    fn enclosed_mass(&self, r: f64) -> Result<f64> {
        for_each_mass!(self, m => m.enclosed_mass(r))
    }

    fn density(&self, r: f64) -> Result<f64> {
        for_each_mass!(self, m => m.density(r))
    }

    fn circular_velocity(&self, r: f64) -> Result<f64> {
        for_each_mass!(self, m => m.circular_velocity(r))
    }

    fn dlnrho_dlnr(&self, r: f64) -> Result<f64> {
        for_each_mass!(self, m => m.dlnrho_dlnr(r))
    }
}
