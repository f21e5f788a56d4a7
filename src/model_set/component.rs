//! Closed set of component kinds a model set can hold.

use crate::model::Model;
use crate::models::{
    Burkert, DekelZhao, DiskBulge, DispersionConst, Einasto, Geometry, LinearNfw, MassComponent, Nfw, Sersic,
    TwoPowerHalo, UniformRadialFlow, ZHeightGauss,
};
use crate::parameters::Parameters;

/// What role a component plays in a model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Mass,
    Geometry,
    Dispersion,
    ZHeight,
    KinematicFlow,
}

/// A registered component.
#[derive(Debug, Clone)]
pub enum Component {
    Mass(MassComponent),
    Geometry(Geometry),
    Dispersion(DispersionConst),
    ZHeight(ZHeightGauss),
    Flow(UniformRadialFlow),
}

macro_rules! for_each_component {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Component::Mass($inner) => $body,
            Component::Geometry($inner) => $body,
            Component::Dispersion($inner) => $body,
            Component::ZHeight($inner) => $body,
            Component::Flow($inner) => $body,
        }
    };
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Mass(_) => ComponentKind::Mass,
            Component::Geometry(_) => ComponentKind::Geometry,
            Component::Dispersion(_) => ComponentKind::Dispersion,
            Component::ZHeight(_) => ComponentKind::ZHeight,
            Component::Flow(_) => ComponentKind::KinematicFlow,
        }
    }

    pub fn as_mass(&self) -> Option<&MassComponent> {
        match self {
            Component::Mass(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Component::Geometry(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_dispersion(&self) -> Option<&DispersionConst> {
        match self {
            Component::Dispersion(d) => Some(d),
            _ => None,
        }
    }
}

impl Model for Component {
    fn parameters(&self) -> &Parameters {
        for_each_component!(self, c => c.parameters())
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        for_each_component!(self, c => c.parameters_mut())
    }

    fn kind_name(&self) -> &'static str {
        for_each_component!(self, c => c.kind_name())
    }

    fn default_name(&self) -> Option<&'static str> {
        for_each_component!(self, c => c.default_name())
    }
}

impl From<MassComponent> for Component {
    fn from(model: MassComponent) -> Self {
        Component::Mass(model)
    }
}

macro_rules! impl_from_mass_model {
    ($($model:ident),*) => {
        $(
            impl From<$model> for Component {
                fn from(model: $model) -> Self {
                    Component::Mass(model.into())
                }
            }
        )*
    };
}

impl_from_mass_model!(Sersic, DiskBulge, Nfw, LinearNfw, TwoPowerHalo, Burkert, Einasto, DekelZhao);

impl From<Geometry> for Component {
    fn from(model: Geometry) -> Self {
        Component::Geometry(model)
    }
}

impl From<DispersionConst> for Component {
    fn from(model: DispersionConst) -> Self {
        Component::Dispersion(model)
    }
}

impl From<ZHeightGauss> for Component {
    fn from(model: ZHeightGauss) -> Self {
        Component::ZHeight(model)
    }
}

impl From<UniformRadialFlow> for Component {
    fn from(model: UniformRadialFlow) -> Self {
        Component::Flow(model)
    }
}
