//! # Model Sets
//!
//! A [`ModelSet`] is the composition root of a galaxy model. It holds named
//! components (mass profiles, the geometry, dispersion and vertical
//! profiles, kinematic flows), keeps their parameters in a
//! [`ParameterStore`], resolves tied parameters and evaluates rotation
//! curves through the [`KinematicsCombiner`].
//!
//! ## Example Usage
//!
//! ```rust
//! use galkin::model_set::ModelSet;
//! use galkin::models::{Nfw, Sersic};
//!
//! let mut model_set = ModelSet::new();
//! model_set.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
//! model_set.add_component(Nfw::new(12.0, 5.0).with_redshift(1.613), None).unwrap();
//!
//! assert_eq!(model_set.nparams_free(), 5);
//! let vc = model_set.circular_velocity(5.0).unwrap();
//! assert!(vc > 0.0);
//! ```

mod component;
pub mod ties;

pub use component::{Component, ComponentKind};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink, TracingSink};
use crate::error::{GalkinError, Result};
use crate::kinematics::{
    KinematicOptions, KinematicsCombiner, PressureInputs, PressureSetup, PressureSupportType, SersicSlopeProvider,
    VelocityComponents,
};
use crate::model::Model;
use crate::models::{Geometry, InversionOptions, MassComponent};
use crate::parameters::{Dependency, Parameter, ParameterStore, Tie, TieContext};
use crate::utils::roots::RootFindingConfig;
use ndarray::Array1;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Optional collaborators available to a model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A Sersic slope provider is registered, so exact Sersic pressure support works
    pub exact_sersic: bool,

    /// At least one baryonic component uses tabulated flattened rotation curves
    pub flattening: bool,
}

/// A galaxy model assembled from named components.
#[derive(Debug, Clone)]
pub struct ModelSet {
    components: Vec<(String, Component)>,

    /// Name of the active geometry, if any
    geometry: Option<String>,

    store: ParameterStore,
    kinematic_options: KinematicOptions,
    root_finding: RootFindingConfig,
    diagnostics: Arc<dyn DiagnosticsSink>,
    sersic_slopes: Option<Arc<dyn SersicSlopeProvider>>,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self::new()
    }
}

type TieKey = (String, String);

impl ModelSet {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            geometry: None,
            store: ParameterStore::new(),
            kinematic_options: KinematicOptions::default(),
            root_finding: RootFindingConfig::default(),
            diagnostics: Arc::new(TracingSink),
            sersic_slopes: None,
        }
    }

    /// Route diagnostics to `sink` instead of `tracing`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Register the self-gravitating Sersic slope collaborator.
    pub fn with_sersic_slopes(mut self, provider: Arc<dyn SersicSlopeProvider>) -> Self {
        self.sersic_slopes = Some(provider);
        self
    }

    pub fn with_kinematic_options(mut self, options: KinematicOptions) -> Self {
        self.kinematic_options = options;
        self
    }

    pub fn with_root_finding(mut self, config: RootFindingConfig) -> Self {
        self.root_finding = config;
        self
    }

    pub fn kinematic_options(&self) -> &KinematicOptions {
        &self.kinematic_options
    }

    pub fn kinematic_options_mut(&mut self) -> &mut KinematicOptions {
        &mut self.kinematic_options
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.diagnostics
    }

    /// Settings for fdm inversions run on behalf of this model set.
    pub fn inversion_options(&self) -> InversionOptions {
        InversionOptions {
            adiabatic_contract: self.kinematic_options.adiabatic_contract,
            root_finding: self.root_finding,
            contraction: self.kinematic_options.adiabatic_contraction,
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let flattening = self.mass_components().any(|(_, m)| match m {
            MassComponent::Sersic(s) => s.noord_flat(),
            MassComponent::DiskBulge(db) => db.noord_flat(),
            _ => false,
        });
        Capabilities {
            exact_sersic: self.sersic_slopes.is_some(),
            flattening,
        }
    }

    /// Add a component under `name`, or under its default name.
    ///
    /// A new geometry replaces the active one. Parameters are appended to
    /// the store in declaration order.
    ///
    /// # Errors
    ///
    /// * `UnnamedComponent` - no name given and the component has no default
    /// * `DuplicateComponent` - the name is already taken
    /// * `CircularDependency` - the component's ties close a cycle; nothing is added
    pub fn add_component(&mut self, model: impl Into<Component>, name: Option<&str>) -> Result<()> {
        let component = model.into();
        let name = match name.or_else(|| component.default_name()) {
            Some(name) => name.to_string(),
            None => return Err(GalkinError::UnnamedComponent(component.kind_name().to_string())),
        };

        let replaced_geometry = match (&self.geometry, component.kind()) {
            (Some(old), ComponentKind::Geometry) => Some(old.clone()),
            _ => None,
        };
        if self.position(&name).is_some() && replaced_geometry.as_deref() != Some(name.as_str()) {
            return Err(GalkinError::DuplicateComponent(name));
        }

        let snapshot = (self.components.clone(), self.geometry.clone(), self.store.clone());

        if let Some(old) = &replaced_geometry {
            self.components.retain(|(n, _)| n != old);
            self.store.unregister(old);
        }
        if component.kind() == ComponentKind::Geometry {
            self.geometry = Some(name.clone());
        }
        self.store.register(&name, component.parameters())?;
        self.components.push((name.clone(), component));

        if let Err(err) = self.tie_order() {
            (self.components, self.geometry, self.store) = snapshot;
            return Err(err);
        }

        if let Some(old) = replaced_geometry {
            self.diagnostics.emit(Diagnostic::warn(
                DiagnosticKind::GeometryOverwritten,
                format!("geometry '{}' replaced by '{}'", old, name),
            ));
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|(n, _)| n == name)
    }

    pub fn component(&self, name: &str) -> Result<&Component> {
        self.position(name)
            .map(|i| &self.components[i].1)
            .ok_or_else(|| GalkinError::ComponentNotFound(name.to_string()))
    }

    fn component_mut(&mut self, name: &str) -> Result<&mut Component> {
        match self.position(name) {
            Some(i) => Ok(&mut self.components[i].1),
            None => Err(GalkinError::ComponentNotFound(name.to_string())),
        }
    }

    fn parameter(&self, component: &str, parameter: &str) -> Result<&Parameter> {
        self.component(component)?
            .parameters()
            .get(parameter)
            .ok_or_else(|| GalkinError::parameter_not_found(component, parameter))
    }

    fn parameter_mut(&mut self, component: &str, parameter: &str) -> Result<&mut Parameter> {
        self.component_mut(component)?
            .parameters_mut()
            .get_mut(parameter)
            .ok_or_else(|| GalkinError::parameter_not_found(component, parameter))
    }

    /// Component names in registration order.
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry
            .as_deref()
            .and_then(|name| self.component(name).ok())
            .and_then(Component::as_geometry)
    }

    pub fn mass_component(&self, name: &str) -> Result<&MassComponent> {
        self.component(name)?.as_mass().ok_or_else(|| {
            GalkinError::InvalidConfiguration(format!("component '{}' is not a mass component", name))
        })
    }

    /// Mass components in registration order.
    pub fn mass_components(&self) -> impl Iterator<Item = (&str, &MassComponent)> {
        self.components
            .iter()
            .filter_map(|(n, c)| c.as_mass().map(|m| (n.as_str(), m)))
    }

    pub fn get_parameter_value(&self, component: &str, parameter: &str) -> Result<f64> {
        Ok(self.parameter(component, parameter)?.value())
    }

    /// Set a parameter on the component and in the store together.
    pub fn set_parameter_value(&mut self, component: &str, parameter: &str, value: f64) -> Result<()> {
        self.parameter(component, parameter)?;
        self.store.set_value(component, parameter, value)?;
        self.parameter_mut(component, parameter)?.set_value(value);
        Ok(())
    }

    /// Fix or free a parameter; the free vector is rebuilt immediately.
    pub fn set_parameter_fixed(&mut self, component: &str, parameter: &str, fixed: bool) -> Result<()> {
        let param = self.parameter_mut(component, parameter)?;
        param.set_fixed(fixed);
        let free = param.is_free();
        self.store.set_free(component, parameter, free)
    }

    /// Install or remove a tie; the free vector is rebuilt immediately.
    ///
    /// # Errors
    ///
    /// `CircularDependency` if the tie closes a cycle; the previous tie is kept.
    pub fn set_parameter_tied(&mut self, component: &str, parameter: &str, tie: Option<Tie>) -> Result<()> {
        let param = self.parameter_mut(component, parameter)?;
        let previous = param.tie().cloned();
        param.set_tie(tie);

        if let Err(err) = self.tie_order() {
            self.parameter_mut(component, parameter)?.set_tie(previous);
            return Err(err);
        }

        let free = self.parameter(component, parameter)?.is_free();
        self.store.set_free(component, parameter, free)
    }

    /// Write `theta` into the free parameters, in free order.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` unless `theta.len() == nparams_free()`; nothing is written.
    pub fn update_parameters(&mut self, theta: &[f64]) -> Result<()> {
        if theta.len() != self.store.nparams_free() {
            return Err(GalkinError::DimensionMismatch(format!(
                "expected {} free parameters, got {}",
                self.store.nparams_free(),
                theta.len()
            )));
        }
        let keys: Vec<TieKey> = self
            .store
            .free_keys()
            .map(|(c, p)| (c.to_string(), p.to_string()))
            .collect();
        for ((component, parameter), &value) in keys.iter().zip(theta) {
            self.set_parameter_value(component, parameter, value)?;
        }
        Ok(())
    }

    pub fn get_free_parameters(&self) -> Vec<f64> {
        self.store.free_values().to_vec()
    }

    /// Free parameter names as `component.parameter`, in free order.
    pub fn free_parameter_names(&self) -> Vec<String> {
        self.store.free_keys().map(|(c, p)| format!("{}.{}", c, p)).collect()
    }

    pub fn nparams(&self) -> usize {
        self.store.nparams()
    }

    pub fn nparams_free(&self) -> usize {
        self.store.nparams_free()
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Whether every free parameter lies inside its bounds.
    pub fn free_parameters_within_bounds(&self) -> bool {
        self.store
            .free_keys()
            .all(|(c, p)| self.parameter(c, p).map(Parameter::within_bounds).unwrap_or(false))
    }

    /// Tied parameters ordered so that every tie comes after the ties it reads.
    ///
    /// Nodes are visited in sorted `(component, parameter)` order, so the
    /// result does not depend on registration order.
    fn tie_order(&self) -> Result<Vec<TieKey>> {
        let mut graph: BTreeMap<TieKey, BTreeSet<TieKey>> = BTreeMap::new();
        for (name, component) in &self.components {
            for param in component.parameters().iter() {
                if param.is_tied() {
                    graph.insert((name.clone(), param.name().to_string()), BTreeSet::new());
                }
            }
        }

        let nodes: Vec<TieKey> = graph.keys().cloned().collect();
        for node in &nodes {
            let tie = match self.parameter(&node.0, &node.1)?.tie() {
                Some(tie) => tie.clone(),
                None => continue,
            };
            let mut edges = BTreeSet::new();
            for dep in tie.dependencies(&node.0) {
                match dep {
                    Dependency::Parameter(r) => {
                        let key = (r.component_or(&node.0).to_string(), r.parameter.clone());
                        if graph.contains_key(&key) {
                            edges.insert(key);
                        }
                    }
                    Dependency::Component(c) => {
                        edges.extend(nodes.iter().filter(|k| k.0 == c && *k != node).cloned());
                    }
                }
            }
            graph.insert(node.clone(), edges);
        }

        let mut state: BTreeMap<&TieKey, u8> = BTreeMap::new();
        let mut order = Vec::with_capacity(nodes.len());
        for node in &nodes {
            visit(node, &graph, &mut state, &mut order)?;
        }
        Ok(order)
    }

    /// Recompute every tied parameter in dependency order.
    pub fn resolve_tied_parameters(&mut self) -> Result<()> {
        for (component, parameter) in self.tie_order()? {
            let tie = match self.parameter(&component, &parameter)?.tie() {
                Some(tie) => tie.clone(),
                None => continue,
            };
            let value = tie.resolve(&TieContext::new(self, &component))?;
            self.set_parameter_value(&component, &parameter, value)?;
        }
        Ok(())
    }

    /// Combiner over every mass component at the current parameter values.
    ///
    /// Ties are not resolved; use the evaluation methods for that.
    pub fn combiner(&self) -> KinematicsCombiner<'_> {
        let mut combiner = KinematicsCombiner::new(&self.kinematic_options, self.diagnostics.as_ref());
        for (name, mass) in self.mass_components() {
            combiner.add(name, mass);
        }
        combiner
    }

    /// Combiner over the named mass components only.
    pub fn combiner_for(&self, names: &[String]) -> Result<KinematicsCombiner<'_>> {
        let mut combiner = KinematicsCombiner::new(&self.kinematic_options, self.diagnostics.as_ref());
        for name in names {
            let index = self
                .position(name)
                .ok_or_else(|| GalkinError::ComponentNotFound(name.clone()))?;
            let (stored, component) = &self.components[index];
            let mass = component.as_mass().ok_or_else(|| {
                GalkinError::InvalidConfiguration(format!("component '{}' is not a mass component", name))
            })?;
            combiner.add(stored, mass);
        }
        Ok(combiner)
    }

    /// Inputs of the configured pressure support correction.
    ///
    /// σ comes from the first dispersion profile. The effective radius and
    /// Sersic index come from the kinematic options, falling back to the
    /// configured (or first Sersic-like) baryonic component.
    pub fn pressure_setup(&self) -> Result<PressureSetup> {
        let options = &self.kinematic_options;
        let sigma = match self.components.iter().find_map(|(_, c)| c.as_dispersion()) {
            Some(dispersion) => dispersion.sigma(0.0)?,
            None => {
                return Err(GalkinError::InvalidConfiguration(
                    "pressure support requires a dispersion profile".to_string(),
                ))
            }
        };

        let source = match &options.pressure_support_component {
            Some(name) => Some(self.mass_component(name)?),
            None => self
                .mass_components()
                .map(|(_, m)| m)
                .find(|m| m.effective_radius().is_some()),
        };

        let re = options
            .pressure_support_re
            .or_else(|| source.and_then(MassComponent::effective_radius))
            .ok_or_else(|| {
                GalkinError::InvalidConfiguration(
                    "pressure support needs an effective radius or a Sersic-like component".to_string(),
                )
            })?;

        let n = options
            .pressure_support_n
            .or_else(|| source.and_then(MassComponent::sersic_index));
        let n = match (n, options.pressure_support_type) {
            (Some(n), _) => n,
            (None, PressureSupportType::ExactSersic) => {
                return Err(GalkinError::InvalidConfiguration(
                    "exact Sersic pressure support needs a Sersic index".to_string(),
                ))
            }
            (None, _) => 1.0,
        };

        Ok(PressureSetup {
            kind: options.pressure_support_type,
            inputs: PressureInputs { sigma, re, n },
            provider: self.sersic_slopes.clone(),
        })
    }

    fn velocity_components(&mut self, r: &[f64]) -> Result<VelocityComponents> {
        self.resolve_tied_parameters()?;
        self.combiner().circular_velocity_components(r)
    }

    /// Total, baryonic and dark matter circular velocity at `r`.
    pub fn circular_velocity_components(&mut self, r: f64) -> Result<(f64, f64, f64)> {
        let v = self.velocity_components(&[r])?;
        Ok((v.vtot[0], v.vbaryon[0], v.vdm[0]))
    }

    pub fn circular_velocity_components_array(
        &mut self,
        r: &Array1<f64>,
    ) -> Result<(Array1<f64>, Array1<f64>, Array1<f64>)> {
        let radii = r.to_vec();
        let v = self.velocity_components(&radii)?;
        Ok((Array1::from(v.vtot), Array1::from(v.vbaryon), Array1::from(v.vdm)))
    }

    pub fn circular_velocity(&mut self, r: f64) -> Result<f64> {
        Ok(self.circular_velocity_components(r)?.0)
    }

    pub fn circular_velocity_array(&mut self, r: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(self.circular_velocity_components_array(r)?.0)
    }

    pub fn enclosed_mass(&mut self, r: f64) -> Result<f64> {
        Ok(self.enclosed_mass_slice(&[r])?[0])
    }

    pub fn enclosed_mass_array(&mut self, r: &Array1<f64>) -> Result<Array1<f64>> {
        let radii = r.to_vec();
        Ok(Array1::from(self.enclosed_mass_slice(&radii)?))
    }

    fn enclosed_mass_slice(&mut self, r: &[f64]) -> Result<Vec<f64>> {
        self.resolve_tied_parameters()?;
        self.combiner().enclosed_mass(r)
    }

    /// v_dm² / v_tot² at `r`.
    pub fn dark_matter_fraction(&mut self, r: f64) -> Result<f64> {
        Ok(self.dark_matter_fraction_slice(&[r])?[0])
    }

    pub fn dark_matter_fraction_array(&mut self, r: &Array1<f64>) -> Result<Array1<f64>> {
        let radii = r.to_vec();
        Ok(Array1::from(self.dark_matter_fraction_slice(&radii)?))
    }

    fn dark_matter_fraction_slice(&mut self, r: &[f64]) -> Result<Vec<f64>> {
        self.resolve_tied_parameters()?;
        self.combiner().dark_matter_fraction(r)
    }

    /// Rotation velocity at `r`, after pressure support if enabled.
    pub fn velocity_profile(&mut self, r: f64) -> Result<f64> {
        Ok(self.velocity_profile_slice(&[r])?[0])
    }

    pub fn velocity_profile_array(&mut self, r: &Array1<f64>) -> Result<Array1<f64>> {
        let radii = r.to_vec();
        Ok(Array1::from(self.velocity_profile_slice(&radii)?))
    }

    pub(crate) fn velocity_profile_slice(&mut self, r: &[f64]) -> Result<Vec<f64>> {
        self.resolve_tied_parameters()?;
        let setup = if self.kinematic_options.pressure_support {
            Some(self.pressure_setup()?)
        } else {
            None
        };
        self.combiner().velocity_profile(r, setup.as_ref())
    }
}

/// Depth-first post-order visit; state 1 is "on the stack", 2 is "done".
fn visit<'a>(
    node: &'a TieKey,
    graph: &'a BTreeMap<TieKey, BTreeSet<TieKey>>,
    state: &mut BTreeMap<&'a TieKey, u8>,
    order: &mut Vec<TieKey>,
) -> Result<()> {
    match state.get(node) {
        Some(2) => return Ok(()),
        Some(_) => return Err(GalkinError::CircularDependency(format!("{}.{}", node.0, node.1))),
        None => {}
    }
    state.insert(node, 1);
    if let Some(edges) = graph.get(node) {
        for dep in edges {
            visit(dep, graph, state, order)?;
        }
    }
    state.insert(node, 2);
    order.push(node.clone());
    Ok(())
}
