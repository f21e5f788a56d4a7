//! Flattened parameter bookkeeping across components
//!
//! The store keeps every `(component, parameter)` pair of a model set in
//! registration order, together with the full value vector and the
//! free-only vector seen by samplers. Both vectors are updated in the same
//! call, so readers never observe a stale view.

use crate::error::{GalkinError, Result};
use crate::parameters::parameters::Parameters;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    component: String,
    parameter: String,
    value: f64,
    free: bool,
}

/// Full and free-only parameter vectors with stable index maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    entries: Vec<Entry>,

    /// Free position of each full entry, `None` for fixed or tied entries
    free_index: Vec<Option<usize>>,

    /// Full positions of the free entries, in free order
    free_entries: Vec<usize>,

    free_values: Vec<f64>,

    /// component -> parameter -> full index
    lookup: HashMap<String, HashMap<String, usize>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all parameters of a component in declaration order
    pub fn register(&mut self, component: &str, params: &Parameters) -> Result<()> {
        if self.lookup.contains_key(component) {
            return Err(GalkinError::DuplicateComponent(component.to_string()));
        }
        for param in params {
            self.entries.push(Entry {
                component: component.to_string(),
                parameter: param.name().to_string(),
                value: param.value(),
                free: param.is_free(),
            });
        }
        self.rebuild();
        Ok(())
    }

    /// Drop all parameters of a component; unknown components are ignored
    pub fn unregister(&mut self, component: &str) {
        self.entries.retain(|e| e.component != component);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.lookup.clear();
        self.free_index.clear();
        self.free_entries.clear();
        self.free_values.clear();

        for (i, entry) in self.entries.iter().enumerate() {
            self.lookup
                .entry(entry.component.clone())
                .or_default()
                .insert(entry.parameter.clone(), i);
            if entry.free {
                self.free_index.push(Some(self.free_entries.len()));
                self.free_entries.push(i);
                self.free_values.push(entry.value);
            } else {
                self.free_index.push(None);
            }
        }
    }

    fn locate(&self, component: &str, parameter: &str) -> Result<usize> {
        let params = self
            .lookup
            .get(component)
            .ok_or_else(|| GalkinError::ComponentNotFound(component.to_string()))?;
        params
            .get(parameter)
            .copied()
            .ok_or_else(|| GalkinError::parameter_not_found(component, parameter))
    }

    /// Update the full entry and, if free, the free entry
    pub fn set_value(&mut self, component: &str, parameter: &str, value: f64) -> Result<()> {
        let i = self.locate(component, parameter)?;
        self.entries[i].value = value;
        if let Some(j) = self.free_index[i] {
            self.free_values[j] = value;
        }
        Ok(())
    }

    /// Mark a parameter free or not and rebuild the free vector
    pub fn set_free(&mut self, component: &str, parameter: &str, free: bool) -> Result<()> {
        let i = self.locate(component, parameter)?;
        if self.entries[i].free != free {
            self.entries[i].free = free;
            self.rebuild();
        }
        Ok(())
    }

    pub fn value(&self, component: &str, parameter: &str) -> Result<f64> {
        let i = self.locate(component, parameter)?;
        Ok(self.entries[i].value)
    }

    pub fn contains_component(&self, component: &str) -> bool {
        self.lookup.contains_key(component)
    }

    /// Position in the full vector
    pub fn full_index(&self, component: &str, parameter: &str) -> Option<usize> {
        self.locate(component, parameter).ok()
    }

    /// Position in the free vector, `None` for fixed or tied parameters
    pub fn free_index(&self, component: &str, parameter: &str) -> Option<usize> {
        self.locate(component, parameter)
            .ok()
            .and_then(|i| self.free_index[i])
    }

    pub fn full_values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.value).collect()
    }

    pub fn free_values(&self) -> &[f64] {
        &self.free_values
    }

    /// `(component, parameter)` pairs in full order
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.component.as_str(), e.parameter.as_str()))
    }

    /// `(component, parameter)` pairs of the free vector, in free order
    pub fn free_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.free_entries.iter().map(move |&i| {
            let e = &self.entries[i];
            (e.component.as_str(), e.parameter.as_str())
        })
    }

    pub fn nparams(&self) -> usize {
        self.entries.len()
    }

    pub fn nparams_free(&self) -> usize {
        self.free_entries.len()
    }
}
