//! Ordered collection of named parameters
//!
//! Every model component owns one [`Parameters`] collection. Declaration
//! order is preserved, since it defines the layout of the free-parameter
//! vector of a model set.

use crate::parameters::parameter::{Parameter, ParameterError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Parameters of one component, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl Parameters {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    ///
    /// # Errors
    ///
    /// `DuplicateParameter` if a parameter with the same name already exists
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.index.contains_key(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }
        self.index.insert(param.name().to_string(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Append a parameter, or replace the existing one with the same name in place
    pub fn insert(&mut self, param: Parameter) {
        match self.index.get(param.name()) {
            Some(&i) => self.params[i] = param,
            None => {
                self.index.insert(param.name().to_string(), self.params.len());
                self.params.push(param);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.params[i]),
            None => None,
        }
    }

    /// Value of a parameter, if present
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(Parameter::value)
    }

    /// Set the value of an existing parameter
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        let param = self
            .get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })?;
        param.set_value(value);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a parameter in declaration order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Parameter values in declaration order
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(Parameter::value).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.params.iter_mut()
    }

    /// Restore every parameter to its construction-time value
    pub fn reset(&mut self) {
        for param in &mut self.params {
            param.reset();
        }
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for param in iter {
            params.insert(param);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.params.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let params = Vec::<Parameter>::deserialize(deserializer)?;
        let mut collection = Parameters::new();
        for param in params {
            collection.add(param).map_err(serde::de::Error::custom)?;
        }
        Ok(collection)
    }
}
