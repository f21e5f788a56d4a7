//! Parameter definition and implementation
//!
//! A [`Parameter`] is one named scalar of a model component: its current
//! value, its admissible range, whether it is held fixed, and an optional
//! [`Tie`] that derives its value from other parameters.

use crate::parameters::bounds::{Bounds, BoundsError};
use crate::parameters::tie::Tie;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' is already defined")]
    DuplicateParameter { name: String },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },
}

/// A named model parameter
///
/// A parameter is *free* when it is neither fixed nor tied; only free
/// parameters are exposed to samplers and optimizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    pub name: String,

    /// Current value of the parameter
    value: f64,

    /// Value at construction, restored by [`Parameter::reset`]
    init_value: f64,

    /// Whether the parameter is held at its current value
    fixed: bool,

    /// Admissible range (advisory, never enforced on assignment)
    bounds: Bounds,

    /// Rule deriving this parameter from others
    #[serde(skip)]
    tie: Option<Tie>,

    /// Standard error of the parameter, if known from a fit
    pub stderr: Option<f64>,
}

impl Parameter {
    /// Create a new free, unbounded parameter
    ///
    /// # Examples
    ///
    /// ```
    /// use galkin::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::new("conc", 5.0);
    /// assert_eq!(param.name(), "conc");
    /// assert_eq!(param.value(), 5.0);
    /// assert!(param.is_free());
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            fixed: false,
            bounds: Bounds::default(),
            tie: None,
            stderr: None,
        }
    }

    /// Create a new parameter with the given bounds
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the parameter
    /// * `value` - Initial value; it is kept as given even when outside the bounds
    /// * `min` - Minimum admissible value
    /// * `max` - Maximum admissible value
    ///
    /// # Examples
    ///
    /// ```
    /// use galkin::parameters::parameter::Parameter;
    ///
    /// let fdm = Parameter::with_bounds("fdm", -99.9, 0.0, 1.0).unwrap();
    /// assert_eq!(fdm.value(), -99.9);
    /// assert!(!fdm.within_bounds());
    /// ```
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max)?;
        Ok(Self::new(name, value).bounded(bounds))
    }

    /// Builder: replace the bounds
    pub fn bounded(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Builder: set the fixed flag
    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter. No clamping is applied.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Restore the construction-time value
    pub fn reset(&mut self) {
        self.value = self.init_value;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn tie(&self) -> Option<&Tie> {
        self.tie.as_ref()
    }

    /// Install or remove the tie
    pub fn set_tie(&mut self, tie: Option<Tie>) {
        self.tie = tie;
    }

    pub fn is_tied(&self) -> bool {
        self.tie.is_some()
    }

    /// Neither fixed nor tied
    pub fn is_free(&self) -> bool {
        !self.fixed && self.tie.is_none()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Whether the current value lies inside the bounds
    pub fn within_bounds(&self) -> bool {
        self.bounds.is_within_bounds(self.value)
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.fixed == other.fixed
            && self.bounds == other.bounds
            && self.is_tied() == other.is_tied()
    }
}
