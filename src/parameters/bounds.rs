//! Parameter bounds.
//!
//! Bounds describe the physically admissible range of a parameter (e.g. an
//! inclination in [0, 90] degrees). They are advisory: values are never
//! clamped on assignment, since samplers may legitimately step outside them
//! and some parameters carry out-of-range sentinels (an unset `fdm` is -99.9).

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },
}

/// Lower and upper limits of a parameter; infinite limits mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum admissible value
    pub min: f64,

    /// Maximum admissible value
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // JSON has no infinities; open ends are written as null
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        Ok(Bounds {
            min: helper.min.unwrap_or(NEG_INFINITY),
            max: helper.max.unwrap_or(INFINITY),
        })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create bounds with min and max values
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum admissible value
    /// * `max` - Maximum admissible value
    ///
    /// # Returns
    ///
    /// A new `Bounds` object if min <= max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use galkin::parameters::bounds::Bounds;
    ///
    /// let inc = Bounds::new(0.0, 90.0).unwrap();
    /// assert!(inc.is_within_bounds(45.0));
    /// assert!(Bounds::new(90.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Unbounded range (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounded from below only
    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    /// Bounded from above only
    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    /// Check if a value is within the bounds (inclusive)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check if both limits are finite
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Clamp a value into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}
