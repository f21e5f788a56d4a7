//! Piecewise-linear interpolation with linear extrapolation beyond the table.

use crate::error::{GalkinError, Result};

/// Linear interpolator over a strictly increasing abscissa.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    /// Build an interpolator from tabulated points.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the lengths differ, `InvalidInput` if fewer than
    /// two points are given or `x` is not strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(GalkinError::DimensionMismatch(format!(
                "interpolation table has {} abscissae but {} ordinates",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(GalkinError::InvalidInput(
                "interpolation needs at least two points".to_string(),
            ));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(GalkinError::InvalidInput(
                "interpolation abscissae must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { x, y })
    }

    /// Evaluate at `xq`, extrapolating linearly from the end segments.
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        // Index of the segment [x[i], x[i+1]] used for xq
        let i = match self.x.partition_point(|&xi| xi <= xq) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (y1 - y0) * (xq - x0) / (x1 - x0)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }
}
