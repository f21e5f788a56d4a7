//! Tabulated rotation curves of flattened Sersic profiles.
//!
//! Noordermeer (2008) computed circular velocities of oblate Sersic
//! spheroids on a grid of Sersic index and inverse axis ratio. A Sersic
//! component in flattened mode picks the nearest grid curve and rescales it
//! to its own mass and effective radius.

use crate::error::{GalkinError, Result};
use crate::utils::interp::LinearInterpolator;
use std::collections::HashMap;
use std::fmt::Debug;

/// Sersic indices covered by the Noordermeer grid.
pub const NOORDERMEER_N: (f64, f64, f64) = (0.5, 8.0, 0.1);

/// Inverse axis ratios covered by the Noordermeer grid.
pub const NOORDERMEER_INVQ: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 20.0, 100.0];

/// One tabulated curve and the profile it was computed for.
#[derive(Debug, Clone)]
pub struct FlattenedCurve {
    /// Rotation curve over the tabulated radii
    pub curve: LinearInterpolator,

    /// Effective radius of the tabulated profile, in the table's radius units
    pub r_eff: f64,

    /// Total mass of the tabulated profile in Msun
    pub mass: f64,
}

impl FlattenedCurve {
    /// Build a curve from radius and circular velocity columns.
    pub fn new(radius: Vec<f64>, vcirc: Vec<f64>, r_eff: f64, mass: f64) -> Result<Self> {
        Ok(Self {
            curve: LinearInterpolator::new(radius, vcirc)?,
            r_eff,
            mass,
        })
    }

    /// Circular velocity of a profile with total mass `mass` (Msun) and
    /// effective radius `r_eff` (kpc) at radius `r` (kpc).
    pub fn scaled_velocity(&self, r: f64, mass: f64, r_eff: f64) -> f64 {
        self.curve.eval(r / r_eff * self.r_eff) * (mass / self.mass).sqrt() * (self.r_eff / r_eff).sqrt()
    }
}

/// Source of flattened rotation curves indexed by (n, invq).
pub trait FlatteningTable: Debug + Send + Sync {
    /// Curve for the grid point nearest to `(n, invq)`.
    ///
    /// # Errors
    ///
    /// `FeatureUnavailable` when the table holds no curve for that grid point.
    fn lookup(&self, n: f64, invq: f64) -> Result<&FlattenedCurve>;
}

/// In-memory Noordermeer grid with nearest-neighbour lookup.
#[derive(Debug, Clone, Default)]
pub struct NoordermeerTable {
    curves: HashMap<(u32, u32), FlattenedCurve>,
}

impl NoordermeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the curve for a grid point; off-grid keys snap to the nearest one.
    pub fn insert(&mut self, n: f64, invq: f64, curve: FlattenedCurve) {
        self.curves.insert(Self::key(n, invq), curve);
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Nearest tabulated Sersic index, in tenths
    fn nearest_n_tenths(n: f64) -> u32 {
        let (lo, hi, step) = NOORDERMEER_N;
        let clamped = n.clamp(lo, hi);
        let i = ((clamped - lo) / step).round();
        (lo / step).round() as u32 + i as u32
    }

    fn nearest_invq(invq: f64) -> u32 {
        let mut best = NOORDERMEER_INVQ[0];
        for &q in &NOORDERMEER_INVQ[1..] {
            if (q - invq).abs() < (best - invq).abs() {
                best = q;
            }
        }
        best as u32
    }

    fn key(n: f64, invq: f64) -> (u32, u32) {
        (Self::nearest_n_tenths(n), Self::nearest_invq(invq))
    }
}

impl FlatteningTable for NoordermeerTable {
    fn lookup(&self, n: f64, invq: f64) -> Result<&FlattenedCurve> {
        let key = Self::key(n, invq);
        self.curves.get(&key).ok_or_else(|| {
            GalkinError::FeatureUnavailable(format!(
                "no flattened rotation curve for n={:.1}, invq={}",
                key.0 as f64 / 10.0,
                key.1
            ))
        })
    }
}
