//! Bracketed root finding.
//!
//! Inversions follow a "coarse grid, then bracket" pattern: the objective is
//! sampled on a fixed grid, the first sign change is taken as the bracket and
//! Brent's method (from the `roots` crate) refines it. What happens when the
//! grid shows no sign change is governed by [`BracketPolicy`].

use crate::error::{GalkinError, Result};
use roots::{find_root_brent, SearchError, SimpleConvergency};
use serde::{Deserialize, Serialize};

/// Behaviour when a grid search finds no sign change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BracketPolicy {
    /// Fail with [`GalkinError::UnbracketedRoot`].
    #[default]
    Raise,

    /// Force a bracket from the grid edges and fall back to its midpoint if
    /// Brent's method cannot use it.
    GridEdges,
}

/// Settings shared by every bracketed solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootFindingConfig {
    /// Absolute convergence tolerance on the root position
    pub tolerance: f64,

    /// Iteration budget for Brent's method
    pub max_iterations: usize,

    /// What to do when no sign change is found on the grid
    pub bracket_policy: BracketPolicy,
}

impl Default for RootFindingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
            bracket_policy: BracketPolicy::Raise,
        }
    }
}

/// An interval believed to contain a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,

    /// `false` when the bracket was forced from the grid edges.
    pub verified: bool,
}

/// Result of a grid-bracketed solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSolution {
    pub value: f64,
    pub bracket: Bracket,
}

/// Evenly spaced values in `[start, stop)`.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Find a root of `f` in `[a, b]` with Brent's method.
///
/// # Arguments
///
/// * `f` - Objective; an error from `f` aborts the search and is returned
/// * `a`, `b` - Bracket end points, `f(a)` and `f(b)` must differ in sign
/// * `config` - Tolerance and iteration budget
/// * `target` - Name of the quantity being solved for, used in error messages
///
/// # Returns
///
/// The root, or `UnbracketedRoot` / `ConvergenceFailure`
pub fn brent<F>(mut f: F, a: f64, b: f64, config: &RootFindingConfig, target: &str) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    let fa = f(a)?;
    if fa == 0.0 {
        return Ok(a);
    }
    let fb = f(b)?;
    if fb == 0.0 {
        return Ok(b);
    }
    if !fa.is_finite() || !fb.is_finite() || fa.signum() == fb.signum() {
        return Err(GalkinError::UnbracketedRoot(format!(
            "{} in [{}, {}] (f = {}, {})",
            target, a, b, fa, fb
        )));
    }

    let mut failure: Option<GalkinError> = None;
    let mut convergency = SimpleConvergency {
        eps: config.tolerance,
        max_iter: config.max_iterations,
    };

    let root = find_root_brent(
        a,
        b,
        |x: f64| match f(x) {
            Ok(v) => v,
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                }
                f64::NAN
            }
        },
        &mut convergency,
    );

    if let Some(err) = failure {
        return Err(err);
    }

    root.map_err(|err| match err {
        SearchError::NoBracketing => GalkinError::UnbracketedRoot(target.to_string()),
        other => GalkinError::ConvergenceFailure(format!("{}: {}", target, other)),
    })
}

/// Sample `f` on `grid` and return the first interval over which it changes sign.
///
/// Grid points where `f` is non-finite are skipped. Sampling stops at the first
/// sign change, so points past it are never evaluated.
///
/// # Errors
///
/// * Any error returned by `f`
/// * `UnbracketedRoot` if there is no sign change and `policy` is [`BracketPolicy::Raise`]
pub fn grid_bracket<F>(grid: &[f64], mut f: F, policy: BracketPolicy, target: &str) -> Result<Bracket>
where
    F: FnMut(f64) -> Result<f64>,
{
    let mut previous: Option<(f64, f64)> = None;
    let mut any_negative = false;
    for &x in grid {
        let v = f(x)?;
        if !v.is_finite() {
            continue;
        }
        if v == 0.0 {
            return Ok(Bracket {
                lower: x,
                upper: x,
                verified: true,
            });
        }
        if let Some((px, pv)) = previous {
            if pv.signum() != v.signum() {
                return Ok(Bracket {
                    lower: px,
                    upper: x,
                    verified: true,
                });
            }
        }
        any_negative |= v < 0.0;
        previous = Some((x, v));
    }

    match policy {
        BracketPolicy::Raise => Err(GalkinError::UnbracketedRoot(format!(
            "{} over grid [{}, {}]",
            target,
            grid.first().copied().unwrap_or(f64::NAN),
            grid.last().copied().unwrap_or(f64::NAN)
        ))),
        BracketPolicy::GridEdges => {
            let n = grid.len();
            if n < 2 {
                return Err(GalkinError::UnbracketedRoot(format!(
                    "{}: grid has fewer than two points",
                    target
                )));
            }
            let (lower, upper) = if any_negative {
                (grid[n - 2], grid[n - 1])
            } else {
                (grid[0], grid[1])
            };
            Ok(Bracket {
                lower,
                upper,
                verified: false,
            })
        }
    }
}

/// Bracket a root of `f` on `grid`, then refine it with Brent's method.
pub fn solve_on_grid<F>(
    grid: &[f64],
    mut f: F,
    config: &RootFindingConfig,
    target: &str,
) -> Result<RootSolution>
where
    F: FnMut(f64) -> Result<f64>,
{
    let bracket = grid_bracket(grid, &mut f, config.bracket_policy, target)?;

    if bracket.lower == bracket.upper {
        return Ok(RootSolution {
            value: bracket.lower,
            bracket,
        });
    }

    match brent(&mut f, bracket.lower, bracket.upper, config, target) {
        Ok(value) => Ok(RootSolution { value, bracket }),
        Err(GalkinError::UnbracketedRoot(_)) | Err(GalkinError::ConvergenceFailure(_))
            if !bracket.verified =>
        {
            Ok(RootSolution {
                value: 0.5 * (bracket.lower + bracket.upper),
                bracket,
            })
        }
        Err(err) => Err(err),
    }
}
