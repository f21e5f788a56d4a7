//! Numerical helpers shared by the mass profiles and the kinematics.

pub mod finite_difference;
pub mod interp;
pub mod parallel;
pub mod roots;
pub mod special;

// Re-export commonly used utilities
pub use finite_difference::log_derivative;
pub use interp::LinearInterpolator;
pub use parallel::{evaluate_batch, velocity_profiles};
pub use roots::{arange, brent, grid_bracket, solve_on_grid, Bracket, BracketPolicy, RootFindingConfig, RootSolution};
