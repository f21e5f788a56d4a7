//! # Parameter System
//!
//! Named, bounded parameters for galaxy model components, and the
//! bookkeeping that flattens them into the vectors seen by samplers.
//!
//! ## Core Components
//!
//! - [`Parameter`]: one value with bounds, a fixed flag and an optional tie
//! - [`Parameters`]: a component's parameters in declaration order
//! - [`Bounds`]: advisory admissible range
//! - [`Expression`]: algebraic tie expressions over `component.parameter` names
//! - [`Tie`]: derives a parameter from others, with declared dependencies
//! - [`ParameterStore`]: full and free-only vectors with stable index maps
//!
//! ## Example Usage
//!
//! ```rust
//! use galkin::parameters::{Parameter, Parameters};
//!
//! let mut params = Parameters::new();
//! params.add(Parameter::with_bounds("mvirial", 12.0, 5.0, 20.0).unwrap()).unwrap();
//! params.add(Parameter::with_bounds("conc", 5.0, 2.0, 20.0).unwrap()).unwrap();
//! params.get_mut("conc").unwrap().set_fixed(true);
//!
//! assert_eq!(params.names(), vec!["mvirial", "conc"]);
//! assert!(params.get("mvirial").unwrap().is_free());
//! ```

pub mod bounds;
pub mod expression;
pub mod parameter;
pub mod parameters;
pub mod store;
pub mod tie;


// Re-export key types
pub use bounds::{Bounds, BoundsError};
pub use expression::{EvaluationContext, Expression, ExpressionError, SimpleContext};
pub use parameter::{Parameter, ParameterError};
pub use parameters::Parameters;
pub use store::ParameterStore;
pub use tie::{Dependency, ParamRef, Tie, TieContext};
