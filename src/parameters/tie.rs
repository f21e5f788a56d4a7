//! Tied parameters
//!
//! A tie derives a parameter's value from other parameters of the model set.
//! It is either an algebraic [`Expression`] over `component.parameter`
//! references, or an arbitrary resolver function with explicitly declared
//! dependencies (used for physically derived quantities such as the dark
//! matter fraction of a halo).

use crate::error::Result;
use crate::model_set::ModelSet;
use crate::parameters::expression::{EvaluationContext, Expression, ExpressionError};
use std::fmt;
use std::sync::Arc;

/// Reference to a parameter, optionally qualified by its component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamRef {
    /// Owning component; `None` means the component that owns the tie
    pub component: Option<String>,
    pub parameter: String,
}

impl ParamRef {
    /// Parse `component.parameter` or a bare `parameter`
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((component, parameter)) => Self::qualified(component, parameter),
            None => Self::local(name),
        }
    }

    pub fn local(parameter: &str) -> Self {
        Self {
            component: None,
            parameter: parameter.to_string(),
        }
    }

    pub fn qualified(component: &str, parameter: &str) -> Self {
        Self {
            component: Some(component.to_string()),
            parameter: parameter.to_string(),
        }
    }

    /// The component this reference points into, given the tie's owner
    pub fn component_or<'a>(&'a self, owner: &'a str) -> &'a str {
        self.component.as_deref().unwrap_or(owner)
    }
}

/// Something a tie reads
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    /// A single parameter
    Parameter(ParamRef),

    /// Every parameter of a component, except the tie's own target
    Component(String),
}

/// Resolver function of a tie
pub type TieFn = Arc<dyn Fn(&TieContext<'_>) -> Result<f64> + Send + Sync>;

/// Rule deriving a parameter's value
#[derive(Clone)]
pub enum Tie {
    /// Algebraic expression over other parameters
    Expression {
        source: String,
        expr: Expression,
        deps: Vec<ParamRef>,
    },

    /// Arbitrary function of the model set
    Resolver { deps: Vec<Dependency>, func: TieFn },
}

impl Tie {
    /// Tie to an algebraic expression such as `"2 * disk.r_eff"`
    ///
    /// # Examples
    ///
    /// ```
    /// use galkin::parameters::tie::{Dependency, ParamRef, Tie};
    ///
    /// let tie = Tie::expression("1 / nEinasto").unwrap();
    /// assert_eq!(
    ///     tie.dependencies("halo"),
    ///     vec![Dependency::Parameter(ParamRef::qualified("halo", "nEinasto"))]
    /// );
    /// ```
    pub fn expression(source: &str) -> Result<Self> {
        let expr = Expression::parse(source)?;
        let deps = expr.variables().iter().map(|v| ParamRef::parse(v)).collect();
        Ok(Tie::Expression {
            source: source.to_string(),
            expr,
            deps,
        })
    }

    /// Tie to a resolver function reading the declared dependencies
    pub fn resolver<F>(deps: Vec<Dependency>, func: F) -> Self
    where
        F: Fn(&TieContext<'_>) -> Result<f64> + Send + Sync + 'static,
    {
        Tie::Resolver {
            deps,
            func: Arc::new(func),
        }
    }

    /// Dependencies with bare references resolved against `owner`
    pub fn dependencies(&self, owner: &str) -> Vec<Dependency> {
        match self {
            Tie::Expression { deps, .. } => deps
                .iter()
                .map(|r| Dependency::Parameter(ParamRef::qualified(r.component_or(owner), &r.parameter)))
                .collect(),
            Tie::Resolver { deps, .. } => deps
                .iter()
                .map(|d| match d {
                    Dependency::Parameter(r) => {
                        Dependency::Parameter(ParamRef::qualified(r.component_or(owner), &r.parameter))
                    }
                    other => other.clone(),
                })
                .collect(),
        }
    }

    /// Expression text, for expression ties
    pub fn source(&self) -> Option<&str> {
        match self {
            Tie::Expression { source, .. } => Some(source),
            Tie::Resolver { .. } => None,
        }
    }

    /// Compute the tied value
    pub fn resolve(&self, context: &TieContext<'_>) -> Result<f64> {
        match self {
            Tie::Expression { expr, .. } => Ok(expr.evaluate(context)?),
            Tie::Resolver { func, .. } => func(context),
        }
    }
}

impl fmt::Debug for Tie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tie::Expression { source, .. } => f.debug_tuple("Expression").field(source).finish(),
            Tie::Resolver { deps, .. } => f.debug_struct("Resolver").field("deps", deps).finish(),
        }
    }
}

/// View of the model set handed to a tie while it resolves
pub struct TieContext<'a> {
    pub model_set: &'a ModelSet,

    /// Component owning the tied parameter
    pub component: &'a str,
}

impl<'a> TieContext<'a> {
    pub fn new(model_set: &'a ModelSet, component: &'a str) -> Self {
        Self {
            model_set,
            component,
        }
    }

    /// Value of a parameter, bare names referring to the owning component
    pub fn value(&self, name: &str) -> Result<f64> {
        let r = ParamRef::parse(name);
        self.model_set
            .get_parameter_value(r.component_or(self.component), &r.parameter)
    }
}

impl EvaluationContext for TieContext<'_> {
    fn get_variable(&self, name: &str) -> std::result::Result<f64, ExpressionError> {
        self.value(name).map_err(|_| ExpressionError::UndefinedVariable {
            name: name.to_string(),
        })
    }

    fn has_variable(&self, name: &str) -> bool {
        self.value(name).is_ok()
    }
}
