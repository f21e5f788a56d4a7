use thiserror::Error;

/// Error types for the galkin library.
#[derive(Error, Debug)]
pub enum GalkinError {
    /// A component with the same name is already registered.
    #[error("Component '{0}' is already registered")]
    DuplicateComponent(String),

    /// A component was added without a name and has no default name.
    #[error("Component of kind '{0}' has no name and no default name")]
    UnnamedComponent(String),

    /// The named component does not exist in the model set.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// The parameter does not belong to the named component.
    #[error("Parameter '{parameter}' not found on component '{component}'")]
    ParameterNotFound { component: String, parameter: String },

    /// Error indicating a mismatch in vector lengths.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Tied parameters depend on each other in a cycle.
    #[error("Circular dependency in tied parameter '{0}'")]
    CircularDependency(String),

    /// Invalid or inconsistent model configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A coarse grid search found no sign change to bracket a root.
    #[error("No sign change bracketed while solving for '{0}'")]
    UnbracketedRoot(String),

    /// Error indicating a numeric solver failed to converge.
    #[error("Failed to converge: {0}")]
    ConvergenceFailure(String),

    /// Not implemented functionality.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// An optional collaborator required by the request is not available.
    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error while parsing or evaluating a tie expression.
    #[error("Expression error: {0}")]
    ExpressionError(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GalkinError {
    /// Shorthand for a missing parameter on a named component.
    pub fn parameter_not_found(component: &str, parameter: &str) -> Self {
        GalkinError::ParameterNotFound {
            component: component.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

impl From<crate::parameters::parameter::ParameterError> for GalkinError {
    fn from(err: crate::parameters::parameter::ParameterError) -> Self {
        GalkinError::ParameterError(format!("{}", err))
    }
}

impl From<crate::parameters::bounds::BoundsError> for GalkinError {
    fn from(err: crate::parameters::bounds::BoundsError) -> Self {
        GalkinError::ParameterError(format!("{}", err))
    }
}

impl From<crate::parameters::expression::ExpressionError> for GalkinError {
    fn from(err: crate::parameters::expression::ExpressionError) -> Self {
        GalkinError::ExpressionError(format!("{}", err))
    }
}

impl From<roots::SearchError> for GalkinError {
    fn from(err: roots::SearchError) -> Self {
        match err {
            roots::SearchError::NoBracketing => {
                GalkinError::UnbracketedRoot(format!("{}", err))
            }
            other => GalkinError::ConvergenceFailure(format!("{}", other)),
        }
    }
}

/// Result type alias for galkin operations.
pub type Result<T> = std::result::Result<T, GalkinError>;
