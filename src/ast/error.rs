use thiserror::Error;

/// Failures raised while turning text into a tree. Always fatal to the parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Format error: {0}")]
    Format(String),
    #[error("Argument error: {0}")]
    Argument(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Failures raised while evaluating a tree.
///
/// `Domain` and `DivideByZero` are only produced when the matching setting asks
/// for them; otherwise the operation yields NaN or an infinity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Domain error: {0}")]
    Domain(String),
    #[error("Division by zero")]
    DivideByZero,
    #[error("Variable '{0}' is not defined")]
    NotDefinedVariable(String),
    #[error("Expression has no value set")]
    InvalidState,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Expression '{0}' is not registered")]
    UnknownExpression(String),
}

impl ParseError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ParseError::Format(message.into())
    }
}
