pub mod ast;
pub mod calculator;
pub mod error;
pub mod functions;
pub mod kernel;
pub mod settings;
pub mod workspace;

pub use ast::{ASTNode, EvalError, Evaluator, Expression, NameResolver, ParseError, Variable};
pub use calculator::Calculator;
pub use error::{Error, Result};
pub use settings::{AngleUnit, EvaluationSettings};
pub use workspace::{RegistryError, Workspace};

/// Parses and evaluates `expression` with default settings and the built-in
/// functions.
pub fn evaluate_expression(expression: &str, variables: &[Variable]) -> Result<f64> {
    let expression = Expression::parse(expression)?;
    Ok(expression.evaluate(variables, &EvaluationSettings::default())?)
}
