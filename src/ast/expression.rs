use crate::ast::{ASTNode, EvalError, Evaluator, NameResolver, ParseError, Parser, Variable};
use crate::functions;
use crate::settings::EvaluationSettings;
use rayon::prelude::*;
use std::fmt;

/// A named, settable container around one parsed tree.
///
/// Anonymous expressions have an empty name. An expression that was never set
/// successfully refuses to evaluate with [`EvalError::InvalidState`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    name: String,
    root: Option<ASTNode>,
}

impl Expression {
    /// An anonymous, unset expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unset expression carrying `name`.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            root: None,
        }
    }

    pub fn from_ast(root: ASTNode) -> Self {
        Self {
            name: String::new(),
            root: Some(root),
        }
    }

    /// Parses `text` against the built-in function library.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, functions::builtins())
    }

    /// Parses `text`, resolving calls through `resolver`.
    pub fn parse_with(text: &str, resolver: &dyn NameResolver) -> Result<Self, ParseError> {
        let mut expression = Self::new();
        expression.set_with(text, resolver)?;
        Ok(expression)
    }

    pub fn set(&mut self, text: &str) -> Result<(), ParseError> {
        self.set_with(text, functions::builtins())
    }

    /// Replaces the tree. On failure the previous tree is kept.
    pub fn set_with(&mut self, text: &str, resolver: &dyn NameResolver) -> Result<(), ParseError> {
        let root = Parser::new(resolver).parse_expression(text)?;
        self.root = Some(root);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> Option<&ASTNode> {
        self.root.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.root.is_some()
    }

    /// Number of arguments a call to this expression takes.
    pub fn arity(&self) -> usize {
        self.root
            .as_ref()
            .map_or(0, |root| root.free_variables().len())
    }

    /// Evaluates with the built-in functions only.
    pub fn evaluate(
        &self,
        variables: &[Variable],
        settings: &EvaluationSettings,
    ) -> Result<f64, EvalError> {
        self.evaluate_with(variables, &Evaluator::with_builtins(settings))
    }

    pub fn evaluate_with(
        &self,
        variables: &[Variable],
        evaluator: &Evaluator,
    ) -> Result<f64, EvalError> {
        let root = self.root.as_ref().ok_or(EvalError::InvalidState)?;
        evaluator.evaluate(root, variables)
    }

    /// Evaluates the same tree against many bindings in parallel.
    pub fn evaluate_batch(
        &self,
        bindings: &[Vec<Variable>],
        evaluator: &Evaluator,
    ) -> Vec<Result<f64, EvalError>> {
        bindings
            .par_iter()
            .map(|variables| self.evaluate_with(variables, evaluator))
            .collect()
    }

    /// Free variables in first-encountered order.
    pub fn free_variables(&self) -> Result<Vec<String>, EvalError> {
        let root = self.root.as_ref().ok_or(EvalError::InvalidState)?;
        Ok(root.free_variables())
    }

    /// Whether the expression needs bindings, and for which names.
    pub fn depends_on_variables(&self) -> Result<(bool, Vec<String>), EvalError> {
        let names = self.free_variables()?;
        Ok((!names.is_empty(), names))
    }

    /// Names of the permanent expressions this expression calls.
    pub fn called_expressions(&self) -> Vec<String> {
        self.root
            .as_ref()
            .map(ASTNode::called_expressions)
            .unwrap_or_default()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}", root),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_evaluate() {
        let expression = Expression::parse("2x + 1").unwrap();
        let settings = EvaluationSettings::default();
        let result = expression.evaluate(&[Variable::new("x", 4.0)], &settings);
        assert_eq!(result, Ok(9.0));
    }

    #[test]
    fn test_unset_expression() {
        let expression = Expression::named("f");
        let settings = EvaluationSettings::default();
        assert_eq!(expression.name(), "f");
        assert!(!expression.is_set());
        assert_eq!(expression.evaluate(&[], &settings), Err(EvalError::InvalidState));
        assert_eq!(expression.depends_on_variables(), Err(EvalError::InvalidState));
        assert_eq!(expression.to_string(), "");
    }

    #[test]
    fn test_failed_set_keeps_previous_tree() {
        let mut expression = Expression::parse("1+1").unwrap();
        assert!(expression.set("1+").is_err());
        let settings = EvaluationSettings::default();
        assert_eq!(expression.evaluate(&[], &settings), Ok(2.0));

        expression.set("3*3").unwrap();
        assert_eq!(expression.evaluate(&[], &settings), Ok(9.0));
    }

    #[test]
    fn test_depends_on_variables() {
        let expression = Expression::parse("exp(x)+y^2").unwrap();
        assert_eq!(
            expression.depends_on_variables(),
            Ok((true, vec!["x".to_string(), "y".to_string()]))
        );

        let expression = Expression::parse("x*y+x").unwrap();
        assert_eq!(expression.arity(), 2);

        let expression = Expression::parse("sum(k,k,1,n)").unwrap();
        assert_eq!(
            expression.depends_on_variables(),
            Ok((true, vec!["n".to_string()]))
        );

        let expression = Expression::parse("2+2").unwrap();
        assert_eq!(expression.depends_on_variables(), Ok((false, vec![])));
    }

    #[test]
    fn test_display() {
        let cases = [
            ("2+3*4", "2+3*4"),
            ("(2+3)*4", "(2+3)*4"),
            ("2^2^3", "(2^2)^3"),
            ("x-1", "x-1"),
            ("-x^2", "-x^2"),
            ("(-2)^2", "(-2)^2"),
            ("log(8,2)", "log(8,2)"),
            ("2pi", "2*pi"),
            ("e^-x", "e^(-x)"),
            ("tau/phi", "tau/phi"),
        ];
        for (input, expected) in cases {
            assert_eq!(Expression::parse(input).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_evaluate_batch() {
        let expression = Expression::parse("x^2").unwrap();
        let settings = EvaluationSettings::default();
        let evaluator = Evaluator::with_builtins(&settings);
        let bindings: Vec<Vec<Variable>> =
            (0..100).map(|i| vec![Variable::new("x", i as f64)]).collect();

        let results = expression.evaluate_batch(&bindings, &evaluator);
        assert_eq!(results.len(), 100);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result, Ok((i * i) as f64));
        }

        let results = expression.evaluate_batch(&[vec![]], &evaluator);
        assert_eq!(
            results,
            vec![Err(EvalError::NotDefinedVariable("x".to_string()))]
        );
    }
}
