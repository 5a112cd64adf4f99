use crate::ast::{Evaluator, Expression, Variable};
use crate::error::{Error, Result};
use crate::settings::EvaluationSettings;
use crate::workspace::{RegistryError, Workspace};
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

/// A calculator session: registries, settings and a cache of parsed input.
///
/// Parsed anonymous expressions are cached by their source text. Parsing
/// depends on which permanent expressions exist, so the cache is dropped
/// whenever the expression registry changes.
pub struct Calculator {
    workspace: Workspace,
    settings: EvaluationSettings,
    cache: LruCache<String, Expression>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(128)
    }
}

impl Calculator {
    /// Creates a session caching up to `cache_capacity` parsed expressions.
    pub fn new(cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            workspace: Workspace::new(),
            settings: EvaluationSettings::default(),
            cache: LruCache::new(capacity),
        }
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EvaluationSettings {
        &mut self.settings
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Parses `text`, reusing a cached tree when the same text was seen before.
    pub fn parse(&mut self, text: &str) -> Result<Expression> {
        if let Some(expression) = self.cache.get(text) {
            debug!("Parse cache hit: {}", text);
            return Ok(expression.clone());
        }
        let expression = Expression::parse_with(text, &self.workspace)?;
        self.cache.put(text.to_string(), expression.clone());
        Ok(expression)
    }

    /// Parses and evaluates `text` with the registry variables bound.
    pub fn calculate(&mut self, text: &str) -> Result<f64> {
        let expression = self.parse(text)?;
        self.evaluate(&expression)
    }

    /// Evaluates the permanent expression `name` with the registry variables bound.
    pub fn calculate_expression(&self, name: &str) -> Result<f64> {
        let expression = self
            .workspace
            .get_expression(name)
            .ok_or_else(|| RegistryError::NotFound(name.trim().to_lowercase()))?;
        self.evaluate(expression)
    }

    fn evaluate(&self, expression: &Expression) -> Result<f64> {
        let variables: Vec<Variable> = self.workspace.variables().cloned().collect();
        let evaluator = Evaluator::new(&self.settings, &self.workspace);
        expression
            .evaluate_with(&variables, &evaluator)
            .map_err(Error::from)
    }

    /// Creates the variable, or updates its value when it already exists.
    pub fn set_variable(&mut self, name: &str, value: f64) -> Result<()> {
        if self.workspace.contains_variable(name) {
            self.workspace.update_variable(name, value)?;
        } else {
            self.workspace.create_variable(name, Some(value))?;
        }
        Ok(())
    }

    pub fn delete_variable(&mut self, name: &str) -> Result<()> {
        self.workspace.delete_variable(name)?;
        Ok(())
    }

    /// Creates the permanent expression, or redefines it when it already exists.
    pub fn set_expression(&mut self, name: &str, text: &str) -> Result<()> {
        if self.workspace.contains_expression(name) {
            self.workspace.update_expression(name, text)?;
        } else {
            self.workspace.create_expression(name, text)?;
        }
        self.cache.clear();
        Ok(())
    }

    pub fn delete_expression(&mut self, name: &str) -> Result<()> {
        self.workspace.delete_expression(name)?;
        self.cache.clear();
        Ok(())
    }

    /// Empties both registries and the parse cache.
    pub fn clear(&mut self) {
        self.workspace.clear();
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EvalError, ParseError};
    use crate::settings::AngleUnit;

    #[test]
    fn test_calculate() {
        let mut calculator = Calculator::new(16);
        assert_eq!(calculator.calculate("2+10"), Ok(12.0));
        assert_eq!(calculator.calculate("2+10"), Ok(12.0));
        assert_eq!(calculator.cached_len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut calculator = Calculator::new(0);
        calculator.calculate("1+1").unwrap();
        calculator.calculate("2+2").unwrap();
        assert_eq!(calculator.cached_len(), 1);
    }

    #[test]
    fn test_variables() {
        let mut calculator = Calculator::default();
        calculator.set_variable("x", 3.0).unwrap();
        assert_eq!(calculator.calculate("x^2"), Ok(9.0));
        calculator.set_variable("X", 4.0).unwrap();
        assert_eq!(calculator.calculate("x^2"), Ok(16.0));

        calculator.delete_variable("x").unwrap();
        assert_eq!(
            calculator.calculate("x^2"),
            Err(Error::Eval(EvalError::NotDefinedVariable("x".to_string())))
        );
    }

    #[test]
    fn test_expression_changes_clear_cache() {
        let mut calculator = Calculator::default();
        // before `f` exists this is a product of variables
        assert!(matches!(
            calculator.calculate("f(2)"),
            Err(Error::Eval(EvalError::NotDefinedVariable(_)))
        ));

        calculator.set_expression("f", "x^2+1").unwrap();
        assert_eq!(calculator.cached_len(), 0);
        assert_eq!(calculator.calculate("f(2)"), Ok(5.0));

        calculator.set_expression("f", "x^3").unwrap();
        assert_eq!(calculator.calculate("f(2)"), Ok(8.0));
        calculator.set_variable("x", 3.0).unwrap();
        assert_eq!(calculator.calculate_expression("f"), Ok(27.0));

        calculator.delete_expression("f").unwrap();
        assert!(matches!(
            calculator.calculate_expression("f"),
            Err(Error::Registry(RegistryError::NotFound(_)))
        ));
    }

    #[test]
    fn test_settings_are_applied() {
        let mut calculator = Calculator::default();
        assert_eq!(
            calculator.calculate("3/0"),
            Err(Error::Eval(EvalError::DivideByZero))
        );
        calculator.settings_mut().raise_divide_by_zero = false;
        assert_eq!(calculator.calculate("3/0"), Ok(f64::INFINITY));

        calculator.settings_mut().angle_unit = AngleUnit::Radians;
        let value = calculator.calculate("cos(pi)").unwrap();
        assert!((value + 1.0).abs() < 1e-12);

        calculator.settings_mut().reset();
        assert_eq!(*calculator.settings(), EvaluationSettings::default());
    }

    #[test]
    fn test_parse_errors_are_surfaced() {
        let mut calculator = Calculator::default();
        assert!(matches!(
            calculator.calculate("(1+2"),
            Err(Error::Parse(ParseError::Format(_)))
        ));
        assert_eq!(calculator.cached_len(), 0);
    }

    #[test]
    fn test_clear() {
        let mut calculator = Calculator::default();
        calculator.set_variable("a", 1.0).unwrap();
        calculator.set_expression("g", "a+b").unwrap();
        calculator.calculate("1").unwrap();
        calculator.clear();
        assert_eq!(calculator.workspace().variables().count(), 0);
        assert_eq!(calculator.workspace().expressions().count(), 0);
        assert_eq!(calculator.cached_len(), 0);
    }
}
