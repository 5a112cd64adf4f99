//! Named variables and permanent expressions.
//!
//! Names are case-insensitive identifiers (`[a-z_][a-z0-9_]*` once lowercased),
//! unique across both registries and never equal to a constant or built-in
//! function name. A permanent expression can be called from other expressions
//! like a function; its free variables are its parameters.

use crate::ast::{is_identifier, Expression, NameResolver, ParseError, Variable};
use crate::functions::{FunctionLibrary, FunctionSpec};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("'{0}' is not a valid name")]
    InvalidName(String),
    #[error("'{0}' is a reserved name")]
    Reserved(String),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    #[error("'{0}' does not exist")]
    NotFound(String),
    #[error("'{0}' is called by '{1}'")]
    InUse(String, String),
    #[error("'{0}' would end up calling itself")]
    Recursive(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub struct Workspace {
    library: FunctionLibrary,
    variables: BTreeMap<String, Variable>,
    expressions: BTreeMap<String, Expression>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// An empty workspace with the built-in function library.
    pub fn new() -> Self {
        Self::with_library(FunctionLibrary::with_builtins())
    }

    pub fn with_library(library: FunctionLibrary) -> Self {
        Self {
            library,
            variables: BTreeMap::new(),
            expressions: BTreeMap::new(),
        }
    }

    pub fn library(&self) -> &FunctionLibrary {
        &self.library
    }

    fn validate_name(&self, name: &str) -> Result<String, RegistryError> {
        let name = name.trim().to_lowercase();
        if !is_identifier(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        if self.is_reserved(&name) {
            return Err(RegistryError::Reserved(name));
        }
        Ok(name)
    }

    fn ensure_new(&self, name: &str) -> Result<(), RegistryError> {
        if self.variables.contains_key(name) || self.expressions.contains_key(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }

    pub fn create_variable(&mut self, name: &str, value: Option<f64>) -> Result<(), RegistryError> {
        let name = self.validate_name(name)?;
        self.ensure_new(&name)?;
        let variable = match value {
            Some(value) => Variable::new(&name, value),
            None => Variable::unset(&name),
        };
        debug!("Created variable {} = {:?}", name, value);
        self.variables.insert(name, variable);
        Ok(())
    }

    pub fn update_variable(&mut self, name: &str, value: f64) -> Result<(), RegistryError> {
        let name = name.trim().to_lowercase();
        let variable = self
            .variables
            .get_mut(&name)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;
        variable.set_value(value);
        debug!("Updated variable {} = {}", name, value);
        Ok(())
    }

    pub fn delete_variable(&mut self, name: &str) -> Result<Variable, RegistryError> {
        let name = name.trim().to_lowercase();
        let variable = self
            .variables
            .remove(&name)
            .ok_or(RegistryError::NotFound(name))?;
        debug!("Deleted variable {}", variable.name());
        Ok(variable)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.contains_key(&name.trim().to_lowercase())
    }

    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(&name.trim().to_lowercase())
    }

    /// Variables in name order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn clear_variables(&mut self) {
        debug!("Cleared {} variables", self.variables.len());
        self.variables.clear();
    }

    pub fn create_expression(&mut self, name: &str, text: &str) -> Result<(), RegistryError> {
        let name = self.validate_name(name)?;
        self.ensure_new(&name)?;
        let expression = self.build_expression(&name, text)?;
        debug!("Created expression {} = {}", name, expression);
        self.expressions.insert(name, expression);
        Ok(())
    }

    /// Replaces the definition of an existing expression.
    ///
    /// Rejected when the new definition would call itself, directly or
    /// through other expressions, or when it changes the parameter count of
    /// an expression that others call.
    pub fn update_expression(&mut self, name: &str, text: &str) -> Result<(), RegistryError> {
        let name = name.trim().to_lowercase();
        let previous = self
            .expressions
            .get(&name)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;
        let previous_arity = previous.arity();

        let expression = self.build_expression(&name, text)?;
        if expression
            .called_expressions()
            .iter()
            .any(|callee| self.reaches(callee, &name, &mut HashSet::new()))
        {
            return Err(RegistryError::Recursive(name));
        }
        if expression.arity() != previous_arity {
            if let Some(caller) = self.caller_of(&name) {
                return Err(RegistryError::InUse(name, caller.to_string()));
            }
        }

        debug!("Updated expression {} = {}", name, expression);
        self.expressions.insert(name, expression);
        Ok(())
    }

    pub fn delete_expression(&mut self, name: &str) -> Result<Expression, RegistryError> {
        let name = name.trim().to_lowercase();
        if !self.expressions.contains_key(&name) {
            return Err(RegistryError::NotFound(name));
        }
        if let Some(caller) = self.caller_of(&name) {
            return Err(RegistryError::InUse(name.clone(), caller.to_string()));
        }
        let expression = self
            .expressions
            .remove(&name)
            .ok_or(RegistryError::NotFound(name))?;
        debug!("Deleted expression {}", expression.name());
        Ok(expression)
    }

    pub fn contains_expression(&self, name: &str) -> bool {
        self.expressions.contains_key(&name.trim().to_lowercase())
    }

    pub fn get_expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(&name.trim().to_lowercase())
    }

    /// Expressions in name order.
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.values()
    }

    pub fn clear_expressions(&mut self) {
        debug!("Cleared {} expressions", self.expressions.len());
        self.expressions.clear();
    }

    pub fn clear(&mut self) {
        self.clear_variables();
        self.clear_expressions();
    }

    fn build_expression(&self, name: &str, text: &str) -> Result<Expression, RegistryError> {
        let mut expression = Expression::named(name);
        expression.set_with(text, self)?;
        // an expression cannot take its own name as a parameter
        if expression.free_variables().unwrap_or_default().iter().any(|v| v == name) {
            return Err(RegistryError::Recursive(name.to_string()));
        }
        Ok(expression)
    }

    // Whether `from` calls `target`, directly or transitively.
    fn reaches(&self, from: &str, target: &str, visited: &mut HashSet<String>) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from.to_string()) {
            return false;
        }
        self.expressions.get(from).is_some_and(|expression| {
            expression
                .called_expressions()
                .iter()
                .any(|callee| self.reaches(callee, target, visited))
        })
    }

    fn caller_of(&self, name: &str) -> Option<&str> {
        self.expressions
            .iter()
            .find(|(caller, expression)| {
                caller.as_str() != name && expression.called_expressions().iter().any(|c| c == name)
            })
            .map(|(caller, _)| caller.as_str())
    }
}

impl NameResolver for Workspace {
    fn find_function(&self, name: &str) -> Option<&FunctionSpec> {
        self.library.get(name)
    }

    fn find_permanent_expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EvalError, Evaluator};
    use crate::settings::EvaluationSettings;

    fn evaluate(workspace: &Workspace, text: &str) -> Result<f64, EvalError> {
        let settings = EvaluationSettings::default();
        let expression = Expression::parse_with(text, workspace).unwrap();
        let variables: Vec<Variable> = workspace.variables().cloned().collect();
        expression.evaluate_with(&variables, &Evaluator::new(&settings, workspace))
    }

    #[test]
    fn test_variable_crud() {
        let mut workspace = Workspace::new();
        workspace.create_variable("Rate", Some(0.5)).unwrap();
        workspace.create_variable("n", None).unwrap();
        assert!(workspace.contains_variable("RATE"));
        assert_eq!(workspace.get_variable("rate").unwrap().value(), Some(0.5));
        assert_eq!(workspace.get_variable("n").unwrap().value(), None);

        workspace.update_variable("n", 3.0).unwrap();
        assert_eq!(workspace.get_variable("n").unwrap().value(), Some(3.0));

        let names: Vec<&str> = workspace.variables().map(Variable::name).collect();
        assert_eq!(names, vec!["n", "rate"]);

        assert_eq!(workspace.delete_variable("n").unwrap().value(), Some(3.0));
        assert!(matches!(
            workspace.delete_variable("n"),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            workspace.update_variable("missing", 1.0),
            Err(RegistryError::NotFound(_))
        ));

        workspace.clear_variables();
        assert_eq!(workspace.variables().count(), 0);
    }

    #[test]
    fn test_name_rules() {
        let mut workspace = Workspace::new();
        assert!(matches!(
            workspace.create_variable("2x", Some(1.0)),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            workspace.create_variable("a-b", Some(1.0)),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            workspace.create_variable("pi", Some(1.0)),
            Err(RegistryError::Reserved(_))
        ));
        assert!(matches!(
            workspace.create_expression("SIN", "x"),
            Err(RegistryError::Reserved(_))
        ));

        workspace.create_variable("x", Some(1.0)).unwrap();
        assert!(matches!(
            workspace.create_variable("X", Some(2.0)),
            Err(RegistryError::AlreadyExists(_))
        ));
        assert!(matches!(
            workspace.create_expression("x", "2"),
            Err(RegistryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_expression_calls() {
        let mut workspace = Workspace::new();
        workspace.create_expression("area", "w*h").unwrap();
        workspace.create_expression("volume", "area(w,h)*d").unwrap();
        assert_eq!(workspace.get_expression("volume").unwrap().arity(), 3);

        assert_eq!(evaluate(&workspace, "area(2,3)"), Ok(6.0));
        assert_eq!(evaluate(&workspace, "volume(2,3,4)"), Ok(24.0));
        assert_eq!(evaluate(&workspace, "2area(1+1,3)"), Ok(12.0));
    }

    #[test]
    fn test_expression_call_arity_is_checked() {
        let mut workspace = Workspace::new();
        workspace.create_expression("area", "w*h").unwrap();
        assert!(matches!(
            Expression::parse_with("area(2)", &workspace),
            Err(ParseError::Argument(_))
        ));
        assert!(matches!(
            Expression::parse_with("area", &workspace),
            Err(ParseError::Format(_))
        ));
    }

    #[test]
    fn test_zero_argument_expression() {
        let mut workspace = Workspace::new();
        workspace.create_expression("answer", "6*7").unwrap();
        assert_eq!(evaluate(&workspace, "answer()+1"), Ok(43.0));
    }

    #[test]
    fn test_registry_variables_are_used() {
        let mut workspace = Workspace::new();
        workspace.create_variable("r", Some(2.0)).unwrap();
        assert_eq!(evaluate(&workspace, "r^2"), Ok(4.0));
    }

    #[test]
    fn test_recursion_is_rejected() {
        let mut workspace = Workspace::new();
        assert!(matches!(
            workspace.create_expression("f", "f+1"),
            Err(RegistryError::Recursive(_))
        ));

        workspace.create_expression("f", "x+1").unwrap();
        workspace.create_expression("g", "f(x)*2").unwrap();
        assert!(matches!(
            workspace.update_expression("f", "g(x)"),
            Err(RegistryError::Recursive(_))
        ));
        // the failed update left f untouched
        assert_eq!(evaluate(&workspace, "g(1)"), Ok(4.0));
    }

    #[test]
    fn test_called_expressions_are_protected() {
        let mut workspace = Workspace::new();
        workspace.create_expression("f", "x+1").unwrap();
        workspace.create_expression("g", "f(x)*2").unwrap();

        assert_eq!(
            workspace.delete_expression("f"),
            Err(RegistryError::InUse("f".to_string(), "g".to_string()))
        );
        assert!(matches!(
            workspace.update_expression("f", "x+y"),
            Err(RegistryError::InUse(_, _))
        ));

        workspace.update_expression("f", "x+2").unwrap();
        assert_eq!(evaluate(&workspace, "g(1)"), Ok(6.0));

        workspace.delete_expression("g").unwrap();
        workspace.delete_expression("f").unwrap();
        assert_eq!(workspace.expressions().count(), 0);
    }

    #[test]
    fn test_invalid_definition_is_reported() {
        let mut workspace = Workspace::new();
        assert!(matches!(
            workspace.create_expression("f", "x+"),
            Err(RegistryError::Parse(ParseError::Format(_)))
        ));
        assert!(!workspace.contains_expression("f"));
    }
}
