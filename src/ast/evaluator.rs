use crate::ast::{find_variable, ASTNode, EvalError, NameResolver, Variable};
use crate::functions::{self, other, series};
use crate::settings::EvaluationSettings;
use log::trace;

// Variable lookup chain: bound variables of enclosing sums, products and
// integrals first, innermost wins, then the caller's flat list.
enum Scope<'s> {
    Root(&'s [Variable]),
    Bound {
        name: &'s str,
        value: f64,
        parent: &'s Scope<'s>,
    },
}

impl Scope<'_> {
    fn lookup(&self, name: &str) -> Result<f64, EvalError> {
        match self {
            Scope::Root(variables) => find_variable(variables, name)
                .and_then(Variable::value)
                .ok_or_else(|| EvalError::NotDefinedVariable(name.to_string())),
            Scope::Bound {
                name: bound,
                value,
                parent,
            } => {
                if *bound == name {
                    Ok(*value)
                } else {
                    parent.lookup(name)
                }
            }
        }
    }
}

/// Walks a tree and computes its value.
///
/// Settings are borrowed for the whole walk, so concurrent evaluations can use
/// different settings. The resolver is only consulted for calls into
/// permanent expressions.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    settings: &'a EvaluationSettings,
    resolver: &'a dyn NameResolver,
}

impl<'a> Evaluator<'a> {
    pub fn new(settings: &'a EvaluationSettings, resolver: &'a dyn NameResolver) -> Self {
        Self { settings, resolver }
    }

    /// An evaluator that only knows the built-in functions.
    pub fn with_builtins(settings: &'a EvaluationSettings) -> Self {
        Self::new(settings, functions::builtins())
    }

    pub fn settings(&self) -> &EvaluationSettings {
        self.settings
    }

    /// Evaluates `ast` with `variables` bound, first match wins.
    pub fn evaluate(&self, ast: &ASTNode, variables: &[Variable]) -> Result<f64, EvalError> {
        self.evaluate_in(ast, &Scope::Root(variables))
    }

    fn evaluate_in(&self, ast: &ASTNode, scope: &Scope<'_>) -> Result<f64, EvalError> {
        match ast {
            ASTNode::Number(n) => Ok(*n),

            ASTNode::Constant { value, .. } => Ok(*value),

            ASTNode::Identifier(name) => scope.lookup(name),

            ASTNode::Negate(inner) => Ok(-self.evaluate_in(inner, scope)?),

            ASTNode::Factorial(inner) => {
                let value = self.evaluate_in(inner, scope)?;
                other::factorial(value, self.settings)
            }

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_in(left, scope)?;
                let right = self.evaluate_in(right, scope)?;
                operator.apply(left, right, self.settings)
            }

            ASTNode::Function { function, args } => {
                let values = self.evaluate_all(args, scope)?;
                function.apply(&values, self.settings)
            }

            ASTNode::Variadic {
                function,
                variable,
                args,
            } => {
                let (body, limits) = args.split_first().ok_or_else(|| {
                    EvalError::InvalidOperation(format!("{} has no body", function.name()))
                })?;
                let limits = self.evaluate_all(limits, scope)?;
                let (from, to, step) = match limits.as_slice() {
                    [from, to] => (*from, *to, function.default_step()),
                    [from, to, step] => (*from, *to, *step),
                    _ => {
                        return Err(EvalError::InvalidOperation(format!(
                            "{} expects a lower bound, an upper bound and an optional step",
                            function.name()
                        )))
                    }
                };
                trace!(
                    "Evaluating {} over {} from {} to {} by {}",
                    function.name(),
                    variable,
                    from,
                    to,
                    step
                );

                series::accumulate(*function, from, to, step, |position| {
                    let bound = Scope::Bound {
                        name: variable,
                        value: position,
                        parent: scope,
                    };
                    self.evaluate_in(body, &bound)
                })
            }

            ASTNode::ExpressionCall { name, args } => {
                let target = self
                    .resolver
                    .find_permanent_expression(name)
                    .ok_or_else(|| EvalError::UnknownExpression(name.clone()))?;
                let values = self.evaluate_all(args, scope)?;
                let parameters = target.free_variables()?;
                if parameters.len() != values.len() {
                    return Err(EvalError::InvalidOperation(format!(
                        "{} expects {} arguments, but got {}",
                        name,
                        parameters.len(),
                        values.len()
                    )));
                }

                let bindings: Vec<Variable> = parameters
                    .iter()
                    .zip(values)
                    .map(|(parameter, value)| Variable::new(parameter, value))
                    .collect();
                target.evaluate_with(&bindings, self)
            }
        }
    }

    fn evaluate_all(&self, args: &[ASTNode], scope: &Scope<'_>) -> Result<Vec<f64>, EvalError> {
        args.iter()
            .map(|arg| self.evaluate_in(arg, scope))
            .collect()
    }
}
