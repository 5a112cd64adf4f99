use std::fmt;

mod error;
mod evaluator;
mod expression;
mod normalizer;
mod parser;
mod resolver;
mod scoping;
mod variable;

pub use error::*;
pub use evaluator::Evaluator;
pub use expression::Expression;
pub use normalizer::Normalizer;
pub use parser::ExpressionParser as Parser;
pub(crate) use parser::is_identifier;
pub use resolver::NameResolver;
pub use variable::*;

use crate::functions::{FunctionTag, VariadicTag};
use crate::settings::EvaluationSettings;

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(f64),
    /// Named constant, kept by name so it renders the way it was written.
    Constant {
        name: &'static str,
        value: f64,
    },
    Identifier(String),
    Negate(Box<ASTNode>),
    Factorial(Box<ASTNode>),
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    /// Built-in numeric function with a fixed arity range.
    Function {
        function: FunctionTag,
        args: Vec<ASTNode>,
    },
    /// Sum, product or integral over a bound variable. `args` holds the body
    /// followed by the lower bound, the upper bound and the optional step.
    Variadic {
        function: VariadicTag,
        variable: String,
        args: Vec<ASTNode>,
    },
    /// Call into a permanent expression, resolved by name when evaluated.
    ExpressionCall {
        name: String,
        args: Vec<ASTNode>,
    },
}

impl ASTNode {
    pub fn binary(left: ASTNode, operator: Operator, right: ASTNode) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Free variable names in first-encountered order, without duplicates.
    /// Variables bound by a sum, product or integral are not free inside its body.
    pub fn free_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut Vec::new(), &mut names);
        names
    }

    fn collect_identifiers(&self, bound: &mut Vec<String>, names: &mut Vec<String>) {
        match self {
            ASTNode::Number(_) | ASTNode::Constant { .. } => {}
            ASTNode::Identifier(name) => {
                if !bound.contains(name) && !names.contains(name) {
                    names.push(name.clone());
                }
            }
            ASTNode::Negate(inner) | ASTNode::Factorial(inner) => {
                inner.collect_identifiers(bound, names)
            }
            ASTNode::BinaryOperation { left, right, .. } => {
                left.collect_identifiers(bound, names);
                right.collect_identifiers(bound, names);
            }
            ASTNode::Function { args, .. } | ASTNode::ExpressionCall { args, .. } => {
                for arg in args {
                    arg.collect_identifiers(bound, names);
                }
            }
            ASTNode::Variadic { variable, args, .. } => {
                if let Some((body, limits)) = args.split_first() {
                    bound.push(variable.clone());
                    body.collect_identifiers(bound, names);
                    bound.pop();
                    for limit in limits {
                        limit.collect_identifiers(bound, names);
                    }
                }
            }
        }
    }

    /// Names of the permanent expressions this tree calls, without duplicates.
    pub fn called_expressions(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_calls(&mut names);
        names
    }

    fn collect_calls(&self, names: &mut Vec<String>) {
        match self {
            ASTNode::Number(_) | ASTNode::Constant { .. } | ASTNode::Identifier(_) => {}
            ASTNode::Negate(inner) | ASTNode::Factorial(inner) => inner.collect_calls(names),
            ASTNode::BinaryOperation { left, right, .. } => {
                left.collect_calls(names);
                right.collect_calls(names);
            }
            ASTNode::Function { args, .. } | ASTNode::Variadic { args, .. } => {
                for arg in args {
                    arg.collect_calls(names);
                }
            }
            ASTNode::ExpressionCall { name, args } => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
                for arg in args {
                    arg.collect_calls(names);
                }
            }
        }
    }

    // Binding strength used when rendering; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            ASTNode::Number(value) if value.is_sign_negative() => 3,
            ASTNode::Negate(_) => 3,
            ASTNode::BinaryOperation { operator, .. } => match operator {
                Operator::Add | Operator::Subtract => 1,
                Operator::Multiply | Operator::Divide => 2,
                Operator::Power => 4,
            },
            ASTNode::Factorial(_) => 5,
            _ => 6,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, node: &ASTNode, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, name: &str, args: &[ASTNode]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(value) => write!(f, "{}", value),
            ASTNode::Constant { name, .. } => write!(f, "{}", name),
            ASTNode::Identifier(name) => write!(f, "{}", name),
            ASTNode::Negate(inner) => {
                write!(f, "-")?;
                write_operand(f, inner, inner.precedence() <= 3)
            }
            ASTNode::Factorial(inner) => {
                write_operand(f, inner, inner.precedence() <= 4)?;
                write!(f, "!")
            }
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => match operator {
                Operator::Add => {
                    write!(f, "{}", left)?;
                    // a + (-b) renders as a - b, which parses back to the same tree
                    match right.as_ref() {
                        ASTNode::Negate(inner) => {
                            write!(f, "-")?;
                            write_operand(f, inner, inner.precedence() <= 3)
                        }
                        ASTNode::Number(value) if value.is_sign_negative() => {
                            write!(f, "-{}", -value)
                        }
                        _ => {
                            write!(f, "+")?;
                            write_operand(f, right, right.precedence() <= 1)
                        }
                    }
                }
                Operator::Subtract => {
                    write!(f, "{}-", left)?;
                    write_operand(f, right, right.precedence() <= 3)
                }
                Operator::Multiply => {
                    write_operand(f, left, left.precedence() < 2)?;
                    write!(f, "*")?;
                    write_operand(f, right, right.precedence() <= 3)
                }
                Operator::Divide => {
                    write_operand(f, left, left.precedence() < 2)?;
                    write!(f, "/")?;
                    write_operand(f, right, right.precedence() <= 3)
                }
                Operator::Power => {
                    write_operand(f, left, left.precedence() <= 4)?;
                    write!(f, "^")?;
                    write_operand(f, right, right.precedence() <= 5)
                }
            },
            ASTNode::Function { function, args } => write_arguments(f, function.name(), args),
            ASTNode::Variadic {
                function,
                variable,
                args,
            } => {
                write!(f, "{}(", function.name())?;
                for (index, arg) in args.iter().enumerate() {
                    match index {
                        0 => write!(f, "{},{}", arg, variable)?,
                        _ => write!(f, ",{}", arg)?,
                    }
                }
                write!(f, ")")
            }
            ASTNode::ExpressionCall { name, args } => write_arguments(f, name, args),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Power => '^',
        }
    }

    pub fn apply(
        &self,
        left: f64,
        right: f64,
        settings: &EvaluationSettings,
    ) -> Result<f64, EvalError> {
        match self {
            Operator::Add => Ok(left + right),
            Operator::Subtract => Ok(left - right),
            Operator::Multiply => Ok(left * right),
            Operator::Divide => {
                if right == 0.0 {
                    if settings.raise_divide_by_zero {
                        return Err(EvalError::DivideByZero);
                    }
                    if left == 0.0 {
                        return settings.domain_error("0/0");
                    }
                }
                Ok(left / right)
            }
            Operator::Power => {
                if left == 0.0 && right == 0.0 {
                    return settings.domain_error("0^0");
                }
                Ok(left.powf(right))
            }
        }
    }
}

impl TryFrom<char> for Operator {
    type Error = ParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Subtract),
            '*' => Ok(Operator::Multiply),
            '/' => Ok(Operator::Divide),
            '^' => Ok(Operator::Power),
            _ => Err(ParseError::NotSupported(format!("Unknown operator: {}", value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> ASTNode {
        ASTNode::Number(value)
    }

    fn identifier(name: &str) -> ASTNode {
        ASTNode::Identifier(name.to_string())
    }

    #[test]
    fn test_divide_policy() {
        let mut settings = EvaluationSettings::default();
        assert_eq!(
            Operator::Divide.apply(3.0, 0.0, &settings),
            Err(EvalError::DivideByZero)
        );
        assert_eq!(
            Operator::Divide.apply(0.0, 0.0, &settings),
            Err(EvalError::DivideByZero)
        );

        settings.raise_divide_by_zero = false;
        assert_eq!(
            Operator::Divide.apply(0.0, 0.0, &settings),
            Err(EvalError::Domain("0/0".to_string()))
        );
        assert_eq!(
            Operator::Divide.apply(3.0, 0.0, &settings),
            Ok(f64::INFINITY)
        );
        assert_eq!(
            Operator::Divide.apply(-3.0, 0.0, &settings),
            Ok(f64::NEG_INFINITY)
        );
        assert_eq!(
            Operator::Divide.apply(3.0, -0.0, &settings),
            Ok(f64::NEG_INFINITY)
        );

        settings.raise_domain_error = false;
        assert!(Operator::Divide
            .apply(0.0, 0.0, &settings)
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_power_policy() {
        let mut settings = EvaluationSettings::default();
        assert_eq!(Operator::Power.apply(2.0, 10.0, &settings), Ok(1024.0));
        assert_eq!(Operator::Power.apply(0.0, 3.0, &settings), Ok(0.0));
        assert_eq!(
            Operator::Power.apply(0.0, 0.0, &settings),
            Err(EvalError::Domain("0^0".to_string()))
        );
        settings.raise_domain_error = false;
        assert!(Operator::Power.apply(0.0, 0.0, &settings).unwrap().is_nan());
    }

    #[test]
    fn test_operator_from_char() {
        assert_eq!(Operator::try_from('^'), Ok(Operator::Power));
        assert!(Operator::try_from('%').is_err());
        assert_eq!(Operator::Multiply.symbol(), '*');
    }

    #[test]
    fn test_free_variables_in_order() {
        // y * (x + y) + sum(i * x, i, 1, n)
        let ast = ASTNode::binary(
            ASTNode::binary(
                identifier("y"),
                Operator::Multiply,
                ASTNode::binary(identifier("x"), Operator::Add, identifier("y")),
            ),
            Operator::Add,
            ASTNode::Variadic {
                function: VariadicTag::Sum,
                variable: "i".to_string(),
                args: vec![
                    ASTNode::binary(identifier("i"), Operator::Multiply, identifier("x")),
                    number(1.0),
                    identifier("n"),
                ],
            },
        );
        assert_eq!(ast.free_variables(), vec!["y", "x", "n"]);
    }

    #[test]
    fn test_render_minimal_parentheses() {
        let ast = ASTNode::binary(
            ASTNode::binary(number(1.0), Operator::Add, number(2.0)),
            Operator::Divide,
            ASTNode::Negate(Box::new(identifier("x"))),
        );
        assert_eq!(ast.to_string(), "(1+2)/(-x)");

        let ast = ASTNode::binary(number(2.0), Operator::Add, number(-3.0));
        assert_eq!(ast.to_string(), "2-3");

        let ast = ASTNode::binary(
            ASTNode::binary(number(2.0), Operator::Power, number(2.0)),
            Operator::Power,
            number(3.0),
        );
        assert_eq!(ast.to_string(), "(2^2)^3");

        let ast = ASTNode::Negate(Box::new(ASTNode::binary(
            identifier("a"),
            Operator::Multiply,
            identifier("b"),
        )));
        assert_eq!(ast.to_string(), "-(a*b)");

        let ast = ASTNode::Factorial(Box::new(ASTNode::binary(
            identifier("n"),
            Operator::Add,
            number(1.0),
        )));
        assert_eq!(ast.to_string(), "(n+1)!");
    }

    #[test]
    fn test_render_functions() {
        let ast = ASTNode::Function {
            function: FunctionTag::Log,
            args: vec![number(8.0), number(2.0)],
        };
        assert_eq!(ast.to_string(), "log(8,2)");

        let ast = ASTNode::Variadic {
            function: VariadicTag::Sum,
            variable: "k".to_string(),
            args: vec![identifier("k"), number(1.0), number(10.0)],
        };
        assert_eq!(ast.to_string(), "sum(k,k,1,10)");

        let ast = ASTNode::ExpressionCall {
            name: "area".to_string(),
            args: vec![number(2.0), number(3.0)],
        };
        assert_eq!(ast.to_string(), "area(2,3)");
    }
}
