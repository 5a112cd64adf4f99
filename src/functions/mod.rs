pub mod exponential;
pub mod hyperbolic;
pub mod other;
pub mod series;
pub mod trigonometry;

use crate::ast::{ASTNode, EvalError, Expression, NameResolver, ParseError};
use crate::settings::EvaluationSettings;
use std::collections::HashMap;
use std::f64::consts::{E, PI, TAU};
use std::sync::OnceLock;

/// Named constants recognised by the parser. These names are reserved.
pub const CONSTANTS: [(&str, f64); 5] = [
    ("pi", PI),
    ("tau", TAU),
    ("pau", 1.5 * PI),
    ("e", E),
    ("phi", 1.618_033_988_749_895),
];

pub fn constant(name: &str) -> Option<f64> {
    named_constant(name).map(|(_, value)| value)
}

/// The constant entry for `name`, with its name interned.
pub fn named_constant(name: &str) -> Option<(&'static str, f64)> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .copied()
}

/// Built-in functions with a fixed (possibly optional) set of numeric arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FunctionTag {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sech,
    Csch,
    Coth,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Ln,
    Log,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Gamma,
    Binomial,
    Rad,
    Deg,
}

impl FunctionTag {
    pub fn name(&self) -> &'static str {
        match self {
            FunctionTag::Sin => "sin",
            FunctionTag::Cos => "cos",
            FunctionTag::Tan => "tan",
            FunctionTag::Sec => "sec",
            FunctionTag::Csc => "csc",
            FunctionTag::Cot => "cot",
            FunctionTag::Asin => "asin",
            FunctionTag::Acos => "acos",
            FunctionTag::Atan => "atan",
            FunctionTag::Sinh => "sinh",
            FunctionTag::Cosh => "cosh",
            FunctionTag::Tanh => "tanh",
            FunctionTag::Sech => "sech",
            FunctionTag::Csch => "csch",
            FunctionTag::Coth => "coth",
            FunctionTag::Asinh => "asinh",
            FunctionTag::Acosh => "acosh",
            FunctionTag::Atanh => "atanh",
            FunctionTag::Exp => "exp",
            FunctionTag::Ln => "ln",
            FunctionTag::Log => "log",
            FunctionTag::Sqrt => "sqrt",
            FunctionTag::Abs => "abs",
            FunctionTag::Floor => "floor",
            FunctionTag::Ceil => "ceil",
            FunctionTag::Round => "round",
            FunctionTag::Gamma => "gamma",
            FunctionTag::Binomial => "binomial",
            FunctionTag::Rad => "rad",
            FunctionTag::Deg => "deg",
        }
    }

    /// Minimum and maximum number of arguments.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            FunctionTag::Sin => trigonometry::SIN_ARITY,
            FunctionTag::Cos => trigonometry::COS_ARITY,
            FunctionTag::Tan => trigonometry::TAN_ARITY,
            FunctionTag::Sec => trigonometry::SEC_ARITY,
            FunctionTag::Csc => trigonometry::CSC_ARITY,
            FunctionTag::Cot => trigonometry::COT_ARITY,
            FunctionTag::Asin => trigonometry::ASIN_ARITY,
            FunctionTag::Acos => trigonometry::ACOS_ARITY,
            FunctionTag::Atan => trigonometry::ATAN_ARITY,
            FunctionTag::Sinh => hyperbolic::SINH_ARITY,
            FunctionTag::Cosh => hyperbolic::COSH_ARITY,
            FunctionTag::Tanh => hyperbolic::TANH_ARITY,
            FunctionTag::Sech => hyperbolic::SECH_ARITY,
            FunctionTag::Csch => hyperbolic::CSCH_ARITY,
            FunctionTag::Coth => hyperbolic::COTH_ARITY,
            FunctionTag::Asinh => hyperbolic::ASINH_ARITY,
            FunctionTag::Acosh => hyperbolic::ACOSH_ARITY,
            FunctionTag::Atanh => hyperbolic::ATANH_ARITY,
            FunctionTag::Exp => exponential::EXP_ARITY,
            FunctionTag::Ln => exponential::LN_ARITY,
            FunctionTag::Log => exponential::LOG_ARITY,
            FunctionTag::Sqrt => exponential::SQRT_ARITY,
            FunctionTag::Abs => other::ABS_ARITY,
            FunctionTag::Floor => other::FLOOR_ARITY,
            FunctionTag::Ceil => other::CEIL_ARITY,
            FunctionTag::Round => other::ROUND_ARITY,
            FunctionTag::Gamma => other::GAMMA_ARITY,
            FunctionTag::Binomial => other::BINOMIAL_ARITY,
            FunctionTag::Rad => other::RAD_ARITY,
            FunctionTag::Deg => other::DEG_ARITY,
        }
    }

    pub fn apply(&self, args: &[f64], settings: &EvaluationSettings) -> Result<f64, EvalError> {
        match self {
            FunctionTag::Sin => trigonometry::sin(args, settings),
            FunctionTag::Cos => trigonometry::cos(args, settings),
            FunctionTag::Tan => trigonometry::tan(args, settings),
            FunctionTag::Sec => trigonometry::sec(args, settings),
            FunctionTag::Csc => trigonometry::csc(args, settings),
            FunctionTag::Cot => trigonometry::cot(args, settings),
            FunctionTag::Asin => trigonometry::asin(args, settings),
            FunctionTag::Acos => trigonometry::acos(args, settings),
            FunctionTag::Atan => trigonometry::atan(args, settings),
            FunctionTag::Sinh => hyperbolic::sinh(args, settings),
            FunctionTag::Cosh => hyperbolic::cosh(args, settings),
            FunctionTag::Tanh => hyperbolic::tanh(args, settings),
            FunctionTag::Sech => hyperbolic::sech(args, settings),
            FunctionTag::Csch => hyperbolic::csch(args, settings),
            FunctionTag::Coth => hyperbolic::coth(args, settings),
            FunctionTag::Asinh => hyperbolic::asinh(args, settings),
            FunctionTag::Acosh => hyperbolic::acosh(args, settings),
            FunctionTag::Atanh => hyperbolic::atanh(args, settings),
            FunctionTag::Exp => exponential::exp(args, settings),
            FunctionTag::Ln => exponential::ln(args, settings),
            FunctionTag::Log => exponential::log(args, settings),
            FunctionTag::Sqrt => exponential::sqrt(args, settings),
            FunctionTag::Abs => other::abs(args, settings),
            FunctionTag::Floor => other::floor(args, settings),
            FunctionTag::Ceil => other::ceil(args, settings),
            FunctionTag::Round => other::round(args, settings),
            FunctionTag::Gamma => other::gamma(args, settings),
            FunctionTag::Binomial => other::binomial(args, settings),
            FunctionTag::Rad => other::rad(args, settings),
            FunctionTag::Deg => other::deg(args, settings),
        }
    }
}

/// Functions that bind a variable over a range: `name(body, var, from, to[, step])`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariadicTag {
    Sum,
    Product,
    Integral,
}

impl VariadicTag {
    pub fn name(&self) -> &'static str {
        match self {
            VariadicTag::Sum => "sum",
            VariadicTag::Product => "product",
            VariadicTag::Integral => "integral",
        }
    }

    pub fn arity(&self) -> (usize, usize) {
        (4, 5)
    }

    pub fn default_step(&self) -> f64 {
        match self {
            VariadicTag::Sum | VariadicTag::Product => 1.0,
            VariadicTag::Integral => 0.1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FunctionKind {
    Fixed(FunctionTag),
    Variadic(VariadicTag),
}

/// A callable entry of the function library.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub kind: FunctionKind,
}

impl FunctionSpec {
    pub fn fixed(tag: FunctionTag) -> Self {
        let (min_args, max_args) = tag.arity();
        Self {
            name: tag.name(),
            min_args,
            max_args,
            kind: FunctionKind::Fixed(tag),
        }
    }

    pub fn variadic(tag: VariadicTag) -> Self {
        let (min_args, max_args) = tag.arity();
        Self {
            name: tag.name(),
            min_args,
            max_args,
            kind: FunctionKind::Variadic(tag),
        }
    }

    /// Builds the call node for already-parsed arguments.
    ///
    /// For a variadic function the second argument names the bound variable
    /// and is moved out of the argument list.
    pub fn build(&self, mut args: Vec<ASTNode>) -> Result<ASTNode, ParseError> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(ParseError::Argument(format!(
                "{} expects {} to {} arguments, but got {}",
                self.name,
                self.min_args,
                self.max_args,
                args.len()
            )));
        }

        match self.kind {
            FunctionKind::Fixed(function) => Ok(ASTNode::Function { function, args }),
            FunctionKind::Variadic(function) => match args.remove(1) {
                ASTNode::Identifier(variable) => Ok(ASTNode::Variadic {
                    function,
                    variable,
                    args,
                }),
                other => Err(ParseError::Argument(format!(
                    "{} expects a variable name as second argument, got '{}'",
                    self.name, other
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionLibrary {
    functions: HashMap<&'static str, FunctionSpec>,
}

impl FunctionLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        register_functions(&mut library);
        library
    }

    pub fn register(&mut self, tag: FunctionTag) {
        self.functions.insert(tag.name(), FunctionSpec::fixed(tag));
    }

    pub fn register_variadic(&mut self, tag: VariadicTag) {
        self.functions.insert(tag.name(), FunctionSpec::variadic(tag));
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl NameResolver for FunctionLibrary {
    fn find_function(&self, name: &str) -> Option<&FunctionSpec> {
        self.get(name)
    }

    fn find_permanent_expression(&self, _name: &str) -> Option<&Expression> {
        None
    }
}

/// The shared built-in library.
pub fn builtins() -> &'static FunctionLibrary {
    static BUILTINS: OnceLock<FunctionLibrary> = OnceLock::new();
    BUILTINS.get_or_init(FunctionLibrary::with_builtins)
}

pub fn register_functions(library: &mut FunctionLibrary) {
    trigonometry::register(library);
    hyperbolic::register(library);
    exponential::register(library);
    other::register(library);
    series::register(library);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let library = builtins();
        assert_eq!(library.len(), 33);
        for name in ["sin", "log", "binomial", "sum", "product", "integral"] {
            assert!(library.get(name).is_some(), "{} is missing", name);
        }
        assert!(library.get("foo").is_none());
    }

    #[test]
    fn test_arity() {
        assert_eq!(FunctionTag::Sin.arity(), (1, 1));
        assert_eq!(FunctionTag::Log.arity(), (1, 2));
        assert_eq!(FunctionTag::Binomial.arity(), (2, 2));
        assert_eq!(VariadicTag::Sum.arity(), (4, 5));
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("pi"), Some(PI));
        assert_eq!(constant("tau"), Some(2.0 * PI));
        assert_eq!(constant("pau"), Some(1.5 * PI));
        assert_eq!(constant("x"), None);
    }

    #[test]
    fn test_build_variadic_takes_variable() {
        let spec = builtins().get("sum").unwrap();
        let node = spec
            .build(vec![
                ASTNode::Identifier("k".to_string()),
                ASTNode::Identifier("k".to_string()),
                ASTNode::Number(1.0),
                ASTNode::Number(10.0),
            ])
            .unwrap();
        assert_eq!(
            node,
            ASTNode::Variadic {
                function: VariadicTag::Sum,
                variable: "k".to_string(),
                args: vec![
                    ASTNode::Identifier("k".to_string()),
                    ASTNode::Number(1.0),
                    ASTNode::Number(10.0),
                ],
            }
        );

        let error = spec
            .build(vec![
                ASTNode::Number(1.0),
                ASTNode::Number(2.0),
                ASTNode::Number(1.0),
                ASTNode::Number(10.0),
            ])
            .unwrap_err();
        assert!(matches!(error, ParseError::Argument(_)));
    }

    #[test]
    fn test_build_checks_arity() {
        let spec = builtins().get("sin").unwrap();
        assert!(matches!(spec.build(vec![]), Err(ParseError::Argument(_))));
    }
}
