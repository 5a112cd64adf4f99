use crate::ast::Expression;
use crate::functions::{self, FunctionSpec};

/// Answers the name lookups the normalizer, parser and evaluator need.
///
/// A bare [`FunctionLibrary`](crate::functions::FunctionLibrary) knows only
/// the built-ins; a [`Workspace`](crate::workspace::Workspace) adds permanent
/// expressions on top.
pub trait NameResolver: Sync {
    fn find_function(&self, name: &str) -> Option<&FunctionSpec>;

    fn find_permanent_expression(&self, name: &str) -> Option<&Expression>;

    /// Constants and built-in function names cannot be used as identifiers.
    fn is_reserved(&self, name: &str) -> bool {
        functions::constant(name).is_some() || self.find_function(name).is_some()
    }

    /// True for anything that must be followed by an argument list.
    fn is_callable(&self, name: &str) -> bool {
        self.find_function(name).is_some() || self.find_permanent_expression(name).is_some()
    }

    /// Accepted argument count range for a callable name.
    fn arity(&self, name: &str) -> Option<(usize, usize)> {
        if let Some(spec) = self.find_function(name) {
            return Some((spec.min_args, spec.max_args));
        }
        self.find_permanent_expression(name).map(|expression| {
            let arity = expression.arity();
            (arity, arity)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::builtins;

    #[test]
    fn test_builtin_resolution() {
        let resolver = builtins();
        assert!(resolver.is_reserved("pi"));
        assert!(resolver.is_reserved("sin"));
        assert!(!resolver.is_reserved("x"));
        assert!(resolver.is_callable("integral"));
        assert!(!resolver.is_callable("pi"));
        assert_eq!(resolver.arity("log"), Some((1, 2)));
        assert_eq!(resolver.arity("x"), None);
    }
}
