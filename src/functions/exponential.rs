use crate::ast::EvalError;
use crate::functions::{FunctionLibrary, FunctionTag};
use crate::settings::EvaluationSettings;
use calcexpr_macros::calcexpr_fn;

pub fn register(library: &mut FunctionLibrary) {
    library.register(FunctionTag::Exp);
    library.register(FunctionTag::Ln);
    library.register(FunctionTag::Log);
    library.register(FunctionTag::Sqrt);
}

#[calcexpr_fn]
fn exp(x: f64) -> Result<f64, EvalError> {
    Ok(x.exp())
}

#[calcexpr_fn]
fn ln(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x < 0.0 {
        return settings.domain_error(&format!("ln({})", x));
    }
    if x == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(x.ln())
}

/// Logarithm of `x` in `base`, ten when omitted.
#[calcexpr_fn]
fn log(x: f64, base: Option<f64>, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let base = base.unwrap_or(10.0);
    if base < 0.0 || x < 0.0 || (base == 0.0 && x == 0.0) {
        return settings.domain_error(&format!("log({},{})", x, base));
    }
    if base == 0.0 {
        return Ok(1.0);
    }
    if x == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if base == 10.0 {
        return Ok(x.log10());
    }
    Ok(x.log(base))
}

/// `root`-th root of `x`, square root when omitted.
#[calcexpr_fn]
fn sqrt(x: f64, root: Option<f64>, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let root = root.unwrap_or(2.0);
    if root == 0.0 || x < 0.0 {
        return settings.domain_error(&format!("sqrt({},{})", x, root));
    }
    if root == 2.0 {
        return Ok(x.sqrt());
    }
    Ok(x.powf(1.0 / root))
}
