use crate::ast::EvalError;
use crate::functions::{FunctionLibrary, FunctionTag};
use crate::kernel;
use crate::settings::EvaluationSettings;
use calcexpr_macros::calcexpr_fn;

pub fn register(library: &mut FunctionLibrary) {
    library.register(FunctionTag::Sinh);
    library.register(FunctionTag::Cosh);
    library.register(FunctionTag::Tanh);
    library.register(FunctionTag::Sech);
    library.register(FunctionTag::Csch);
    library.register(FunctionTag::Coth);
    library.register(FunctionTag::Asinh);
    library.register(FunctionTag::Acosh);
    library.register(FunctionTag::Atanh);
}

#[calcexpr_fn]
fn sinh(x: f64) -> Result<f64, EvalError> {
    Ok(x.sinh())
}

#[calcexpr_fn]
fn cosh(x: f64) -> Result<f64, EvalError> {
    Ok(x.cosh())
}

#[calcexpr_fn]
fn tanh(x: f64) -> Result<f64, EvalError> {
    Ok(x.tanh())
}

#[calcexpr_fn]
fn sech(x: f64) -> Result<f64, EvalError> {
    Ok(kernel::sech(x))
}

#[calcexpr_fn]
fn csch(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x == 0.0 {
        return settings.domain_error("csch(0)");
    }
    Ok(kernel::csch(x))
}

#[calcexpr_fn]
fn coth(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x == 0.0 {
        return settings.domain_error("coth(0)");
    }
    Ok(kernel::coth(x))
}

#[calcexpr_fn]
fn asinh(x: f64) -> Result<f64, EvalError> {
    Ok(x.asinh())
}

#[calcexpr_fn]
fn acosh(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x < 1.0 {
        return settings.domain_error(&format!("acosh({})", x));
    }
    Ok(x.acosh())
}

#[calcexpr_fn]
fn atanh(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x.abs() > 1.0 {
        return settings.domain_error(&format!("atanh({})", x));
    }
    Ok(x.atanh())
}
