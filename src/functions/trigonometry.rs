use crate::ast::EvalError;
use crate::functions::{FunctionLibrary, FunctionTag};
use crate::kernel::is_multiple_of;
use crate::settings::EvaluationSettings;
use calcexpr_macros::calcexpr_fn;
use std::f64::consts::{FRAC_PI_2, PI};

pub fn register(library: &mut FunctionLibrary) {
    library.register(FunctionTag::Sin);
    library.register(FunctionTag::Cos);
    library.register(FunctionTag::Tan);
    library.register(FunctionTag::Sec);
    library.register(FunctionTag::Csc);
    library.register(FunctionTag::Cot);
    library.register(FunctionTag::Asin);
    library.register(FunctionTag::Acos);
    library.register(FunctionTag::Atan);
}

// tan and sec are undefined at odd multiples of a right angle
fn on_cosine_pole(radians: f64) -> bool {
    is_multiple_of(radians - FRAC_PI_2, PI)
}

fn on_sine_pole(radians: f64) -> bool {
    is_multiple_of(radians, PI)
}

#[calcexpr_fn]
fn sin(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    Ok(settings.angle_unit.to_radians(x).sin())
}

#[calcexpr_fn]
fn cos(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    Ok(settings.angle_unit.to_radians(x).cos())
}

#[calcexpr_fn]
fn tan(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let radians = settings.angle_unit.to_radians(x);
    if on_cosine_pole(radians) {
        return settings.domain_error(&format!("tan({})", x));
    }
    Ok(radians.tan())
}

#[calcexpr_fn]
fn sec(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let radians = settings.angle_unit.to_radians(x);
    if on_cosine_pole(radians) {
        return settings.domain_error(&format!("sec({})", x));
    }
    Ok(1.0 / radians.cos())
}

#[calcexpr_fn]
fn csc(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let radians = settings.angle_unit.to_radians(x);
    if on_sine_pole(radians) {
        return settings.domain_error(&format!("csc({})", x));
    }
    Ok(1.0 / radians.sin())
}

#[calcexpr_fn]
fn cot(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let radians = settings.angle_unit.to_radians(x);
    if on_sine_pole(radians) {
        return settings.domain_error(&format!("cot({})", x));
    }
    Ok(radians.cos() / radians.sin())
}

#[calcexpr_fn]
fn asin(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if !(-1.0..=1.0).contains(&x) {
        return settings.domain_error(&format!("asin({})", x));
    }
    Ok(settings.angle_unit.from_radians(x.asin()))
}

#[calcexpr_fn]
fn acos(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if !(-1.0..=1.0).contains(&x) {
        return settings.domain_error(&format!("acos({})", x));
    }
    Ok(settings.angle_unit.from_radians(x.acos()))
}

#[calcexpr_fn]
fn atan(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    Ok(settings.angle_unit.from_radians(x.atan()))
}
