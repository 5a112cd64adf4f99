//! Range functions that bind a variable: `sum`, `product` and `integral`.
//!
//! The body is evaluated through a callback so this module stays unaware of
//! trees and scopes.

use crate::ast::EvalError;
use crate::functions::{FunctionLibrary, VariadicTag};
use crate::kernel::round_to;

/// Steps smaller than this are rejected.
pub const MIN_STEP: f64 = 1e-6;

// The running position is rounded to this many decimals to keep float drift
// from skipping the upper limit.
const POSITION_DIGITS: i32 = 6;

pub fn register(library: &mut FunctionLibrary) {
    library.register_variadic(VariadicTag::Sum);
    library.register_variadic(VariadicTag::Product);
    library.register_variadic(VariadicTag::Integral);
}

fn advance(position: f64, step: f64) -> Result<f64, EvalError> {
    let next = round_to(position + step, POSITION_DIGITS);
    if next <= position {
        return Err(EvalError::InvalidOperation(format!(
            "step {} does not advance past {}",
            step, position
        )));
    }
    Ok(next)
}

/// Runs `body` over `from..=to` in increments of `step` and combines the results.
pub fn accumulate<F>(
    function: VariadicTag,
    from: f64,
    to: f64,
    step: f64,
    mut body: F,
) -> Result<f64, EvalError>
where
    F: FnMut(f64) -> Result<f64, EvalError>,
{
    if !(step >= MIN_STEP) {
        return Err(EvalError::InvalidOperation(format!(
            "{} step must be at least {}, got {}",
            function.name(),
            MIN_STEP,
            step
        )));
    }
    if !from.is_finite() || !to.is_finite() {
        return Err(EvalError::InvalidOperation(format!(
            "{} needs finite limits, got {} and {}",
            function.name(),
            from,
            to
        )));
    }

    match function {
        VariadicTag::Sum => {
            let mut total = 0.0;
            let mut position = from;
            while position <= to {
                total += body(position)?;
                position = advance(position, step)?;
            }
            Ok(total)
        }
        VariadicTag::Product => {
            let mut total = 1.0;
            let mut position = from;
            while position <= to {
                total *= body(position)?;
                position = advance(position, step)?;
            }
            Ok(total)
        }
        VariadicTag::Integral => integrate(from, to, step, body),
    }
}

// Trapezoid rule; the last step is clamped to `to`.
fn integrate<F>(from: f64, to: f64, step: f64, mut body: F) -> Result<f64, EvalError>
where
    F: FnMut(f64) -> Result<f64, EvalError>,
{
    if from > to {
        return integrate(to, from, step, body).map(|area| -area);
    }

    let mut area = 0.0;
    let mut position = from;
    let mut previous = body(from)?;
    while position < to {
        let next = advance(position, step)?.min(to);
        let current = body(next)?;
        area += (previous + current) / 2.0 * (next - position);
        previous = current;
        position = next;
    }
    Ok(area)
}
