use crate::ast::EvalError;
use crate::functions::{FunctionLibrary, FunctionTag};
use crate::kernel;
use crate::settings::EvaluationSettings;
use calcexpr_macros::calcexpr_fn;

pub fn register(library: &mut FunctionLibrary) {
    library.register(FunctionTag::Abs);
    library.register(FunctionTag::Floor);
    library.register(FunctionTag::Ceil);
    library.register(FunctionTag::Round);
    library.register(FunctionTag::Gamma);
    library.register(FunctionTag::Binomial);
    library.register(FunctionTag::Rad);
    library.register(FunctionTag::Deg);
}

/// The postfix `!` operator.
///
/// Integers come from the memoized table, other values go through gamma when
/// the settings allow it. Negative integers are poles whatever the gamma flag
/// says.
pub fn factorial(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x.is_nan() {
        return Ok(f64::NAN);
    }
    if kernel::is_integer(x) {
        if x < 0.0 {
            return settings.domain_error(&format!("({})!", x));
        }
        if x > kernel::MAX_FACTORIAL as f64 {
            return Ok(f64::INFINITY);
        }
        return Ok(kernel::factorial(x as u32));
    }
    if x == f64::INFINITY {
        return Ok(f64::INFINITY);
    }
    if settings.gamma_for_non_integer_factorial {
        return Ok(kernel::gamma(x + 1.0));
    }
    settings.domain_error(&format!("({})!", x))
}

#[calcexpr_fn]
fn abs(x: f64) -> Result<f64, EvalError> {
    Ok(x.abs())
}

#[calcexpr_fn]
fn floor(x: f64) -> Result<f64, EvalError> {
    Ok(x.floor())
}

#[calcexpr_fn]
fn ceil(x: f64) -> Result<f64, EvalError> {
    Ok(x.ceil())
}

/// Rounds half away from zero to `digits` decimals.
#[calcexpr_fn]
fn round(x: f64, digits: Option<f64>, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    let digits = digits.unwrap_or(0.0);
    if digits < 0.0 || !kernel::is_integer(digits) {
        return settings.domain_error(&format!("round({},{})", x, digits));
    }
    Ok(kernel::round_to(x, digits as i32))
}

#[calcexpr_fn]
fn gamma(x: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if x <= 0.0 && kernel::is_integer(x) {
        return settings.domain_error(&format!("gamma({})", x));
    }
    Ok(kernel::gamma(x))
}

/// Number of ways to choose `k` items out of `n`.
#[calcexpr_fn]
fn binomial(k: f64, n: f64, settings: &EvaluationSettings) -> Result<f64, EvalError> {
    if k < 0.0 || n < 0.0 || !kernel::is_integer(k) || !kernel::is_integer(n) {
        return settings.domain_error(&format!("binomial({},{})", k, n));
    }
    Ok(kernel::binomial(k, n))
}

#[calcexpr_fn]
fn rad(x: f64) -> Result<f64, EvalError> {
    Ok(kernel::degrees_to_radians(x))
}

#[calcexpr_fn]
fn deg(x: f64) -> Result<f64, EvalError> {
    Ok(kernel::radians_to_degrees(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        let mut settings = EvaluationSettings::default();
        assert_eq!(factorial(0.0, &settings).unwrap(), 1.0);
        assert_eq!(factorial(5.0, &settings).unwrap(), 120.0);
        assert_eq!(factorial(171.0, &settings).unwrap(), f64::INFINITY);
        assert!(factorial(f64::NAN, &settings).unwrap().is_nan());
        assert!((factorial(0.5, &settings).unwrap() - 0.886_226_925_452_758).abs() < 1e-9);

        settings.gamma_for_non_integer_factorial = false;
        assert!(matches!(factorial(0.5, &settings), Err(EvalError::Domain(_))));
        settings.raise_domain_error = false;
        assert!(factorial(0.5, &settings).unwrap().is_nan());
    }

    #[test]
    fn test_negative_integer_factorial_is_a_pole() {
        let mut settings = EvaluationSettings::default();
        assert_eq!(
            factorial(-1.0, &settings),
            Err(EvalError::Domain("(-1)!".to_string()))
        );
        settings.gamma_for_non_integer_factorial = false;
        assert!(matches!(factorial(-2.0, &settings), Err(EvalError::Domain(_))));

        settings.raise_domain_error = false;
        assert!(factorial(-1.0, &settings).unwrap().is_nan());
        settings.gamma_for_non_integer_factorial = true;
        assert!(factorial(-2.0, &settings).unwrap().is_nan());
    }

    #[test]
    fn test_round() {
        let settings = EvaluationSettings::default();
        assert_eq!(round(&[2.5], &settings).unwrap(), 3.0);
        assert_eq!(round(&[3.14159, 2.0], &settings).unwrap(), 3.14);
        assert!(matches!(round(&[1.0, -1.0], &settings), Err(EvalError::Domain(_))));
        assert!(matches!(round(&[1.0, 1.5], &settings), Err(EvalError::Domain(_))));
        assert_eq!(round(&[1.5, 400.0], &settings).unwrap(), 1.5);
    }

    #[test]
    fn test_gamma_poles() {
        let settings = EvaluationSettings::default();
        assert!((gamma(&[5.0], &settings).unwrap() - 24.0).abs() < 1e-9);
        assert!(matches!(gamma(&[0.0], &settings), Err(EvalError::Domain(_))));
        assert!(matches!(gamma(&[-3.0], &settings), Err(EvalError::Domain(_))));
    }

    #[test]
    fn test_binomial() {
        let settings = EvaluationSettings::default();
        assert_eq!(binomial(&[2.0, 5.0], &settings).unwrap(), 10.0);
        assert_eq!(binomial(&[6.0, 5.0], &settings).unwrap(), 0.0);
        assert_eq!(binomial(&[1e20, 3e20], &settings).unwrap(), f64::INFINITY);
        assert!(matches!(
            binomial(&[1.5, 5.0], &settings),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn test_angle_conversion() {
        let settings = EvaluationSettings::default();
        assert!((rad(&[180.0], &settings).unwrap() - std::f64::consts::PI).abs() < 1e-12);
        assert!((deg(&[std::f64::consts::PI], &settings).unwrap() - 180.0).abs() < 1e-12);
    }
}
