//! Pure numeric helpers shared by the operators and the built-in functions.
//!
//! Nothing in here knows about settings or errors; callers decide what an
//! out-of-domain input means.

use num_bigint::BigUint;
use std::f64::consts::PI;
use std::sync::Mutex;

/// Largest `n` whose factorial is still a finite double.
pub const MAX_FACTORIAL: u32 = 170;

/// Past this point `gamma` overflows a double.
pub const MAX_GAMMA_X: f64 = 170.624_376_956_302_7;

/// Tolerance used when testing whether an angle sits on a pole.
pub const POLE_EPSILON: f64 = 1e-9;

// Lanczos approximation, g = 5, n = 7.
const LANCZOS_G: f64 = 5.0;
const LANCZOS_BASE: f64 = 1.000_000_000_190_015;
const LANCZOS_COEFFICIENTS: [f64; 6] = [
    76.180_091_729_471_46,
    -86.505_320_329_416_77,
    24.014_098_240_830_91,
    -1.231_739_572_450_155,
    0.120_865_097_386_617_9e-2,
    -0.539_523_938_495_3e-5,
];
const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_5;

// Append-only; entry `n` holds `n!` rounded once from the exact product.
struct FactorialTable {
    exact: BigUint,
    values: Vec<f64>,
}

static FACTORIALS: Mutex<Option<FactorialTable>> = Mutex::new(None);

// Decimal parsing rounds to nearest.
fn to_nearest_f64(value: &BigUint) -> f64 {
    value.to_string().parse().unwrap_or(f64::INFINITY)
}

/// `n!` from a memoized table, `+inf` past [`MAX_FACTORIAL`].
///
/// Every entry is the double nearest to the exact factorial.
pub fn factorial(n: u32) -> f64 {
    if n > MAX_FACTORIAL {
        return f64::INFINITY;
    }

    let mut guard = FACTORIALS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let table = guard.get_or_insert_with(|| FactorialTable {
        exact: BigUint::from(1u32),
        values: vec![1.0],
    });
    while table.values.len() <= n as usize {
        table.exact *= table.values.len() as u32;
        let next = to_nearest_f64(&table.exact);
        table.values.push(next);
    }
    table.values[n as usize]
}

/// Natural logarithm of the gamma function for `x > 0`.
pub fn log_gamma(x: f64) -> f64 {
    let shifted = x + LANCZOS_G + 0.5;
    let mut series = LANCZOS_BASE;
    let mut denominator = x;
    for coefficient in LANCZOS_COEFFICIENTS {
        denominator += 1.0;
        series += coefficient / denominator;
    }
    (x + 0.5) * shifted.ln() - shifted + (SQRT_TWO_PI * series / x).ln()
}

/// Gamma function, using the reflection formula below `0.5`.
///
/// Poles (zero and the negative integers) are not detected here; the result
/// there is a huge or non-finite number. Callers that care check for poles
/// first.
pub fn gamma(x: f64) -> f64 {
    if x > MAX_GAMMA_X {
        return f64::INFINITY;
    }
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }
    log_gamma(x).exp()
}

pub fn sech(x: f64) -> f64 {
    1.0 / x.cosh()
}

pub fn csch(x: f64) -> f64 {
    1.0 / x.sinh()
}

pub fn coth(x: f64) -> f64 {
    x.cosh() / x.sinh()
}

pub fn degrees_to_radians(angle: f64) -> f64 {
    angle * PI / 180.0
}

pub fn radians_to_degrees(angle: f64) -> f64 {
    angle * 180.0 / PI
}

/// `n` choose `k` for non-negative integers, multiplicative formula.
///
/// Zero when `k > n`. Each partial product is a binomial coefficient that at
/// least doubles per step, so large `k` overflows to `+inf` within about a
/// thousand iterations.
pub fn binomial(k: f64, n: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    let mut i = 1.0;
    while i <= k {
        result *= (n - k + i) / i;
        if !result.is_finite() {
            return f64::INFINITY;
        }
        i += 1.0;
    }
    result.round()
}

pub fn is_integer(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}

/// True when `x` is within [`POLE_EPSILON`] of an integer multiple of `period`.
pub fn is_multiple_of(x: f64, period: f64) -> bool {
    let quotient = x / period;
    (quotient - quotient.round()).abs() < POLE_EPSILON
}

/// Rounds half away from zero to `digits` fractional digits.
/// Returns `x` unchanged when the scaling overflows.
pub fn round_to(x: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    let scaled = x * factor;
    if !factor.is_finite() || !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            ((actual - expected) / expected).abs() < tolerance,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_factorial_table() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
        assert_eq!(factorial(10), 3_628_800.0);
        assert_eq!(factorial(20), 2_432_902_008_176_640_000.0);
        assert_eq!(factorial(25), 1.551_121_004_333_098_6e25);
        assert_eq!(factorial(100), 9.332_621_544_394_415e157);
        assert_eq!(factorial(170), 7.257_415_615_307_999e306);
        assert_eq!(factorial(171), f64::INFINITY);
    }

    #[test]
    fn test_gamma_matches_factorial() {
        for n in 1..20u32 {
            assert_close(gamma(n as f64 + 1.0), factorial(n), 1e-9);
        }
    }

    #[test]
    fn test_gamma_half_integers() {
        let sqrt_pi = PI.sqrt();
        assert_close(gamma(0.5), sqrt_pi, 1e-9);
        assert_close(gamma(1.5), sqrt_pi / 2.0, 1e-9);
        // reflection branch
        assert_close(gamma(-0.5), -2.0 * sqrt_pi, 1e-9);
    }

    #[test]
    fn test_gamma_overflow() {
        assert_eq!(gamma(171.0), f64::INFINITY);
        assert!(gamma(170.5).is_finite());
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(2.0, 5.0), 10.0);
        assert_eq!(binomial(0.0, 7.0), 1.0);
        assert_eq!(binomial(7.0, 7.0), 1.0);
        assert_eq!(binomial(8.0, 7.0), 0.0);
        assert_eq!(binomial(10.0, 52.0), 15_820_024_220.0);
    }

    #[test]
    fn test_binomial_large_arguments() {
        assert_close(binomial(5.0, 1e20), 8.333_333_333_333_333e97, 1e-12);
        assert_eq!(binomial(1e20, 3e20), f64::INFINITY);
        assert_eq!(binomial(1e20, 1e20), 1.0);
        assert_eq!(binomial(2000.0, 4000.0), f64::INFINITY);
    }

    #[test]
    fn test_hyperbolic_reciprocals() {
        assert_close(sech(1.0), 1.0 / 1f64.cosh(), 1e-15);
        assert_close(csch(1.0), 1.0 / 1f64.sinh(), 1e-15);
        assert_close(coth(2.0), 1.0 / 2f64.tanh(), 1e-12);
    }

    #[test]
    fn test_multiple_of() {
        assert!(is_multiple_of(PI, PI));
        assert!(is_multiple_of(-3.0 * PI, PI));
        assert!(is_multiple_of(degrees_to_radians(180.0), PI));
        assert!(!is_multiple_of(1.0, PI));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.345_678_9, 2), 2.35);
        assert_eq!(round_to(0.1 + 0.2, 6), 0.3);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.5, 400), 1.5);
        assert_eq!(round_to(1e300, 20), 1e300);
    }
}
