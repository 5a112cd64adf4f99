use crate::ast::EvalError;

/// Unit in which trigonometric arguments are read and inverse results reported.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(&self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => crate::kernel::degrees_to_radians(angle),
            AngleUnit::Radians => angle,
        }
    }

    pub fn from_radians(&self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => crate::kernel::radians_to_degrees(angle),
            AngleUnit::Radians => angle,
        }
    }
}

/// Policy knobs consulted while evaluating a tree.
///
/// Passed by reference into every evaluation instead of living in global
/// state, so two evaluations with different settings can run side by side.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub raise_divide_by_zero: bool,
    pub raise_domain_error: bool,
    pub gamma_for_non_integer_factorial: bool,
    pub angle_unit: AngleUnit,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            raise_divide_by_zero: true,
            raise_domain_error: true,
            gamma_for_non_integer_factorial: true,
            angle_unit: AngleUnit::Degrees,
        }
    }
}

impl EvaluationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the four defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn with_angle_unit(mut self, angle_unit: AngleUnit) -> Self {
        self.angle_unit = angle_unit;
        self
    }

    /// Raises a domain error for `operation`, or yields NaN when raising is off.
    pub fn domain_error(&self, operation: &str) -> Result<f64, EvalError> {
        if self.raise_domain_error {
            Err(EvalError::Domain(operation.to_string()))
        } else {
            Ok(f64::NAN)
        }
    }
}
