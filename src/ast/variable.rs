/// A named binding handed to an evaluation.
///
/// Bindings are passed as a flat slice and scanned left to right; when a name
/// appears twice the first entry wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) value: Option<f64>,
}

impl Variable {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_lowercase(),
            value: Some(value),
        }
    }

    /// A variable that exists but holds no value yet.
    pub fn unset(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }
}

/// First binding named `name`, if any.
pub fn find_variable<'a>(variables: &'a [Variable], name: &str) -> Option<&'a Variable> {
    variables.iter().find(|variable| variable.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let variables = vec![
            Variable::new("x", 1.0),
            Variable::new("y", 2.0),
            Variable::new("x", 3.0),
        ];
        assert_eq!(find_variable(&variables, "x").unwrap().value(), Some(1.0));
        assert_eq!(find_variable(&variables, "y").unwrap().value(), Some(2.0));
        assert!(find_variable(&variables, "z").is_none());
    }

    #[test]
    fn test_names_are_lowercased() {
        let mut variable = Variable::unset("Rate");
        assert_eq!(variable.name(), "rate");
        assert_eq!(variable.value(), None);
        variable.set_value(0.5);
        assert_eq!(variable.value(), Some(0.5));
    }
}
