//! Solver settings, expressed once for all solvers.
use std::borrow::Cow;

/// The value of a solver option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Boolean option
    Bool(bool),
    /// Integer option
    Int(i64),
    /// Floating point number option
    Float(f64),
    /// String option
    Str(Cow<'static, str>),
}

impl OptionValue {
    /// Gets the boolean option if applicable.
    pub fn as_bool(&self) -> Option<bool> {
        if let &Self::Bool(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Gets the integer option if applicable.
    pub fn as_int(&self) -> Option<i64> {
        if let &Self::Int(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Gets the float option if applicable. Integers are accepted too.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Gets the string option if applicable.
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Str(v) = self {
            Some(v.as_ref())
        } else {
            None
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}
impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}
impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Str(v.into())
    }
}
impl From<&'static str> for OptionValue {
    fn from(v: &'static str) -> Self {
        Self::Str(v.into())
    }
}

/// The options understood by every solver.
///
/// Options left unset are not sent to the solver, which then uses its own
/// default, except `verbose`: solvers stay silent unless asked otherwise.
///
/// ```
/// use good_qp::SolverOptions;
/// let options = SolverOptions::default()
///     .max_iterations(500)
///     .abs_tolerance(1e-9)
///     .with_option("time_limit", 2.5);
/// assert_eq!(options.max_iterations, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolverOptions {
    /// Let the solver print its progress
    pub verbose: bool,
    /// Maximum number of iterations
    pub max_iterations: Option<u32>,
    /// Absolute accuracy
    pub abs_tolerance: Option<f64>,
    /// Relative accuracy
    pub rel_tolerance: Option<f64>,
    /// Tolerance on the feasibility conditions
    pub feas_tolerance: Option<f64>,
    /// Number of iterative refinement steps when solving the KKT system
    pub refinement_steps: Option<u32>,
    /// Solver-specific options, passed as is, in order
    pub overrides: Vec<(String, OptionValue)>,
}

impl SolverOptions {
    /// Sets whether the solver should display its progress
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the maximum number of iterations
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Sets the absolute accuracy
    pub fn abs_tolerance(mut self, tolerance: f64) -> Self {
        self.abs_tolerance = Some(tolerance);
        self
    }

    /// Sets the relative accuracy
    pub fn rel_tolerance(mut self, tolerance: f64) -> Self {
        self.rel_tolerance = Some(tolerance);
        self
    }

    /// Sets the tolerance on feasibility
    pub fn feas_tolerance(mut self, tolerance: f64) -> Self {
        self.feas_tolerance = Some(tolerance);
        self
    }

    /// Sets the number of iterative refinement steps
    pub fn refinement_steps(mut self, steps: u32) -> Self {
        self.refinement_steps = Some(steps);
        self
    }

    /// Sets a solver-specific option, using the solver's own name for it.
    /// It takes precedence over the uniform options above.
    pub fn with_option<K: Into<String>, V: Into<OptionValue>>(mut self, key: K, value: V) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unset() {
        let options = SolverOptions::default();
        assert!(!options.verbose);
        assert_eq!(options.max_iterations, None);
        assert_eq!(options.abs_tolerance, None);
        assert!(options.overrides.is_empty());
    }

    #[test]
    fn option_value_accessors() {
        assert_eq!(OptionValue::from(3_u32).as_int(), Some(3));
        assert_eq!(OptionValue::from(3_u32).as_float(), Some(3.));
        assert_eq!(OptionValue::from(true).as_float(), None);
        assert_eq!(OptionValue::from("qdldl").as_str(), Some("qdldl"));
        assert_eq!(OptionValue::from(String::from("x")).as_bool(), None);
    }
}
