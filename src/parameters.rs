//! Translation of [SolverOptions] into the option names each solver understands.
//!
//! Every solver carries a static table of [OptionMapping]s. For each uniform
//! option the table says how the solver calls it, and what to do when the
//! caller left it unset: either say nothing and let the solver use its own
//! default ([Unset::Omit]), or send the uniform default
//! ([Unset::UniformDefault]). The latter is used for `verbose`, so that no
//! solver prints anything unless asked to.
use std::collections::BTreeMap;
use std::convert::TryFrom;

use tracing::warn;

use crate::error::Error;
use crate::options::{OptionValue, SolverOptions};

/// Options ready to be handed to a solver, keyed by the solver's own option names.
/// The map is ordered, so the same options always produce the same kwargs.
pub type BackendKwargs = BTreeMap<String, OptionValue>;

/// An option of [SolverOptions]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformOption {
    /// [SolverOptions::verbose]
    Verbose,
    /// [SolverOptions::max_iterations]
    MaxIterations,
    /// [SolverOptions::abs_tolerance]
    AbsTolerance,
    /// [SolverOptions::rel_tolerance]
    RelTolerance,
    /// [SolverOptions::feas_tolerance]
    FeasTolerance,
    /// [SolverOptions::refinement_steps]
    RefinementSteps,
}

impl UniformOption {
    /// The value the caller set, if any
    pub fn value(self, options: &SolverOptions) -> Option<OptionValue> {
        match self {
            UniformOption::Verbose => Some(options.verbose).filter(|&v| v).map(OptionValue::from),
            UniformOption::MaxIterations => options.max_iterations.map(OptionValue::from),
            UniformOption::AbsTolerance => options.abs_tolerance.map(OptionValue::from),
            UniformOption::RelTolerance => options.rel_tolerance.map(OptionValue::from),
            UniformOption::FeasTolerance => options.feas_tolerance.map(OptionValue::from),
            UniformOption::RefinementSteps => options.refinement_steps.map(OptionValue::from),
        }
    }

    /// The value used when the option is unset and the solver must not
    /// fall back to its own default
    pub fn uniform_default(self) -> Option<OptionValue> {
        match self {
            UniformOption::Verbose => Some(OptionValue::Bool(false)),
            _ => None,
        }
    }
}

/// What to send to a solver for an option the caller did not set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unset {
    /// Send nothing, the solver uses its own default
    Omit,
    /// Send [UniformOption::uniform_default]
    UniformDefault,
}

/// How a solver expresses one uniform option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMapping {
    /// The uniform option
    pub option: UniformOption,
    /// The solver's name for it, `None` if the solver has no such setting
    pub name: Option<&'static str>,
    /// What to do when the option is unset
    pub when_unset: Unset,
}

impl OptionMapping {
    /// A mapping that omits the option when it is unset
    pub const fn omit(option: UniformOption, name: &'static str) -> Self {
        OptionMapping {
            option,
            name: Some(name),
            when_unset: Unset::Omit,
        }
    }

    /// A mapping that sends the uniform default when the option is unset
    pub const fn uniform(option: UniformOption, name: &'static str) -> Self {
        OptionMapping {
            option,
            name: Some(name),
            when_unset: Unset::UniformDefault,
        }
    }

    /// An option the solver cannot express
    pub const fn unsupported(option: UniformOption) -> Self {
        OptionMapping {
            option,
            name: None,
            when_unset: Unset::Omit,
        }
    }
}

/// Build the options of `solver` from the uniform ones, using its mapping `table`.
///
/// Options the solver cannot express are dropped with a warning.
/// [SolverOptions::overrides] are added last, and replace table-driven
/// options with the same name.
pub fn map_options(
    options: &SolverOptions,
    solver: &str,
    table: &[OptionMapping],
) -> BackendKwargs {
    let mut kwargs = BackendKwargs::new();
    for mapping in table {
        let value = match (mapping.option.value(options), mapping.when_unset) {
            (Some(value), _) => value,
            (None, Unset::UniformDefault) => match mapping.option.uniform_default() {
                Some(value) => value,
                None => continue,
            },
            (None, Unset::Omit) => continue,
        };
        match mapping.name {
            Some(name) => {
                kwargs.insert(name.to_string(), value);
            }
            None if mapping.option.value(options).is_some() => {
                warn!(
                    "{} has no equivalent of {:?}, the option is ignored",
                    solver, mapping.option
                );
            }
            None => {}
        }
    }
    for (name, value) in &options.overrides {
        kwargs.insert(name.clone(), value.clone());
    }
    kwargs
}

/// The error for an option a solver does not know
pub(crate) fn unknown_option(backend: &'static str, name: &str) -> Error {
    Error::InvalidOption {
        backend,
        name: name.to_string(),
        reason: "unknown option".to_string(),
    }
}

fn wrong_type(backend: &'static str, name: &str, expected: &str, value: &OptionValue) -> Error {
    Error::InvalidOption {
        backend,
        name: name.to_string(),
        reason: format!("expected {}, got {:?}", expected, value),
    }
}

pub(crate) fn bool_option(
    backend: &'static str,
    name: &str,
    value: &OptionValue,
) -> Result<bool, Error> {
    value
        .as_bool()
        .ok_or_else(|| wrong_type(backend, name, "a boolean", value))
}

pub(crate) fn u32_option(
    backend: &'static str,
    name: &str,
    value: &OptionValue,
) -> Result<u32, Error> {
    value
        .as_int()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| wrong_type(backend, name, "a non-negative integer", value))
}

pub(crate) fn f64_option(
    backend: &'static str,
    name: &str,
    value: &OptionValue,
) -> Result<f64, Error> {
    value
        .as_float()
        .ok_or_else(|| wrong_type(backend, name, "a number", value))
}

pub(crate) fn str_option<'a>(
    backend: &'static str,
    name: &str,
    value: &'a OptionValue,
) -> Result<&'a str, Error> {
    value
        .as_str()
        .ok_or_else(|| wrong_type(backend, name, "a string", value))
}
