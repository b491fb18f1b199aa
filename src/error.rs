//! Errors that prevent a problem from being handed to a solver.
use thiserror::Error;

/// Represents an error that occurred before or around a solver invocation.
///
/// Numerical outcomes such as infeasibility are not errors:
/// they are reported through [`SolveOutcome`](crate::SolveOutcome).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The shapes or the pairing of the problem data are inconsistent,
    /// for instance `G` was given without `h`.
    #[error("malformed problem: {0}")]
    MalformedProblem(String),
    /// No solver with this name is registered.
    #[error("unknown solver {name:?}, available solvers are: {}", available.join(", "))]
    UnknownBackend {
        /// The name that was requested
        name: String,
        /// The names of the solvers that could have been used instead
        available: Vec<String>,
    },
    /// A solver-specific option is not recognised, or has the wrong type.
    #[error("invalid option {name:?} for {backend}: {reason}")]
    InvalidOption {
        /// The solver the option was forwarded to
        backend: &'static str,
        /// Name of the option
        name: String,
        /// What is wrong with it
        reason: String,
    },
    /// The solver failed in a way that says nothing about the problem itself.
    #[error("solver error: {0}")]
    Backend(String),
}

impl Error {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedProblem(msg.into())
    }
}
