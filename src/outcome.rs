//! The result of a call to a solver.
use std::fmt;

use crate::error::Error;

/// How a solver call ended.
///
/// Only [SolveOutcome::Solution] carries a point: the iterate a solver stops
/// on when it runs out of iterations is not returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// An optimal point was found
    Solution(Vec<f64>),
    /// The constraints cannot be satisfied
    Infeasible,
    /// The objective is unbounded below on the feasible set
    Unbounded,
    /// The solver stopped before reaching the requested accuracy
    IterationLimitReached,
    /// The solver failed, with its own description of the failure
    BackendError(String),
}

impl SolveOutcome {
    /// The solution, if one was found
    pub fn solution(&self) -> Option<&[f64]> {
        match self {
            SolveOutcome::Solution(x) => Some(x),
            _ => None,
        }
    }

    /// Whether a solution was found
    pub fn is_solution(&self) -> bool {
        matches!(self, SolveOutcome::Solution(_))
    }

    /// Collapse the outcome into the solution, if any.
    /// Solver failures become an [Error::Backend].
    pub fn into_result(self) -> Result<Option<Vec<f64>>, Error> {
        match self {
            SolveOutcome::Solution(x) => Ok(Some(x)),
            SolveOutcome::Infeasible
            | SolveOutcome::Unbounded
            | SolveOutcome::IterationLimitReached => Ok(None),
            SolveOutcome::BackendError(msg) => Err(Error::Backend(msg)),
        }
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveOutcome::Solution(x) => write!(f, "solution found ({} variables)", x.len()),
            SolveOutcome::Infeasible => write!(f, "infeasible"),
            SolveOutcome::Unbounded => write!(f, "unbounded"),
            SolveOutcome::IterationLimitReached => write!(f, "iteration limit reached"),
            SolveOutcome::BackendError(msg) => write!(f, "solver error: {}", msg),
        }
    }
}
