//! A solver that uses [quadprog](https://docs.rs/quadprog), a pure rust port of the
//! Goldfarb-Idnani dual active set method.

use tracing::debug;

use crate::error::Error;
use crate::matrix::{row_major, symmetric_from_lower, Matrix, MatrixFormat};
use crate::outcome::SolveOutcome;
use crate::parameters::UniformOption::*;
use crate::parameters::{unknown_option, BackendKwargs, OptionMapping};
use crate::solvers::{BoxSupport, PreparedProblem, QpSolver};

const NAME: &str = "quadprog";

const INFEASIBLE: &str = "optimization is infeasible";

const OPTIONS: &[OptionMapping] = &[
    OptionMapping::unsupported(Verbose),
    OptionMapping::unsupported(MaxIterations),
    OptionMapping::unsupported(AbsTolerance),
    OptionMapping::unsupported(RelTolerance),
    OptionMapping::unsupported(FeasTolerance),
    OptionMapping::unsupported(RefinementSteps),
];

/// The [quadprog](https://docs.rs/quadprog) solver.
///
/// It only solves strictly convex problems: `P` must be positive definite.
/// It runs to completion and has no settings, so the uniform options are
/// ignored and any solver-specific option is rejected. `initvals` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadprog;

impl QpSolver for Quadprog {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matrix_format(&self) -> MatrixFormat {
        MatrixFormat::Dense
    }

    fn box_support(&self) -> BoxSupport {
        BoxSupport::Expand
    }

    fn option_table(&self) -> &'static [OptionMapping] {
        OPTIONS
    }

    fn solve(
        &self,
        problem: &PreparedProblem<'_>,
        kwargs: &BackendKwargs,
    ) -> Result<SolveOutcome, Error> {
        if let Some(name) = kwargs.keys().next() {
            return Err(unknown_option(NAME, name));
        }
        if problem.initvals.is_some() {
            debug!("quadprog does not support warm starts, the initial guess is ignored");
        }
        let mut quadratic_objective = row_major(&symmetric_from_lower(&problem.p.to_dense()));
        // the first `equalities` rows are equalities, the others are `<=`
        let mut constraints = Vec::new();
        let mut constraint_values = Vec::new();
        let mut equalities = 0;
        if let Some((a, b)) = problem.equalities() {
            constraints.extend(to_row_major(a));
            constraint_values.extend_from_slice(b);
            equalities = b.len();
        }
        if let Some((g, h)) = problem.inequalities() {
            constraints.extend(to_row_major(g));
            constraint_values.extend_from_slice(h);
        }
        let result = quadprog::solve_qp(
            &mut quadratic_objective,
            problem.q,
            &constraints,
            &constraint_values,
            equalities,
            false,
        );
        Ok(match result {
            Ok(solution) => {
                debug!("quadprog finished after {} iterations", solution.iter);
                SolveOutcome::Solution(solution.sol)
            }
            Err(INFEASIBLE) => SolveOutcome::Infeasible,
            Err(msg) => SolveOutcome::BackendError(msg.to_string()),
        })
    }
}

/// The values of a matrix, row after row
pub fn to_row_major(matrix: &Matrix) -> Vec<f64> {
    row_major(&matrix.to_dense())
}
