//! A solver that uses [clarabel](https://oxfordcontrol.github.io/ClarabelDocs/stable/), a pure rust interior point solver.

use clarabel::algebra::CscMatrix as ClarabelCscMatrix;
use clarabel::solver::implementations::default::{DefaultSettings, DefaultSettingsBuilder};
use clarabel::solver::SupportedConeT::{self, *};
use clarabel::solver::SolverStatus;
use clarabel::solver::{DefaultSolver, IPSolver};
use tracing::{debug, warn};

use crate::error::Error;
use crate::matrix::{csc_parts, lower_to_upper, vstack, zeros, CscMatrix, MatrixFormat};
use crate::outcome::SolveOutcome;
use crate::parameters::UniformOption::*;
use crate::parameters::{
    bool_option, f64_option, str_option, u32_option, unknown_option, BackendKwargs, OptionMapping,
};
use crate::solvers::{BoxSupport, PreparedProblem, QpSolver};

const NAME: &str = "clarabel";

const OPTIONS: &[OptionMapping] = &[
    OptionMapping::uniform(Verbose, "verbose"),
    OptionMapping::omit(MaxIterations, "max_iter"),
    OptionMapping::omit(AbsTolerance, "tol_gap_abs"),
    OptionMapping::omit(RelTolerance, "tol_gap_rel"),
    OptionMapping::omit(FeasTolerance, "tol_feas"),
    OptionMapping::omit(RefinementSteps, "iterative_refinement_max_iter"),
];

/// The [clarabel](https://oxfordcontrol.github.io/ClarabelDocs/stable/) solver.
///
/// Equality constraints go to a zero cone and inequalities to a nonnegative
/// cone. Bounds on the variables are turned into inequalities. Clarabel does
/// not take an initial guess, `initvals` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clarabel;

impl QpSolver for Clarabel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matrix_format(&self) -> MatrixFormat {
        MatrixFormat::Sparse
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
        let settings = settings(kwargs)?;
        let n = problem.n_variables();
        let quadratic_objective = to_clarabel_csc(&lower_to_upper(&problem.p.to_csc()));

        // Ax + s = b, with s in the zero cone for the equalities
        // and in the nonnegative cone for the inequalities
        let mut constraints = zeros(0, n);
        let mut constraint_values = Vec::new();
        let mut cones: Vec<SupportedConeT<f64>> = Vec::new();
        if let Some((a, b)) = problem.equalities() {
            constraints = vstack(&constraints, &a.to_csc())?;
            constraint_values.extend_from_slice(b);
            push_cone(&mut cones, ZeroConeT(b.len()));
        }
        if let Some((g, h)) = problem.inequalities() {
            constraints = vstack(&constraints, &g.to_csc())?;
            constraint_values.extend_from_slice(h);
            push_cone(&mut cones, NonnegativeConeT(h.len()));
        }
        let constraints = to_clarabel_csc(&constraints);

        if problem.initvals.is_some() {
            debug!("clarabel does not support warm starts, the initial guess is ignored");
        }
        let mut solver = match DefaultSolver::new(
            &quadratic_objective,
            problem.q,
            &constraints,
            &constraint_values,
            &cones,
            settings,
        ) {
            Ok(solver) => solver,
            Err(e) => {
                return Ok(SolveOutcome::BackendError(format!(
                    "invalid clarabel problem: {:?}",
                    e
                )))
            }
        };
        solver.solve();
        let status = solver.solution.status;
        debug!("clarabel finished with status {:?}", status);
        Ok(match status {
            SolverStatus::Solved => SolveOutcome::Solution(std::mem::take(&mut solver.solution.x)),
            SolverStatus::AlmostSolved => {
                warn!("clarabel only reached reduced accuracy");
                SolveOutcome::Solution(std::mem::take(&mut solver.solution.x))
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                SolveOutcome::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                SolveOutcome::Unbounded
            }
            SolverStatus::MaxIterations => SolveOutcome::IterationLimitReached,
            SolverStatus::Unsolved => SolveOutcome::BackendError("Unsolved".into()),
            SolverStatus::MaxTime => SolveOutcome::BackendError("Time limit reached".into()),
            SolverStatus::NumericalError => SolveOutcome::BackendError("Numerical error".into()),
            SolverStatus::InsufficientProgress => SolveOutcome::BackendError("No progress".into()),
            SolverStatus::CallbackTerminated => {
                SolveOutcome::BackendError("Callback terminated".into())
            }
        })
    }
}

/// Merge consecutive cones of the same kind, and skip empty ones.
fn push_cone(cones: &mut Vec<SupportedConeT<f64>>, next_cone: SupportedConeT<f64>) {
    let prev_cone = cones.last_mut();
    match (prev_cone, next_cone) {
        (_, ZeroConeT(0)) | (_, NonnegativeConeT(0)) => {}
        (Some(ZeroConeT(a)), ZeroConeT(b)) => *a += b,
        (Some(NonnegativeConeT(a)), NonnegativeConeT(b)) => *a += b,
        (_, next_cone) => cones.push(next_cone),
    }
}

/// Build clarabel's own CSC matrix
pub fn to_clarabel_csc(matrix: &CscMatrix) -> ClarabelCscMatrix<f64> {
    let (nrows, ncols, colptr, rowval, nzval) = csc_parts(matrix);
    ClarabelCscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

fn settings(kwargs: &BackendKwargs) -> Result<DefaultSettings<f64>, Error> {
    let mut settings = DefaultSettingsBuilder::default();
    for (name, value) in kwargs {
        match name.as_str() {
            "verbose" => settings.verbose(bool_option(NAME, name, value)?),
            "max_iter" => settings.max_iter(u32_option(NAME, name, value)?),
            "time_limit" => settings.time_limit(f64_option(NAME, name, value)?),
            "tol_gap_abs" => settings.tol_gap_abs(f64_option(NAME, name, value)?),
            "tol_gap_rel" => settings.tol_gap_rel(f64_option(NAME, name, value)?),
            "tol_feas" => settings.tol_feas(f64_option(NAME, name, value)?),
            "tol_infeas_abs" => settings.tol_infeas_abs(f64_option(NAME, name, value)?),
            "tol_infeas_rel" => settings.tol_infeas_rel(f64_option(NAME, name, value)?),
            "tol_ktratio" => settings.tol_ktratio(f64_option(NAME, name, value)?),
            "equilibrate_enable" => settings.equilibrate_enable(bool_option(NAME, name, value)?),
            "presolve_enable" => settings.presolve_enable(bool_option(NAME, name, value)?),
            "iterative_refinement_enable" => {
                settings.iterative_refinement_enable(bool_option(NAME, name, value)?)
            }
            "iterative_refinement_max_iter" => {
                settings.iterative_refinement_max_iter(u32_option(NAME, name, value)?)
            }
            "direct_solve_method" => {
                settings.direct_solve_method(str_option(NAME, name, value)?.to_string())
            }
            _ => return Err(unknown_option(NAME, name)),
        };
    }
    settings.build().map_err(|e| Error::InvalidOption {
        backend: NAME,
        name: "settings".to_string(),
        reason: format!("{:?}", e),
    })
}
