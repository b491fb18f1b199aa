//! A solver that uses [OSQP](https://osqp.org/), an operator splitting solver written in C.
//! Enabling the `osqp` feature requires cmake and a C compiler.

use osqp::{CscMatrix as OsqpCscMatrix, Problem, Settings, Status};
use tracing::{debug, warn};

use crate::error::Error;
use crate::matrix::{
    csc_parts, from_triplets, lower_to_upper, vstack, zeros, CscMatrix, MatrixFormat,
};
use crate::outcome::SolveOutcome;
use crate::parameters::UniformOption::*;
use crate::parameters::{
    bool_option, f64_option, u32_option, unknown_option, BackendKwargs, OptionMapping,
};
use crate::solvers::{BoxSupport, PreparedProblem, QpSolver};

const NAME: &str = "osqp";

const OPTIONS: &[OptionMapping] = &[
    OptionMapping::uniform(Verbose, "verbose"),
    OptionMapping::omit(MaxIterations, "max_iter"),
    OptionMapping::omit(AbsTolerance, "eps_abs"),
    OptionMapping::omit(RelTolerance, "eps_rel"),
    OptionMapping::omit(FeasTolerance, "eps_prim_inf"),
    OptionMapping::omit(RefinementSteps, "polish_refine_iter"),
];

/// The [OSQP](https://osqp.org/) solver.
///
/// OSQP solves `l ≤ Ax ≤ u`: equalities become rows with `l = u = b`,
/// inequalities rows with `l = -∞` and `u = h`, and each variable with a
/// finite bound gets an identity row with `l = lb` and `u = ub`.
/// `initvals` is used to warm start the solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Osqp;

impl QpSolver for Osqp {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matrix_format(&self) -> MatrixFormat {
        MatrixFormat::Sparse
    }

    fn box_support(&self) -> BoxSupport {
        BoxSupport::Native
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
        let (constraints, lower, upper) = constraint_rows(problem)?;
        debug!("osqp problem with {} variables and {} constraint rows", n, lower.len());
        let mut prob = match Problem::new(
            to_osqp_csc(&lower_to_upper(&problem.p.to_csc())),
            problem.q,
            to_osqp_csc(&constraints),
            &lower,
            &upper,
            &settings,
        ) {
            Ok(prob) => prob,
            Err(e) => {
                let msg = format!("osqp setup failed: {}", e);
                return Ok(SolveOutcome::BackendError(msg));
            }
        };
        if let Some(x) = problem.initvals {
            prob.warm_start_x(x);
        }
        Ok(match prob.solve() {
            Status::Solved(solution) => SolveOutcome::Solution(solution.x().to_vec()),
            Status::SolvedInaccurate(solution) => {
                warn!("osqp only reached reduced accuracy");
                SolveOutcome::Solution(solution.x().to_vec())
            }
            Status::PrimalInfeasible(..) | Status::PrimalInfeasibleInaccurate(..) => {
                SolveOutcome::Infeasible
            }
            Status::DualInfeasible(..) | Status::DualInfeasibleInaccurate(..) => {
                SolveOutcome::Unbounded
            }
            Status::MaxIterationsReached(..) => SolveOutcome::IterationLimitReached,
            Status::TimeLimitReached(..) => SolveOutcome::BackendError("Time limit reached".into()),
            Status::NonConvex(..) => SolveOutcome::BackendError("Problem is non convex".into()),
            _ => SolveOutcome::BackendError("Unknown osqp status".into()),
        })
    }
}

/// Stack the equalities, the inequalities and the finite bounds
/// into a single constraint matrix with its lower and upper limits.
fn constraint_rows(
    problem: &PreparedProblem<'_>,
) -> Result<(CscMatrix, Vec<f64>, Vec<f64>), Error> {
    let n = problem.n_variables();
    let mut constraints = zeros(0, n);
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    if let Some((a, b)) = problem.equalities() {
        constraints = vstack(&constraints, &a.to_csc())?;
        lower.extend_from_slice(b);
        upper.extend_from_slice(b);
    }
    if let Some((g, h)) = problem.inequalities() {
        constraints = vstack(&constraints, &g.to_csc())?;
        lower.extend(h.iter().map(|_| f64::NEG_INFINITY));
        upper.extend_from_slice(h);
    }
    if problem.lb.is_some() || problem.ub.is_some() {
        let bound = |bounds: Option<&[f64]>, i: usize, default: f64| {
            bounds.map_or(default, |b| b[i])
        };
        let mut triplets = Vec::new();
        for i in 0..n {
            let l = bound(problem.lb, i, f64::NEG_INFINITY);
            let u = bound(problem.ub, i, f64::INFINITY);
            if l.is_finite() || u.is_finite() {
                triplets.push((triplets.len(), i, 1.));
                lower.push(l);
                upper.push(u);
            }
        }
        let box_rows = from_triplets(triplets.len(), n, triplets)?;
        constraints = vstack(&constraints, &box_rows)?;
    }
    Ok((constraints, lower, upper))
}

/// Build the CSC matrix of the osqp crate
pub fn to_osqp_csc(matrix: &CscMatrix) -> OsqpCscMatrix<'static> {
    let (nrows, ncols, indptr, indices, data) = csc_parts(matrix);
    OsqpCscMatrix {
        nrows,
        ncols,
        indptr: indptr.into(),
        indices: indices.into(),
        data: data.into(),
    }
}

fn settings(kwargs: &BackendKwargs) -> Result<Settings, Error> {
    let mut settings = Settings::default();
    for (name, value) in kwargs {
        settings = match name.as_str() {
            "verbose" => settings.verbose(bool_option(NAME, name, value)?),
            "max_iter" => settings.max_iter(u32_option(NAME, name, value)?),
            "eps_abs" => settings.eps_abs(f64_option(NAME, name, value)?),
            "eps_rel" => settings.eps_rel(f64_option(NAME, name, value)?),
            "eps_prim_inf" => settings.eps_prim_inf(f64_option(NAME, name, value)?),
            "eps_dual_inf" => settings.eps_dual_inf(f64_option(NAME, name, value)?),
            "rho" => settings.rho(f64_option(NAME, name, value)?),
            "sigma" => settings.sigma(f64_option(NAME, name, value)?),
            "alpha" => settings.alpha(f64_option(NAME, name, value)?),
            "adaptive_rho" => settings.adaptive_rho(bool_option(NAME, name, value)?),
            "scaling" => settings.scaling(u32_option(NAME, name, value)?),
            "polish" => settings.polish(bool_option(NAME, name, value)?),
            "polish_refine_iter" => settings.polish_refine_iter(u32_option(NAME, name, value)?),
            "warm_start" => settings.warm_start(bool_option(NAME, name, value)?),
            _ => return Err(unknown_option(NAME, name)),
        };
    }
    Ok(settings)
}
