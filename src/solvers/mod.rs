//! The solvers good_qp can dispatch to, and the interface they share.
//!
//! Each solver lives behind a cargo feature of the same name.
use std::borrow::Cow;

use crate::canonical::canonicalize_box;
use crate::error::Error;
use crate::global_options::GlobalOptionStore;
use crate::matrix::{Matrix, MatrixFormat};
use crate::outcome::SolveOutcome;
use crate::parameters::{BackendKwargs, OptionMapping};
use crate::problem::QuadraticProgram;

#[macro_use]
mod macros;

#[cfg(feature = "clarabel")]
pub mod clarabel;

#[cfg(feature = "osqp")]
pub mod osqp;

#[cfg(feature = "quadprog")]
pub mod quadprog;

/// Whether a solver handles variable bounds itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSupport {
    /// `lb` and `ub` are passed to the solver as they are
    Native,
    /// `lb` and `ub` are turned into rows of `G` and `h` before the call
    Expand,
}

/// How a solver receives its options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    /// The options are arguments of each call
    PerCall,
    /// The options are process-wide state of the solver library,
    /// held in a [GlobalOptionStore]
    Global,
}

/// A quadratic programming solver.
///
/// Implementations translate a [PreparedProblem] into the solver's own data
/// structures, run it, and map its status onto a [SolveOutcome].
/// Failures the solver reports about the problem itself are outcomes,
/// not errors: `Err` is reserved for options the solver rejects and for
/// inconsistencies in the problem data.
pub trait QpSolver: Send + Sync {
    /// The identifier of the solver, in lower case
    fn name(&self) -> &'static str;

    /// The representation the solver expects its matrices in
    fn matrix_format(&self) -> MatrixFormat;

    /// Whether the solver handles `lb` and `ub` itself
    fn box_support(&self) -> BoxSupport;

    /// How the uniform options translate to this solver's options
    fn option_table(&self) -> &'static [OptionMapping];

    /// The process-wide options of the solver, if it reads them from there
    fn global_options(&self) -> Option<&GlobalOptionStore> {
        None
    }

    /// How the solver receives its options
    fn option_scope(&self) -> OptionScope {
        if self.global_options().is_some() {
            OptionScope::Global
        } else {
            OptionScope::PerCall
        }
    }

    /// Solve the problem with the given solver-specific options
    fn solve(
        &self,
        problem: &PreparedProblem<'_>,
        kwargs: &BackendKwargs,
    ) -> Result<SolveOutcome, Error>;
}

/// A problem whose matrices are in the representation a solver expects,
/// and whose box constraints were expanded if the solver needs it.
///
/// Data that needed no conversion is borrowed from the [QuadraticProgram].
#[derive(Debug, Clone)]
pub struct PreparedProblem<'a> {
    /// Quadratic cost, only its lower triangle is meaningful
    pub p: Cow<'a, Matrix>,
    /// Linear cost
    pub q: &'a [f64],
    /// Inequality constraint matrix
    pub g: Option<Cow<'a, Matrix>>,
    /// Inequality constraint vector
    pub h: Option<Cow<'a, [f64]>>,
    /// Equality constraint matrix
    pub a: Option<Cow<'a, Matrix>>,
    /// Equality constraint vector
    pub b: Option<&'a [f64]>,
    /// Lower bounds, always `None` for solvers with [BoxSupport::Expand]
    pub lb: Option<&'a [f64]>,
    /// Upper bounds, always `None` for solvers with [BoxSupport::Expand]
    pub ub: Option<&'a [f64]>,
    /// Initial guess
    pub initvals: Option<&'a [f64]>,
}

impl<'a> PreparedProblem<'a> {
    /// Convert `problem` for a solver with the given capabilities.
    /// The problem must already have been validated.
    pub fn new(
        problem: &'a QuadraticProgram,
        format: MatrixFormat,
        box_support: BoxSupport,
    ) -> Result<Self, Error> {
        let has_bounds = problem.lb.is_some() || problem.ub.is_some();
        let (g, h, lb, ub) = match box_support {
            BoxSupport::Expand if has_bounds => {
                let (g, h) = canonicalize_box(
                    problem.g.as_ref(),
                    problem.h.as_deref(),
                    problem.lb.as_deref(),
                    problem.ub.as_deref(),
                )?;
                let g = g.map(|g| Cow::Owned(g.into_format(format)));
                (g, h.map(Cow::Owned), None, None)
            }
            BoxSupport::Expand => (
                problem.g.as_ref().map(|g| g.to_format(format)),
                problem.h.as_deref().map(Cow::Borrowed),
                None,
                None,
            ),
            BoxSupport::Native => (
                problem.g.as_ref().map(|g| g.to_format(format)),
                problem.h.as_deref().map(Cow::Borrowed),
                problem.lb.as_deref(),
                problem.ub.as_deref(),
            ),
        };
        Ok(PreparedProblem {
            p: problem.p.to_format(format),
            q: &problem.q,
            g,
            h,
            a: problem.a.as_ref().map(|a| a.to_format(format)),
            b: problem.b.as_deref(),
            lb,
            ub,
            initvals: problem.initvals.as_deref(),
        })
    }

    /// Number of optimization variables
    pub fn n_variables(&self) -> usize {
        self.q.len()
    }

    /// The equality constraints, if any
    pub fn equalities(&self) -> Option<(&Matrix, &[f64])> {
        Some((self.a.as_deref()?, self.b?))
    }

    /// The inequality constraints, if any
    pub fn inequalities(&self) -> Option<(&Matrix, &[f64])> {
        Some((self.g.as_deref()?, self.h.as_deref()?))
    }
}
