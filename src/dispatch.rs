//! Selection of a solver by name, and the path a problem takes to reach it.
//!
//! ```
//! # #[cfg(feature = "clarabel")] {
//! use good_qp::matrix::dense_from_rows;
//! use good_qp::{solve_qp, SolverOptions};
//!
//! // minimize x² + y² - 2x - 4y subject to x + y <= 1
//! let p = dense_from_rows(&[[2., 0.], [0., 2.]])?;
//! let g = dense_from_rows(&[[1., 1.]])?;
//! let x = solve_qp(
//!     &p.into(), &[-2., -4.],
//!     Some(&g.into()), Some(&[1.]),
//!     None, None, None, None, None,
//!     "clarabel", &SolverOptions::default(),
//! )?;
//! let x = x.expect("the problem is feasible");
//! assert!((x[0] - 0.).abs() < 1e-6 && (x[1] - 1.).abs() < 1e-6);
//! # }
//! # Ok::<_, good_qp::Error>(())
//! ```
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use fnv::FnvHashMap;
use tracing::{debug, info_span};

use crate::error::Error;
use crate::matrix::Matrix;
use crate::options::SolverOptions;
use crate::outcome::SolveOutcome;
use crate::parameters::{map_options, BackendKwargs};
use crate::problem::{LeastSquares, QuadraticProgram};
use crate::solvers::{PreparedProblem, QpSolver};
use crate::validation::{check_dimensions, validate};

/// A set of solvers, addressed by name.
///
/// Names are matched without regard to case or surrounding whitespace.
#[derive(Clone, Default)]
pub struct Registry {
    solvers: FnvHashMap<String, Arc<dyn QpSolver>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl Registry {
    /// A registry without any solver
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every solver enabled at compile time
    pub fn with_available_solvers() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::empty();
        #[cfg(feature = "clarabel")]
        registry.register(crate::solvers::clarabel::Clarabel);
        #[cfg(feature = "osqp")]
        registry.register(crate::solvers::osqp::Osqp);
        #[cfg(feature = "quadprog")]
        registry.register(crate::solvers::quadprog::Quadprog);
        registry
    }

    /// Add a solver, under its [QpSolver::name].
    /// Returns the solver previously registered under that name, if any.
    pub fn register<S: QpSolver + 'static>(&mut self, solver: S) -> Option<Arc<dyn QpSolver>> {
        self.solvers.insert(normalize(solver.name()), Arc::new(solver))
    }

    /// The names of the registered solvers
    pub fn names(&self) -> BTreeSet<&'static str> {
        self.solvers.values().map(|s| s.name()).collect()
    }

    /// Find a solver by name
    pub fn get(&self, name: &str) -> Result<&Arc<dyn QpSolver>, Error> {
        self.solvers
            .get(&normalize(name))
            .ok_or_else(|| Error::UnknownBackend {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    /// The options that would be sent to the named solver
    pub fn map_options(
        &self,
        options: &SolverOptions,
        backend: &str,
    ) -> Result<BackendKwargs, Error> {
        let solver = self.get(backend)?;
        Ok(map_options(options, solver.name(), solver.option_table()))
    }

    /// Check the problem, convert it for the named solver, and run it.
    pub fn solve(
        &self,
        problem: &QuadraticProgram,
        backend: &str,
        options: &SolverOptions,
    ) -> Result<SolveOutcome, Error> {
        validate(
            problem.g.as_ref(),
            problem.h.as_deref(),
            problem.a.as_ref(),
            problem.b.as_deref(),
        )?;
        check_dimensions(problem)?;
        let solver = self.get(backend)?;
        let _span = info_span!("solve", solver = solver.name()).entered();
        let prepared =
            PreparedProblem::new(problem, solver.matrix_format(), solver.box_support())?;
        let kwargs = map_options(options, solver.name(), solver.option_table());
        debug!(
            "{} variables, {} options: {:?}",
            problem.n_variables(),
            kwargs.len(),
            kwargs
        );
        let outcome = match solver.global_options() {
            Some(store) => {
                let scope = store.scoped(&kwargs);
                let kwargs = scope.options();
                solver.solve(&prepared, &kwargs)
            }
            None => solver.solve(&prepared, &kwargs),
        }?;
        debug!("outcome: {}", outcome);
        Ok(outcome)
    }
}

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The registry used by the free functions of this crate:
/// every solver enabled at compile time.
pub fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(Registry::with_available_solvers)
}

/// The names of the solvers enabled at compile time
///
/// ```
/// # #[cfg(all(feature = "clarabel", feature = "quadprog"))] {
/// let names = good_qp::available_backends();
/// assert!(names.contains("clarabel"));
/// assert!(names.contains("quadprog"));
/// # }
/// ```
pub fn available_backends() -> BTreeSet<&'static str> {
    default_registry().names()
}

/// Solve a quadratic program with the named solver, keeping the detail of
/// how the solver ended.
pub fn solve_problem(
    problem: &QuadraticProgram,
    backend: &str,
    options: &SolverOptions,
) -> Result<SolveOutcome, Error> {
    default_registry().solve(problem, backend, options)
}

/// Solve
///
/// ```text
/// minimize    ½ xᵀPx + qᵀx
/// subject to  Gx ≤ h
///             Ax = b
///             lb ≤ x ≤ ub
/// ```
///
/// with the named solver. Only the lower triangle of `P` is read.
///
/// Returns `Ok(None)` when the problem is infeasible or unbounded, or when
/// the solver ran out of iterations.
#[allow(clippy::too_many_arguments)]
pub fn solve_qp(
    p: &Matrix,
    q: &[f64],
    g: Option<&Matrix>,
    h: Option<&[f64]>,
    a: Option<&Matrix>,
    b: Option<&[f64]>,
    lb: Option<&[f64]>,
    ub: Option<&[f64]>,
    initvals: Option<&[f64]>,
    backend: &str,
    options: &SolverOptions,
) -> Result<Option<Vec<f64>>, Error> {
    let problem = QuadraticProgram {
        p: p.clone(),
        q: q.to_vec(),
        g: g.cloned(),
        h: h.map(<[f64]>::to_vec),
        a: a.cloned(),
        b: b.map(<[f64]>::to_vec),
        lb: lb.map(<[f64]>::to_vec),
        ub: ub.map(<[f64]>::to_vec),
        initvals: initvals.map(<[f64]>::to_vec),
    };
    solve_problem(&problem, backend, options)?.into_result()
}

/// Solve a constrained weighted linear least squares problem with the named solver.
/// See [LeastSquares].
pub fn solve_ls(
    problem: &LeastSquares,
    backend: &str,
    options: &SolverOptions,
) -> Result<Option<Vec<f64>>, Error> {
    let qp = problem.to_quadratic_program()?;
    solve_problem(&qp, backend, options)?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_options::GlobalOptionStore;
    use crate::matrix::{dense_from_rows, identity, zeros, MatrixFormat};
    use crate::options::OptionValue;
    use crate::parameters::{OptionMapping, UniformOption};
    use crate::solvers::{BoxSupport, OptionScope};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Reads its iteration limit from process-wide state, and returns it as the solution
    struct GlobalSolver {
        store: GlobalOptionStore,
        running: AtomicUsize,
    }

    const GLOBAL_OPTIONS: &[OptionMapping] = &[
        OptionMapping::uniform(UniformOption::Verbose, "show_progress"),
        OptionMapping::omit(UniformOption::MaxIterations, "maxiters"),
    ];

    impl QpSolver for GlobalSolver {
        fn name(&self) -> &'static str {
            "Global"
        }
        fn matrix_format(&self) -> MatrixFormat {
            MatrixFormat::Dense
        }
        fn box_support(&self) -> BoxSupport {
            BoxSupport::Expand
        }
        fn option_table(&self) -> &'static [OptionMapping] {
            GLOBAL_OPTIONS
        }
        fn global_options(&self) -> Option<&GlobalOptionStore> {
            Some(&self.store)
        }
        fn solve(
            &self,
            _problem: &PreparedProblem<'_>,
            _kwargs: &BackendKwargs,
        ) -> Result<SolveOutcome, Error> {
            assert_eq!(self.running.fetch_add(1, Ordering::SeqCst), 0);
            thread::sleep(Duration::from_millis(5));
            let current = self.store.current();
            self.running.fetch_sub(1, Ordering::SeqCst);
            let iterations = current.get("maxiters").and_then(OptionValue::as_float);
            Ok(SolveOutcome::Solution(vec![iterations.unwrap_or(-1.)]))
        }
    }

    fn global_solver() -> GlobalSolver {
        let mut defaults = BackendKwargs::new();
        defaults.insert("show_progress".to_string(), true.into());
        GlobalSolver {
            store: GlobalOptionStore::new(defaults),
            running: AtomicUsize::new(0),
        }
    }

    fn small_problem() -> QuadraticProgram {
        QuadraticProgram::new(identity(1), vec![0.])
    }

    #[test]
    fn unknown_backend() {
        let registry = Registry::empty();
        let err = registry
            .solve(&small_problem(), "cvxopt", &SolverOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownBackend {
                name: "cvxopt".to_string(),
                available: vec![]
            }
        );
    }

    #[test]
    fn unknown_backend_lists_available_ones() {
        let mut registry = Registry::empty();
        registry.register(global_solver());
        match registry.get("nope") {
            Err(Error::UnknownBackend { available, .. }) => assert_eq!(available, vec!["Global"]),
            other => panic!("unexpected {:?}", other.map(|s| s.name())),
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut registry = Registry::empty();
        assert!(registry.register(global_solver()).is_none());
        assert!(registry.get(" GLOBAL ").is_ok());
        assert!(registry.register(global_solver()).is_some());
        assert_eq!(registry.names().len(), 1);
    }

    #[test]
    fn malformed_problems_are_rejected_before_any_solver_runs() {
        let registry = Registry::empty();
        let mut problem = small_problem();
        problem.h = Some(vec![1.]);
        match registry.solve(&problem, "anything", &SolverOptions::default()) {
            Err(Error::MalformedProblem(msg)) => assert!(msg.contains("missing G")),
            other => panic!("unexpected {:?}", other),
        }
        let problem = small_problem().lower_bounds(vec![0., 0.]);
        assert!(matches!(
            registry.solve(&problem, "anything", &SolverOptions::default()),
            Err(Error::MalformedProblem(_))
        ));
    }

    #[test]
    fn mapped_options() {
        let mut registry = Registry::empty();
        registry.register(global_solver());
        let kwargs = registry
            .map_options(&SolverOptions::default().max_iterations(4), "global")
            .unwrap();
        assert_eq!(kwargs.len(), 2);
        assert_eq!(kwargs["show_progress"], OptionValue::Bool(false));
        assert_eq!(kwargs["maxiters"], OptionValue::Int(4));
    }

    #[test]
    fn global_options_do_not_leak_between_calls() {
        let solver = global_solver();
        assert_eq!(solver.option_scope(), OptionScope::Global);
        let mut registry = Registry::empty();
        registry.register(solver);
        let registry = Arc::new(registry);

        let handles: Vec<_> = (1..=8_u32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let options = SolverOptions::default().max_iterations(i);
                    let outcome = registry.solve(&small_problem(), "global", &options);
                    (i, outcome)
                })
            })
            .collect();
        for handle in handles {
            let (i, outcome) = handle.join().unwrap();
            assert_eq!(outcome, Ok(SolveOutcome::Solution(vec![f64::from(i)])));
        }
        // without an iteration limit, the solver sees its own defaults
        let outcome = registry
            .solve(&small_problem(), "global", &SolverOptions::default())
            .unwrap();
        assert_eq!(outcome, SolveOutcome::Solution(vec![-1.]));
        let store = registry.get("global").unwrap().global_options().unwrap().current();
        assert_eq!(store["show_progress"], OptionValue::Bool(true));
        assert!(!store.contains_key("maxiters"));
    }

    #[test]
    fn least_squares_through_the_default_registry() {
        if !available_backends().contains("quadprog") {
            return;
        }
        // minimize ||x - (1, 2)||² subject to x + y = 1
        let ls = LeastSquares::new(identity(2), vec![1., 2.]).subject_to(
            QuadraticProgram::new(zeros(2, 2), vec![0., 0.])
                .equalities(dense_from_rows(&[[1., 1.]]).unwrap(), vec![1.]),
        );
        let x = solve_ls(&ls, "quadprog", &SolverOptions::default())
            .unwrap()
            .unwrap();
        float_eq::assert_float_eq!(x[0], 0., abs <= 1e-6);
        float_eq::assert_float_eq!(x[1], 1., abs <= 1e-6);
    }
}
