//! The same problems, solved by every solver enabled at compile time

use float_eq::assert_float_eq;
use good_qp::matrix::{dense_from_rows, from_triplets, identity};
use good_qp::{
    available_backends, default_registry, solve_ls, solve_problem, solve_qp, DenseMatrix, Error,
    LeastSquares, Matrix, OptionValue, QuadraticProgram, SolveOutcome, SolverOptions,
};

/// Solvers that accept problems whose `P` is only positive semidefinite
const SEMIDEFINITE: &[&str] = &["clarabel", "osqp"];

/// Each solver, with the accuracy to expect from it with default settings
fn solvers() -> Vec<(&'static str, f64)> {
    available_backends()
        .into_iter()
        .map(|name| (name, if name == "osqp" { 1e-2 } else { 1e-5 }))
        .collect()
}

fn solution(problem: &QuadraticProgram, solver: &str) -> Vec<f64> {
    match solve_problem(problem, solver, &SolverOptions::default()) {
        Ok(SolveOutcome::Solution(x)) => x,
        other => panic!("{} did not find a solution: {:?}", solver, other),
    }
}

fn assert_all_close(x: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(x.len(), expected.len());
    for (xi, ei) in x.iter().zip(expected) {
        assert_float_eq!(*xi, *ei, abs <= tolerance);
    }
}

/// minimize x² + y² + z² subject to x + y + z = 6 and x - y + 2z = 4
fn two_equalities() -> QuadraticProgram {
    QuadraticProgram::new(identity(3), vec![0.; 3]).equalities(
        dense_from_rows(&[[1., 1., 1.], [1., -1., 2.]]).unwrap(),
        vec![6., 4.],
    )
}

#[test]
fn solvers_agree_on_equality_constrained_problem() {
    // the minimum norm solution of the linear system
    let expected = [2., 2., 2.];
    for (solver, tolerance) in solvers() {
        let x = solution(&two_equalities(), solver);
        assert_all_close(&x, &expected, tolerance);
    }
}

#[test]
fn solvers_agree_with_each_other() {
    // a problem mixing every kind of constraint, with a sparse P
    let p = from_triplets(
        3,
        3,
        vec![(0, 0, 4.), (1, 0, 1.), (1, 1, 2.), (2, 2, 1.)],
    )
    .unwrap();
    let problem = QuadraticProgram::new(p, vec![1., 1., -1.])
        .inequalities(dense_from_rows(&[[-1., -1., 0.]]).unwrap(), vec![-1.])
        .equalities(dense_from_rows(&[[0., 0., 1.]]).unwrap(), vec![0.5])
        .lower_bounds(vec![0., 0., f64::NEG_INFINITY])
        .upper_bounds(vec![0.7, 0.7, f64::INFINITY]);
    let (reference_solver, reference_tolerance) = solvers()[0];
    let reference = solution(&problem, reference_solver);
    assert!(problem.primal_residual(&reference).unwrap() < reference_tolerance);
    for (solver, tolerance) in solvers() {
        let x = solution(&problem, solver);
        let tolerance = tolerance.max(reference_tolerance);
        assert_all_close(&x, &reference, tolerance);
        assert_float_eq!(
            problem.objective(&x).unwrap(),
            problem.objective(&reference).unwrap(),
            abs <= tolerance
        );
    }
}

#[test]
fn projection_on_a_half_plane() {
    // minimize ½(x₀² + x₁²) subject to -x₀ - x₁ ≤ -1
    let problem = QuadraticProgram::new(identity(2), vec![0., 0.])
        .inequalities(dense_from_rows(&[[-1., -1.]]).unwrap(), vec![-1.]);
    for (solver, tolerance) in solvers() {
        let x = solution(&problem, solver);
        // osqp is a first order method, its default accuracy is lower
        let tolerance = if solver == "osqp" { tolerance } else { 1e-6 };
        assert_all_close(&x, &[0.5, 0.5], tolerance);
    }
}

#[test]
fn contradicting_equality_and_inequality() {
    // x = 1 and x ≤ 0
    let problem = QuadraticProgram::new(identity(1), vec![0.])
        .equalities(dense_from_rows(&[[1.]]).unwrap(), vec![1.])
        .inequalities(dense_from_rows(&[[1.]]).unwrap(), vec![0.]);
    for (solver, _) in solvers() {
        let outcome = solve_problem(&problem, solver, &SolverOptions::default()).unwrap();
        assert_eq!(outcome, SolveOutcome::Infeasible, "{}", solver);
    }
}

#[test]
fn problems_without_variables_are_rejected() {
    let problem = QuadraticProgram::new(identity(0), vec![]);
    for (solver, _) in solvers() {
        let outcome = solve_problem(&problem, solver, &SolverOptions::default());
        assert!(matches!(outcome, Err(Error::MalformedProblem(_))), "{:?}", outcome);
    }
}

#[test]
fn infeasible_problems_have_no_solution() {
    let problem = two_equalities().upper_bounds(vec![1., 1., 1.]);
    for (solver, _) in solvers() {
        let outcome = solve_problem(&problem, solver, &SolverOptions::default()).unwrap();
        assert_eq!(outcome, SolveOutcome::Infeasible, "{}", solver);
    }
}

#[test]
fn unbounded_problems_have_no_solution() {
    // minimize x - y with y free above
    let problem = QuadraticProgram::new(DenseMatrix::zeros(2, 2), vec![1., -1.])
        .lower_bounds(vec![0., 0.]);
    for (solver, _) in solvers() {
        if !SEMIDEFINITE.contains(&solver) {
            continue;
        }
        let outcome = solve_problem(&problem, solver, &SolverOptions::default()).unwrap();
        assert_eq!(outcome, SolveOutcome::Unbounded, "{}", solver);
        let x = solve_qp(
            &problem.p,
            &problem.q,
            None,
            None,
            None,
            None,
            problem.lb.as_deref(),
            None,
            None,
            solver,
            &SolverOptions::default(),
        );
        assert_eq!(x, Ok(None));
    }
}

#[test]
fn dense_and_sparse_inputs_give_the_same_solution() {
    let dense = two_equalities();
    let mut sparse = dense.clone();
    sparse.a = sparse.a.map(|a| Matrix::Sparse(a.to_csc().into_owned()));
    let mut all_dense = dense.clone();
    all_dense.p = Matrix::Dense(all_dense.p.to_dense().into_owned());
    for (solver, tolerance) in solvers() {
        let a = solution(&dense, solver);
        let b = solution(&sparse, solver);
        let c = solution(&all_dense, solver);
        assert_all_close(&a, &b, tolerance);
        assert_all_close(&a, &c, tolerance);
    }
}

#[test]
fn solver_names_are_case_insensitive() {
    for (solver, tolerance) in solvers() {
        let upper = format!("  {} ", solver.to_uppercase());
        let x = solution(&two_equalities(), &upper);
        assert_all_close(&x, &[2., 2., 2.], tolerance);
    }
}

#[test]
fn unknown_solver() {
    let err = solve_problem(&two_equalities(), "cvxopt", &SolverOptions::default()).unwrap_err();
    match &err {
        Error::UnknownBackend { name, available } => {
            assert_eq!(name, "cvxopt");
            let expected: Vec<String> = available_backends().into_iter().map(String::from).collect();
            assert_eq!(available, &expected);
        }
        other => panic!("unexpected error {}", other),
    }
    assert!(err.to_string().contains("cvxopt"));
}

#[test]
fn half_constraints_are_rejected() {
    for (solver, _) in solvers() {
        let x = solve_qp(
            &identity(1).into(),
            &[0.],
            None,
            Some(&[1.]),
            None,
            None,
            None,
            None,
            None,
            solver,
            &SolverOptions::default(),
        );
        assert!(matches!(x, Err(Error::MalformedProblem(_))), "{:?}", x);
    }
}

#[test]
fn verbose_is_off_unless_asked() {
    for (solver, _) in solvers() {
        let kwargs = default_registry()
            .map_options(&SolverOptions::default(), solver)
            .unwrap();
        if let Some(verbose) = kwargs.values().find_map(OptionValue::as_bool) {
            assert!(!verbose, "{} is verbose by default", solver);
        }
        let again = default_registry()
            .map_options(&SolverOptions::default(), solver)
            .unwrap();
        assert_eq!(kwargs, again);
    }
}

#[test]
fn weighted_least_squares() {
    // fit y = a x to three points, the last one counting double
    let r = dense_from_rows(&[[1.], [2.], [3.]]).unwrap();
    let ls = LeastSquares::new(r, vec![1., 2., 2.]).weights(vec![1., 1., 2.]);
    // (1 + 4 + 12) / (1 + 4 + 18)
    let expected = 17. / 23.;
    for (solver, tolerance) in solvers() {
        let x = solve_ls(&ls, solver, &SolverOptions::default())
            .unwrap()
            .unwrap();
        assert_float_eq!(x[0], expected, abs <= tolerance);
    }
}
