/// Tests every solver must pass, run through a [Registry](crate::dispatch::Registry)
/// holding only that solver. Solutions are compared with an absolute tolerance,
/// `1e-4` unless given.
#[allow(unused_macros)]
macro_rules! backend_tests {
    ($solver:expr) => {
        backend_tests!($solver, 1e-4);
    };
    ($solver:expr, $tolerance:expr) => {
        fn solve_with(
            qp: &$crate::QuadraticProgram,
            options: &$crate::SolverOptions,
        ) -> Result<$crate::SolveOutcome, $crate::Error> {
            use $crate::solvers::QpSolver;
            let solver = $solver;
            let name = solver.name();
            let mut registry = $crate::dispatch::Registry::empty();
            registry.register(solver);
            registry.solve(qp, name, options)
        }

        fn solve(qp: &$crate::QuadraticProgram) -> Vec<f64> {
            match solve_with(qp, &$crate::SolverOptions::default()) {
                Ok($crate::SolveOutcome::Solution(x)) => x,
                other => panic!("expected a solution, got {:?}", other),
            }
        }

        fn assert_close(x: &[f64], expected: &[f64]) {
            assert_eq!(x.len(), expected.len());
            for (xi, ei) in x.iter().zip(expected) {
                float_eq::assert_float_eq!(*xi, *ei, abs <= $tolerance);
            }
        }

        fn dense(rows: &[&[f64]]) -> $crate::DenseMatrix {
            $crate::matrix::dense_from_rows(rows).unwrap()
        }

        /// Projection of (1, 2) on the half-plane x + y <= 1
        fn projection() -> $crate::QuadraticProgram {
            $crate::QuadraticProgram::new(dense(&[&[1., 0.], &[0., 1.]]), vec![-1., -2.])
                .inequalities(dense(&[&[1., 1.]]), vec![1.])
        }

        #[test]
        fn solves_inequality_constrained_problem() {
            assert_close(&solve(&projection()), &[0., 1.]);
        }

        #[test]
        fn solves_with_sparse_matrices() {
            let mut qp = projection();
            qp.p = $crate::Matrix::Sparse(qp.p.to_csc().into_owned());
            qp.g = qp.g.map(|g| $crate::Matrix::Sparse(g.to_csc().into_owned()));
            assert_close(&solve(&qp), &[0., 1.]);
        }

        #[test]
        fn ignores_upper_triangle() {
            let mut qp = projection();
            qp.p = dense(&[&[1., 123.], &[0., 1.]]).into();
            assert_close(&solve(&qp), &[0., 1.]);
        }

        #[test]
        fn solves_equality_constrained_problem() {
            let qp = $crate::QuadraticProgram::new(dense(&[&[1., 0.], &[0., 1.]]), vec![0., 0.])
                .equalities(dense(&[&[1., 1.]]), vec![1.]);
            assert_close(&solve(&qp), &[0.5, 0.5]);
        }

        #[test]
        fn solves_box_constrained_problem() {
            let qp = $crate::QuadraticProgram::new(dense(&[&[1., 0.], &[0., 1.]]), vec![-2., 3.])
                .lower_bounds(vec![0., 0.])
                .upper_bounds(vec![1., 1.]);
            assert_close(&solve(&qp), &[1., 0.]);
        }

        #[test]
        fn solves_with_infinite_bounds() {
            let qp = projection()
                .lower_bounds(vec![f64::NEG_INFINITY, 0.5])
                .upper_bounds(vec![f64::INFINITY, f64::INFINITY]);
            // the lower bound on y is inactive
            assert_close(&solve(&qp), &[0., 1.]);
        }

        #[test]
        fn solves_with_all_constraint_kinds() {
            let qp = $crate::QuadraticProgram::new(
                dense(&[&[2., 0., 0.], &[0., 2., 0.], &[0., 0., 2.]]),
                vec![-2., -4., -6.],
            )
            .equalities(dense(&[&[1., 1., 1.]]), vec![3.])
            .inequalities(dense(&[&[0., 0., 1.]]), vec![1.5])
            .lower_bounds(vec![0., 0., 0.])
            .with_initial_solution(vec![1., 1., 1.]);
            assert_close(&solve(&qp), &[0.25, 1.25, 1.5]);
        }

        #[test]
        fn detects_infeasibility() {
            // x <= -1 and x >= 1
            let qp = $crate::QuadraticProgram::new(dense(&[&[1.]]), vec![0.])
                .inequalities(dense(&[&[1.], &[-1.]]), vec![-1., -1.]);
            let outcome = solve_with(&qp, &$crate::SolverOptions::default()).unwrap();
            assert_eq!(outcome, $crate::SolveOutcome::Infeasible);
            assert_eq!(outcome.into_result(), Ok(None));
        }

        #[test]
        fn rejects_problems_without_variables() {
            let qp = $crate::QuadraticProgram::new($crate::matrix::identity(0), vec![]);
            match solve_with(&qp, &$crate::SolverOptions::default()) {
                Err($crate::Error::MalformedProblem(_)) => {}
                other => panic!("expected a malformed problem, got {:?}", other),
            }
        }

        #[test]
        fn rejects_nan_bounds() {
            let qp = projection().upper_bounds(vec![f64::NAN, 5.]);
            match solve_with(&qp, &$crate::SolverOptions::default()) {
                Err($crate::Error::MalformedProblem(_)) => {}
                other => panic!("expected a malformed problem, got {:?}", other),
            }
        }

        #[test]
        fn rejects_unknown_options() {
            let options = $crate::SolverOptions::default().with_option("no_such_option", 1_i64);
            match solve_with(&projection(), &options) {
                Err($crate::Error::InvalidOption { name, .. }) => assert_eq!(name, "no_such_option"),
                other => panic!("expected an invalid option error, got {:?}", other),
            }
        }

        #[test]
        fn accepts_uniform_options() {
            let options = $crate::SolverOptions::default()
                .max_iterations(10_000)
                .abs_tolerance(1e-6)
                .rel_tolerance(1e-6)
                .feas_tolerance(1e-6)
                .refinement_steps(10);
            match solve_with(&projection(), &options) {
                Ok($crate::SolveOutcome::Solution(x)) => assert_close(&x, &[0., 1.]),
                other => panic!("expected a solution, got {:?}", other),
            }
        }
    };
}
