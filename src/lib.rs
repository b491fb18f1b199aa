//! Solve convex quadratic programs
//!
//! ```text
//! minimize    ½ xᵀPx + qᵀx
//! subject to  Gx ≤ h
//!             Ax = b
//!             lb ≤ x ≤ ub
//! ```
//!
//! with any of several solvers, through a single API.
//! The problem is described once, with dense or sparse matrices, and the
//! solver is picked by name at runtime.
//! good_qp converts the matrices to the representation the solver expects,
//! rewrites the box constraints for solvers that do not handle them,
//! and translates the uniform [SolverOptions] to the solver's own settings.
//!
//! ```rust
//! # #[cfg(feature = "quadprog")] {
//! use good_qp::matrix::{dense_from_rows, identity};
//! use good_qp::{solve_problem, QuadraticProgram, SolveOutcome, SolverOptions};
//!
//! // Project (1, 2) on the triangle x ≥ 0, y ≥ 0, x + y ≤ 1
//! let problem = QuadraticProgram::new(identity(2), vec![-1., -2.])
//!     .inequalities(dense_from_rows(&[[1., 1.]])?, vec![1.])
//!     .lower_bounds(vec![0., 0.]);
//!
//! match solve_problem(&problem, "quadprog", &SolverOptions::default())? {
//!     SolveOutcome::Solution(x) => println!("x={}   y={}", x[0], x[1]),
//!     other => println!("no solution: {}", other),
//! }
//! # }
//! # Ok::<_, good_qp::Error>(())
//! ```
//!
//! ## Solvers
//!
//! Each solver is behind a cargo feature of the same name:
//!
//! | name       | feature    | matrices | bounds   | notes                       |
//! |------------|------------|----------|----------|-----------------------------|
//! | `clarabel` | `clarabel` | sparse   | expanded | pure rust, default          |
//! | `osqp`     | `osqp`     | sparse   | native   | needs cmake and a C compiler|
//! | `quadprog` | `quadprog` | dense    | expanded | pure rust, default, P ≻ 0   |
//!
//! ## Matrices
//!
//! Dense matrices are [nalgebra] `DMatrix<f64>` and sparse ones are [sprs]
//! `CsMat<f64>`; both crates are re-exported. The [matrix] module has the
//! constructors and conversions good_qp uses.
//!
//! Other solvers can be added to a [Registry] by implementing [QpSolver].

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use dispatch::{
    available_backends, default_registry, solve_ls, solve_problem, solve_qp, Registry,
};
pub use error::Error;
pub use matrix::{CscMatrix, DenseMatrix, Matrix, MatrixFormat};
pub use nalgebra;
pub use sprs;
pub use options::{OptionValue, SolverOptions};
pub use outcome::SolveOutcome;
pub use parameters::BackendKwargs;
pub use problem::{LeastSquares, QuadraticProgram};
pub use solvers::{BoxSupport, OptionScope, PreparedProblem, QpSolver};

#[cfg_attr(docsrs, doc(cfg(feature = "clarabel")))]
#[cfg(feature = "clarabel")]
pub use solvers::clarabel::Clarabel;
#[cfg_attr(docsrs, doc(cfg(feature = "osqp")))]
#[cfg(feature = "osqp")]
pub use solvers::osqp::Osqp;
#[cfg_attr(docsrs, doc(cfg(feature = "quadprog")))]
#[cfg(feature = "quadprog")]
pub use solvers::quadprog::Quadprog;

pub mod canonical;
pub mod dispatch;
mod error;
pub mod global_options;
pub mod matrix;
mod options;
mod outcome;
pub mod parameters;
mod problem;
pub mod solvers;
pub mod validation;

#[cfg(not(any(feature = "clarabel", feature = "osqp", feature = "quadprog")))]
compile_error!(
    "No solver available. \
You need to activate at least one solver feature flag in good_qp. \
You can do by adding the following to your Cargo.toml :
[dependencies]
good_qp = { version = \"*\", features = [\"clarabel\"] }
"
);
