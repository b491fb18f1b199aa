//! The quadratic programs handed to the solvers.
use crate::error::Error;
use crate::matrix::{from_triplets, zeros, DenseMatrix, Matrix};
use crate::validation::check_dimensions;

/// A convex quadratic program:
///
/// ```text
/// minimize    ½ xᵀPx + qᵀx
/// subject to  Gx ≤ h
///             Ax = b
///             lb ≤ x ≤ ub
/// ```
///
/// Only the lower triangle of `P` (diagonal included) is read.
/// good_qp never averages `P` with its transpose: the lower triangle is
/// mirrored into whatever form each solver expects, and anything strictly
/// above the diagonal is ignored.
///
/// Missing bounds are represented by infinite values:
/// `lb = [-1, f64::NEG_INFINITY]` bounds only the first variable from below.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticProgram {
    /// Quadratic cost matrix, n x n
    pub p: Matrix,
    /// Linear cost vector, length n
    pub q: Vec<f64>,
    /// Linear inequality matrix, m x n
    pub g: Option<Matrix>,
    /// Linear inequality vector, length m
    pub h: Option<Vec<f64>>,
    /// Linear equality matrix, p x n
    pub a: Option<Matrix>,
    /// Linear equality vector, length p
    pub b: Option<Vec<f64>>,
    /// Lower bounds on the variables, length n
    pub lb: Option<Vec<f64>>,
    /// Upper bounds on the variables, length n
    pub ub: Option<Vec<f64>>,
    /// Initial guess for the solution, length n
    pub initvals: Option<Vec<f64>>,
}

impl QuadraticProgram {
    /// An unconstrained problem with the given costs
    pub fn new<M: Into<Matrix>>(p: M, q: Vec<f64>) -> Self {
        QuadraticProgram {
            p: p.into(),
            q,
            g: None,
            h: None,
            a: None,
            b: None,
            lb: None,
            ub: None,
            initvals: None,
        }
    }

    /// Number of variables
    pub fn n_variables(&self) -> usize {
        self.q.len()
    }

    /// Add the inequality constraints `Gx ≤ h`
    pub fn inequalities<M: Into<Matrix>>(mut self, g: M, h: Vec<f64>) -> Self {
        self.g = Some(g.into());
        self.h = Some(h);
        self
    }

    /// Add the equality constraints `Ax = b`
    pub fn equalities<M: Into<Matrix>>(mut self, a: M, b: Vec<f64>) -> Self {
        self.a = Some(a.into());
        self.b = Some(b);
        self
    }

    /// Bound the variables from below
    pub fn lower_bounds(mut self, lb: Vec<f64>) -> Self {
        self.lb = Some(lb);
        self
    }

    /// Bound the variables from above
    pub fn upper_bounds(mut self, ub: Vec<f64>) -> Self {
        self.ub = Some(ub);
        self
    }

    /// Give the solver a starting point. Solvers that cannot warm start ignore it.
    pub fn with_initial_solution(mut self, initvals: Vec<f64>) -> Self {
        self.initvals = Some(initvals);
        self
    }

    /// Evaluate the objective `½ xᵀPx + qᵀx`, reading only the lower triangle of `P`.
    pub fn objective(&self, x: &[f64]) -> Result<f64, Error> {
        self.check_point(x)?;
        let quadratic: f64 = self
            .p
            .to_csc()
            .iter()
            .filter(|&(_, (row, col))| row >= col)
            .map(|(&value, (row, col))| {
                let term = value * x[row] * x[col];
                if row == col {
                    term / 2.
                } else {
                    term
                }
            })
            .sum();
        Ok(quadratic + dot(&self.q, x))
    }

    /// The largest constraint violation at `x`, or 0 if `x` is feasible.
    pub fn primal_residual(&self, x: &[f64]) -> Result<f64, Error> {
        self.check_point(x)?;
        let mut residual: f64 = 0.;
        if let (Some(g), Some(h)) = (&self.g, &self.h) {
            for (gx, hi) in mat_vec(g, x).into_iter().zip(h) {
                residual = residual.max(gx - hi);
            }
        }
        if let (Some(a), Some(b)) = (&self.a, &self.b) {
            for (ax, bi) in mat_vec(a, x).into_iter().zip(b) {
                residual = residual.max((ax - bi).abs());
            }
        }
        if let Some(lb) = &self.lb {
            for (xi, li) in x.iter().zip(lb) {
                residual = residual.max(li - xi);
            }
        }
        if let Some(ub) = &self.ub {
            for (xi, ui) in x.iter().zip(ub) {
                residual = residual.max(xi - ui);
            }
        }
        Ok(residual)
    }

    fn check_point(&self, x: &[f64]) -> Result<(), Error> {
        check_dimensions(self)?;
        if x.len() != self.n_variables() {
            return Err(Error::malformed(format!(
                "x has length {} but the problem has {} variables",
                x.len(),
                self.n_variables()
            )));
        }
        Ok(())
    }
}

/// A constrained weighted least-squares problem:
///
/// ```text
/// minimize    ½ ‖Rx − s‖²_W
/// subject to  Gx ≤ h
///             Ax = b
///             lb ≤ x ≤ ub
/// ```
///
/// It is solved as the quadratic program with `P = RᵀWR` and `q = −RᵀWs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    /// Least-squares matrix, k x n
    pub r: Matrix,
    /// Target vector, length k
    pub s: Vec<f64>,
    /// Positive weight of each residual, length k. Unit weights when absent.
    pub w: Option<Vec<f64>>,
    /// The constraints, `p` and `q` of this problem are ignored
    pub constraints: QuadraticProgram,
}

impl LeastSquares {
    /// Minimize `½ ‖Rx − s‖²` without constraints
    pub fn new<M: Into<Matrix>>(r: M, s: Vec<f64>) -> Self {
        let r = r.into();
        let n = r.ncols();
        LeastSquares {
            r,
            s,
            w: None,
            constraints: QuadraticProgram::new(zeros(n, n), vec![0.; n]),
        }
    }

    /// Weight the residuals
    pub fn weights(mut self, w: Vec<f64>) -> Self {
        self.w = Some(w);
        self
    }

    /// Set the constraints, the costs of `constraints` are discarded
    pub fn subject_to(mut self, constraints: QuadraticProgram) -> Self {
        self.constraints = constraints;
        self
    }

    /// The equivalent quadratic program
    pub fn to_quadratic_program(&self) -> Result<QuadraticProgram, Error> {
        let (k, n) = self.r.shape();
        if self.s.len() != k {
            return Err(Error::malformed(format!(
                "s has length {} but R has {} rows",
                self.s.len(),
                k
            )));
        }
        let weights = match &self.w {
            Some(w) if w.len() != k => {
                return Err(Error::malformed(format!(
                    "w has length {} but R has {} rows",
                    w.len(),
                    k
                )))
            }
            Some(w) => w.clone(),
            None => vec![1.; k],
        };
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); k];
        for (&value, (row, col)) in self.r.to_csc().iter() {
            rows[row].push((col, value));
        }
        let mut q = vec![0.; n];
        // lower triangle of RᵀWR, duplicates are summed
        let mut triplets = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            for &(c1, v1) in row {
                q[c1] -= v1 * weights[i] * self.s[i];
                for &(c2, v2) in row.iter().filter(|&&(c2, _)| c2 <= c1) {
                    triplets.push((c1, c2, v1 * weights[i] * v2));
                }
            }
        }
        let p = match self.r {
            Matrix::Dense(_) => {
                let mut p = DenseMatrix::zeros(n, n);
                for (row, col, value) in triplets {
                    p[(row, col)] += value;
                }
                Matrix::Dense(p)
            }
            Matrix::Sparse(_) => Matrix::Sparse(from_triplets(n, n, triplets)?),
        };
        Ok(QuadraticProgram {
            p,
            q,
            ..self.constraints.clone()
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn mat_vec(m: &Matrix, x: &[f64]) -> Vec<f64> {
    let mut out = vec![0.; m.nrows()];
    for (&value, (row, col)) in m.to_csc().iter() {
        out[row] += value * x[col];
    }
    out
}
