//! Structural checks run before anything is converted or sent to a solver.
//!
//! Nothing here looks at matrix values: rank or convexity requirements differ
//! from one solver to the next and are left to them.
use crate::error::Error;
use crate::matrix::Matrix;
use crate::problem::QuadraticProgram;

/// Check that the constraint matrices and vectors come in pairs:
/// `G` with `h`, and `A` with `b`.
pub fn validate(
    g: Option<&Matrix>,
    h: Option<&[f64]>,
    a: Option<&Matrix>,
    b: Option<&[f64]>,
) -> Result<(), Error> {
    match (g.is_some(), h.is_some()) {
        (false, true) => {
            return Err(Error::malformed(
                "incomplete inequality constraint (missing G)",
            ))
        }
        (true, false) => {
            return Err(Error::malformed(
                "incomplete inequality constraint (missing h)",
            ))
        }
        _ => {}
    }
    match (a.is_some(), b.is_some()) {
        (false, true) => Err(Error::malformed("incomplete equality constraint (missing A)")),
        (true, false) => Err(Error::malformed("incomplete equality constraint (missing b)")),
        _ => Ok(()),
    }
}

/// Check that all the shapes of the problem agree on the number of variables,
/// and that every constraint matrix has as many rows as its vector.
/// A problem must have at least one variable, and its bounds cannot be NaN.
pub fn check_dimensions(problem: &QuadraticProgram) -> Result<(), Error> {
    let n = problem.q.len();
    if n == 0 {
        return Err(Error::malformed("the problem has no variables"));
    }
    let (p_rows, p_cols) = problem.p.shape();
    if p_rows != n || p_cols != n {
        return Err(Error::malformed(format!(
            "P is {}x{} but q has length {}",
            p_rows, p_cols, n
        )));
    }
    check_pair("G", "h", problem.g.as_ref(), problem.h.as_deref(), n)?;
    check_pair("A", "b", problem.a.as_ref(), problem.b.as_deref(), n)?;
    check_bounds("lb", problem.lb.as_deref(), n)?;
    check_bounds("ub", problem.ub.as_deref(), n)?;
    check_length("initvals", problem.initvals.as_deref(), n)
}

fn check_pair(
    matrix_name: &str,
    vector_name: &str,
    matrix: Option<&Matrix>,
    vector: Option<&[f64]>,
    n: usize,
) -> Result<(), Error> {
    if let (Some(matrix), Some(vector)) = (matrix, vector) {
        let (rows, cols) = matrix.shape();
        if cols != n {
            return Err(Error::malformed(format!(
                "{} has {} columns but the problem has {} variables",
                matrix_name, cols, n
            )));
        }
        if rows != vector.len() {
            return Err(Error::malformed(format!(
                "{} has {} rows but {} has length {}",
                matrix_name,
                rows,
                vector_name,
                vector.len()
            )));
        }
    }
    Ok(())
}

fn check_length(name: &str, vector: Option<&[f64]>, n: usize) -> Result<(), Error> {
    match vector {
        Some(v) if v.len() != n => Err(Error::malformed(format!(
            "{} has length {} but the problem has {} variables",
            name,
            v.len(),
            n
        ))),
        _ => Ok(()),
    }
}

fn check_bounds(name: &str, bounds: Option<&[f64]>, n: usize) -> Result<(), Error> {
    check_length(name, bounds, n)?;
    if let Some(i) = bounds.and_then(|b| b.iter().position(|v| v.is_nan())) {
        return Err(Error::malformed(format!("{}[{}] is NaN", name, i)));
    }
    Ok(())
}
