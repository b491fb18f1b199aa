//! Rewriting of box constraints `lb ≤ x ≤ ub` as linear inequalities `Gx ≤ h`,
//! for solvers that have no native notion of variable bounds.
use tracing::debug;

use crate::error::Error;
use crate::matrix::{from_triplets, DenseMatrix, Matrix};

/// Append the finite bounds to the inequality constraints.
///
/// The rows of the result are, in order:
///  - the rows of `G`,
///  - `-x_i ≤ -lb_i` for each finite `lb_i`, by increasing `i`,
///  - `x_i ≤ ub_i` for each finite `ub_i`, by increasing `i`.
///
/// A dense `G` stays dense and a sparse one stays sparse. Without `G`, the
/// new rows are sparse. When there is neither `G` nor any finite bound,
/// `(None, None)` is returned: no empty matrix is ever created.
pub fn canonicalize_box(
    g: Option<&Matrix>,
    h: Option<&[f64]>,
    lb: Option<&[f64]>,
    ub: Option<&[f64]>,
) -> Result<(Option<Matrix>, Option<Vec<f64>>), Error> {
    let n = match (g, lb, ub) {
        (Some(g), _, _) => g.ncols(),
        (None, Some(lb), _) => lb.len(),
        (None, None, Some(ub)) => ub.len(),
        (None, None, None) => return Ok((g.cloned(), h.map(<[f64]>::to_vec))),
    };
    for (name, bounds) in [("lb", lb), ("ub", ub)].iter() {
        if let Some(bounds) = bounds {
            if bounds.len() != n {
                return Err(Error::malformed(format!(
                    "{} has length {} but the problem has {} variables",
                    name,
                    bounds.len(),
                    n
                )));
            }
            if bounds.iter().any(|v| v.is_nan()) {
                return Err(Error::malformed(format!("{} contains NaN", name)));
            }
        }
    }
    // (variable index, coefficient, right hand side)
    let rows: Vec<(usize, f64, f64)> = finite(lb)
        .map(|(i, l)| (i, -1., -l))
        .chain(finite(ub).map(|(i, u)| (i, 1., u)))
        .collect();
    debug!(
        "{} box constraints turned into inequalities on {} variables",
        rows.len(),
        n
    );
    if rows.is_empty() {
        return Ok((g.cloned(), h.map(<[f64]>::to_vec)));
    }
    let mut rhs = h.map(<[f64]>::to_vec).unwrap_or_default();
    rhs.extend(rows.iter().map(|&(_, _, r)| r));
    let triplets = rows.iter().enumerate().map(|(k, &(i, coef, _))| (k, i, coef));
    let bound_rows = match g {
        Some(Matrix::Dense(_)) => {
            let mut dense = DenseMatrix::zeros(rows.len(), n);
            for (k, i, coef) in triplets {
                dense[(k, i)] = coef;
            }
            Matrix::Dense(dense)
        }
        _ => Matrix::Sparse(from_triplets(rows.len(), n, triplets)?),
    };
    let stacked = match g {
        Some(g) => g.vstack(&bound_rows)?,
        None => bound_rows,
    };
    Ok((Some(stacked), Some(rhs)))
}

fn finite(bounds: Option<&[f64]>) -> impl Iterator<Item = (usize, f64)> + '_ {
    bounds
        .into_iter()
        .flat_map(|b| b.iter().copied().enumerate())
        .filter(|(_, v)| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{dense_from_rows, row_major, MatrixFormat};

    const INF: f64 = f64::INFINITY;

    #[test]
    fn bounds_without_inequalities() {
        let (g, h) = canonicalize_box(None, None, Some(&[-1., -INF]), Some(&[INF, 2.])).unwrap();
        let g = g.unwrap();
        assert_eq!(g.format(), MatrixFormat::Sparse);
        assert_eq!(g.shape(), (2, 2));
        // -x0 <= 1, then x1 <= 2
        assert_eq!(
            g.to_dense().into_owned(),
            dense_from_rows(&[[-1., 0.], [0., 1.]]).unwrap()
        );
        assert_eq!(h.unwrap(), vec![1., 2.]);
    }

    #[test]
    fn original_rows_come_first() {
        let g: Matrix = dense_from_rows(&[[1., 1., 1.]]).unwrap().into();
        let (g, h) = canonicalize_box(
            Some(&g),
            Some(&[3.]),
            Some(&[0., -INF, 1.]),
            Some(&[5., 6., INF]),
        )
        .unwrap();
        let g = g.unwrap();
        assert_eq!(g.format(), MatrixFormat::Dense);
        assert_eq!(
            row_major(&g.to_dense()),
            vec![
                1., 1., 1., //
                -1., 0., 0., // lb_0
                0., 0., -1., // lb_2
                1., 0., 0., // ub_0
                0., 1., 0., // ub_1
            ]
        );
        assert_eq!(h.unwrap(), vec![3., 0., -1., 5., 6.]);
    }

    #[test]
    fn infinite_bounds_add_nothing() {
        assert_eq!(
            canonicalize_box(None, None, Some(&[-INF, -INF]), Some(&[INF, INF])).unwrap(),
            (None, None)
        );
        assert_eq!(canonicalize_box(None, None, None, None).unwrap(), (None, None));
    }

    #[test]
    fn inequalities_are_kept_as_is_without_bounds() {
        let g: Matrix = dense_from_rows(&[[1., 2.]]).unwrap().into();
        let (g2, h2) = canonicalize_box(Some(&g), Some(&[1.]), None, Some(&[INF, INF])).unwrap();
        assert_eq!(g2, Some(g));
        assert_eq!(h2, Some(vec![1.]));
    }

    #[test]
    fn bound_length_is_checked() {
        let g: Matrix = dense_from_rows(&[[1., 2.]]).unwrap().into();
        assert!(canonicalize_box(Some(&g), Some(&[1.]), Some(&[0.]), None).is_err());
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let err = canonicalize_box(None, None, None, Some(&[f64::NAN])).unwrap_err();
        assert!(matches!(err, Error::MalformedProblem(_)));
    }
}
