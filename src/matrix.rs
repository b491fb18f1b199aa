//! Problem matrices, either dense or in compressed sparse column (CSC) form.
//!
//! Dense matrices are [nalgebra] matrices and sparse ones are [sprs] matrices.
//! Solvers disagree on the representation they want: clarabel and osqp take
//! CSC matrices holding only the upper triangle of `P`, quadprog takes full
//! dense row-major arrays. This module holds the conversions between the two
//! representations; each solver module then builds its own native type from
//! [csc_parts] or [row_major].
//!
//! Conversions are deterministic: a dense matrix is always traversed
//! column by column, and every non-zero entry is kept, however small.
use std::borrow::Cow;

use sprs::{CsMat, TriMat};

use crate::error::Error;

/// A dense matrix
pub type DenseMatrix = nalgebra::DMatrix<f64>;

/// A sparse matrix. [Matrix] only ever holds it in CSC storage.
pub type CscMatrix = CsMat<f64>;

/// The representation a solver expects its matrices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixFormat {
    /// Dense storage
    Dense,
    /// Compressed sparse column storage
    Sparse,
}

/// A matrix of the problem, in one of the two supported representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// A dense matrix
    Dense(DenseMatrix),
    /// A sparse matrix in CSC storage
    Sparse(CscMatrix),
}

impl Matrix {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Matrix::Dense(m) => m.shape(),
            Matrix::Sparse(m) => m.shape(),
        }
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.shape().1
    }

    /// The representation this matrix is currently stored in
    pub fn format(&self) -> MatrixFormat {
        match self {
            Matrix::Dense(_) => MatrixFormat::Dense,
            Matrix::Sparse(_) => MatrixFormat::Sparse,
        }
    }

    /// Borrow this matrix as CSC, converting it only if it is dense.
    pub fn to_csc(&self) -> Cow<'_, CscMatrix> {
        match self {
            Matrix::Dense(m) => Cow::Owned(dense_to_csc(m)),
            Matrix::Sparse(m) => Cow::Borrowed(m),
        }
    }

    /// Borrow this matrix as a dense matrix, converting it only if it is sparse.
    pub fn to_dense(&self) -> Cow<'_, DenseMatrix> {
        match self {
            Matrix::Dense(m) => Cow::Borrowed(m),
            Matrix::Sparse(m) => Cow::Owned(csc_to_dense(m)),
        }
    }

    /// Convert the matrix to the given representation.
    /// Nothing is copied when the matrix already has the right one.
    pub fn to_format(&self, format: MatrixFormat) -> Cow<'_, Matrix> {
        match (self, format) {
            (Matrix::Dense(_), MatrixFormat::Dense) | (Matrix::Sparse(_), MatrixFormat::Sparse) => {
                Cow::Borrowed(self)
            }
            (Matrix::Dense(m), MatrixFormat::Sparse) => {
                Cow::Owned(Matrix::Sparse(dense_to_csc(m)))
            }
            (Matrix::Sparse(m), MatrixFormat::Dense) => {
                Cow::Owned(Matrix::Dense(csc_to_dense(m)))
            }
        }
    }

    /// Like [Matrix::to_format], but consumes the matrix
    pub fn into_format(self, format: MatrixFormat) -> Matrix {
        match (self, format) {
            (Matrix::Dense(m), MatrixFormat::Sparse) => Matrix::Sparse(dense_to_csc(&m)),
            (Matrix::Sparse(m), MatrixFormat::Dense) => Matrix::Dense(csc_to_dense(&m)),
            (m, _) => m,
        }
    }

    /// Stack `other` below `self`.
    /// The result is dense only if both operands are dense.
    pub fn vstack(&self, other: &Matrix) -> Result<Matrix, Error> {
        check_stackable(self.ncols(), other.ncols())?;
        Ok(match (self, other) {
            (Matrix::Dense(top), Matrix::Dense(bottom)) => {
                let split = top.nrows();
                Matrix::Dense(DenseMatrix::from_fn(
                    split + bottom.nrows(),
                    top.ncols(),
                    |i, j| {
                        if i < split {
                            top[(i, j)]
                        } else {
                            bottom[(i - split, j)]
                        }
                    },
                ))
            }
            (top, bottom) => Matrix::Sparse(vstack(&top.to_csc(), &bottom.to_csc())?),
        })
    }
}

impl From<DenseMatrix> for Matrix {
    fn from(m: DenseMatrix) -> Self {
        Matrix::Dense(m)
    }
}

impl From<CscMatrix> for Matrix {
    /// CSR matrices are converted to CSC
    fn from(m: CscMatrix) -> Self {
        if m.is_csc() {
            Matrix::Sparse(m)
        } else {
            Matrix::Sparse(m.to_csc())
        }
    }
}

/// Create a dense matrix from a list of rows of equal length.
///
/// ```
/// use good_qp::matrix::dense_from_rows;
/// let m = dense_from_rows(&[[1., 2.], [3., 4.]]).unwrap();
/// assert_eq!(m[(1, 0)], 3.);
/// ```
pub fn dense_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<DenseMatrix, Error> {
    let cols = rows.first().map_or(0, |r| r.as_ref().len());
    if let Some((i, row)) = rows
        .iter()
        .map(AsRef::as_ref)
        .enumerate()
        .find(|(_, row)| row.len() != cols)
    {
        return Err(Error::malformed(format!(
            "row {} has {} columns, expected {}",
            i,
            row.len(),
            cols
        )));
    }
    Ok(DenseMatrix::from_fn(rows.len(), cols, |i, j| rows[i].as_ref()[j]))
}

/// Create a dense matrix from its row-major values
pub fn dense_from_row_major(rows: usize, cols: usize, data: &[f64]) -> Result<DenseMatrix, Error> {
    if data.len() != rows * cols {
        return Err(Error::malformed(format!(
            "a {}x{} matrix needs {} values, got {}",
            rows,
            cols,
            rows * cols,
            data.len()
        )));
    }
    Ok(DenseMatrix::from_row_slice(rows, cols, data))
}

/// Create a CSC matrix from its raw parts, checking that they are coherent.
/// Row indices must be increasing inside each column.
pub fn csc(
    nrows: usize,
    ncols: usize,
    colptr: Vec<usize>,
    rowval: Vec<usize>,
    nzval: Vec<f64>,
) -> Result<CscMatrix, Error> {
    if colptr.len() != ncols + 1 || colptr.first() != Some(&0) {
        return Err(Error::malformed(format!(
            "colptr must start at 0 and have {} elements",
            ncols + 1
        )));
    }
    if let Some(col) = colptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::malformed(format!("colptr decreases at column {}", col)));
    }
    if rowval.len() != nzval.len() || colptr[ncols] != nzval.len() {
        return Err(Error::malformed(
            "rowval, nzval and the last colptr element must agree on the number of entries",
        ));
    }
    CsMat::try_new_csc((nrows, ncols), colptr, rowval, nzval)
        .map_err(|(_, _, _, e)| Error::malformed(format!("invalid CSC matrix: {:?}", e)))
}

/// Build a CSC matrix from `(row, column, value)` triplets in any order.
/// Values given several times for the same position are summed.
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> Result<CscMatrix, Error>
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (row, col, value) in triplets {
        if row >= nrows || col >= ncols {
            return Err(Error::malformed(format!(
                "entry ({}, {}) is outside of a {}x{} matrix",
                row, col, nrows, ncols
            )));
        }
        tri.add_triplet(row, col, value);
    }
    Ok(tri.to_csc())
}

/// An empty CSC matrix of the given shape
pub fn zeros(nrows: usize, ncols: usize) -> CscMatrix {
    TriMat::new((nrows, ncols)).to_csc()
}

/// The identity matrix of size n
pub fn identity(n: usize) -> CscMatrix {
    let mut tri = TriMat::with_capacity((n, n), n);
    for i in 0..n {
        tri.add_triplet(i, i, 1.);
    }
    tri.to_csc()
}

/// Convert to CSC, traversing the matrix column by column.
/// Every entry that is not exactly zero is stored.
pub fn dense_to_csc(m: &DenseMatrix) -> CscMatrix {
    let mut tri = TriMat::new(m.shape());
    // nalgebra stores its values column by column
    for (k, &value) in m.iter().enumerate() {
        if value != 0. {
            tri.add_triplet(k % m.nrows(), k / m.nrows(), value);
        }
    }
    tri.to_csc()
}

/// Scatter the stored entries into a dense matrix
pub fn csc_to_dense(m: &CscMatrix) -> DenseMatrix {
    let mut dense = DenseMatrix::zeros(m.rows(), m.cols());
    for (&value, (row, col)) in m.iter() {
        dense[(row, col)] = value;
    }
    dense
}

/// The values of a dense matrix, row after row
pub fn row_major(m: &DenseMatrix) -> Vec<f64> {
    m.transpose().as_slice().to_vec()
}

/// Decompose a matrix into (nrows, ncols, colptr, rowval, nzval),
/// the CSC arrays every sparse solver takes.
pub fn csc_parts(m: &CscMatrix) -> (usize, usize, Vec<usize>, Vec<usize>, Vec<f64>) {
    let m = if m.is_csc() {
        Cow::Borrowed(m)
    } else {
        Cow::Owned(m.to_csc())
    };
    let mut colptr = Vec::with_capacity(m.cols() + 1);
    let mut rowval = Vec::with_capacity(m.nnz());
    let mut nzval = Vec::with_capacity(m.nnz());
    colptr.push(0);
    for column in m.outer_iterator() {
        for (row, &value) in column.iter() {
            rowval.push(row);
            nzval.push(value);
        }
        colptr.push(rowval.len());
    }
    (m.rows(), m.cols(), colptr, rowval, nzval)
}

/// Keep the lower triangle (diagonal included) and return it transposed,
/// which is the upper triangle of the symmetric matrix it describes.
pub fn lower_to_upper(m: &CscMatrix) -> CscMatrix {
    let (rows, cols) = m.shape();
    let mut tri = TriMat::new((cols, rows));
    for (&value, (row, col)) in m.iter() {
        if row >= col {
            tri.add_triplet(col, row, value);
        }
    }
    tri.to_csc()
}

/// Build the full symmetric matrix described by the lower triangle of a
/// square matrix. Entries above the diagonal are ignored.
pub fn symmetric_from_lower(m: &DenseMatrix) -> DenseMatrix {
    DenseMatrix::from_fn(m.nrows(), m.ncols(), |i, j| {
        if i >= j {
            m[(i, j)]
        } else {
            m[(j, i)]
        }
    })
}

/// Stack `bottom` below `top`
pub fn vstack(top: &CscMatrix, bottom: &CscMatrix) -> Result<CscMatrix, Error> {
    check_stackable(top.cols(), bottom.cols())?;
    let split = top.rows();
    let shape = (split + bottom.rows(), top.cols());
    let mut tri = TriMat::with_capacity(shape, top.nnz() + bottom.nnz());
    for (&value, (row, col)) in top.iter() {
        tri.add_triplet(row, col, value);
    }
    for (&value, (row, col)) in bottom.iter() {
        tri.add_triplet(split + row, col, value);
    }
    Ok(tri.to_csc())
}

fn check_stackable(top: usize, bottom: usize) -> Result<(), Error> {
    if top != bottom {
        return Err(Error::malformed(format!(
            "cannot stack a matrix with {} columns below one with {}",
            bottom, top
        )));
    }
    Ok(())
}
