//! Matrix helpers shared by the estimators and controllers.

use na::storage::{Storage, StorageMut};
use na::{allocator::Allocator, DefaultAllocator, Dim, Matrix, MatrixN, RealField, Scalar, SquareMatrix, Vector};
use nalgebra as na;
use nalgebra::constraint::{DimEq, ShapeConstraint};

use crate::error::EstimateError;

/// Computes the quadratic form `self = alpha * lhs * mid * lhs.transpose() + beta * self`.
///
/// 'mid' is a diagonal matrix represented by a Vector.
pub fn quadform_tr<N: RealField, D1, S, R3, C3, S3, D4, S4>(
    mat: &mut SquareMatrix<N, D1, S>,
    alpha: N,
    lhs: &Matrix<N, R3, C3, S3>,
    mid: &Vector<N, D4, S4>,
    beta: N,
) where
    D1: Dim,
    S: StorageMut<N, D1, D1>,
    R3: Dim,
    C3: Dim,
    D4: Dim,
    S3: Storage<N, R3, C3>,
    S4: Storage<N, D4>,
    ShapeConstraint: DimEq<D1, R3> + DimEq<C3, D4>,
{
    if mid.nrows() == 0 {
        *mat *= beta;
        return;
    }
    mat.ger(alpha * mid[0], &lhs.column(0), &lhs.column(0), beta);

    for j in 1..mid.nrows() {
        mat.ger(alpha * mid[j], &lhs.column(j), &lhs.column(j), N::one());
    }
}

/// Checks a the reciprocal condition number is > 0 .
///
/// IEC 559 NaN values are never true
pub fn check_positive<N: RealField>(rcond: N, message: &'static str) -> Result<N, EstimateError> {
    if rcond > N::zero() {
        Ok(rcond)
    } else {
        Err(EstimateError::Singular(message))
    }
}

/// Checks a the reciprocal condition number is >= 0 .
///
/// IEC 559 NaN values are never true
pub fn check_non_negativ<N: RealField>(rcond: N, message: &'static str) -> Result<N, EstimateError> {
    if rcond >= N::zero() {
        Ok(rcond)
    } else {
        Err(EstimateError::NotPSD(message))
    }
}

/// Checks a matrix (or vector) has the expected (rows, columns).
pub fn check_shape<N: Scalar, R: Dim, C: Dim, S: Storage<N, R, C>>(
    what: &'static str,
    m: &Matrix<N, R, C, S>,
    expected: (usize, usize),
) -> Result<(), EstimateError> {
    let found = m.shape();
    if found == expected {
        Ok(())
    } else {
        Err(EstimateError::DimensionMismatch { what, expected, found })
    }
}

/// Makes a square matrix exactly symmetric by averaging it with its transpose.
pub fn symmetrize<N: RealField, D: Dim>(m: &mut MatrixN<N, D>)
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let half: N = na::convert(0.5);
    for j in 0..m.ncols() {
        for i in 0..j {
            let avg = (m[(i, j)] + m[(j, i)]) * half;
            m[(i, j)] = avg;
            m[(j, i)] = avg;
        }
    }
}

/// True when no element is NaN or infinite.
pub fn all_finite<N: RealField, R: Dim, C: Dim, S: Storage<N, R, C>>(m: &Matrix<N, R, C, S>) -> bool {
    m.iter().all(|e| e.is_finite())
}
