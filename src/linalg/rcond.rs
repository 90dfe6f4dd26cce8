//! Numerical comparison of reciprocal condition numbers.
//!
//! Required for all linear algebra in models and filters.

use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, RealField, VectorN};

/// Estimate the reciprocal condition number of a Diagonal Matrix for inversion.
/// D represents a diagonal matrix, the parameter is actually passed as a vector.
///
/// The Condition Number is defined from a matrix norm.
///  Choose max element of D as the norm of the original matrix.
///  Assume this norm for inverse matrix is min element D.
///  Therefore rcond = min/max
///
/// Note:
///  Defined to be 0 for semi-definite and 0 for an empty matrix
///  Defined to be 0 for max and min infinite
///  Defined to be <0 for negative matrix (D element a value  < 0)
///  Defined to be <0 with any NaN element
pub fn rcond_vec<N: RealField, R: Dim>(dv: &VectorN<N, R>) -> N
where
    DefaultAllocator: Allocator<N, R>,
{
    rcond_diagonal(dv.nrows(), |i| dv[i])
}

/// Estimate the reciprocal condition number of the diagonal of a symmetric (or factorised) matrix.
pub fn rcond_symetric<N: RealField, R: Dim, C: Dim>(sm: &MatrixMN<N, R, C>) -> N
where
    DefaultAllocator: Allocator<N, R, C>,
{
    rcond_diagonal(sm.nrows().min(sm.ncols()), |i| sm[(i, i)])
}

fn rcond_diagonal<N: RealField>(n: usize, d: impl Fn(usize) -> N) -> N {
    // Special case an empty matrix
    if n == 0 {
        return N::zero();
    }
    let mut mind = d(0);
    let mut maxd = mind;

    for i in 0..n {
        let di = d(i);
        if di != di {
            // NaN
            mind = -N::one();
            break;
        }
        if di < mind {
            mind = di;
        }
        if di > maxd {
            maxd = di;
        }
    }

    rcond_min_max(mind, maxd)
}

fn rcond_min_max<N: RealField>(mind: N, maxd: N) -> N {
    if mind < N::zero() {
        // matrix is negative, mind < 0 but does not represent a rcond
        mind
    } else {
        // ISSUE mind may still be -0, this is progated into rcond
        debug_assert!(mind <= maxd);

        let rcond = mind / maxd; // rcond from min/max norm
        if rcond != rcond {
            // NaN, singular due to (mind == maxd) == (zero or infinity)
            N::zero()
        } else {
            rcond
        }
    }
}
