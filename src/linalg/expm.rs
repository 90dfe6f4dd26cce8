//! Matrix exponential.
//!
//! Scaling and squaring of a truncated Taylor series: exp(M) = exp(M / 2^s)^(2^s),
//! with s chosen so the scaled matrix has a Frobenius norm of at most 1/2.
//! At that norm 18 Taylor terms are well below f64 round off.

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField};
use nalgebra as na;

use crate::error::EstimateError;
use crate::matrix::{all_finite, check_shape};

const TAYLOR_TERMS: usize = 18;
const MAX_SQUARINGS: usize = 1024;

/// Matrix exponential of a square matrix.
pub fn expm<N: RealField, D: Dim>(m: &MatrixN<N, D>) -> Result<MatrixN<N, D>, EstimateError>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    check_shape("exponent matrix", m, (m.nrows(), m.nrows()))?;
    if !all_finite(m) {
        return Err(EstimateError::InvalidParameter("exponent matrix not finite"));
    }
    let (d, _) = m.data.shape();
    let half: N = na::convert(0.5);

    let mut scaled = m.clone();
    let mut norm = m.norm();
    let mut squarings = 0;
    while norm > half && squarings < MAX_SQUARINGS {
        scaled *= half;
        norm *= half;
        squarings += 1;
    }

    let mut result = MatrixN::<N, D>::identity_generic(d, d);
    let mut term = result.clone();
    let mut k = N::zero();
    for _ in 0..TAYLOR_TERMS {
        k += N::one();
        term = &term * &scaled / k;
        result += &term;
    }

    for _ in 0..squarings {
        result = &result * &result;
    }

    Ok(result)
}
