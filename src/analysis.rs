//! Statistics of simulated and estimated trajectories.
//!
//! Scalar series are generic over [`num_traits::Float`], vector trajectories over nalgebra's RealField.

use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, VectorN};
use nalgebra as na;
use num_traits::{Float, FromPrimitive};

use crate::error::EstimateError;

/// Naive velocity from successive positions, `v[t] = (p[t] - p[t-1]) / dt` and `v[0] = 0`.
pub fn finite_difference<T: Float>(positions: &[T], dt: T) -> Vec<T> {
    let mut v = Vec::with_capacity(positions.len());
    if positions.is_empty() {
        return v;
    }
    v.push(T::zero());
    for w in positions.windows(2) {
        v.push((w[1] - w[0]) / dt);
    }
    v
}

/// Root mean square of the differences of two series.
pub fn rmse<T: Float + FromPrimitive>(a: &[T], b: &[T]) -> Result<T, EstimateError> {
    if a.len() != b.len() {
        return Err(EstimateError::LengthMismatch {
            what: "rmse series",
            expected: a.len(),
            found: b.len(),
        });
    }
    let n = T::from_usize(a.len())
        .filter(|n| *n > T::zero())
        .ok_or(EstimateError::InvalidParameter("rmse of empty series"))?;
    let sum = a
        .iter()
        .zip(b)
        .fold(T::zero(), |sum, (ai, bi)| sum + (*ai - *bi) * (*ai - *bi));
    Ok((sum / n).sqrt())
}

/// Sample autocorrelation `R(k) = 1/(T-k) Σ x[t] x[t+k]` for lags `0..=max_lag`.
///
/// Lags are limited to the length of the series. The series is expected to be zero mean.
pub fn autocorrelation<T: Float + FromPrimitive>(series: &[T], max_lag: usize) -> Vec<T> {
    let len = series.len();
    (0..=max_lag)
        .take_while(|k| *k < len)
        .filter_map(|k| {
            let sum = series[..len - k]
                .iter()
                .zip(&series[k..])
                .fold(T::zero(), |sum, (a, b)| sum + *a * *b);
            T::from_usize(len - k).map(|n| sum / n)
        })
        .collect()
}

/// The series less its sample mean.
pub fn remove_mean<T: Float + FromPrimitive>(series: &[T]) -> Vec<T> {
    let mean = match T::from_usize(series.len()) {
        Some(n) if n > T::zero() => series.iter().fold(T::zero(), |sum, x| sum + *x) / n,
        _ => T::zero(),
    };
    series.iter().map(|x| *x - mean).collect()
}

/// Autocorrelation normalised by its zero lag value.
pub fn normalise<T: Float>(acf: &[T]) -> Vec<T> {
    match acf.first() {
        Some(r0) if *r0 > T::zero() => acf.iter().map(|r| *r / *r0).collect(),
        _ => Vec::new(),
    }
}

/// Component i of each vector of a trajectory.
pub fn component<N: RealField, D: Dim>(trajectory: &[VectorN<N, D>], i: usize) -> Vec<N>
where
    DefaultAllocator: Allocator<N, D>,
{
    trajectory.iter().map(|x| x[i]).collect()
}

/// Largest absolute element difference between two trajectories.
pub fn max_abs_error<N: RealField, D: Dim>(a: &[VectorN<N, D>], b: &[VectorN<N, D>]) -> Result<N, EstimateError>
where
    DefaultAllocator: Allocator<N, D>,
{
    if a.len() != b.len() {
        return Err(EstimateError::LengthMismatch {
            what: "trajectory",
            expected: a.len(),
            found: b.len(),
        });
    }
    let mut max = N::zero();
    for (ai, bi) in a.iter().zip(b) {
        if ai.shape() != bi.shape() {
            return Err(EstimateError::DimensionMismatch {
                what: "trajectory state",
                expected: ai.shape(),
                found: bi.shape(),
            });
        }
        let e = (ai - bi).amax();
        if e > max {
            max = e;
        }
    }
    Ok(max)
}
