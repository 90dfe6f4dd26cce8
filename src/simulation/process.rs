#![allow(non_snake_case)]

//! Linear processes driven by white noise.
//!
//! `x[t+1] = A x[t] + v[t]` with `v` zero mean Gaussian white noise of covariance Q. White noise has an autocorrelation
//! concentrated at lag zero, filtering it through A spreads the correlation over later lags.

use log::debug;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, VectorN};
use nalgebra as na;
use num_traits::Float;
use rand_core::RngCore;

use crate::error::EstimateError;
use crate::linalg::rcond;
use crate::matrix::{check_shape, symmetrize};
use crate::noise::{CorrelatedNoise, CoupledNoise};

#[derive(PartialEq, Clone)]
pub struct LinearProcess<D: Dim>
where
    DefaultAllocator: Allocator<f64, D, D>,
{
    /// State transition
    pub A: MatrixN<f64, D>,
    pub noise: CorrelatedNoise<f64, D>,
}

// Convergence of the stationary covariance iteration, relative to its trace
const STATIONARY_TOLERANCE: f64 = 1e-12;
const STATIONARY_ITERATIONS: usize = 100_000;

impl<D: Dim> LinearProcess<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    pub fn new(A: MatrixN<f64, D>, noise: CorrelatedNoise<f64, D>) -> Result<Self, EstimateError> {
        let n = A.nrows();
        check_shape("A", &A, (n, n))?;
        check_shape("Q", &noise.Q, (n, n))?;
        noise.check_psd("Q not PSD")?;
        Ok(LinearProcess { A, noise })
    }

    /// Process with noise entering through a coupling, `Q = G q G'`.
    pub fn from_coupled<QD: Dim>(A: MatrixN<f64, D>, noise: &CoupledNoise<f64, D, QD>) -> Result<Self, EstimateError>
    where
        DefaultAllocator: Allocator<f64, QD, QD> + Allocator<f64, D, QD> + Allocator<f64, QD>,
    {
        let n = A.nrows();
        check_shape("G", &noise.G, (n, noise.q.nrows()))?;
        if rcond::rcond_vec(&noise.q) < 0. {
            return Err(EstimateError::NotPSD("q not PSD"));
        }
        Self::new(A, CorrelatedNoise::from_coupled(noise))
    }

    /// Simulates `steps` states from x0, returns `steps + 1` states including x0.
    pub fn simulate<R: RngCore + ?Sized>(
        &self,
        x0: &VectorN<f64, D>,
        steps: usize,
        rng: &mut R,
    ) -> Result<Vec<VectorN<f64, D>>, EstimateError> {
        check_shape("x0", x0, (self.A.nrows(), 1))?;
        let v = self.noise.sampler()?;
        debug!("Simulating {} dimensional process over {} steps", self.A.nrows(), steps);

        let mut x = Vec::with_capacity(steps + 1);
        let mut xt = x0.clone();
        for _ in 0..steps {
            let next = &self.A * &xt + v.sample(rng);
            x.push(xt);
            xt = next;
        }
        x.push(xt);
        Ok(x)
    }

    /// Stationary covariance P solving `P = A P A' + Q`.
    ///
    /// Only exists for stable processes, the iteration diverging is reported as [`EstimateError::InvalidParameter`].
    pub fn stationary_covariance(&self) -> Result<MatrixN<f64, D>, EstimateError> {
        let mut P = self.noise.Q.clone();
        for i in 0..STATIONARY_ITERATIONS {
            let mut next = &self.A * &P * self.A.transpose() + &self.noise.Q;
            symmetrize(&mut next);
            let change = (&next - &P).norm();
            let scale = next.trace().abs();
            if !scale.is_finite() {
                break;
            }
            P = next;
            if change <= STATIONARY_TOLERANCE * scale.max(f64::MIN_POSITIVE) {
                debug!("Stationary covariance converged after {} iterations", i + 1);
                return Ok(P);
            }
        }
        Err(EstimateError::InvalidParameter("process is not stable, no stationary covariance"))
    }

    /// Theoretical stationary autocovariance `E[x[t+k] x[t]'] = A^k P` for lags `0..=max_lag`.
    pub fn autocovariance(&self, max_lag: usize) -> Result<Vec<MatrixN<f64, D>>, EstimateError> {
        let P = self.stationary_covariance()?;
        let mut acf = Vec::with_capacity(max_lag + 1);
        let mut Rk = P;
        for _ in 0..max_lag {
            let next = &self.A * &Rk;
            acf.push(Rk);
            Rk = next;
        }
        acf.push(Rk);
        Ok(acf)
    }
}

/// Theoretical autocovariance of the scalar process `x[t+1] = a x[t] + sigma n[t]`, `sigma² a^k / (1 - a²)`.
pub fn ar1_autocovariance<T: Float>(a: T, sigma: T, max_lag: usize) -> Result<Vec<T>, EstimateError> {
    if !(a.abs() < T::one()) {
        return Err(EstimateError::InvalidParameter("|a| must be less than 1 for a stationary process"));
    }
    let variance = sigma * sigma / (T::one() - a * a);
    let mut acf = Vec::with_capacity(max_lag + 1);
    let mut ak = T::one();
    for _ in 0..=max_lag {
        acf.push(variance * ak);
        ak = ak * a;
    }
    Ok(acf)
}

/// Gaussian white noise of amplitude sigma, the autocorrelation of which is `sigma²` at lag zero only.
pub fn white_noise<R: RngCore + ?Sized>(sigma: f64, len: usize, rng: &mut R) -> Result<Vec<f64>, EstimateError> {
    if !(sigma >= 0.) {
        return Err(EstimateError::InvalidParameter("sigma must be non negative"));
    }
    let sampler = CorrelatedNoise::isotropic(na::U1, sigma).sampler()?;
    Ok((0..len).map(|_| sampler.sample(rng)[0]).collect())
}
