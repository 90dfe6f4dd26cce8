#![allow(non_snake_case)]

//! Noise models.
//!
//! Linear additive noise models are represented as structs.
//! Zero mean white noise with these statistics can be sampled for simulation.

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN, U1};
use nalgebra as na;
use rand_core::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::error::EstimateError;
use crate::linalg::cholesky::UDU;
use crate::linalg::rcond;
use crate::matrix::{check_non_negativ, quadform_tr};

/// Additive noise.
///
/// Noise represented as a the noise variance vector.
#[derive(PartialEq, Clone)]
pub struct UncorrelatedNoise<N: RealField, QD: Dim>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Noise variance
    pub q: VectorN<N, QD>,
}

/// Additive noise.
///
/// Noise represented as a the noise covariance matrix.
#[derive(PartialEq, Clone)]
pub struct CorrelatedNoise<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    /// Noise covariance
    pub Q: MatrixN<N, D>,
}

/// Additive noise.
///
/// Noise represented as a the noise variance vector and a noise coupling matrix.
/// The noise covariance is G.q.G'.
#[derive(PartialEq, Clone)]
pub struct CoupledNoise<N: RealField, D: Dim, QD: Dim>
where
    DefaultAllocator: Allocator<N, D, QD> + Allocator<N, QD>,
{
    /// Noise variance
    pub q: VectorN<N, QD>,
    /// Noise coupling
    pub G: MatrixMN<N, D, QD>,
}

impl<N: RealField, D: Dim> CorrelatedNoise<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Zero noise of dimension d.
    pub fn zero(d: D) -> Self {
        CorrelatedNoise {
            Q: MatrixN::zeros_generic(d, d),
        }
    }

    /// Noise with covariance `sigma² I`, the noise of independent components with amplitude sigma.
    pub fn isotropic(d: D, sigma: N) -> Self {
        CorrelatedNoise {
            Q: MatrixN::identity_generic(d, d) * (sigma * sigma),
        }
    }

    /// Creates a CorrelatedNoise from an CoupledNoise.
    pub fn from_coupled<QD: Dim>(coupled: &CoupledNoise<N, D, QD>) -> Self
    where
        DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D, QD> + Allocator<N, QD>,
    {
        let mut Q = MatrixN::zeros_generic(coupled.G.data.shape().0, coupled.G.data.shape().0);
        quadform_tr(&mut Q, N::one(), &coupled.G, &coupled.q, N::one());
        CorrelatedNoise { Q }
    }

    /// Creates a CorrelatedNoise from an UncorrelatedNoise.
    pub fn from_uncorrelated(uncorrelated: &UncorrelatedNoise<N, D>) -> Self {
        let z_size = uncorrelated.q.data.shape().0;
        let mut correlated = CorrelatedNoise {
            Q: MatrixN::zeros_generic(z_size, z_size),
        };
        for i in 0..uncorrelated.q.nrows() {
            correlated.Q[(i, i)] = uncorrelated.q[i];
        }

        correlated
    }

    /// Checks the covariance is square and PSD, returning its reciprocal condition number.
    pub fn check_psd(&self, what: &'static str) -> Result<N, EstimateError> {
        if self.Q.nrows() != self.Q.ncols() {
            return Err(EstimateError::DimensionMismatch {
                what,
                expected: (self.Q.nrows(), self.Q.nrows()),
                found: self.Q.shape(),
            });
        }
        let mut ud = self.Q.clone();
        let rcond = UDU::new().UdUfactor(&mut ud, self.Q.nrows());
        check_non_negativ(rcond, what)
    }
}

impl<N: RealField, QD: Dim> UncorrelatedNoise<N, QD>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Checks the variances are non negative, returning their reciprocal condition number.
    pub fn check_psd(&self, what: &'static str) -> Result<N, EstimateError> {
        check_non_negativ(rcond::rcond_vec(&self.q), what)
    }
}

impl<D: Dim> CorrelatedNoise<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    /// A sampler of zero mean Gaussian noise with this covariance.
    ///
    /// The covariance may be semi-definite, zero covariance samples exact zeros.
    pub fn sampler(&self) -> Result<NoiseSampler<D>, EstimateError> {
        let mut uc = self.Q.clone();
        let rcond = UDU::new().UCfactor_n(&mut uc, self.Q.nrows());
        check_non_negativ(rcond, "noise covariance not PSD")?;
        Ok(NoiseSampler { UC: uc })
    }
}

/// Gaussian white noise sampler.
///
/// Samples are `UC n` with `n` standard normal and `UC UC' = Q`.
#[derive(PartialEq, Clone)]
pub struct NoiseSampler<D: Dim>
where
    DefaultAllocator: Allocator<f64, D, D>,
{
    UC: MatrixN<f64, D>,
}

impl<D: Dim> NoiseSampler<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    /// Draw one noise vector.
    pub fn sample<R: RngCore + ?Sized>(&self, rng: &mut R) -> VectorN<f64, D> {
        let n = VectorN::<f64, D>::from_fn_generic(self.UC.data.shape().0, U1, |_, _| {
            StandardNormal.sample(&mut *rng)
        });
        &self.UC * n
    }
}
