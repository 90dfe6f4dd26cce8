#![allow(non_snake_case)]

//! Linear system, observation and estimation models.
//!
//! State representations and models are structs.
//! Common discrete system estimation operations are defined as traits.

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN};
use nalgebra as na;

use crate::error::EstimateError;
use crate::matrix::check_shape;
use crate::noise::CorrelatedNoise;

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone)]
pub struct KalmanState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: MatrixN<N, D>,
}

/// Linear time invariant system.
///
/// Continuous `ẋ = A x + B u` or discrete `x' = A x + B u`, depending on use.
#[derive(PartialEq, Clone)]
pub struct LinearSystem<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD>,
{
    /// State matrix
    pub A: MatrixN<N, D>,
    /// Control input matrix
    pub B: MatrixMN<N, D, UD>,
}

/// Linear observation model.
///
/// Observation is represented by an observation matrix.
#[derive(PartialEq, Clone)]
pub struct LinearObserveModel<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, ZD, D>,
{
    /// Observation matrix
    pub Hx: MatrixMN<N, ZD, D>,
}

/// A state estimator.
pub trait Estimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// The estimator's estimate of the system's state.
    fn state(&self) -> Result<VectorN<N, D>, EstimateError>;
}

/// A Kalman filter (estimator).
///
/// The linear Kalman state representation x,X is used to represent the system.
pub trait KalmanEstimator<N: RealField, D: Dim>: Estimator<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Initialise the estimator with a KalmanState.
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError>;

    /// The estimator's estimate of the system's KalmanState.
    fn kalman_state(&self) -> Result<KalmanState<N, D>, EstimateError>;
}

/// A linear predictor.
///
/// Uses a discrete linear system with a known control input and additive noise.
pub trait LinearPredictor<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD> + Allocator<N, D> + Allocator<N, UD>,
{
    /// State prediction `x = A x + B u` with additive noise.
    fn predict(
        &mut self,
        system: &LinearSystem<N, D, UD>,
        u: &VectorN<N, UD>,
        noise: &CorrelatedNoise<N, D>,
    ) -> Result<(), EstimateError>;
}

/// A linear observer with correlated observation noise.
pub trait LinearObserver<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, ZD, D> + Allocator<N, ZD, ZD> + Allocator<N, ZD>,
{
    /// Observation of `z`, returns the reciprocal condition number of the innovation covariance.
    fn observe(
        &mut self,
        obs: &LinearObserveModel<N, D, ZD>,
        noise: &CorrelatedNoise<N, ZD>,
        z: &VectorN<N, ZD>,
    ) -> Result<N, EstimateError>;
}

impl<N: RealField, D: Dim, UD: Dim> LinearSystem<N, D, UD>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD> + Allocator<N, D> + Allocator<N, UD>,
{
    /// Creates a LinearSystem, A must be square and B must have as many rows as A.
    pub fn new(A: MatrixN<N, D>, B: MatrixMN<N, D, UD>) -> Result<Self, EstimateError> {
        let system = LinearSystem { A, B };
        system.check()?;
        Ok(system)
    }

    /// Checks the shapes of A and B agree.
    pub fn check(&self) -> Result<(), EstimateError> {
        let n = self.A.nrows();
        check_shape("A", &self.A, (n, n))?;
        check_shape("B", &self.B, (n, self.B.ncols()))
    }

    /// State dimension.
    pub fn dim(&self) -> D {
        self.A.data.shape().0
    }

    /// Checks x is a state of this system.
    pub fn check_state(&self, what: &'static str, x: &VectorN<N, D>) -> Result<(), EstimateError> {
        check_shape(what, x, (self.A.nrows(), 1))
    }

    /// Checks u is a control of this system.
    pub fn check_control(&self, what: &'static str, u: &VectorN<N, UD>) -> Result<(), EstimateError> {
        check_shape(what, u, (self.B.ncols(), 1))
    }

    /// `A x + B u`, the derivative of a continuous system or the successor of a discrete one.
    pub fn apply(&self, x: &VectorN<N, D>, u: &VectorN<N, UD>) -> VectorN<N, D> {
        &self.A * x + &self.B * u
    }

    /// Explicit Euler step of the continuous system `x + dt (A x + B u)`.
    pub fn euler_step(&self, x: &VectorN<N, D>, u: &VectorN<N, UD>, dt: N) -> VectorN<N, D> {
        x + self.apply(x, u) * dt
    }
}

impl<N: RealField, D: Dim, ZD: Dim> LinearObserveModel<N, D, ZD>
where
    DefaultAllocator: Allocator<N, ZD, D> + Allocator<N, D> + Allocator<N, ZD>,
{
    /// Predicted observation `Hx x`.
    pub fn observe(&self, x: &VectorN<N, D>) -> VectorN<N, ZD> {
        &self.Hx * x
    }
}
