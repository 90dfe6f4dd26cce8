#![allow(non_snake_case)]

//! Covariance state estimation.
//!
//! A discrete Bayesian estimator that uses a Kalman state representation [`KalmanState`] of the system for estimation.
//! The Kalman state is simply the x,X pair the dimensions of both are the dimensions of the system.
//!
//! Each step is a prediction through the linear system followed by an observation:
//!
//! prediction: `x = A x + B u`, `X = A X A' + Rv`
//!
//! observation: `S = C X C' + Rw`, `L = X C' inv(S)`, `x += L (z - C x)`, `X = (I - L C) X`
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use log::{debug, trace, warn};
use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use crate::error::EstimateError;
use crate::linalg::cholesky::UDU;
use crate::matrix::{all_finite, check_non_negativ, check_positive, check_shape, symmetrize};
use crate::models::{
    Estimator, KalmanEstimator, KalmanState, LinearObserveModel, LinearObserver, LinearPredictor, LinearSystem,
};
use crate::noise::CorrelatedNoise;

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero(d: D) -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros_generic(d, U1),
            X: MatrixN::zeros_generic(d, d),
        }
    }
}

impl<N: RealField, D: Dim> Estimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn state(&self) -> Result<VectorN<N, D>, EstimateError> {
        Ok(self.x.clone())
    }
}

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError> {
        let n = state.x.nrows();
        check_shape("X", &state.X, (n, n))?;
        let mut ud = state.X.clone();
        let rcond = UDU::new().UdUfactor(&mut ud, n);
        check_non_negativ(rcond, "X not PSD")?;

        self.x = state.x.clone();
        self.X = state.X.clone();
        symmetrize(&mut self.X);

        Ok(rcond)
    }

    fn kalman_state(&self) -> Result<KalmanState<N, D>, EstimateError> {
        Ok(KalmanState {
            x: self.x.clone(),
            X: self.X.clone(),
        })
    }
}

impl<N: RealField, D: Dim, UD: Dim> LinearPredictor<N, D, UD> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD> + Allocator<N, D> + Allocator<N, UD>,
{
    fn predict(
        &mut self,
        system: &LinearSystem<N, D, UD>,
        u: &VectorN<N, UD>,
        noise: &CorrelatedNoise<N, D>,
    ) -> Result<(), EstimateError> {
        let n = system.A.nrows();
        system.check_state("x", &self.x)?;
        check_shape("X", &self.X, (n, n))?;
        system.check_control("u", u)?;
        check_shape("Rv", &noise.Q, (n, n))?;

        self.x = system.apply(&self.x, u);
        // X = A.X.A' + Rv
        self.X = &system.A * &self.X * system.A.transpose() + &noise.Q;
        symmetrize(&mut self.X);

        Ok(())
    }
}

impl<N: RealField, D: Dim, ZD: Dim> LinearObserver<N, D, ZD> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    fn observe(
        &mut self,
        obs: &LinearObserveModel<N, D, ZD>,
        noise: &CorrelatedNoise<N, ZD>,
        z: &VectorN<N, ZD>,
    ) -> Result<N, EstimateError> {
        let n = self.x.nrows();
        let m = obs.Hx.nrows();
        check_shape("X", &self.X, (n, n))?;
        check_shape("Hx", &obs.Hx, (m, n))?;
        check_shape("Rw", &noise.Q, (m, m))?;
        check_shape("z", z, (m, 1))?;

        let XHt = &self.X * obs.Hx.transpose();
        // S = Hx.X.Hx' + Rw
        let S = &obs.Hx * &XHt + &noise.Q;

        let cholesky = S.cholesky().ok_or(EstimateError::Singular("innovation covariance S not PD"))?;
        let rcond = UDU::new().UCrcond(&cholesky.l());
        check_positive(rcond, "innovation covariance S not PD")?;
        let SI = cholesky.inverse();
        // Kalman gain, X*Hx'*SI
        let L = &XHt * SI;

        // State update
        let innovation = z - obs.observe(&self.x);
        self.x += &L * innovation;
        // X = (I - L.Hx).X
        let (d, _) = self.X.data.shape();
        self.X = (MatrixN::<N, D>::identity_generic(d, d) - &L * &obs.Hx) * &self.X;
        symmetrize(&mut self.X);

        Ok(rcond)
    }
}

/// Runs the Kalman filter over a measurement sequence.
///
/// `initial` is the estimate at step 0. For each following step the estimate is predicted with the previous control
/// and then corrected with that step's measurement, `y[0]` is not used. Only past and current measurements contribute
/// to each estimate.
///
/// Returns one estimate per measurement.
pub fn filter<N: RealField, D: Dim, UD: Dim, ZD: Dim>(
    system: &LinearSystem<N, D, UD>,
    obs: &LinearObserveModel<N, D, ZD>,
    process_noise: &CorrelatedNoise<N, D>,
    observe_noise: &CorrelatedNoise<N, ZD>,
    u: &[VectorN<N, UD>],
    y: &[VectorN<N, ZD>],
    initial: &KalmanState<N, D>,
) -> Result<Vec<KalmanState<N, D>>, EstimateError>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, D, UD>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, UD>
        + Allocator<N, ZD>,
{
    if u.len() != y.len() {
        return Err(EstimateError::LengthMismatch {
            what: "controls",
            expected: y.len(),
            found: u.len(),
        });
    }
    system.check()?;
    system.check_state("initial x", &initial.x)?;
    process_noise.check_psd("Rv not PSD")?;
    observe_noise.check_psd("Rw not PSD")?;
    debug!(
        "Kalman filter over {} steps, {} states, {} controls, {} observations",
        y.len(),
        system.A.nrows(),
        system.B.ncols(),
        obs.Hx.nrows()
    );

    let mut estimates = Vec::with_capacity(y.len());
    if y.is_empty() {
        return Ok(estimates);
    }

    let poorly_conditioned: N = na::convert(1e-12);
    let mut estimate = KalmanState::new_zero(system.dim());
    estimate.init(initial)?;
    estimates.push(estimate.clone());

    for t in 0..y.len() - 1 {
        estimate.predict(system, &u[t], process_noise)?;
        let rcond = estimate.observe(obs, observe_noise, &y[t + 1])?;
        if !all_finite(&estimate.x) || !all_finite(&estimate.X) {
            warn!("Kalman estimate is not finite at step {}", t + 1);
        }
        if rcond < poorly_conditioned {
            trace!("innovation covariance poorly conditioned at step {}", t + 1);
        }
        estimates.push(estimate.clone());
    }

    Ok(estimates)
}
