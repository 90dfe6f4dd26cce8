#![allow(non_snake_case)]

//! Finite horizon linear-quadratic tracking.
//!
//! The continuous system `ẋ = A x + B u` is driven to follow a reference trajectory `r` by minimising
//! `∫ 0.5 |x - r|² + 0.5 lambda |u|² dt` over the horizon.
//!
//! The optimal control is `u = -(1/lambda) B' (K x + s)` where the Riccati matrix K and the costate s solve
//!
//! `-K̇ = I + A'K + KA - (1/lambda) K B B' K`, `K(T) = 0`
//!
//! `-ṡ = (A' - (1/lambda) K B B') s - r`, `s(T) = 0`
//!
//! Both are integrated backward in time from the end of the horizon with explicit Euler steps, the resulting
//! [`FeedbackSchedule`] is then applied while integrating the system forward, also with explicit Euler steps.
//!
//! There is no step size control. If `dt` is large compared to `sqrt(lambda)` the recursions diverge.

use log::{debug, warn};
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use crate::error::EstimateError;
use crate::matrix::{all_finite, check_shape, symmetrize};
use crate::models::LinearSystem;

/// A tracking problem, the system with its control cost and time step.
#[derive(PartialEq, Clone)]
pub struct TrackingProblem<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD>,
{
    pub system: LinearSystem<N, D, UD>,
    /// Weight of the control cost relative to the tracking error
    pub lambda: N,
    /// Integration time step
    pub dt: N,
}

/// Time varying feedback and feedforward computed by the backward pass.
///
/// `K[t]` and `s[t]` for `t` in `0..=T`, with `K[T] = 0` and `s[T] = 0`.
#[derive(PartialEq, Clone)]
pub struct FeedbackSchedule<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, UD, D>,
{
    /// Riccati matrices (symmetric positive semi-definite)
    pub K: Vec<MatrixN<N, D>>,
    /// Costates
    pub s: Vec<VectorN<N, D>>,
    /// B'/lambda
    gain: MatrixMN<N, UD, D>,
}

/// Controls and states of a forward pass.
///
/// `u[t]` for `t` in `0..T` and `x[t]` for `t` in `0..=T`.
#[derive(PartialEq, Clone)]
pub struct Trajectory<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, UD>,
{
    pub u: Vec<VectorN<N, UD>>,
    pub x: Vec<VectorN<N, D>>,
}

#[derive(PartialEq, Clone)]
pub struct TrackingSolution<N: RealField, D: Dim, UD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, UD> + Allocator<N, UD, D>,
{
    pub schedule: FeedbackSchedule<N, D, UD>,
    pub trajectory: Trajectory<N, D, UD>,
}

impl<N: RealField, D: Dim, UD: Dim> FeedbackSchedule<N, D, UD>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, UD> + Allocator<N, UD, D>,
{
    /// Number of control steps T.
    pub fn horizon(&self) -> usize {
        self.K.len().saturating_sub(1)
    }

    /// Optimal control at step t, `u = -(1/lambda) B' (K[t] x + s[t])`.
    ///
    /// Panics if t is beyond the horizon.
    pub fn control(&self, t: usize, x: &VectorN<N, D>) -> VectorN<N, UD> {
        -(&self.gain * (&self.K[t] * x + &self.s[t]))
    }
}

impl<N: RealField, D: Dim, UD: Dim> TrackingProblem<N, D, UD>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, D, UD>
        + Allocator<N, UD, D>
        + Allocator<N, D>
        + Allocator<N, UD>,
{
    /// Creates a tracking problem, lambda and dt must be positive.
    pub fn new(system: LinearSystem<N, D, UD>, lambda: N, dt: N) -> Result<Self, EstimateError> {
        system.check()?;
        if !(lambda > N::zero()) {
            return Err(EstimateError::InvalidParameter("lambda must be positive"));
        }
        if !(dt > N::zero()) {
            return Err(EstimateError::InvalidParameter("dt must be positive"));
        }
        Ok(TrackingProblem { system, lambda, dt })
    }

    /// Backward pass from `t = T-1` down to `0` over the reference `r[0..=T]`.
    pub fn backward(&self, reference: &[VectorN<N, D>]) -> Result<FeedbackSchedule<N, D, UD>, EstimateError> {
        if reference.is_empty() {
            return Err(EstimateError::InvalidParameter("reference trajectory is empty"));
        }
        for r in reference {
            self.system.check_state("reference", r)?;
        }
        let horizon = reference.len() - 1;
        debug!(
            "LQ tracking backward pass over {} steps, {} states, {} controls",
            horizon,
            self.system.A.nrows(),
            self.system.B.ncols()
        );

        let d = self.system.dim();
        let A = &self.system.A;
        let At = A.transpose();
        let I = MatrixN::<N, D>::identity_generic(d, d);
        let gain = self.system.B.transpose() / self.lambda;
        let BBt = &self.system.B * &gain;

        let mut K = MatrixN::<N, D>::zeros_generic(d, d);
        let mut s = VectorN::<N, D>::zeros_generic(d, U1);
        let mut Ks = Vec::with_capacity(horizon + 1);
        let mut ss = Vec::with_capacity(horizon + 1);
        Ks.push(K.clone());
        ss.push(s.clone());
        let mut diverged = false;

        for t in (0..horizon).rev() {
            let KBBt = &K * &BBt;
            // -K̇ = I + A'K + KA - K.B.B'.K/lambda
            let dK = &I + &At * &K + &K * A - &KBBt * &K;
            // -ṡ = (A' - K.B.B'/lambda).s - r
            let ds = (&At - &KBBt) * &s - &reference[t + 1];

            K += dK * self.dt;
            symmetrize(&mut K);
            s += ds * self.dt;

            if !diverged && !(all_finite(&K) && all_finite(&s)) {
                warn!("Riccati recursion diverged at step {}, dt too large for lambda", t);
                diverged = true;
            }
            Ks.push(K.clone());
            ss.push(s.clone());
        }
        Ks.reverse();
        ss.reverse();

        Ok(FeedbackSchedule { K: Ks, s: ss, gain })
    }

    /// Forward pass from `x[0] = x0`, applying the schedule with explicit Euler steps.
    pub fn forward(
        &self,
        schedule: &FeedbackSchedule<N, D, UD>,
        x0: &VectorN<N, D>,
    ) -> Result<Trajectory<N, D, UD>, EstimateError> {
        let n = self.system.A.nrows();
        self.system.check_state("x0", x0)?;
        if schedule.s.len() != schedule.K.len() {
            return Err(EstimateError::LengthMismatch {
                what: "costates",
                expected: schedule.K.len(),
                found: schedule.s.len(),
            });
        }
        for K in &schedule.K {
            check_shape("K", K, (n, n))?;
        }
        for s in &schedule.s {
            check_shape("s", s, (n, 1))?;
        }
        check_shape("feedback gain", &schedule.gain, (self.system.B.ncols(), n))?;

        let horizon = schedule.horizon();
        let mut u = Vec::with_capacity(horizon);
        let mut x = Vec::with_capacity(horizon + 1);
        let mut xt = x0.clone();
        for t in 0..horizon {
            let ut = schedule.control(t, &xt);
            let next = self.system.euler_step(&xt, &ut, self.dt);
            x.push(xt);
            u.push(ut);
            xt = next;
        }
        if !all_finite(&xt) {
            warn!("LQ tracking trajectory is not finite after {} steps", horizon);
        }
        x.push(xt);

        Ok(Trajectory { u, x })
    }

    /// Backward pass then forward pass.
    pub fn solve(
        &self,
        reference: &[VectorN<N, D>],
        x0: &VectorN<N, D>,
    ) -> Result<TrackingSolution<N, D, UD>, EstimateError> {
        let schedule = self.backward(reference)?;
        let trajectory = self.forward(&schedule, x0)?;
        Ok(TrackingSolution { schedule, trajectory })
    }

    /// Running cost `Σ dt (0.5 |x[t] - r[t]|² + 0.5 lambda |u[t]|²)` of a trajectory.
    pub fn cost(&self, trajectory: &Trajectory<N, D, UD>, reference: &[VectorN<N, D>]) -> Result<N, EstimateError> {
        if reference.len() != trajectory.x.len() {
            return Err(EstimateError::LengthMismatch {
                what: "reference",
                expected: trajectory.x.len(),
                found: reference.len(),
            });
        }
        let half: N = na::convert(0.5);
        let mut cost = N::zero();
        for (t, u) in trajectory.u.iter().enumerate() {
            self.system.check_state("x", &trajectory.x[t])?;
            self.system.check_state("reference", &reference[t])?;
            self.system.check_control("u", u)?;
            let e = &trajectory.x[t] - &reference[t];
            cost += (e.norm_squared() + u.norm_squared() * self.lambda) * half * self.dt;
        }
        Ok(cost)
    }
}
