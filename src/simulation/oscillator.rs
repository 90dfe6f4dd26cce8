#![allow(non_snake_case)]

//! Forced harmonic oscillator with noisy position measurements.
//!
//! The discrete system `x[t+1] = A x[t] + B u[t] + v[t]`, `y[t] = C x[t] + w[t]` with state (position, velocity) and
//! a sinusoidal forcing `u[t] = sin(omega t dt)`. Only the position is measured. The velocity is recovered either by
//! Kalman filtering or naively by differencing successive measured positions.

use log::{debug, info};
use na::{Matrix1x2, Matrix2, Matrix2x1, Vector1, Vector2, U1, U2};
use nalgebra as na;
use rand_core::RngCore;

use crate::analysis::{component, finite_difference, rmse};
use crate::config::{matrix2, vector2, OscillatorConfig};
use crate::error::EstimateError;
use crate::estimators::covariance::filter;
use crate::models::{KalmanState, LinearObserveModel, LinearSystem};
use crate::noise::CorrelatedNoise;

#[derive(PartialEq, Clone)]
pub struct OscillatorScenario {
    pub system: LinearSystem<f64, U2, U1>,
    pub obs: LinearObserveModel<f64, U2, U1>,
    /// Process noise amplitude
    pub v_amp: f64,
    /// Observation noise amplitude
    pub w_amp: f64,
    pub dt: f64,
    pub omega: f64,
    pub steps: usize,
    pub x0: Vector2<f64>,
    /// Filter's estimate at step 0
    pub initial: KalmanState<f64, U2>,
}

/// Simulated controls, true states and measurements, one of each per step.
#[derive(PartialEq, Clone)]
pub struct OscillatorRecord {
    pub u: Vec<Vector1<f64>>,
    pub x: Vec<Vector2<f64>>,
    pub y: Vec<Vector1<f64>>,
}

/// Velocity recovered by the Kalman filter and by differencing, with their errors against the true velocity.
#[derive(PartialEq, Clone)]
pub struct VelocityComparison {
    pub record: OscillatorRecord,
    pub estimates: Vec<KalmanState<f64, U2>>,
    pub finite_difference: Vec<f64>,
    pub kalman_rmse: f64,
    pub finite_difference_rmse: f64,
}

impl OscillatorScenario {
    pub fn from_config(config: &OscillatorConfig) -> Result<Self, EstimateError> {
        if !(config.dt > 0.) {
            return Err(EstimateError::InvalidParameter("dt must be positive"));
        }
        if !(config.v_amp >= 0. && config.w_amp >= 0. && config.initial_variance >= 0.) {
            return Err(EstimateError::InvalidParameter("noise amplitudes and variances must be non negative"));
        }
        if config.steps < 2 {
            return Err(EstimateError::InvalidParameter("at least 2 steps are needed to compare velocity estimates"));
        }
        let system = LinearSystem::new(matrix2(&config.a), Matrix2x1::new(config.b[0], config.b[1]))?;
        Ok(OscillatorScenario {
            system,
            obs: LinearObserveModel {
                Hx: Matrix1x2::new(config.c[0], config.c[1]),
            },
            v_amp: config.v_amp,
            w_amp: config.w_amp,
            dt: config.dt,
            omega: config.omega,
            steps: config.steps,
            x0: vector2(&config.x0),
            initial: KalmanState {
                x: vector2(&config.initial_estimate),
                X: Matrix2::identity() * config.initial_variance,
            },
        })
    }

    /// Process noise covariance `Rv = v_amp² I`.
    pub fn process_noise(&self) -> CorrelatedNoise<f64, U2> {
        CorrelatedNoise::isotropic(U2, self.v_amp)
    }

    /// Observation noise covariance `Rw = w_amp²`.
    pub fn observe_noise(&self) -> CorrelatedNoise<f64, U1> {
        CorrelatedNoise::isotropic(U1, self.w_amp)
    }

    /// Forcing at step t.
    pub fn forcing(&self, t: usize) -> Vector1<f64> {
        Vector1::new((self.omega * t as f64 * self.dt).sin())
    }

    /// Simulates `steps` states starting from x0.
    pub fn simulate<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<OscillatorRecord, EstimateError> {
        let v = self.process_noise().sampler()?;
        let w = self.observe_noise().sampler()?;
        debug!("Simulating oscillator over {} steps", self.steps);

        let mut record = OscillatorRecord {
            u: Vec::with_capacity(self.steps),
            x: Vec::with_capacity(self.steps),
            y: Vec::with_capacity(self.steps),
        };
        let mut x = self.x0;
        for t in 0..self.steps {
            let u = self.forcing(t);
            let y = self.obs.observe(&x) + w.sample(rng);
            let next = self.system.apply(&x, &u) + v.sample(rng);
            record.u.push(u);
            record.x.push(x);
            record.y.push(y);
            x = next;
        }
        Ok(record)
    }

    /// Kalman estimates over a simulated record.
    pub fn estimate(&self, record: &OscillatorRecord) -> Result<Vec<KalmanState<f64, U2>>, EstimateError> {
        filter(
            &self.system,
            &self.obs,
            &self.process_noise(),
            &self.observe_noise(),
            &record.u,
            &record.y,
            &self.initial,
        )
    }

    /// Simulates, then recovers the velocity both ways.
    ///
    /// Errors are taken from step 1 on, step 0 has no velocity information for either method.
    pub fn run<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<VelocityComparison, EstimateError> {
        let record = self.simulate(rng)?;
        let estimates = self.estimate(&record)?;

        let positions: Vec<f64> = record.y.iter().map(|y| y[0]).collect();
        let fd = finite_difference(&positions, self.dt);
        let velocity = component(&record.x, 1);
        let estimated: Vec<f64> = estimates.iter().map(|e| e.x[1]).collect();

        let from = 1.min(velocity.len());
        let kalman_rmse = rmse(&estimated[from..], &velocity[from..])?;
        let finite_difference_rmse = rmse(&fd[from..], &velocity[from..])?;
        info!(
            "Velocity RMSE, Kalman {:.4}, finite difference {:.4}",
            kalman_rmse, finite_difference_rmse
        );

        Ok(VelocityComparison {
            record,
            estimates,
            finite_difference: fd,
            kalman_rmse,
            finite_difference_rmse,
        })
    }
}
