//! Scenario configuration.
//!
//! A scenario is read from TOML. Every section and field is optional, missing values take the defaults of the
//! course exercises.
//!
//! ```toml
//! [oscillator]
//! v_amp = 0.1
//! w_amp = 1.0
//! steps = 1000
//!
//! [ode]
//! a = [[-1.0, 1.0], [2.0, -3.0]]
//! dt = 0.01
//! ```

use std::path::Path;

use log::debug;
use nalgebra::{Matrix1, Matrix2, Matrix2x1, Vector1, Vector2, U1, U2};
use serde::Deserialize;

use crate::control::tracking::TrackingProblem;
use crate::error::EstimateError;
use crate::models::LinearSystem;
use crate::noise::CorrelatedNoise;
use crate::simulation::process::LinearProcess;

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Scenario {
    pub oscillator: OscillatorConfig,
    pub tracking: TrackingConfig,
    pub ode: OdeConfig,
    pub process: ProcessConfig,
}

/// Forced harmonic oscillator observed through its position.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OscillatorConfig {
    /// Discrete state transition, rows
    pub a: [[f64; 2]; 2],
    /// Forcing input
    pub b: [f64; 2],
    /// Observation row
    pub c: [f64; 2],
    /// Process noise amplitude (standard deviation per component and step)
    pub v_amp: f64,
    /// Observation noise amplitude
    pub w_amp: f64,
    /// Sampling interval
    pub dt: f64,
    /// Forcing angular frequency, `u[t] = sin(omega t dt)`
    pub omega: f64,
    pub steps: usize,
    pub x0: [f64; 2],
    /// Filter's initial guess of the state
    pub initial_estimate: [f64; 2],
    /// Filter's initial state variance
    pub initial_variance: f64,
    pub seed: u64,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        OscillatorConfig {
            a: [[0.99, 0.01], [-0.1, 0.99]],
            b: [0., 0.01],
            c: [1., 0.],
            v_amp: 0.1,
            w_amp: 1.0,
            dt: 0.01,
            omega: 1.0,
            steps: 1000,
            x0: [1., 0.],
            initial_estimate: [0., 0.],
            initial_variance: 1.0,
            seed: 1,
        }
    }
}

/// Linear-quadratic tracking of a sinusoidal position reference.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    /// Continuous state matrix, rows
    pub a: [[f64; 2]; 2],
    /// Control input
    pub b: [f64; 2],
    pub lambda: f64,
    pub dt: f64,
    pub steps: usize,
    pub x0: [f64; 2],
    /// Reference `r(t) = amplitude (sin(omega t), omega cos(omega t))`
    pub reference_amplitude: f64,
    pub reference_omega: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            a: [[0., 1.], [0., 0.]],
            b: [0., 1.],
            lambda: 0.01,
            dt: 0.01,
            steps: 1000,
            x0: [0., 0.],
            reference_amplitude: 1.0,
            reference_omega: 1.0,
        }
    }
}

/// Two dimensional linear ODE `ẋ = A x`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OdeConfig {
    pub a: [[f64; 2]; 2],
    pub x0: [f64; 2],
    pub dt: f64,
    pub steps: usize,
}

impl Default for OdeConfig {
    fn default() -> Self {
        OdeConfig {
            a: [[-1., 1.], [2., -3.]],
            x0: [1., 0.],
            dt: 0.01,
            steps: 1500,
        }
    }
}

/// Scalar process `x[t+1] = a x[t] + sigma n[t]` driven by white noise.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProcessConfig {
    pub a: f64,
    pub sigma: f64,
    pub steps: usize,
    pub max_lag: usize,
    pub seed: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        ProcessConfig {
            a: 0.9,
            sigma: 1.0,
            steps: 10000,
            max_lag: 50,
            seed: 1,
        }
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, EstimateError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EstimateError> {
        debug!("Loading scenario {}", path.as_ref().display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

impl TrackingConfig {
    pub fn problem(&self) -> Result<TrackingProblem<f64, U2, U1>, EstimateError> {
        let system = LinearSystem::new(matrix2(&self.a), Matrix2x1::new(self.b[0], self.b[1]))?;
        TrackingProblem::new(system, self.lambda, self.dt)
    }

    /// Reference sampled at `t = k dt` for `k` in `0..=steps`.
    pub fn reference(&self) -> Vec<Vector2<f64>> {
        let (amplitude, omega) = (self.reference_amplitude, self.reference_omega);
        (0..=self.steps)
            .map(|k| {
                let (sin, cos) = (omega * k as f64 * self.dt).sin_cos();
                Vector2::new(sin, omega * cos) * amplitude
            })
            .collect()
    }

    pub fn initial_state(&self) -> Vector2<f64> {
        vector2(&self.x0)
    }
}

impl ProcessConfig {
    pub fn process(&self) -> Result<LinearProcess<U1>, EstimateError> {
        if !(self.sigma >= 0.) {
            return Err(EstimateError::InvalidParameter("sigma must be non negative"));
        }
        LinearProcess::new(Matrix1::new(self.a), CorrelatedNoise::isotropic(U1, self.sigma))
    }

    pub fn initial_state(&self) -> Vector1<f64> {
        Vector1::zeros()
    }
}

/// Matrix from its rows.
pub fn matrix2(rows: &[[f64; 2]; 2]) -> Matrix2<f64> {
    Matrix2::new(rows[0][0], rows[0][1], rows[1][0], rows[1][1])
}

pub fn vector2(v: &[f64; 2]) -> Vector2<f64> {
    Vector2::new(v[0], v[1])
}
