#![allow(non_snake_case)]

//! Kalman filter: exact cases, limiting noise and the forced oscillator scenario.

use na::{DMatrix, DVector, Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1, Vector2, U1, U2};
use nalgebra as na;
use rand::SeedableRng;

use lq_estimate::config::OscillatorConfig;
use lq_estimate::error::EstimateError;
use lq_estimate::estimators::covariance::filter;
use lq_estimate::models::{Estimator, KalmanEstimator, KalmanState, LinearObserveModel, LinearObserver, LinearPredictor, LinearSystem};
use lq_estimate::noise::CorrelatedNoise;
use lq_estimate::simulation::oscillator::OscillatorScenario;

fn oscillator() -> (LinearSystem<f64, U2, U1>, LinearObserveModel<f64, U2, U1>) {
    let system = LinearSystem::new(Matrix2::new(0.99, 0.01, -0.1, 0.99), Matrix2x1::new(0., 0.01)).unwrap();
    let obs = LinearObserveModel {
        Hx: Matrix1x2::new(1., 0.),
    };
    (system, obs)
}

fn forcing(steps: usize) -> Vec<Vector1<f64>> {
    (0..steps).map(|t| Vector1::new((t as f64 * 0.01).sin())).collect()
}

#[test]
fn test_scalar_covariance_sequence() {
    let system = LinearSystem::new(Matrix1::new(1.), Matrix1::new(0.)).unwrap();
    let obs = LinearObserveModel { Hx: Matrix1::new(1.) };
    let noise = CorrelatedNoise { Q: Matrix1::new(1.) };

    let mut state = KalmanState::new_zero(U1);
    state.predict(&system, &Vector1::new(0.), &noise).unwrap();
    approx::assert_relative_eq!(state.X[(0, 0)], 1.);
    let rcond = state.observe(&obs, &noise, &Vector1::new(2.)).unwrap();
    approx::assert_relative_eq!(rcond, 1.);
    approx::assert_relative_eq!(state.x[0], 1., max_relative = 1e-12);
    approx::assert_relative_eq!(state.X[(0, 0)], 0.5, max_relative = 1e-12);

    state.predict(&system, &Vector1::new(0.), &noise).unwrap();
    state.observe(&obs, &noise, &Vector1::new(1.)).unwrap();
    approx::assert_relative_eq!(state.X[(0, 0)], 0.6, max_relative = 1e-12);
    approx::assert_relative_eq!(state.x[0], 1., max_relative = 1e-12);
}

#[test]
fn test_noiseless_exact() {
    let (system, obs) = oscillator();
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let w = CorrelatedNoise::isotropic(U1, 1.).sampler().unwrap();

    let steps = 200;
    let u = forcing(steps);
    let mut x = Vec::with_capacity(steps);
    let mut y = Vec::with_capacity(steps);
    let mut xt = Vector2::new(1., 0.);
    for t in 0..steps {
        x.push(xt);
        y.push(obs.observe(&xt) + w.sample(&mut rng));
        xt = system.apply(&xt, &u[t]);
    }

    let initial = KalmanState {
        x: x[0],
        X: Matrix2::zeros(),
    };
    let estimates = filter(
        &system,
        &obs,
        &CorrelatedNoise::zero(U2),
        &CorrelatedNoise::isotropic(U1, 1.),
        &u,
        &y,
        &initial,
    )
    .unwrap();

    assert_eq!(estimates.len(), steps);
    for (estimate, xt) in estimates.iter().zip(&x) {
        assert_eq!(&estimate.x, xt);
        assert_eq!(estimate.X, Matrix2::zeros());
    }
}

#[test]
fn test_precise_measurement_recovers_state() {
    let system = LinearSystem::new(Matrix2::new(0.99, 0.01, -0.1, 0.99), Matrix2::identity() * 0.01).unwrap();
    let obs = LinearObserveModel { Hx: Matrix2::identity() };

    let x0 = Vector2::new(1., 0.);
    let u0 = Vector2::new(0.5, -0.5);
    let x1 = system.apply(&x0, &u0) + Vector2::new(0.03, -0.02);

    let estimates = filter(
        &system,
        &obs,
        &CorrelatedNoise::isotropic(U2, 0.1),
        &CorrelatedNoise::isotropic(U2, 1e-6),
        &[u0, Vector2::zeros()],
        &[x0, x1],
        &KalmanState {
            x: Vector2::zeros(),
            X: Matrix2::identity(),
        },
    )
    .unwrap();

    approx::assert_abs_diff_eq!(estimates[1].x, x1, epsilon = 1e-6);
}

#[test]
fn test_singular_innovation() {
    let system = LinearSystem::new(Matrix1::new(1.), Matrix1::new(0.)).unwrap();
    let obs = LinearObserveModel { Hx: Matrix1::new(1.) };
    let zero = CorrelatedNoise::zero(U1);

    let mut state = KalmanState::new_zero(U1);
    state.predict(&system, &Vector1::new(0.), &zero).unwrap();
    assert!(matches!(
        state.observe(&obs, &zero, &Vector1::new(1.)),
        Err(EstimateError::Singular(_))
    ));

    let result = filter(
        &system,
        &obs,
        &zero,
        &zero,
        &[Vector1::new(0.), Vector1::new(0.)],
        &[Vector1::new(0.), Vector1::new(1.)],
        &KalmanState::new_zero(U1),
    );
    assert!(matches!(result, Err(EstimateError::Singular(_))));
}

#[test]
fn test_covariance_symmetric_psd() {
    let scenario = OscillatorScenario::from_config(&OscillatorConfig::default()).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(2);
    let record = scenario.simulate(&mut rng).unwrap();
    let estimates = scenario.estimate(&record).unwrap();

    for estimate in &estimates {
        assert_eq!(estimate.X, estimate.X.transpose());
        assert!(estimate.X.symmetric_eigenvalues().min() >= -1e-12);
    }
}

#[test]
fn test_kalman_velocity_beats_finite_difference() {
    let config = OscillatorConfig::default();
    let scenario = OscillatorScenario::from_config(&config).unwrap();

    for seed in 0..5 {
        let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed + seed);
        let run = scenario.run(&mut rng).unwrap();

        assert_eq!(run.estimates.len(), config.steps);
        assert_eq!(run.finite_difference.len(), config.steps);
        assert_eq!(run.finite_difference[0], 0.);
        assert!(
            run.kalman_rmse < run.finite_difference_rmse,
            "Kalman {} finite difference {}",
            run.kalman_rmse,
            run.finite_difference_rmse
        );
    }
}

#[test]
fn test_estimator_init() {
    let mut state = KalmanState::new_zero(U2);
    let bad = KalmanState {
        x: Vector2::zeros(),
        X: Matrix2::new(1., 0., 0., -1.),
    };
    assert!(matches!(state.init(&bad), Err(EstimateError::NotPSD(_))));

    let good = KalmanState {
        x: Vector2::new(1., 2.),
        X: Matrix2::new(2., 1e-3, 0., 1.),
    };
    state.init(&good).unwrap();
    let kalman = state.kalman_state().unwrap();
    assert_eq!(kalman.x, good.x);
    assert_eq!(state.state().unwrap(), good.x);
    assert_eq!(kalman.X, kalman.X.transpose());
}

#[test]
fn test_sequence_mismatch() {
    let (system, obs) = oscillator();
    let u = forcing(10);
    let y = vec![Vector1::new(0.); 9];
    let result = filter(
        &system,
        &obs,
        &CorrelatedNoise::isotropic(U2, 0.1),
        &CorrelatedNoise::isotropic(U1, 1.),
        &u,
        &y,
        &KalmanState::new_zero(U2),
    );
    assert!(matches!(result, Err(EstimateError::LengthMismatch { .. })));

    let empty = filter(
        &system,
        &obs,
        &CorrelatedNoise::isotropic(U2, 0.1),
        &CorrelatedNoise::isotropic(U1, 1.),
        &[],
        &[],
        &KalmanState::new_zero(U2),
    )
    .unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_dynamic_dimension_mismatch() {
    let system = LinearSystem::new(DMatrix::<f64>::identity(2, 2), DMatrix::zeros(2, 1)).unwrap();
    let obs = LinearObserveModel {
        Hx: DMatrix::from_row_slice(1, 3, &[1., 0., 0.]),
    };
    let mut state = KalmanState {
        x: DVector::<f64>::zeros(2),
        X: DMatrix::identity(2, 2),
    };
    let noise = CorrelatedNoise {
        Q: DMatrix::<f64>::identity(1, 1),
    };
    assert!(matches!(
        state.observe(&obs, &noise, &DVector::zeros(1)),
        Err(EstimateError::DimensionMismatch { .. })
    ));

    let process_noise = CorrelatedNoise {
        Q: DMatrix::<f64>::identity(3, 3),
    };
    assert!(matches!(
        state.predict(&system, &DVector::zeros(1), &process_noise),
        Err(EstimateError::DimensionMismatch { .. })
    ));

    // Covariance not matching the state
    let mut mismatched = KalmanState {
        x: DVector::<f64>::zeros(2),
        X: DMatrix::identity(3, 3),
    };
    let process_noise = CorrelatedNoise {
        Q: DMatrix::<f64>::identity(2, 2),
    };
    assert!(matches!(
        mismatched.predict(&system, &DVector::zeros(1), &process_noise),
        Err(EstimateError::DimensionMismatch { .. })
    ));
    let position = LinearObserveModel {
        Hx: DMatrix::from_row_slice(1, 2, &[1., 0.]),
    };
    assert!(matches!(
        mismatched.observe(&position, &noise, &DVector::zeros(1)),
        Err(EstimateError::DimensionMismatch { .. })
    ));
    assert_eq!(mismatched.X, DMatrix::identity(3, 3));
}
