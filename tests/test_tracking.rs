#![allow(non_snake_case)]

//! Finite horizon LQ tracking: schedule shape, invariants and limiting behaviour.

use na::{DMatrix, DVector, Matrix2, Matrix2x1, Vector2, U1, U2};
use nalgebra as na;

use lq_estimate::config::TrackingConfig;
use lq_estimate::control::tracking::TrackingProblem;
use lq_estimate::error::EstimateError;
use lq_estimate::models::LinearSystem;

const DT: f64 = 0.01;

fn stable_system() -> LinearSystem<f64, U2, U2> {
    LinearSystem::new(Matrix2::new(-1., 1., 2., -3.), Matrix2::identity()).unwrap()
}

fn constant_reference(r: Vector2<f64>, steps: usize) -> Vec<Vector2<f64>> {
    vec![r; steps + 1]
}

fn max_control(u: &[Vector2<f64>]) -> f64 {
    u.iter().map(|u| u.amax()).fold(0., f64::max)
}

/// RMS distance from the reference over the first 80% of the horizon, the end is pulled away by `K[T] = 0`.
fn tracking_error(lambda: f64) -> f64 {
    let r = Vector2::new(1., 0.);
    let reference = constant_reference(r, 1000);
    let problem = TrackingProblem::new(stable_system(), lambda, DT).unwrap();
    let solution = problem.solve(&reference, &r).unwrap();
    let n = 800;
    let sum: f64 = solution.trajectory.x[..n].iter().map(|x| (x - r).norm_squared()).sum();
    (sum / n as f64).sqrt()
}

#[test]
fn test_schedule_and_trajectory_lengths() {
    let reference = constant_reference(Vector2::new(1., 0.), 50);
    let problem = TrackingProblem::new(stable_system(), 1., DT).unwrap();
    let solution = problem.solve(&reference, &Vector2::zeros()).unwrap();

    assert_eq!(solution.schedule.K.len(), 51);
    assert_eq!(solution.schedule.s.len(), 51);
    assert_eq!(solution.schedule.horizon(), 50);
    assert_eq!(solution.trajectory.u.len(), 50);
    assert_eq!(solution.trajectory.x.len(), 51);

    // Terminal conditions
    assert_eq!(solution.schedule.K[50], Matrix2::zeros());
    assert_eq!(solution.schedule.s[50], Vector2::zeros());
    assert_eq!(solution.trajectory.x[0], Vector2::zeros());
}

#[test]
fn test_riccati_symmetric_psd() {
    for &lambda in &[1e-3, 1e-1, 10.] {
        let reference = constant_reference(Vector2::new(1., 0.), 1000);
        let problem = TrackingProblem::new(stable_system(), lambda, DT).unwrap();
        let schedule = problem.backward(&reference).unwrap();
        for K in &schedule.K {
            assert_eq!(K, &K.transpose());
            let min = K.symmetric_eigenvalues().min();
            assert!(min >= -1e-9, "K not PSD, eigenvalue {}", min);
        }
    }
}

#[test]
fn test_costate_zero_for_zero_reference() {
    let reference = constant_reference(Vector2::zeros(), 100);
    let problem = TrackingProblem::new(stable_system(), 1., DT).unwrap();
    let schedule = problem.backward(&reference).unwrap();
    for s in &schedule.s {
        assert_eq!(s, &Vector2::zeros());
    }
    // With nothing to follow the feedback only regulates towards the origin
    let x = Vector2::new(1., -1.);
    let u = schedule.control(0, &x);
    approx::assert_relative_eq!(u, -(&schedule.K[0] * x), max_relative = 1e-12);
}

#[test]
fn test_expensive_control_vanishes() {
    let reference = constant_reference(Vector2::new(1., 0.), 200);

    let expensive = TrackingProblem::new(stable_system(), 1e8, DT).unwrap();
    let u_expensive = expensive.solve(&reference, &Vector2::zeros()).unwrap().trajectory.u;
    let cheap = TrackingProblem::new(stable_system(), 1., DT).unwrap();
    let u_cheap = cheap.solve(&reference, &Vector2::zeros()).unwrap().trajectory.u;

    assert!(max_control(&u_expensive) < 1e-6);
    assert!(max_control(&u_cheap) > 1e-2);
}

#[test]
fn test_cheap_control_tracks() {
    let err_cheap = tracking_error(1e-3);
    let err_mid = tracking_error(1e-1);
    let err_expensive = tracking_error(10.);

    assert!(err_cheap < 0.05, "tracking error {}", err_cheap);
    assert!(err_cheap < err_mid);
    assert!(err_mid < err_expensive);
}

#[test]
fn test_optimal_cost_below_uncontrolled() {
    let r = Vector2::new(1., 0.);
    let reference = constant_reference(r, 1000);
    let problem = TrackingProblem::new(stable_system(), 0.1, DT).unwrap();
    let solution = problem.solve(&reference, &r).unwrap();
    let optimal = problem.cost(&solution.trajectory, &reference).unwrap();

    // Same start with no control at all
    let mut uncontrolled = solution.trajectory.clone();
    let mut x = r;
    for t in 0..uncontrolled.u.len() {
        uncontrolled.u[t] = Vector2::zeros();
        uncontrolled.x[t] = x;
        x = problem.system.euler_step(&x, &uncontrolled.u[t], DT);
    }
    let last = uncontrolled.x.len() - 1;
    uncontrolled.x[last] = x;
    let free = problem.cost(&uncontrolled, &reference).unwrap();

    assert!(optimal < free, "optimal {} uncontrolled {}", optimal, free);
}

#[test]
fn test_double_integrator_follows_sinusoid() {
    let config = TrackingConfig::default();
    let problem = config.problem().unwrap();
    let reference = config.reference();
    assert_eq!(reference.len(), config.steps + 1);

    let solution = problem.solve(&reference, &config.initial_state()).unwrap();
    for t in 100..900 {
        let err = (solution.trajectory.x[t][0] - reference[t][0]).abs();
        assert!(err < 0.1, "position error {} at step {}", err, t);
    }
}

#[test]
fn test_scalar_control() {
    let system: LinearSystem<f64, U2, U1> =
        LinearSystem::new(Matrix2::new(0., 1., 0., 0.), Matrix2x1::new(0., 1.)).unwrap();
    let problem = TrackingProblem::new(system, 1., DT).unwrap();
    let reference = constant_reference(Vector2::new(1., 0.), 10);
    let solution = problem.solve(&reference, &Vector2::zeros()).unwrap();
    assert_eq!(solution.trajectory.u.len(), 10);
    // Pushed towards the reference
    assert!(solution.trajectory.u[0][0] > 0.);
}

#[test]
fn test_invalid_parameters() {
    assert!(matches!(
        TrackingProblem::new(stable_system(), 0., DT),
        Err(EstimateError::InvalidParameter(_))
    ));
    assert!(matches!(
        TrackingProblem::new(stable_system(), 1., -DT),
        Err(EstimateError::InvalidParameter(_))
    ));
    let problem = TrackingProblem::new(stable_system(), 1., DT).unwrap();
    assert!(matches!(problem.backward(&[]), Err(EstimateError::InvalidParameter(_))));
}

#[test]
fn test_dynamic_dimension_mismatch() {
    let A = DMatrix::from_row_slice(2, 2, &[-1., 1., 2., -3.]);
    let B = DMatrix::from_row_slice(2, 1, &[0., 1.]);
    let problem = TrackingProblem::new(LinearSystem::new(A, B).unwrap(), 1., DT).unwrap();

    let bad_reference = vec![DVector::from_element(3, 1.); 11];
    assert!(matches!(
        problem.backward(&bad_reference),
        Err(EstimateError::DimensionMismatch { .. })
    ));

    let reference = vec![DVector::from_element(2, 1.); 11];
    let schedule = problem.backward(&reference).unwrap();
    assert!(matches!(
        problem.forward(&schedule, &DVector::zeros(3)),
        Err(EstimateError::DimensionMismatch { .. })
    ));
    let mut bad_costate = schedule.clone();
    bad_costate.s[0] = DVector::zeros(3);
    assert!(matches!(
        problem.forward(&bad_costate, &DVector::zeros(2)),
        Err(EstimateError::DimensionMismatch { .. })
    ));
    let trajectory = problem.forward(&schedule, &DVector::zeros(2)).unwrap();
    assert_eq!(trajectory.x.len(), 11);

    let short = vec![DVector::from_element(2, 1.); 5];
    assert!(matches!(
        problem.cost(&trajectory, &short),
        Err(EstimateError::LengthMismatch { .. })
    ));
}

#[test]
fn test_non_square_system_rejected() {
    let A = DMatrix::from_row_slice(2, 3, &[0.; 6]);
    let B = DMatrix::from_row_slice(2, 1, &[0., 1.]);
    assert!(matches!(
        LinearSystem::new(A, B),
        Err(EstimateError::DimensionMismatch { .. })
    ));
}
