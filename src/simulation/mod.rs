//! Simulation of the systems used to exercise the estimators and controllers.

pub mod ode;
pub mod oscillator;
pub mod process;
