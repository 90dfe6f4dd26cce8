//! Linear algebra needed by the estimators and the ODE analysis.
//!
//! Factorisations of symmetric positive semi-definite matrices, reciprocal condition estimates and the matrix exponential.

pub mod cholesky;
pub mod expm;
pub mod rcond;
