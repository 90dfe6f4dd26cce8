//! Optimal controllers.

pub mod tracking;
