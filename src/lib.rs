//! LQ+Estimate, linear-quadratic tracking control and Kalman estimation.
//!
//! Optimal control and optimal estimation of linear systems are dual problems. Both are solved by a Riccati equation.
//! For control the recursion runs backward in time from the end of the horizon, giving a time varying feedback that drives
//! the system along a reference trajectory. For estimation the recursion runs forward in time with each observation,
//! giving a time varying gain that fuses the system's model with noisy measurements of its outputs.
//!
//! The library implements both for systems of any dimension:
//! the finite horizon tracking controller in [`control::tracking`] and the discrete Kalman filter in
//! [`estimators::covariance`]. Supporting them are simulations of the systems they are applied to, white noise driven
//! processes and the analysis of linear ODEs by their eigenvalues and matrix exponential.
//!
//! System and noise models are represented by structs, estimation operations are defined by traits in [`models`].
//! Dimensions are nalgebra's static or dynamic dimensions, shape mismatches of dynamic matrices are reported as errors.
//!
//! # Licensing
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction,
//! including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
//! and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NON INFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
//! WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod analysis;
pub mod config;
pub mod control;
pub mod error;
pub mod estimators;
pub mod linalg;
pub mod matrix;
pub mod models;
pub mod noise;
pub mod simulation;
