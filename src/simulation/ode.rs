#![allow(non_snake_case)]

//! Linear ordinary differential equations `ẋ = A x`.
//!
//! The numerical solution by explicit Euler steps is compared with the exact solution `x(t) = exp(A t) x0`.
//! For two dimensional systems [`Modes`] gives the eigendecomposition, the kind of equilibrium at the
//! origin and a closed form matrix exponential.

use log::debug;
use na::{allocator::Allocator, Complex, DefaultAllocator, Dim, Matrix2, MatrixN, RealField, Vector2, VectorN};
use nalgebra as na;

use crate::error::EstimateError;
use crate::linalg::expm::expm;
use crate::matrix::check_shape;

/// Explicit Euler solution `x[k+1] = x[k] + dt A x[k]`, returns `steps + 1` states.
pub fn euler<N: RealField, D: Dim>(
    A: &MatrixN<N, D>,
    x0: &VectorN<N, D>,
    dt: N,
    steps: usize,
) -> Result<Vec<VectorN<N, D>>, EstimateError>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    check_system(A, x0)?;
    debug!("Euler solution of {} dimensional ODE over {} steps", A.nrows(), steps);
    let mut x = Vec::with_capacity(steps + 1);
    let mut xk = x0.clone();
    for _ in 0..steps {
        let next = &xk + A * &xk * dt;
        x.push(xk);
        xk = next;
    }
    x.push(xk);
    Ok(x)
}

/// Exact solution sampled every dt, `x[k+1] = exp(A dt) x[k]`, returns `steps + 1` states.
pub fn exact<N: RealField, D: Dim>(
    A: &MatrixN<N, D>,
    x0: &VectorN<N, D>,
    dt: N,
    steps: usize,
) -> Result<Vec<VectorN<N, D>>, EstimateError>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    check_system(A, x0)?;
    let transition = expm(&(A * dt))?;
    let mut x = Vec::with_capacity(steps + 1);
    let mut xk = x0.clone();
    for _ in 0..steps {
        let next = &transition * &xk;
        x.push(xk);
        xk = next;
    }
    x.push(xk);
    Ok(x)
}

fn check_system<N: RealField, D: Dim>(A: &MatrixN<N, D>, x0: &VectorN<N, D>) -> Result<(), EstimateError>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    check_shape("A", A, (A.nrows(), A.nrows()))?;
    check_shape("x0", x0, (A.nrows(), 1))
}

/// Kind of the equilibrium at the origin of a two dimensional system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equilibrium {
    /// Real negative eigenvalues
    StableNode,
    /// Real positive eigenvalues
    UnstableNode,
    /// Real eigenvalues of opposite sign
    Saddle,
    /// Complex eigenvalues with negative real part
    StableFocus,
    /// Complex eigenvalues with positive real part
    UnstableFocus,
    /// Imaginary eigenvalues
    Center,
    /// A zero eigenvalue, the equilibrium is not isolated
    Degenerate,
}

/// Eigendecomposition of a real 2x2 system matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Modes {
    pub A: Matrix2<f64>,
    /// Eigenvalues, the conjugate pair when complex, otherwise the larger first
    pub values: [Complex<f64>; 2],
    /// Unit eigenvectors as columns, only for real distinct eigenvalues
    pub vectors: Option<Matrix2<f64>>,
}

// Relative tolerance deciding eigenvalues are repeated
const REPEATED: f64 = 1e-12;

impl Modes {
    pub fn of(A: &Matrix2<f64>) -> Modes {
        let half_trace = A.trace() / 2.;
        let det = A.determinant();
        let disc = half_trace * half_trace - det;
        let scale = half_trace * half_trace + det.abs();

        if disc.abs() <= REPEATED * scale {
            Modes {
                A: *A,
                values: [Complex::new(half_trace, 0.); 2],
                vectors: None,
            }
        } else if disc > 0. {
            let root = disc.sqrt();
            let l1 = half_trace + root;
            let l2 = half_trace - root;
            let v1 = eigenvector(A, l1);
            let v2 = eigenvector(A, l2);
            Modes {
                A: *A,
                values: [Complex::new(l1, 0.), Complex::new(l2, 0.)],
                vectors: Some(Matrix2::from_columns(&[v1, v2])),
            }
        } else {
            let root = (-disc).sqrt();
            Modes {
                A: *A,
                values: [Complex::new(half_trace, root), Complex::new(half_trace, -root)],
                vectors: None,
            }
        }
    }

    pub fn is_complex(&self) -> bool {
        self.values[0].im != 0.
    }

    pub fn is_repeated(&self) -> bool {
        self.values[0] == self.values[1]
    }

    pub fn equilibrium(&self) -> Equilibrium {
        let det = self.A.determinant();
        let re = self.values[0].re;
        if det < 0. {
            Equilibrium::Saddle
        } else if det == 0. {
            Equilibrium::Degenerate
        } else if self.is_complex() {
            if re < 0. {
                Equilibrium::StableFocus
            } else if re > 0. {
                Equilibrium::UnstableFocus
            } else {
                Equilibrium::Center
            }
        } else if re < 0. {
            Equilibrium::StableNode
        } else {
            Equilibrium::UnstableNode
        }
    }

    /// Closed form `exp(A t)`, interpolating exp on the eigenvalues with a first order polynomial in A.
    pub fn exp(&self, t: f64) -> Matrix2<f64> {
        let I = Matrix2::identity();
        let A = &self.A;
        let [l1, l2] = self.values;
        if self.is_repeated() {
            let l = l1.re;
            (I * (1. - l * t) + A * t) * (l * t).exp()
        } else if self.is_complex() {
            let (alpha, beta) = (l1.re, l1.im);
            let (sin, cos) = (beta * t).sin_cos();
            (I * (cos - alpha / beta * sin) + A * (sin / beta)) * (alpha * t).exp()
        } else {
            let (l1, l2) = (l1.re, l2.re);
            let (e1, e2) = ((l1 * t).exp(), (l2 * t).exp());
            (I * (l1 * e2 - l2 * e1) + A * (e1 - e2)) / (l1 - l2)
        }
    }

    /// Solution of `ẋ = A x` at time t from x0.
    pub fn solution(&self, x0: &Vector2<f64>, t: f64) -> Vector2<f64> {
        self.exp(t) * x0
    }
}

/// Unit eigenvector of A for the real eigenvalue l, from whichever row of `A - l I` is better conditioned.
fn eigenvector(A: &Matrix2<f64>, l: f64) -> Vector2<f64> {
    let from_row0 = Vector2::new(A[(0, 1)], l - A[(0, 0)]);
    let from_row1 = Vector2::new(l - A[(1, 1)], A[(1, 0)]);
    if from_row0.norm() >= from_row1.norm() {
        from_row0.normalize()
    } else {
        from_row1.normalize()
    }
}
