use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SolverError {
    #[error("Matrix is {rows}x{cols} but the right-hand side has {rhs} entries")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },
}

/// Outcome of an iterative solve. A solve that runs out of iterations still
/// reports the last iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub solution: DVector<f64>,
    pub iterations: usize,
    /// Residual norm relative to the norm of the right-hand side.
    pub residual: f64,
    pub converged: bool,
}

/// Strategy for solving the sparse systems assembled by the engine.
pub trait LinearSolver {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<SolveReport, SolverError>;
}

/// Stabilized bi-conjugate gradient method with an identity preconditioner,
/// started from the zero vector.
///
/// Convergence is declared when `|r| / |b|` drops below the tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiCgStab;

impl BiCgStab {
    pub fn new() -> Self {
        Self
    }
}

impl LinearSolver for BiCgStab {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<SolveReport, SolverError> {
        let n = rhs.len();
        if matrix.nrows() != matrix.ncols() || matrix.nrows() != n {
            return Err(SolverError::DimensionMismatch {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
                rhs: n,
            });
        }

        let mut x = DVector::zeros(n);
        let rhs_norm = rhs.norm();
        if rhs_norm == 0.0 {
            return Ok(SolveReport {
                solution: x,
                iterations: 0,
                residual: 0.0,
                converged: true,
            });
        }

        let mut r = rhs.clone();
        let mut r_hat = r.clone();
        let mut p = DVector::zeros(n);
        let mut v = DVector::zeros(n);
        let (mut rho_prev, mut alpha, mut omega) = (1.0, 1.0, 1.0);
        let mut residual = 1.0;
        let restart_threshold = f64::EPSILON * f64::EPSILON * rhs.norm_squared();
        let mut restarts = 0usize;

        for iteration in 1..=max_iterations {
            let mut rho = r_hat.dot(&r);
            if !rho.is_finite() {
                warn!(iteration, "BiCGSTAB breakdown (rho = {rho})");
                return Ok(SolveReport {
                    solution: x,
                    iterations: iteration - 1,
                    residual,
                    converged: false,
                });
            }
            if rho.abs() < restart_threshold {
                // The shadow residual became orthogonal to r; restart from the current residual.
                r_hat.copy_from(&r);
                rho = r.norm_squared();
                rho_prev = rho;
                alpha = 1.0;
                omega = 1.0;
                p.fill(0.0);
                v.fill(0.0);
                restarts += 1;
                debug!(iteration, restarts, "BiCGSTAB restarted");
            }

            let beta = (rho / rho_prev) * (alpha / omega);
            p = &r + beta * (&p - omega * &v);
            v = matrix * &p;
            alpha = rho / r_hat.dot(&v);

            let s = &r - alpha * &v;
            let s_norm = s.norm() / rhs_norm;
            if s_norm < tolerance {
                x.axpy(alpha, &p, 1.0);
                debug!(iteration, residual = s_norm, "BiCGSTAB converged");
                return Ok(SolveReport {
                    solution: x,
                    iterations: iteration,
                    residual: s_norm,
                    converged: true,
                });
            }

            let t = matrix * &s;
            let tt = t.dot(&t);
            omega = if tt == 0.0 { 0.0 } else { t.dot(&s) / tt };
            x.axpy(alpha, &p, 1.0);
            x.axpy(omega, &s, 1.0);
            r = &s - omega * &t;
            residual = r.norm() / rhs_norm;

            if residual < tolerance {
                debug!(iteration, residual, "BiCGSTAB converged");
                return Ok(SolveReport {
                    solution: x,
                    iterations: iteration,
                    residual,
                    converged: true,
                });
            }
            if omega == 0.0 {
                warn!(iteration, "BiCGSTAB stagnated (omega = 0)");
                return Ok(SolveReport {
                    solution: x,
                    iterations: iteration,
                    residual,
                    converged: false,
                });
            }
            rho_prev = rho;
        }

        Ok(SolveReport {
            solution: x,
            iterations: max_iterations,
            residual,
            converged: false,
        })
    }
}
