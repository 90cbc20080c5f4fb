//! Damped Newton iteration over a residual closure.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::forward_difference_jacobian;
use nalgebra::DVector;
use tracing::debug;

/// Newton solver configuration.
#[derive(Clone, Copy, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Finite-difference perturbation for the Jacobian
    pub fd_epsilon: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-8,
            rel_tol: 1e-8,
            fd_epsilon: 1e-7,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

impl NewtonConfig {
    /// Configuration with a tightened absolute tolerance.
    pub fn with_tolerance(abs_tol: f64) -> Self {
        Self {
            abs_tol,
            rel_tol: 0.0,
            ..Self::default()
        }
    }
}

/// Newton iteration result.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Best iterate found (the zero when `converged` is true)
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Solve `f(x) = 0` by damped Newton iteration from `x0`.
///
/// The Jacobian is computed by forward finite differences of `f`. Failure to
/// meet tolerance within the allowed iterations returns `converged: false`
/// with the best iterate found; only a singular Jacobian or a non-finite
/// residual is an error.
pub fn newton_solve<F>(x0: DVector<f64>, f: F, config: &NewtonConfig) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let mut x = x0;
    let mut r = f(&x)?;
    check_finite(&r)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm <= config.abs_tol || r_norm <= config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = forward_difference_jacobian(&x, &f, config.fd_epsilon)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-&r))
            .ok_or(SolverError::SingularJacobian { iteration: iter })?;

        // Backtracking line search on the residual norm
        let mut alpha = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = f(&x_new)?;
        let mut r_new_norm = r_new.norm();

        for _ in 0..config.max_line_search_iters {
            if r_new_norm.is_finite() && r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = f(&x_new)?;
            r_new_norm = r_new.norm();
        }

        if !r_new_norm.is_finite() {
            return Err(SolverError::NonFiniteResidual {
                what: format!("iteration {iter} left the residual non-finite"),
            });
        }

        // A fully stalled line search means no further progress is possible.
        if r_new_norm >= r_norm && alpha < 1e-12 {
            debug!(iteration = iter, residual = r_norm, "newton stalled");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: false,
            });
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    let converged = r_norm <= config.abs_tol || r_norm <= config.rel_tol * r0_norm;
    Ok(NewtonResult {
        x,
        residual_norm: r_norm,
        iterations: config.max_iterations,
        converged,
    })
}

fn check_finite(r: &DVector<f64>) -> SolverResult<()> {
    if r.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::NonFiniteResidual {
            what: "initial residual".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, f, &NewtonConfig::default()).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-7);
    }

    #[test]
    fn coupled_system() {
        // x^2 + y^2 = 5, x*y = 2 has a root at (2, 1)
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                x[0] * x[0] + x[1] * x[1] - 5.0,
                x[0] * x[1] - 2.0,
            ]))
        };

        let x0 = DVector::from_vec(vec![1.8, 0.7]);
        let result = newton_solve(x0, f, &NewtonConfig::default()).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-6);
        assert!((result.x[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reports_non_convergence_without_error() {
        // f(x) = x^2 + 1 has no real root; the solver must come back with
        // converged = false rather than an Err.
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, f, &NewtonConfig::default()).unwrap();
        assert!(!result.converged);
    }

    #[test]
    fn strict_tolerance_config() {
        let cfg = NewtonConfig::with_tolerance(1e-10);
        assert_eq!(cfg.abs_tol, 1e-10);
        assert_eq!(cfg.rel_tol, 0.0);
    }
}
