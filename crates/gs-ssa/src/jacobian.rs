//! System Jacobian at an operating point.

use nalgebra::{DMatrix, DVector};

use crate::system::DynamicSystem;

/// Finite-difference perturbation used for system linearization.
pub const FD_EPSILON: f64 = 1e-6;

/// Dense Jacobian `∂f/∂x` of the system right-hand side at `x`, `t = 0`.
///
/// Central differences, column by column. For a residual-form system wrap
/// it in [`crate::ResidualForm`] first; the derivative vector is held at
/// zero by construction there, so both forms linearize identically.
pub fn system_jacobian<S: DynamicSystem>(system: &S, x: &DVector<f64>) -> DMatrix<f64> {
    let n = system.dim();
    debug_assert_eq!(x.len(), n);

    let mut jac = DMatrix::zeros(n, n);
    let mut x_probe = x.clone();
    let mut f_plus = DVector::zeros(n);
    let mut f_minus = DVector::zeros(n);

    for j in 0..n {
        let dx = FD_EPSILON * x[j].abs().max(1.0);

        x_probe[j] = x[j] + dx;
        system.derivative(&mut f_plus, &x_probe, 0.0);

        x_probe[j] = x[j] - dx;
        system.derivative(&mut f_minus, &x_probe, 0.0);

        x_probe[j] = x[j];

        jac.set_column(j, &((&f_plus - &f_minus) / (2.0 * dx)));
    }

    jac
}
