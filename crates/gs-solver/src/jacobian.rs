//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Compute a Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by a scaled epsilon and computes
/// (f(x+e) - f(x))/e. One extra residual evaluation per column.
pub fn forward_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);
    let mut x_perturbed = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] = x[j] + dx;

        let f_perturbed = f(&x_perturbed)?;
        jac.set_column(j, &((f_perturbed - &f_x) / dx));

        x_perturbed[j] = x[j];
    }

    Ok(jac)
}

/// Compute a Jacobian using central finite differences (more accurate, 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac = DMatrix::zeros(0, n);
    let mut x_probe = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        x_probe[j] = x[j] + dx;
        let f_plus = f(&x_probe)?;

        x_probe[j] = x[j] - dx;
        let f_minus = f(&x_probe)?;

        x_probe[j] = x[j];

        if jac.nrows() == 0 {
            jac = DMatrix::zeros(f_plus.len(), n);
        }
        jac.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    Ok(jac)
}
