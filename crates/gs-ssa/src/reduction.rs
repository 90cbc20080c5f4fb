//! Schur-complement reduction of algebraic states.

use nalgebra::{DMatrix, DVector};
use tracing::info;

use crate::error::{SsaError, SsaResult};
use gs_network::StateLabel;

/// Result of eliminating algebraic states from a system Jacobian.
#[derive(Clone, Debug)]
pub struct Reduction {
    /// Jacobian over differential states only
    pub reduced: DMatrix<f64>,
    /// Original (global) index of each row/column of `reduced`
    pub differential: Vec<usize>,
    /// Identity of each row/column of `reduced`
    pub labels: Vec<StateLabel>,
    /// Inert algebraic states dropped before inversion
    pub dropped: Vec<StateLabel>,
}

/// Differential/algebraic mask from the mass-matrix diagonal.
///
/// `true` marks a differential state; a zero mass entry pins the equation
/// to an algebraic constraint.
pub fn differential_mask(mass_diagonal: &DVector<f64>) -> Vec<bool> {
    mass_diagonal.iter().map(|&m| m != 0.0).collect()
}

/// Eliminate algebraic states: `diag(1/M_D)·(fx − fy·gy⁻¹·gx)`.
///
/// Algebraic constraints carry no time constant, so they must be folded
/// into the differential block before eigenvalues mean anything. Algebraic
/// states whose `gy` row and column are entirely zero contribute nothing
/// and would make `gy` singular; they are dropped with a diagnostic naming
/// the state, and dropping them never changes the reduced matrix.
///
/// `labels` identifies every state of the full system, in order.
pub fn reduce(
    jacobian: &DMatrix<f64>,
    mass_diagonal: &DVector<f64>,
    labels: &[StateLabel],
) -> SsaResult<Reduction> {
    let n = jacobian.nrows();
    if jacobian.ncols() != n || mass_diagonal.len() != n || labels.len() != n {
        return Err(SsaError::DimensionMismatch {
            what: format!(
                "jacobian {}x{}, mass diagonal {}, labels {}",
                jacobian.nrows(),
                jacobian.ncols(),
                mass_diagonal.len(),
                labels.len()
            ),
        });
    }

    let mask = differential_mask(mass_diagonal);
    let differential: Vec<usize> = (0..n).filter(|&i| mask[i]).collect();
    let algebraic: Vec<usize> = (0..n).filter(|&i| !mask[i]).collect();

    let gy_full = select(jacobian, &algebraic, &algebraic);

    // Inert pruning: keep an algebraic state only if it couples somewhere
    // inside the algebraic block.
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for (k, &global) in algebraic.iter().enumerate() {
        let row_zero = gy_full.row(k).iter().all(|&v| v == 0.0);
        let col_zero = gy_full.column(k).iter().all(|&v| v == 0.0);
        if row_zero && col_zero {
            info!(state = %labels[global], "dropping inert algebraic state from reduction");
            dropped.push(labels[global].clone());
        } else {
            kept.push(global);
        }
    }

    let fx = select(jacobian, &differential, &differential);
    let mut reduced = if kept.is_empty() {
        fx
    } else {
        let fy = select(jacobian, &differential, &kept);
        let gx = select(jacobian, &kept, &differential);
        let gy = select(jacobian, &kept, &kept);

        let solved = gy.lu().solve(&gx).ok_or(SsaError::SingularReduction)?;
        fx - fy * solved
    };

    for (k, &global) in differential.iter().enumerate() {
        let m = mass_diagonal[global];
        let mut row = reduced.row_mut(k);
        row /= m;
    }

    let kept_labels = differential.iter().map(|&i| labels[i].clone()).collect();
    Ok(Reduction {
        reduced,
        differential,
        labels: kept_labels,
        dropped,
    })
}

fn select(m: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
}
