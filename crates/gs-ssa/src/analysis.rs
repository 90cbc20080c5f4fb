//! Eigenanalysis of the reduced Jacobian.

use std::collections::BTreeMap;

use faer::complex_native::c64;
use faer::Mat;
use nalgebra::DMatrix;
use num_complex::Complex;
use tracing::warn;

use crate::error::{SsaError, SsaResult};
use crate::reduction::Reduction;
use gs_network::StateLabel;

/// Eigenvalues below this magnitude are treated as zero modes.
const ZERO_MODE_TOL: f64 = 1e-8;

/// Snapshot of the small-signal behavior at one operating point.
#[derive(Clone, Debug)]
pub struct SmallSignalResult {
    /// Eigenvalues of the reduced Jacobian, one per mode
    pub eigenvalues: Vec<Complex<f64>>,
    /// Right eigenvectors, column per mode, rows in reduced state order
    pub eigenvectors: DMatrix<Complex<f64>>,
    /// Stable iff every eigenvalue has non-positive real part
    pub stable: bool,
    /// Damping ratio of the eigenvalue at each reduced state index
    pub damping: Vec<f64>,
    /// Participation factors, `participation[(mode, state)]`; each mode row
    /// sums to one
    pub participation: DMatrix<f64>,
    /// Identity of each reduced state index
    pub labels: Vec<StateLabel>,
}

impl SmallSignalResult {
    /// Damping ratio of one named differential state.
    pub fn damping_of(&self, owner: &str, symbol: &str) -> Option<f64> {
        let i = self.state_position(owner, symbol)?;
        Some(self.damping[i])
    }

    /// Participation of one named state across all modes.
    pub fn participation_of(&self, owner: &str, symbol: &str) -> Option<Vec<f64>> {
        let i = self.state_position(owner, symbol)?;
        Some(self.participation.column(i).iter().copied().collect())
    }

    /// Structured per-owner, per-state damping map.
    pub fn damping_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut map: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (label, &zeta) in self.labels.iter().zip(self.damping.iter()) {
            map.entry(label.owner.clone())
                .or_default()
                .insert(label.symbol.clone(), zeta);
        }
        map
    }

    fn state_position(&self, owner: &str, symbol: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l.owner == owner && l.symbol == symbol)
    }
}

/// Eigendecompose a reduced Jacobian and classify its modes.
///
/// `angle_reference` states whether some device pins the network angle; a
/// system without one carries a structural zero eigenvalue that must not be
/// read as instability.
pub fn analyze(reduction: &Reduction, angle_reference: bool) -> SsaResult<SmallSignalResult> {
    let n = reduction.reduced.nrows();
    if n == 0 {
        return Ok(SmallSignalResult {
            eigenvalues: Vec::new(),
            eigenvectors: DMatrix::zeros(0, 0),
            stable: true,
            damping: Vec::new(),
            participation: DMatrix::zeros(0, 0),
            labels: Vec::new(),
        });
    }
    if reduction.reduced.iter().any(|v| !v.is_finite()) {
        return Err(SsaError::Eigen {
            what: "reduced Jacobian contains non-finite entries".to_string(),
        });
    }

    let (eigenvalues, eigenvectors) = dense_eigen(&reduction.reduced);

    let stable = eigenvalues.iter().all(|l| l.re <= 0.0);
    if !angle_reference && eigenvalues.iter().any(|l| l.norm() < ZERO_MODE_TOL) {
        warn!(
            "zero eigenvalue without an angle reference; likely a reference artifact, not instability"
        );
    }

    let damping = eigenvalues
        .iter()
        .map(|l| {
            let norm = l.norm();
            if norm < ZERO_MODE_TOL { 0.0 } else { -l.re / norm }
        })
        .collect();

    let participation = participation_factors(&eigenvectors)?;

    Ok(SmallSignalResult {
        eigenvalues,
        eigenvectors,
        stable,
        damping,
        participation,
        labels: reduction.labels.clone(),
    })
}

/// General complex eigendecomposition of a dense real matrix.
fn dense_eigen(m: &DMatrix<f64>) -> (Vec<Complex<f64>>, DMatrix<Complex<f64>>) {
    let n = m.nrows();
    let mut a: Mat<f64> = Mat::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            a.write(i, j, m[(i, j)]);
        }
    }

    let evd = a.eigendecomposition::<c64>();
    let s = evd.s().column_vector();
    let u = evd.u();

    let eigenvalues = (0..n)
        .map(|i| {
            let v = s.read(i);
            Complex::new(v.re, v.im)
        })
        .collect();
    let eigenvectors = DMatrix::from_fn(n, n, |i, j| {
        let v = u.read(i, j);
        Complex::new(v.re, v.im)
    });

    (eigenvalues, eigenvectors)
}

/// Normalized participation factors `p[mode, state]`.
///
/// `p_ij = |L_ij|·|R_ji| / Σ_k |L_ik|·|R_ki|` with `L = R⁻¹`, so each mode's
/// factors sum to one.
fn participation_factors(right: &DMatrix<Complex<f64>>) -> SsaResult<DMatrix<f64>> {
    let n = right.nrows();
    let left = right.clone().try_inverse().ok_or(SsaError::Eigen {
        what: "right eigenvector matrix is singular".to_string(),
    })?;

    let mut p = DMatrix::zeros(n, n);
    for mode in 0..n {
        let mut row_sum = 0.0;
        for state in 0..n {
            let raw = left[(mode, state)].norm() * right[(state, mode)].norm();
            p[(mode, state)] = raw;
            row_sum += raw;
        }
        if row_sum > 0.0 {
            for state in 0..n {
                p[(mode, state)] /= row_sum;
            }
        }
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labels(n: usize) -> Vec<StateLabel> {
        (0..n)
            .map(|i| StateLabel {
                owner: "sys".to_string(),
                symbol: format!("x{i}"),
            })
            .collect()
    }

    fn reduction_of(m: DMatrix<f64>) -> Reduction {
        let n = m.nrows();
        Reduction {
            reduced: m,
            differential: (0..n).collect(),
            labels: labels(n),
            dropped: Vec::new(),
        }
    }

    #[test]
    fn diagonal_matrix_modes() {
        let red = reduction_of(DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, -4.0]));
        let result = analyze(&red, true).unwrap();

        assert!(result.stable);
        let mut res: Vec<f64> = result.eigenvalues.iter().map(|l| l.re).collect();
        res.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(res[0], -4.0, epsilon = 1e-9);
        assert_relative_eq!(res[1], -1.0, epsilon = 1e-9);

        // Real negative eigenvalues are critically damped.
        for zeta in &result.damping {
            assert_relative_eq!(*zeta, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn positive_real_part_flags_unstable() {
        let red = reduction_of(DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, -1.0]));
        let result = analyze(&red, true).unwrap();
        assert!(!result.stable);
    }

    #[test]
    fn oscillator_damping_ratio() {
        // ẍ + 2ζω·ẋ + ω²x with ω = 2, ζ = 0.25
        let (omega, zeta) = (2.0, 0.25);
        let red = reduction_of(DMatrix::from_row_slice(
            2,
            2,
            &[0.0, 1.0, -omega * omega, -2.0 * zeta * omega],
        ));
        let result = analyze(&red, true).unwrap();

        assert!(result.stable);
        for (l, d) in result.eigenvalues.iter().zip(result.damping.iter()) {
            assert!(l.im != 0.0, "expected a complex pair");
            assert_relative_eq!(*d, zeta, epsilon = 1e-9);
            assert!(*d >= -1.0 && *d <= 1.0);
        }
    }

    #[test]
    fn participation_rows_sum_to_one() {
        let red = reduction_of(DMatrix::from_row_slice(
            3,
            3,
            &[-1.0, 0.3, 0.0, 0.1, -2.0, 0.5, 0.0, 0.2, -0.7],
        ));
        let result = analyze(&red, true).unwrap();

        for mode in 0..3 {
            let sum: f64 = result.participation.row(mode).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn named_lookups_follow_labels() {
        let red = reduction_of(DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, -2.0]));
        let result = analyze(&red, true).unwrap();

        assert!(result.damping_of("sys", "x0").is_some());
        assert!(result.damping_of("sys", "nope").is_none());
        assert_eq!(result.participation_of("sys", "x1").unwrap().len(), 2);

        let map = result.damping_map();
        assert_eq!(map["sys"].len(), 2);
    }

    proptest::proptest! {
        /// Stability is a pure function of eigenvalue real parts, damping is
        /// bounded, and participation is mode-normalized — for arbitrary
        /// well-posed systems.
        #[test]
        fn analysis_invariants_hold(entries in proptest::collection::vec(-2.0_f64..2.0, 9)) {
            let red = reduction_of(DMatrix::from_row_slice(3, 3, &entries));
            if let Ok(result) = analyze(&red, true) {
                let expect_stable = result.eigenvalues.iter().all(|l| l.re <= 0.0);
                proptest::prop_assert_eq!(result.stable, expect_stable);

                for zeta in &result.damping {
                    proptest::prop_assert!(*zeta >= -1.0 - 1e-12 && *zeta <= 1.0 + 1e-12);
                }
                for mode in 0..3 {
                    let sum: f64 = result.participation.row(mode).iter().sum();
                    proptest::prop_assert!((sum - 1.0).abs() < 1e-6 || sum == 0.0);
                }
            }
        }
    }

    #[test]
    fn empty_reduction_is_trivially_stable() {
        let red = Reduction {
            reduced: DMatrix::zeros(0, 0),
            differential: Vec::new(),
            labels: Vec::new(),
            dropped: Vec::new(),
        };
        let result = analyze(&red, true).unwrap();
        assert!(result.stable);
        assert!(result.eigenvalues.is_empty());
    }
}
