//! Callback contract at the time-integration boundary.

use nalgebra::DVector;

/// Mass-matrix form of the DAE system: `M·ẋ = f(x, t)`.
///
/// The integration engine owns the full system; small-signal analysis only
/// evaluates `f` at `t = 0` around an operating point.
pub trait DynamicSystem {
    /// Number of states.
    fn dim(&self) -> usize;

    /// Evaluate `f(x, t)` into `out`.
    fn derivative(&self, out: &mut DVector<f64>, x: &DVector<f64>, t: f64);

    /// Diagonal of the mass matrix `M`; zero entries mark algebraic states.
    fn mass_diagonal(&self) -> DVector<f64>;
}

/// Implicit (residual) form of the DAE system: `r(ẋ, x, t) = M·ẋ − f(x, t)`.
pub trait ResidualSystem {
    /// Number of states.
    fn dim(&self) -> usize;

    /// Evaluate `r(ẋ, x, t)` into `out`.
    fn residual(&self, out: &mut DVector<f64>, dx: &DVector<f64>, x: &DVector<f64>, t: f64);

    /// Diagonal of the mass matrix `M`; zero entries mark algebraic states.
    fn mass_diagonal(&self) -> DVector<f64>;
}

/// Adapter presenting a residual-form system in mass-matrix form.
///
/// With the derivative vector held at zero, `r(0, x, t) = −f(x, t)`, so the
/// adaptation is exact rather than a linearization-only trick.
pub struct ResidualForm<'a, S: ResidualSystem>(pub &'a S);

impl<S: ResidualSystem> DynamicSystem for ResidualForm<'_, S> {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn derivative(&self, out: &mut DVector<f64>, x: &DVector<f64>, t: f64) {
        let dx = DVector::zeros(x.len());
        self.0.residual(out, &dx, x, t);
        *out *= -1.0;
    }

    fn mass_diagonal(&self) -> DVector<f64> {
        self.0.mass_diagonal()
    }
}
