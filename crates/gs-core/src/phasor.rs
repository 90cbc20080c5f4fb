//! Complex phasor helpers for per-unit network quantities.
//!
//! All electrical quantities in the core are per-unit: voltages and currents
//! are complex phasors on the system base, powers are `p + j·q` injections.

use num_complex::Complex;

use crate::Real;

/// Complex per-unit phasor.
pub type Phasor = Complex<Real>;

/// Build a phasor from polar components (magnitude, angle in radians).
pub fn polar(mag: Real, ang: Real) -> Phasor {
    Complex::from_polar(mag, ang)
}

/// Complex power `s = v·conj(i)` measured at a terminal.
pub fn apparent_power(v: Phasor, i: Phasor) -> Phasor {
    v * i.conj()
}

/// Terminal current that delivers the injection `p + j·q` at voltage `v`.
///
/// Undefined for a collapsed voltage; callers guard `|v| ≈ 0`.
pub fn injection_current(v: Phasor, p: Real, q: Real) -> Phasor {
    (Complex::new(p, q) / v).conj()
}
