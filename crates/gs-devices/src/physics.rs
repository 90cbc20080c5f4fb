//! Pure device physics: saturation curves and rotor-frame transforms.

use gs_core::Phasor;

use crate::error::{DeviceError, DeviceResult};

/// Incremental flux saturation curve.
///
/// Both families map a flux magnitude `x` to the incremental saturation
/// `Se(x)` given the device's two saturation coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SaturationCurve {
    /// `Se(x) = b·(x−a)²/x`, undefined at `x = 0`
    Quadratic { a: f64, b: f64 },
    /// `Se(x) = b·x^a`
    Exponential { a: f64, b: f64 },
}

impl SaturationCurve {
    /// Evaluate the incremental saturation at flux magnitude `x`.
    ///
    /// The quadratic form divides by `x`; callers guard zero flux.
    pub fn evaluate(&self, x: f64) -> DeviceResult<f64> {
        match *self {
            SaturationCurve::Quadratic { a, b } => {
                if x == 0.0 {
                    return Err(DeviceError::SaturationDomain);
                }
                Ok(b * (x - a).powi(2) / x)
            }
            SaturationCurve::Exponential { a, b } => Ok(b * x.powf(a)),
        }
    }
}

/// Project a network-frame phasor onto the rotor d/q axes at angle `delta`.
///
/// The q axis sits at `delta`; for `v = V∠θ` this yields
/// `d = V·sin(delta−θ)`, `q = V·cos(delta−θ)`.
pub fn to_dq(delta: f64, ph: Phasor) -> (f64, f64) {
    let w = ph * Phasor::from_polar(1.0, -delta);
    (-w.im, w.re)
}

/// Rebuild the network-frame phasor from rotor-frame components.
pub fn from_dq(delta: f64, d: f64, q: f64) -> Phasor {
    Phasor::new(q, -d) * Phasor::from_polar(1.0, delta)
}
