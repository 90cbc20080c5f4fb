//! Shared initialization interface types.

use gs_core::Phasor;
use nalgebra::DVector;

/// Terminal conditions handed to a bus-connected device initializer.
///
/// `p` and `q` are the per-unit injection into the network (loads carry
/// negative `p`).
#[derive(Clone, Copy, Debug)]
pub struct Terminal {
    /// Terminal voltage phasor from the power-flow solution
    pub voltage: Phasor,
    /// Scheduled active-power injection
    pub p: f64,
    /// Scheduled reactive-power injection
    pub q: f64,
}

/// Reference setpoints inferred during initialization.
///
/// Physical setpoints are not supplied a priori; they fall out of the
/// steady-state solve. Initializers return them here instead of mutating
/// their parameter record, so initialization stays side-effect-free.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedSetpoints {
    /// Mechanical/load torque reference (pu)
    pub torque_ref: Option<f64>,
    /// Field/exciter voltage reference (pu)
    pub voltage_ref: Option<f64>,
    /// Active-power command after current limiting (pu)
    pub p_ref: Option<f64>,
    /// Reactive-power command after current limiting (pu)
    pub q_ref: Option<f64>,
    /// DC bias of a periodic source's harmonic sum (pu)
    pub bias: Option<f64>,
}

/// Output of a per-device initializer.
#[derive(Clone, Debug)]
pub struct Initialized {
    /// Device states in declared order; length equals the family's state count
    pub states: DVector<f64>,
    /// Setpoints discovered at the operating point
    pub setpoints: DerivedSetpoints,
}
