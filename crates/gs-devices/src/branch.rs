//! Dynamic branch model: series RL line with current states.

use gs_core::Phasor;
use nalgebra::DVector;

use crate::error::{DeviceError, DeviceResult};
use crate::terminal::{DerivedSetpoints, Initialized};

/// Series branch whose current is a dynamic state.
///
/// States, in declared order: `i_re`, `i_im` — the series current phasor.
/// Unlike bus-connected devices a branch sees both terminal voltages, and
/// its steady state is analytic: the current through the series impedance.
#[derive(Clone, Debug)]
pub struct DynamicBranch {
    /// Series resistance (pu)
    pub r: f64,
    /// Series reactance (pu)
    pub x: f64,
    /// Total line charging susceptance (pu)
    pub b: f64,
}

impl DynamicBranch {
    pub const STATE_NAMES: [&'static str; 2] = ["i_re", "i_im"];

    pub fn new(r: f64, x: f64, b: f64) -> DeviceResult<Self> {
        if r == 0.0 && x == 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "branch series impedance must be nonzero",
            });
        }
        Ok(Self { r, x, b })
    }

    /// Series admittance `1/(r + jx)`.
    pub fn series_admittance(&self) -> Phasor {
        Phasor::new(1.0, 0.0) / Phasor::new(self.r, self.x)
    }

    /// Series current for the given terminal voltages.
    pub fn series_current(&self, v_from: Phasor, v_to: Phasor) -> Phasor {
        (v_from - v_to) * self.series_admittance()
    }

    /// Initialize the current states from the two terminal voltage phasors.
    pub fn initialize(&self, v_from: Phasor, v_to: Phasor) -> Initialized {
        let i = self.series_current(v_from, v_to);
        Initialized {
            states: DVector::from_vec(vec![i.re, i.im]),
            setpoints: DerivedSetpoints::default(),
        }
    }
}
