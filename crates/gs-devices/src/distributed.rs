//! Aggregate distributed-generation model with current limiting.

use tracing::warn;

use crate::error::{DeviceError, DeviceResult};
use crate::terminal::{DerivedSetpoints, Initialized, Terminal};
use nalgebra::DVector;

/// Tolerance beyond which an over-limit current command is reported.
const LIMIT_TOL: f64 = 1e-6;

/// Aggregate distributed generation behind a current-limited interface.
///
/// States, in declared order: active current command `ip`, reactive current
/// command `iq`. Initialization is analytic: the commands follow from the
/// power-flow injection, clamped to the declared limits. A command that
/// already exceeds its limit signals inconsistent input data and is reported
/// as a diagnostic, not an error.
#[derive(Clone, Debug)]
pub struct DistributedGen {
    /// Active current limit (pu)
    pub ip_max: f64,
    /// Reactive current limit (pu)
    pub iq_max: f64,
}

impl DistributedGen {
    pub const STATE_NAMES: [&'static str; 2] = ["ip", "iq"];

    pub fn new(ip_max: f64, iq_max: f64) -> DeviceResult<Self> {
        if ip_max <= 0.0 || iq_max <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "current limits must be positive",
            });
        }
        Ok(Self { ip_max, iq_max })
    }

    /// Derive the limited current commands from the terminal conditions.
    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        let v = terminal.voltage.norm();
        if v < 1e-9 {
            return Err(DeviceError::ZeroVoltage {
                device: name.to_string(),
            });
        }

        let ip_cmd = terminal.p / v;
        let iq_cmd = terminal.q / v;

        if ip_cmd.abs() > self.ip_max + LIMIT_TOL {
            warn!(
                device = name,
                command = ip_cmd,
                limit = self.ip_max,
                "active current command exceeds limit; input data inconsistent"
            );
        }
        if iq_cmd.abs() > self.iq_max + LIMIT_TOL {
            warn!(
                device = name,
                command = iq_cmd,
                limit = self.iq_max,
                "reactive current command exceeds limit; input data inconsistent"
            );
        }

        let ip = ip_cmd.clamp(-self.ip_max, self.ip_max);
        let iq = iq_cmd.clamp(-self.iq_max, self.iq_max);

        Ok(Initialized {
            states: DVector::from_vec(vec![ip, iq]),
            setpoints: DerivedSetpoints {
                p_ref: Some(ip * v),
                q_ref: Some(iq * v),
                ..DerivedSetpoints::default()
            },
        })
    }
}
