//! Third-order induction machine model.

use std::f64::consts::TAU;

use gs_core::Phasor;
use nalgebra::DVector;
use tracing::warn;

use crate::error::{DeviceError, DeviceResult};
use crate::terminal::{DerivedSetpoints, Initialized, Terminal};
use gs_solver::{NewtonConfig, SolverError, newton_solve};

/// Induction machine with rotor flux dynamics behind the transient reactance.
///
/// States, in declared order: rotor slip `slip`, then the real and imaginary
/// parts of the transient EMF, `er_p` and `ei_p`. Motor convention: positive
/// terminal current flows into the machine, so the scheduled injection of a
/// motoring device is negative.
///
/// Steady state is found from three equations: the complex rotor-flux
/// equation `e' + j·s·ω_s·T0'·e' − j·(x − x')·i = 0` (two real residuals)
/// and the active-power match at the terminal. Initialization uses a strict
/// tolerance; a non-converged solve keeps the initial guess, which risks a
/// silently poor fit, so the warning below should not be ignored.
#[derive(Clone, Debug)]
pub struct InductionMachine {
    /// Stator resistance (pu)
    pub rs: f64,
    /// Stator leakage reactance (pu)
    pub xs: f64,
    /// Magnetizing reactance (pu)
    pub xm: f64,
    /// Rotor resistance (pu)
    pub rr: f64,
    /// Rotor leakage reactance (pu)
    pub xr: f64,
    /// Inertia constant (s)
    pub h: f64,
    /// Electrical base frequency (Hz)
    pub f_base: f64,
}

impl InductionMachine {
    pub const STATE_NAMES: [&'static str; 3] = ["slip", "er_p", "ei_p"];

    /// Initial slip guess: 2% off synchronous speed.
    const SLIP_GUESS: f64 = 0.02;

    pub fn new(
        rs: f64,
        xs: f64,
        xm: f64,
        rr: f64,
        xr: f64,
        h: f64,
        f_base: f64,
    ) -> DeviceResult<Self> {
        if rr <= 0.0 || xm <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "rotor resistance and magnetizing reactance must be positive",
            });
        }
        if f_base <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "base frequency must be positive",
            });
        }
        Ok(Self {
            rs,
            xs,
            xm,
            rr,
            xr,
            h,
            f_base,
        })
    }

    /// Open-circuit reactance `x = x_s + x_m`.
    pub fn x_open(&self) -> f64 {
        self.xs + self.xm
    }

    /// Transient reactance `x' = x_s + x_m·x_r/(x_m + x_r)`.
    pub fn x_transient(&self) -> f64 {
        self.xs + self.xm * self.xr / (self.xm + self.xr)
    }

    /// Rotor open-circuit time constant (s).
    pub fn t0_p(&self) -> f64 {
        (self.xr + self.xm) / (TAU * self.f_base * self.rr)
    }

    /// Stator current into the machine for a given transient EMF.
    fn stator_current(&self, voltage: Phasor, e: Phasor) -> Phasor {
        (voltage - e) / Phasor::new(self.rs, self.x_transient())
    }

    /// Residuals for the unknowns `x = [s, e_r', e_i']` at drawn power `p_drawn`.
    pub fn steady_residual(
        &self,
        x: &DVector<f64>,
        voltage: Phasor,
        p_drawn: f64,
    ) -> Result<DVector<f64>, SolverError> {
        let slip = x[0];
        let e = Phasor::new(x[1], x[2]);
        let i = self.stator_current(voltage, e);

        let ws_t0 = TAU * self.f_base * self.t0_p();
        let flux = e + Phasor::new(0.0, slip * ws_t0) * e
            - Phasor::new(0.0, self.x_open() - self.x_transient()) * i;

        Ok(DVector::from_vec(vec![
            flux.re,
            flux.im,
            (voltage * i.conj()).re - p_drawn,
        ]))
    }

    /// Electromagnetic torque at the given state (pu, positive motoring).
    pub fn torque(&self, voltage: Phasor, e: Phasor) -> f64 {
        let i = self.stator_current(voltage, e);
        (e * i.conj()).re
    }

    /// Solve for the steady state at the given terminal conditions.
    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        let v = terminal.voltage;
        if v.norm() < 1e-9 {
            return Err(DeviceError::ZeroVoltage {
                device: name.to_string(),
            });
        }

        let p_drawn = -terminal.p;
        let x0 = DVector::from_vec(vec![Self::SLIP_GUESS, v.re, v.im]);

        let result = newton_solve(
            x0.clone(),
            |x| self.steady_residual(x, v, p_drawn),
            &NewtonConfig::with_tolerance(1e-10),
        )?;

        let x = if result.converged {
            result.x
        } else {
            warn!(
                device = name,
                family = "induction machine",
                residual = result.residual_norm,
                "initialization did not converge; keeping initial guess"
            );
            x0
        };

        let e = Phasor::new(x[1], x[2]);
        Ok(Initialized {
            states: DVector::from_vec(vec![x[0], x[1], x[2]]),
            setpoints: DerivedSetpoints {
                torque_ref: Some(self.torque(v, e)),
                ..DerivedSetpoints::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_core::polar;

    fn machine() -> InductionMachine {
        InductionMachine::new(0.01, 0.1, 3.0, 0.02, 0.08, 1.5, 60.0).unwrap()
    }

    #[test]
    fn half_pu_load_sits_on_stable_slip_branch() {
        // Machine drawing P0 = 0.5 pu at V = 1.0∠0°.
        let terminal = Terminal {
            voltage: polar(1.0, 0.0),
            p: -0.5,
            q: 0.0,
        };

        let init = machine().initialize("motor-1", &terminal).unwrap();

        let slip = init.states[0];
        assert!(slip > 0.0 && slip < 1.0, "slip = {slip}");
        // Stable branch: well below breakdown slip for these parameters.
        assert!(slip < 0.1);
        assert!(init.setpoints.torque_ref.unwrap() > 0.0);
    }

    #[test]
    fn solution_zeroes_the_rotor_equations() {
        let terminal = Terminal {
            voltage: polar(0.98, -0.05),
            p: -0.3,
            q: 0.0,
        };
        let m = machine();
        let init = m.initialize("motor-1", &terminal).unwrap();

        let r = m
            .steady_residual(&init.states, terminal.voltage, 0.3)
            .unwrap();
        assert!(r.norm() < 1e-9, "residual norm {}", r.norm());
    }

    #[test]
    fn derived_reactances() {
        let m = machine();
        assert!((m.x_open() - 3.1).abs() < 1e-12);
        assert!(m.x_transient() < m.x_open());
        assert!(m.t0_p() > 0.0);
    }
}
