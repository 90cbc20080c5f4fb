//! Two-axis synchronous generator model.

use gs_core::{Phasor, injection_current};
use nalgebra::DVector;
use tracing::warn;

use crate::error::{DeviceError, DeviceResult};
use crate::physics::{SaturationCurve, to_dq};
use crate::terminal::{DerivedSetpoints, Initialized, Terminal};
use gs_solver::{NewtonConfig, SolverError, newton_solve};

/// Two-axis synchronous machine with optional field saturation.
///
/// States, in declared order: rotor angle `delta` (rad), rotor speed `omega`
/// (pu), q-axis transient voltage `eq_p`, d-axis transient voltage `ed_p`.
///
/// ## Steady-state equations
///
/// With the terminal voltage and currents projected onto the rotor frame:
///
/// ```text
/// e_d' = v_d + r_a·i_d − x_q'·i_q
/// e_q' = v_q + r_a·i_q + x_d'·i_d
/// E_fd = e_q'·(1 + Se(|e'|)) + (x_d − x_d')·i_d
/// e_d' = (x_q − x_q')·i_q
/// τ_m  = e_d'·i_d + e_q'·i_q + (x_q' − x_d')·i_d·i_q
/// ```
///
/// Initialization solves the five unknowns `[δ, e_q', e_d', E_fd, τ_m]`
/// against the scheduled injection; the field voltage and mechanical torque
/// come back as derived setpoints.
#[derive(Clone, Debug)]
pub struct SynchronousGenerator {
    /// d-axis synchronous reactance (pu)
    pub xd: f64,
    /// q-axis synchronous reactance (pu)
    pub xq: f64,
    /// d-axis transient reactance (pu)
    pub xd_p: f64,
    /// q-axis transient reactance (pu)
    pub xq_p: f64,
    /// Armature resistance (pu)
    pub ra: f64,
    /// d-axis open-circuit transient time constant (s)
    pub td0_p: f64,
    /// q-axis open-circuit transient time constant (s)
    pub tq0_p: f64,
    /// Inertia constant (s)
    pub h: f64,
    /// Damping coefficient (pu torque / pu speed)
    pub d: f64,
    /// Field saturation curve, if modeled
    pub saturation: Option<SaturationCurve>,
}

impl SynchronousGenerator {
    pub const STATE_NAMES: [&'static str; 4] = ["delta", "omega", "eq_p", "ed_p"];

    /// Local index of the rotor-speed state, validated against [0.8, 1.2] pu.
    pub const OMEGA_STATE: usize = 1;

    pub fn new(
        xd: f64,
        xq: f64,
        xd_p: f64,
        xq_p: f64,
        ra: f64,
        td0_p: f64,
        tq0_p: f64,
        h: f64,
        d: f64,
        saturation: Option<SaturationCurve>,
    ) -> DeviceResult<Self> {
        if xd_p <= 0.0 || xq_p <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "transient reactances must be positive",
            });
        }
        if xd < xd_p || xq < xq_p {
            return Err(DeviceError::InvalidParam {
                what: "synchronous reactances must exceed transient reactances",
            });
        }
        if h <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "inertia constant must be positive",
            });
        }
        Ok(Self {
            xd,
            xq,
            xd_p,
            xq_p,
            ra,
            td0_p,
            tq0_p,
            h,
            d,
            saturation,
        })
    }

    /// Rotor-frame currents from the stator algebraic equations.
    fn stator_currents(&self, eq_p: f64, ed_p: f64, vd: f64, vq: f64) -> (f64, f64) {
        let det = self.ra * self.ra + self.xd_p * self.xq_p;
        let id = (self.ra * (ed_p - vd) + self.xq_p * (eq_p - vq)) / det;
        let iq = (self.ra * (eq_p - vq) - self.xd_p * (ed_p - vd)) / det;
        (id, iq)
    }

    /// Residuals of the steady-state system for the unknowns
    /// `x = [δ, e_q', e_d', E_fd, τ_m]`.
    pub fn steady_residual(
        &self,
        x: &DVector<f64>,
        voltage: Phasor,
        p: f64,
        q: f64,
    ) -> Result<DVector<f64>, SolverError> {
        let (delta, eq_p, ed_p, efd, tau_m) = (x[0], x[1], x[2], x[3], x[4]);
        let (vd, vq) = to_dq(delta, voltage);
        let (id, iq) = self.stator_currents(eq_p, ed_p, vd, vq);

        let se = match self.saturation {
            Some(curve) => {
                let flux = (eq_p * eq_p + ed_p * ed_p).sqrt();
                curve
                    .evaluate(flux)
                    .map_err(|e| SolverError::ProblemSetup {
                        what: e.to_string(),
                    })?
            }
            None => 0.0,
        };

        Ok(DVector::from_vec(vec![
            vd * id + vq * iq - p,
            vq * id - vd * iq - q,
            eq_p * (1.0 + se) + (self.xd - self.xd_p) * id - efd,
            ed_p - (self.xq - self.xq_p) * iq,
            ed_p * id + eq_p * iq + (self.xq_p - self.xd_p) * id * iq - tau_m,
        ]))
    }

    /// Solve for the steady state at the given terminal conditions.
    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        let v = terminal.voltage;
        if v.norm() < 1e-9 {
            return Err(DeviceError::ZeroVoltage {
                device: name.to_string(),
            });
        }

        // q-axis locator: the angle of V + (r_a + j·x_q)·I is the classical
        // rotor-angle estimate, exact when saturation is off.
        let i_term = injection_current(v, terminal.p, terminal.q);
        let locator = v + Phasor::new(self.ra, self.xq) * i_term;
        let delta0 = locator.arg();

        let (vd, vq) = to_dq(delta0, v);
        let (id, iq) = to_dq(delta0, i_term);
        let eq0 = vq + self.ra * iq + self.xd_p * id;
        let ed0 = vd + self.ra * id - self.xq_p * iq;
        let efd0 = eq0 + (self.xd - self.xd_p) * id;
        let x0 = DVector::from_vec(vec![delta0, eq0, ed0, efd0, terminal.p]);

        let result = newton_solve(
            x0.clone(),
            |x| self.steady_residual(x, v, terminal.p, terminal.q),
            &NewtonConfig::default(),
        )?;

        let x = if result.converged {
            result.x
        } else {
            warn!(
                device = name,
                family = "synchronous generator",
                residual = result.residual_norm,
                "initialization did not converge; keeping initial guess"
            );
            x0
        };

        Ok(Initialized {
            states: DVector::from_vec(vec![x[0], 1.0, x[1], x[2]]),
            setpoints: DerivedSetpoints {
                torque_ref: Some(x[4]),
                voltage_ref: Some(x[3]),
                ..DerivedSetpoints::default()
            },
        })
    }
}
