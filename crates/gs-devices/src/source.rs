//! Voltage sources behind a Thevenin impedance.

use std::f64::consts::TAU;

use gs_core::{Phasor, polar};
use nalgebra::DVector;
use tracing::warn;

use crate::error::{DeviceError, DeviceResult};
use crate::terminal::{DerivedSetpoints, Initialized, Terminal};
use gs_solver::{NewtonConfig, SolverError, newton_solve};

/// Infinite (stiff) source behind a Thevenin impedance.
///
/// States, in declared order: internal EMF magnitude `e_mag` and angle
/// `e_angle`. Instead of full dynamics, initialization solves the
/// two-variable Thevenin circuit that delivers the scheduled injection at
/// the terminal voltage.
#[derive(Clone, Debug)]
pub struct InfiniteSource {
    /// Thevenin resistance (pu)
    pub r_th: f64,
    /// Thevenin reactance (pu)
    pub x_th: f64,
}

impl InfiniteSource {
    pub const STATE_NAMES: [&'static str; 2] = ["e_mag", "e_angle"];

    pub fn new(r_th: f64, x_th: f64) -> DeviceResult<Self> {
        if x_th <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "Thevenin reactance must be positive",
            });
        }
        Ok(Self { r_th, x_th })
    }

    /// Residuals of the Thevenin circuit for `x = [e_mag, e_angle]`.
    pub fn steady_residual(
        &self,
        x: &DVector<f64>,
        voltage: Phasor,
        p: f64,
        q: f64,
    ) -> Result<DVector<f64>, SolverError> {
        let e = polar(x[0], x[1]);
        let i = (e - voltage) / Phasor::new(self.r_th, self.x_th);
        let s = voltage * i.conj();
        Ok(DVector::from_vec(vec![s.re - p, s.im - q]))
    }

    /// Solve the internal EMF delivering the scheduled injection.
    pub fn solve_emf(
        &self,
        name: &str,
        terminal: &Terminal,
    ) -> DeviceResult<(f64, f64)> {
        let v = terminal.voltage;
        if v.norm() < 1e-9 {
            return Err(DeviceError::ZeroVoltage {
                device: name.to_string(),
            });
        }

        let x0 = DVector::from_vec(vec![v.norm(), v.arg()]);
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
                family = "infinite source",
                residual = result.residual_norm,
                "initialization did not converge; keeping initial guess"
            );
            x0
        };
        Ok((x[0], x[1]))
    }

    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        let (e_mag, e_angle) = self.solve_emf(name, terminal)?;
        Ok(Initialized {
            states: DVector::from_vec(vec![e_mag, e_angle]),
            setpoints: DerivedSetpoints::default(),
        })
    }
}

/// One sinusoidal component of a periodic source.
#[derive(Clone, Copy, Debug)]
pub struct Harmonic {
    /// Amplitude (pu)
    pub amplitude: f64,
    /// Frequency (Hz)
    pub frequency: f64,
    /// Phase offset (rad)
    pub phase: f64,
}

/// Periodic (harmonic) voltage source behind a Thevenin impedance.
///
/// The internal EMF magnitude follows `bias + Σ aₖ·sin(2π·fₖ·t + φₖ)`. The
/// Thevenin circuit is solved like [`InfiniteSource`]; the DC bias is then
/// found analytically so the declared harmonic sum matches the solved
/// magnitude at t = 0.
#[derive(Clone, Debug)]
pub struct PeriodicSource {
    /// Thevenin resistance (pu)
    pub r_th: f64,
    /// Thevenin reactance (pu)
    pub x_th: f64,
    /// Declared sinusoidal components
    pub harmonics: Vec<Harmonic>,
}

impl PeriodicSource {
    pub const STATE_NAMES: [&'static str; 2] = ["e_mag", "e_angle"];

    pub fn new(r_th: f64, x_th: f64, harmonics: Vec<Harmonic>) -> DeviceResult<Self> {
        if x_th <= 0.0 {
            return Err(DeviceError::InvalidParam {
                what: "Thevenin reactance must be positive",
            });
        }
        Ok(Self {
            r_th,
            x_th,
            harmonics,
        })
    }

    /// Value of the harmonic sum (without bias) at time `t`.
    fn harmonic_sum(&self, t: f64) -> f64 {
        self.harmonics
            .iter()
            .map(|h| h.amplitude * (TAU * h.frequency * t + h.phase).sin())
            .sum()
    }

    /// Internal EMF magnitude waveform for a given bias.
    pub fn waveform(&self, bias: f64, t: f64) -> f64 {
        bias + self.harmonic_sum(t)
    }

    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        let thevenin = InfiniteSource {
            r_th: self.r_th,
            x_th: self.x_th,
        };
        let (e_mag, e_angle) = thevenin.solve_emf(name, terminal)?;

        // The bias absorbs whatever the declared components miss at t = 0.
        let bias = e_mag - self.harmonic_sum(0.0);

        Ok(Initialized {
            states: DVector::from_vec(vec![e_mag, e_angle]),
            setpoints: DerivedSetpoints {
                bias: Some(bias),
                ..DerivedSetpoints::default()
            },
        })
    }
}
