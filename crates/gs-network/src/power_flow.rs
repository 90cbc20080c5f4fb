//! Power-flow boundary.
//!
//! The steady-state power-flow solver is an external collaborator; the core
//! consumes it through [`PowerFlowSolver`] and only reads bus voltage
//! phasors from its solution.

use gs_core::{BusId, Phasor, polar};

use crate::error::{PowerFlowError, PowerFlowResult};
use crate::network::Network;

/// Per-bus voltage solution of a converged power flow.
#[derive(Clone, Debug)]
pub struct PowerFlowSolution {
    v_mag: Vec<f64>,
    v_ang: Vec<f64>,
}

impl PowerFlowSolution {
    pub fn new(v_mag: Vec<f64>, v_ang: Vec<f64>) -> PowerFlowResult<Self> {
        if v_mag.len() != v_ang.len() {
            return Err(PowerFlowError::DimensionMismatch {
                got: v_ang.len(),
                expected: v_mag.len(),
            });
        }
        Ok(Self { v_mag, v_ang })
    }

    pub fn bus_count(&self) -> usize {
        self.v_mag.len()
    }

    pub fn magnitude(&self, bus: BusId) -> f64 {
        self.v_mag[bus.index() as usize]
    }

    pub fn angle(&self, bus: BusId) -> f64 {
        self.v_ang[bus.index() as usize]
    }

    /// Voltage phasor at a bus.
    pub fn voltage(&self, bus: BusId) -> Phasor {
        polar(self.magnitude(bus), self.angle(bus))
    }
}

/// Black-box steady-state solver contract.
pub trait PowerFlowSolver {
    fn solve(&self, network: &Network) -> PowerFlowResult<PowerFlowSolution>;
}

/// Solver that hands back a prescribed solution.
///
/// Covers boundary cases where the operating point is known a priori (an
/// infinite-bus study, a lab fixture) and doubles as the test seam for the
/// initialization pipeline.
#[derive(Clone, Debug)]
pub struct PrescribedPowerFlow {
    v_mag: Vec<f64>,
    v_ang: Vec<f64>,
}

impl PrescribedPowerFlow {
    pub fn new(v_mag: Vec<f64>, v_ang: Vec<f64>) -> Self {
        Self { v_mag, v_ang }
    }

    /// Flat 1.0∠0° profile over `bus_count` buses.
    pub fn flat(bus_count: usize) -> Self {
        Self {
            v_mag: vec![1.0; bus_count],
            v_ang: vec![0.0; bus_count],
        }
    }
}

impl PowerFlowSolver for PrescribedPowerFlow {
    fn solve(&self, network: &Network) -> PowerFlowResult<PowerFlowSolution> {
        if self.v_mag.len() != network.buses().len() {
            return Err(PowerFlowError::DimensionMismatch {
                got: self.v_mag.len(),
                expected: network.buses().len(),
            });
        }
        PowerFlowSolution::new(self.v_mag.clone(), self.v_ang.clone())
    }
}

/// Solver that always reports failure, for exercising the fatal path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingPowerFlow;

impl PowerFlowSolver for FailingPowerFlow {
    fn solve(&self, _network: &Network) -> PowerFlowResult<PowerFlowSolution> {
        Err(PowerFlowError::NotConverged {
            what: "mismatch above tolerance after iteration limit".to_string(),
        })
    }
}
