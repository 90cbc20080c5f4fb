//! Closed sum type over bus-connected device families.

use crate::distributed::DistributedGen;
use crate::error::DeviceResult;
use crate::generator::SynchronousGenerator;
use crate::induction::InductionMachine;
use crate::source::{InfiniteSource, PeriodicSource};
use crate::terminal::{Initialized, Terminal};

/// A bus-connected dynamic device.
///
/// Families are a closed set; each variant colocates its parameters with its
/// residual equations and initializer, and the single `initialize` operation
/// dispatches on the tag. Dynamic branches are not in this enum — they see
/// two terminals and live on the branch records instead
/// ([`crate::branch::DynamicBranch`]).
#[derive(Clone, Debug)]
pub enum DeviceModel {
    SynchronousGenerator(SynchronousGenerator),
    InductionMachine(InductionMachine),
    DistributedGen(DistributedGen),
    InfiniteSource(InfiniteSource),
    PeriodicSource(PeriodicSource),
}

impl DeviceModel {
    /// Human-readable family name for diagnostics.
    pub fn family(&self) -> &'static str {
        match self {
            DeviceModel::SynchronousGenerator(_) => "synchronous generator",
            DeviceModel::InductionMachine(_) => "induction machine",
            DeviceModel::DistributedGen(_) => "distributed generation",
            DeviceModel::InfiniteSource(_) => "infinite source",
            DeviceModel::PeriodicSource(_) => "periodic source",
        }
    }

    /// Ordered state symbols declared by the family.
    pub fn state_names(&self) -> &'static [&'static str] {
        match self {
            DeviceModel::SynchronousGenerator(_) => &SynchronousGenerator::STATE_NAMES,
            DeviceModel::InductionMachine(_) => &InductionMachine::STATE_NAMES,
            DeviceModel::DistributedGen(_) => &DistributedGen::STATE_NAMES,
            DeviceModel::InfiniteSource(_) => &InfiniteSource::STATE_NAMES,
            DeviceModel::PeriodicSource(_) => &PeriodicSource::STATE_NAMES,
        }
    }

    /// Number of dynamic states the family contributes.
    pub fn state_count(&self) -> usize {
        self.state_names().len()
    }

    /// Local indices of per-unit speed/frequency states, validated against
    /// the [0.8, 1.2] pu band. Slip is a speed *offset* and is excluded.
    pub fn frequency_states(&self) -> &'static [usize] {
        match self {
            DeviceModel::SynchronousGenerator(_) => &[SynchronousGenerator::OMEGA_STATE],
            _ => &[],
        }
    }

    /// Whether the device is a static source (initialized before injectors).
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            DeviceModel::InfiniteSource(_) | DeviceModel::PeriodicSource(_)
        )
    }

    /// Whether the device pins the network angle reference.
    pub fn is_angle_reference(&self) -> bool {
        self.is_source()
    }

    /// Solve the family's steady state at the given terminal conditions.
    pub fn initialize(&self, name: &str, terminal: &Terminal) -> DeviceResult<Initialized> {
        match self {
            DeviceModel::SynchronousGenerator(m) => m.initialize(name, terminal),
            DeviceModel::InductionMachine(m) => m.initialize(name, terminal),
            DeviceModel::DistributedGen(m) => m.initialize(name, terminal),
            DeviceModel::InfiniteSource(m) => m.initialize(name, terminal),
            DeviceModel::PeriodicSource(m) => m.initialize(name, terminal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_core::polar;

    #[test]
    fn state_counts_match_declared_names() {
        let models = [
            DeviceModel::SynchronousGenerator(
                SynchronousGenerator::new(1.8, 1.7, 0.3, 0.55, 0.0, 8.0, 0.4, 6.5, 0.0, None)
                    .unwrap(),
            ),
            DeviceModel::InductionMachine(
                InductionMachine::new(0.01, 0.1, 3.0, 0.02, 0.08, 1.5, 60.0).unwrap(),
            ),
            DeviceModel::DistributedGen(DistributedGen::new(1.0, 1.0).unwrap()),
            DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap()),
            DeviceModel::PeriodicSource(PeriodicSource::new(0.0, 0.1, vec![]).unwrap()),
        ];

        for model in &models {
            assert_eq!(model.state_count(), model.state_names().len());
        }
    }

    #[test]
    fn initialized_length_equals_state_count() {
        let model = DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap());
        let terminal = Terminal {
            voltage: polar(1.0, 0.0),
            p: 0.3,
            q: 0.0,
        };
        let init = model.initialize("slack", &terminal).unwrap();
        assert_eq!(init.states.len(), model.state_count());
    }

    #[test]
    fn only_sources_pin_the_angle_reference() {
        let dg = DeviceModel::DistributedGen(DistributedGen::new(1.0, 1.0).unwrap());
        let slack = DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap());
        assert!(!dg.is_angle_reference());
        assert!(slack.is_angle_reference());
    }
}
