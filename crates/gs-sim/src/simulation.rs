//! Simulation object and staged initialization pipeline.

use std::collections::BTreeMap;

use nalgebra::DVector;
use tracing::{debug, error, info};

use gs_devices::{DerivedSetpoints, Terminal};
use gs_network::{Network, PowerFlowSolution, PowerFlowSolver, StateIndex};
use gs_ssa::{DynamicSystem, SmallSignalResult, analyze, reduce, system_jacobian};

use crate::error::{BuildError, SimError, SimResult};
use crate::status::BuildStatus;
use crate::validate::{ValidationIssue, validate_states};

/// One grid simulation: network, global index, and the t=0 state vector.
///
/// The state vector and index are the only long-lived mutable resources;
/// both are owned here and the vector is written only by the build pipeline
/// (or read for analysis). Jacobians and eigen results are per-call.
pub struct Simulation<P: PowerFlowSolver> {
    network: Network,
    power_flow: P,
    index: StateIndex,
    status: BuildStatus,
    x0: DVector<f64>,
    setpoints: BTreeMap<String, DerivedSetpoints>,
    last_error: Option<BuildError>,
}

impl<P: PowerFlowSolver> Simulation<P> {
    pub fn new(network: Network, power_flow: P) -> Self {
        let index = StateIndex::new(&network);
        let x0 = DVector::zeros(index.len());
        Self {
            network,
            power_flow,
            index,
            status: BuildStatus::Incomplete,
            x0,
            setpoints: BTreeMap::new(),
            last_error: None,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn index(&self) -> &StateIndex {
        &self.index
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    /// The assembled global state vector (t=0 condition once `Ready`).
    pub fn state_vector(&self) -> &DVector<f64> {
        &self.x0
    }

    /// Setpoints inferred during device initialization, by device name.
    pub fn setpoints(&self) -> &BTreeMap<String, DerivedSetpoints> {
        &self.setpoints
    }

    /// The error that failed the last build, if any.
    pub fn build_error(&self) -> Option<&BuildError> {
        self.last_error.as_ref()
    }

    /// Itemized validation findings from the last build.
    pub fn validation_issues(&self) -> &[ValidationIssue] {
        match &self.last_error {
            Some(BuildError::Validation { entries }) => entries,
            _ => &[],
        }
    }

    /// Run the full initialization pipeline and report the terminal status.
    ///
    /// Stages: power flow → static sources → dynamic injectors → dynamic
    /// branches (only when the network has them) → validation. Each stage
    /// returns a typed result; the first failure is recorded and
    /// short-circuits the rest.
    pub fn build(&mut self) -> BuildStatus {
        self.status = BuildStatus::InProgress;
        self.x0 = DVector::zeros(self.index.len());
        self.setpoints.clear();
        self.last_error = None;

        self.status = match self.run_stages() {
            Ok(()) => {
                info!("simulation build ready");
                BuildStatus::Ready
            }
            Err(e) => {
                error!(error = %e, "simulation build failed");
                self.last_error = Some(e);
                BuildStatus::Failed
            }
        };
        self.status
    }

    /// Convenience wrapper: build and report boolean success.
    pub fn initialize(&mut self) -> bool {
        self.build().is_ready()
    }

    fn run_stages(&mut self) -> Result<(), BuildError> {
        let pf = self.power_flow.solve(&self.network)?;
        self.apply_bus_voltages(&pf);

        self.initialize_devices(&pf, true)?;
        self.initialize_devices(&pf, false)?;

        if self.network.has_dynamic_branches() {
            self.initialize_dynamic_branches(&pf);
        } else {
            debug!("no dynamic branches; skipping branch initialization");
        }

        let entries = validate_states(&self.x0, &self.network, &self.index);
        if !entries.is_empty() {
            return Err(BuildError::Validation { entries });
        }
        Ok(())
    }

    fn apply_bus_voltages(&mut self, pf: &PowerFlowSolution) {
        for bus in self.network.buses() {
            let v = pf.voltage(bus.id);
            let (re, im) = self.index.bus_voltage(bus.id);
            self.x0[re] = v.re;
            self.x0[im] = v.im;
        }
    }

    /// Initialize one device class: sources first, then injectors.
    fn initialize_devices(
        &mut self,
        pf: &PowerFlowSolution,
        sources: bool,
    ) -> Result<(), BuildError> {
        let mut assembled = Vec::new();
        for device in self.network.devices() {
            if device.model.is_source() != sources {
                continue;
            }

            let terminal = Terminal {
                voltage: pf.voltage(device.bus),
                p: device.injection.p,
                q: device.injection.q,
            };
            let init = device.model.initialize(&device.name, &terminal).map_err(
                |source| BuildError::DeviceInit {
                    device: device.name.clone(),
                    family: device.model.family(),
                    source,
                },
            )?;
            assembled.push((device.name.clone(), init));
        }

        for (name, init) in assembled {
            self.write_states(&name, &init.states);
            self.setpoints.insert(name, init.setpoints);
        }
        Ok(())
    }

    /// Initialize branch current states; analytic, so no failure path.
    fn initialize_dynamic_branches(&mut self, pf: &PowerFlowSolution) {
        let mut assembled = Vec::new();
        for branch in self.network.branches() {
            if let Some(dynamics) = branch.dynamics() {
                let init = dynamics.initialize(pf.voltage(branch.from), pf.voltage(branch.to));
                assembled.push((branch.name.clone(), init));
            }
        }
        for (name, init) in assembled {
            self.write_states(&name, &init.states);
        }
    }

    /// Copy an initialized state vector into its owner's global range.
    ///
    /// Panics when the returned vector does not match the owner's declared
    /// state count — that is a modeling bug, not a runtime condition.
    fn write_states(&mut self, owner: &str, states: &DVector<f64>) {
        let range = self
            .index
            .state_range(owner)
            .expect("initialized owner must claim a state range");
        assert_eq!(
            states.len(),
            range.len(),
            "state vector of {owner} does not match its declared state count"
        );
        for (offset, &value) in states.iter().enumerate() {
            self.x0[range.start + offset] = value;
        }
    }

    /// Structured readback: device name → state name → initialized value.
    pub fn initial_conditions(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut map = BTreeMap::new();
        for (owner, symbols, range) in self.index.owners() {
            let states: BTreeMap<String, f64> = symbols
                .iter()
                .zip(range)
                .map(|(&symbol, i)| (symbol.to_string(), self.x0[i]))
                .collect();
            map.insert(owner.to_string(), states);
        }
        map
    }

    /// Small-signal analysis of `system` at the converged operating point,
    /// or at `point` when supplied.
    pub fn small_signal<S: DynamicSystem>(
        &self,
        system: &S,
        point: Option<&DVector<f64>>,
    ) -> SimResult<SmallSignalResult> {
        let x = match point {
            Some(p) => {
                if p.len() != system.dim() {
                    return Err(SimError::PointLength {
                        got: p.len(),
                        expected: system.dim(),
                    });
                }
                p
            }
            None => {
                if !self.status.is_ready() {
                    return Err(SimError::NotReady {
                        status: self.status,
                    });
                }
                if self.x0.len() != system.dim() {
                    return Err(SimError::PointLength {
                        got: self.x0.len(),
                        expected: system.dim(),
                    });
                }
                &self.x0
            }
        };

        let jacobian = system_jacobian(system, x);
        let mass = system.mass_diagonal();
        let labels = self.labels_for(system.dim());

        let reduction = reduce(&jacobian, &mass, &labels)?;
        let result = analyze(&reduction, self.network.has_angle_reference())?;
        Ok(result)
    }

    /// State labels for a system of the given dimension.
    ///
    /// A system matching the global index is labeled from it; a smaller
    /// caller-supplied system (already free of network variables) gets
    /// positional labels.
    fn labels_for(&self, dim: usize) -> Vec<gs_network::StateLabel> {
        if dim == self.index.len() {
            (0..dim).map(|i| self.index.label(i)).collect()
        } else {
            (0..dim)
                .map(|i| gs_network::StateLabel {
                    owner: "system".to_string(),
                    symbol: format!("x{i}"),
                })
                .collect()
        }
    }
}
