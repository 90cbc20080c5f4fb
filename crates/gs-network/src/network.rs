//! Buses, branches, and device instances.

use gs_core::{BranchId, BusId, DeviceId};
use gs_devices::{DeviceModel, DynamicBranch};

use crate::error::{NetworkError, NetworkResult};

/// A network bus.
#[derive(Clone, Debug)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
}

/// Scheduled per-unit injection of a device into the network.
///
/// Loads carry negative `p`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Injection {
    pub p: f64,
    pub q: f64,
}

/// A dynamic device instance attached at a bus.
#[derive(Clone, Debug)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub bus: BusId,
    /// Static (power-flow) counterpart of the device
    pub injection: Injection,
    pub model: DeviceModel,
}

/// Branch model: plain series impedance, or one with current dynamics.
#[derive(Clone, Debug)]
pub enum BranchModel {
    /// Algebraic branch; parameters are consumed by the power-flow solver.
    Static { r: f64, x: f64, b: f64 },
    /// Branch whose series current is a dynamic state.
    Dynamic(DynamicBranch),
}

/// A two-terminal branch between buses.
#[derive(Clone, Debug)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub from: BusId,
    pub to: BusId,
    pub model: BranchModel,
}

impl Branch {
    pub fn dynamics(&self) -> Option<&DynamicBranch> {
        match &self.model {
            BranchModel::Dynamic(d) => Some(d),
            BranchModel::Static { .. } => None,
        }
    }
}

/// The grid model: buses, branches, and the devices attached at buses.
#[derive(Clone, Debug, Default)]
pub struct Network {
    buses: Vec<Bus>,
    devices: Vec<Device>,
    branches: Vec<Branch>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bus and return its ID.
    pub fn add_bus(&mut self, name: impl Into<String>) -> BusId {
        let id = BusId::from_index(self.buses.len() as u32);
        self.buses.push(Bus {
            id,
            name: name.into(),
        });
        id
    }

    /// Attach a device at a bus.
    pub fn add_device(
        &mut self,
        name: impl Into<String>,
        bus: BusId,
        injection: Injection,
        model: DeviceModel,
    ) -> NetworkResult<DeviceId> {
        let name = name.into();
        self.check_bus(bus)?;
        if self.devices.iter().any(|d| d.name == name) {
            return Err(NetworkError::DuplicateDevice { name });
        }

        let id = DeviceId::from_index(self.devices.len() as u32);
        self.devices.push(Device {
            id,
            name,
            bus,
            injection,
            model,
        });
        Ok(id)
    }

    /// Connect two buses with a branch.
    pub fn add_branch(
        &mut self,
        name: impl Into<String>,
        from: BusId,
        to: BusId,
        model: BranchModel,
    ) -> NetworkResult<BranchId> {
        let name = name.into();
        self.check_bus(from)?;
        self.check_bus(to)?;
        if self.branches.iter().any(|b| b.name == name) {
            return Err(NetworkError::DuplicateBranch { name });
        }

        let id = BranchId::from_index(self.branches.len() as u32);
        self.branches.push(Branch {
            id,
            name,
            from,
            to,
            model,
        });
        Ok(id)
    }

    fn check_bus(&self, bus: BusId) -> NetworkResult<()> {
        if (bus.index() as usize) < self.buses.len() {
            Ok(())
        } else {
            Err(NetworkError::UnknownBus { index: bus.index() })
        }
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn bus_name(&self, bus: BusId) -> &str {
        &self.buses[bus.index() as usize].name
    }

    /// Whether any branch carries a dynamic model.
    pub fn has_dynamic_branches(&self) -> bool {
        self.branches.iter().any(|b| b.dynamics().is_some())
    }

    /// Whether some device pins the network angle reference.
    pub fn has_angle_reference(&self) -> bool {
        self.devices.iter().any(|d| d.model.is_angle_reference())
    }
}
