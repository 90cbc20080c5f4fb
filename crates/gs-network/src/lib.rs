//! Network model and global state bookkeeping.
//!
//! A [`Network`] owns buses, branches, and the dynamic devices attached at
//! buses. The [`StateIndex`] lays every bus voltage component and device
//! state out into one flat global vector and is the single source of truth
//! for that mapping. The power-flow solver is an external collaborator
//! behind [`PowerFlowSolver`].

pub mod error;
pub mod index;
pub mod network;
pub mod power_flow;

pub use error::{NetworkError, NetworkResult, PowerFlowError, PowerFlowResult};
pub use index::{StateIndex, StateLabel};
pub use network::{Branch, BranchModel, Device, Injection, Network};
pub use power_flow::{FailingPowerFlow, PowerFlowSolution, PowerFlowSolver, PrescribedPowerFlow};
