//! Dynamic device models for grid stability analysis.
//!
//! Each device family couples a parameter record with its steady-state
//! initializer: given the terminal voltage phasor and scheduled injection
//! from a power-flow solution, the initializer produces the unique state
//! vector at which all of the family's algebraic equations and time
//! derivatives vanish, plus the reference setpoints that are only
//! discoverable at that operating point (mechanical torque, field voltage,
//! current commands). Setpoints are returned explicitly rather than written
//! back into the parameter record.

pub mod branch;
pub mod distributed;
pub mod error;
pub mod generator;
pub mod induction;
pub mod model;
pub mod physics;
pub mod source;
pub mod terminal;

pub use branch::DynamicBranch;
pub use distributed::DistributedGen;
pub use error::{DeviceError, DeviceResult};
pub use generator::SynchronousGenerator;
pub use induction::InductionMachine;
pub use model::DeviceModel;
pub use physics::SaturationCurve;
pub use source::{Harmonic, InfiniteSource, PeriodicSource};
pub use terminal::{DerivedSetpoints, Initialized, Terminal};
