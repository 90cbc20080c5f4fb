//! Simulation assembly and initialization pipeline.
//!
//! A [`Simulation`] owns a network, its global [`gs_network::StateIndex`],
//! and the assembled t=0 state vector. Building runs the staged pipeline —
//! power flow, static sources, dynamic injectors, dynamic branches,
//! validation — with typed per-stage results folded into a terminal
//! [`BuildStatus`]. Small-signal analysis runs on demand at the converged
//! operating point or a caller-supplied one.

pub mod error;
pub mod simulation;
pub mod status;
pub mod validate;

pub use error::{BuildError, SimError, SimResult};
pub use simulation::Simulation;
pub use status::BuildStatus;
pub use validate::{FREQUENCY_BAND, VOLTAGE_LIMIT, ValidationIssue, validate_states};
