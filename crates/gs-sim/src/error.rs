//! Error types for simulation build and analysis.

use gs_devices::DeviceError;
use gs_network::PowerFlowError;
use gs_ssa::SsaError;
use thiserror::Error;

use crate::status::BuildStatus;
use crate::validate::ValidationIssue;

/// A failed stage of the initialization pipeline.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Power flow failed: {0}")]
    PowerFlow(#[from] PowerFlowError),

    #[error("Device {device} ({family}) failed to initialize: {source}")]
    DeviceInit {
        device: String,
        family: &'static str,
        source: DeviceError,
    },

    #[error("Validation failed with {} issue(s)", .entries.len())]
    Validation { entries: Vec<ValidationIssue> },
}

/// Errors surfaced by on-demand analysis calls.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Simulation is not ready (status: {status})")]
    NotReady { status: BuildStatus },

    #[error("Operating point has {got} entries, the system has {expected}")]
    PointLength { got: usize, expected: usize },

    #[error("Small-signal analysis failed: {0}")]
    Ssa(#[from] SsaError),
}

pub type SimResult<T> = Result<T, SimError>;
