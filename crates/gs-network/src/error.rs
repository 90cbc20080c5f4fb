//! Error types for network construction and the power-flow boundary.

use thiserror::Error;

/// Network construction and lookup errors.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Duplicate device name: {name}")]
    DuplicateDevice { name: String },

    #[error("Duplicate branch name: {name}")]
    DuplicateBranch { name: String },

    #[error("Unknown bus index {index}")]
    UnknownBus { index: u32 },

    #[error("Unknown device: {name}")]
    UnknownDevice { name: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors surfaced by a power-flow solver.
#[derive(Error, Debug)]
pub enum PowerFlowError {
    #[error("Power flow did not converge: {what}")]
    NotConverged { what: String },

    #[error("Power-flow solution covers {got} buses, network has {expected}")]
    DimensionMismatch { got: usize, expected: usize },
}

pub type PowerFlowResult<T> = Result<T, PowerFlowError>;
