//! Error types for device models.

use gs_solver::SolverError;
use thiserror::Error;

/// Errors raised by device parameter validation and initialization.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device {device}: terminal voltage magnitude is zero")]
    ZeroVoltage { device: String },

    #[error("Quadratic saturation is undefined at zero flux")]
    SaturationDomain,

    #[error("Invalid parameter: {what}")]
    InvalidParam { what: &'static str },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type DeviceResult<T> = Result<T, DeviceError>;
