//! Error types for small-signal analysis.

use thiserror::Error;

/// Errors raised during linearization, reduction, or eigenanalysis.
///
/// These are fatal for the analysis call only; a completed time-domain
/// build is unaffected.
#[derive(Error, Debug)]
pub enum SsaError {
    #[error("Algebraic Jacobian block is singular after inert-state pruning")]
    SingularReduction,

    #[error("Dimension mismatch: {what}")]
    DimensionMismatch { what: String },

    #[error("Eigendecomposition failed: {what}")]
    Eigen { what: String },
}

pub type SsaResult<T> = Result<T, SsaError>;
