//! Error types for nonlinear solver operations.

use thiserror::Error;

/// Errors that can occur during a nonlinear solve.
///
/// Failing to meet tolerance is not an error: [`crate::NewtonResult`] carries
/// a `converged` flag for that. Errors are reserved for conditions that make
/// the iteration itself meaningless.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Singular Jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },

    #[error("Non-finite residual: {what}")]
    NonFiniteResidual { what: String },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;
