//! Multivariate Newton root-finder for device initialization.
//!
//! This crate provides the nonlinear solver used by per-device steady-state
//! initialization: a damped Newton iteration over a residual closure, with
//! Jacobians obtained by finite differences. The solver reports convergence
//! through a flag rather than an error so that callers can keep best-effort
//! iterates for non-critical devices.

pub mod error;
pub mod jacobian;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use jacobian::{central_difference_jacobian, forward_difference_jacobian};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
