//! Small-signal analysis of differential-algebraic grid models.
//!
//! Pipeline: a [`DynamicSystem`] callback is linearized at an operating
//! point by finite differences, the algebraic states are eliminated with a
//! Schur complement over the mass-matrix partition, and the reduced
//! Jacobian is eigendecomposed into modes, damping ratios, and
//! participation factors. Every matrix is allocated fresh per call; nothing
//! is cached between analyses.

pub mod analysis;
pub mod error;
pub mod jacobian;
pub mod reduction;
pub mod system;

pub use analysis::{SmallSignalResult, analyze};
pub use error::{SsaError, SsaResult};
pub use jacobian::{FD_EPSILON, system_jacobian};
pub use reduction::{Reduction, differential_mask, reduce};
pub use system::{DynamicSystem, ResidualForm, ResidualSystem};
