//! gs-core: stable foundation for gridstab.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for network/model objects)
//! - phasor (complex per-unit phasor helpers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod phasor;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use phasor::*;
