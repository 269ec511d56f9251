//! Voxcal Core: domain layer for polynomial volume calibration.
//!
//! This crate contains the volume data model, the per-voxel polynomial
//! transform, and the calibration math that produces its coefficients.
//! No host or framework dependencies.

pub mod calibration;
pub mod config;
pub mod error;
pub mod transform;
pub mod volume;

// Re-exports for convenience.
pub use config::TransformConfig;
pub use error::{Result, VoxcalError};
pub use transform::coefficients::CoefficientList;
pub use transform::polynomial::{apply, apply_block, apply_with};
pub use volume::{Extent, Sample, ScalarType, Volume, VolumeData};
