//! Voxcal Host: glue between a host application's volume objects and the
//! polynomial calibration kernel.
//!
//! The host owns its volumes and implements [`VolumeNode`] for them.
//! [`CalibrationLogic`] reads a node's image data, runs the transform, and
//! installs the result back into the node.

pub mod logic;
pub mod node;

pub use logic::{ApplyStats, CALIBRATED_SUFFIX, CalibrationLogic, calibrated_name};
pub use node::{SharedVolumeNode, VolumeNode};

// Re-export for downstream crates.
pub use voxcal_core::{Result, ScalarType, TransformConfig, Volume, VoxcalError};
