//! Transform pipeline: coefficient lists and per-voxel polynomial evaluation.

pub mod coefficients;
pub mod polynomial;
