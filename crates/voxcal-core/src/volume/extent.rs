//! Voxel index boxes used to address a block of a volume.

use glam::UVec3;
use serde::{Deserialize, Serialize};

/// Half-open voxel box `[min.x, max.x) × [min.y, max.y) × [min.z, max.z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    /// First voxel index on each axis (inclusive).
    pub min: UVec3,
    /// One past the last voxel index on each axis (exclusive).
    pub max: UVec3,
}

impl Extent {
    pub const fn new(min: UVec3, max: UVec3) -> Self {
        Self { min, max }
    }

    /// The extent covering an entire volume of `dims`.
    pub const fn whole(dims: UVec3) -> Self {
        Self {
            min: UVec3::ZERO,
            max: dims,
        }
    }

    /// True when any axis has no voxels.
    pub fn is_empty(&self) -> bool {
        self.min.cmpge(self.max).any()
    }

    /// Number of voxels inside the box.
    pub fn voxel_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let size = self.max - self.min;
        size.x as usize * size.y as usize * size.z as usize
    }

    /// True when the box lies inside a volume of `dims`.
    pub fn fits_within(&self, dims: UVec3) -> bool {
        self.min.cmple(self.max).all() && self.max.cmple(dims).all()
    }

    /// Split along z into consecutive slabs of at most `slices` slices each.
    pub fn split_z(self, slices: u32) -> impl Iterator<Item = Extent> {
        let step = slices.max(1);
        let (z0, z1) = (self.min.z, self.max.z.max(self.min.z));
        (z0..z1).step_by(step as usize).map(move |z| Extent {
            min: UVec3::new(self.min.x, self.min.y, z),
            max: UVec3::new(self.max.x, self.max.y, (z + step).min(z1)),
        })
    }
}
