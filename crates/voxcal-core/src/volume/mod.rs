//! Volume representation for the polynomial calibration pipeline.
//!
//! A [`Volume`] is a dense 3-D grid of scalar samples stored x-fastest, then
//! y, then z. Every sample shares one [`ScalarType`]; each voxel holds
//! `components` consecutive samples.

mod extent;
mod scalar;

pub use extent::Extent;
pub use scalar::{Sample, ScalarType};

use glam::UVec3;

use crate::error::{Result, VoxcalError};

/// Typed sample buffer. The variant is the volume's element type.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl VolumeData {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::I8(_) => ScalarType::I8,
            Self::U8(_) => ScalarType::U8,
            Self::I16(_) => ScalarType::I16,
            Self::U16(_) => ScalarType::U16,
            Self::I32(_) => ScalarType::I32,
            Self::U32(_) => ScalarType::U32,
            Self::I64(_) => ScalarType::I64,
            Self::U64(_) => ScalarType::U64,
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
        }
    }

    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Self::I8(v) => v.get(index).map(|s| s.to_f64()),
            Self::U8(v) => v.get(index).map(|s| s.to_f64()),
            Self::I16(v) => v.get(index).map(|s| s.to_f64()),
            Self::U16(v) => v.get(index).map(|s| s.to_f64()),
            Self::I32(v) => v.get(index).map(|s| s.to_f64()),
            Self::U32(v) => v.get(index).map(|s| s.to_f64()),
            Self::I64(v) => v.get(index).map(|s| s.to_f64()),
            Self::U64(v) => v.get(index).map(|s| s.to_f64()),
            Self::F32(v) => v.get(index).map(|s| s.to_f64()),
            Self::F64(v) => v.get(index).map(|s| s.to_f64()),
        }
    }

    /// Native-endian byte view of the samples, for handing back to a host.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::I8(v) => bytemuck::cast_slice(v),
            Self::U8(v) => v.as_slice(),
            Self::I16(v) => bytemuck::cast_slice(v),
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::I32(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
            Self::I64(v) => bytemuck::cast_slice(v),
            Self::U64(v) => bytemuck::cast_slice(v),
            Self::F32(v) => bytemuck::cast_slice(v),
            Self::F64(v) => bytemuck::cast_slice(v),
        }
    }

    /// Copy a native-endian host byte buffer into a typed buffer.
    ///
    /// The source may have any alignment; its length must be a whole number
    /// of samples.
    pub fn from_bytes(scalar_type: ScalarType, bytes: &[u8]) -> Result<Self> {
        match scalar_type {
            ScalarType::I8 => typed_from_bytes::<i8>(bytes),
            ScalarType::U8 => typed_from_bytes::<u8>(bytes),
            ScalarType::I16 => typed_from_bytes::<i16>(bytes),
            ScalarType::U16 => typed_from_bytes::<u16>(bytes),
            ScalarType::I32 => typed_from_bytes::<i32>(bytes),
            ScalarType::U32 => typed_from_bytes::<u32>(bytes),
            ScalarType::I64 => typed_from_bytes::<i64>(bytes),
            ScalarType::U64 => typed_from_bytes::<u64>(bytes),
            ScalarType::F32 => typed_from_bytes::<f32>(bytes),
            ScalarType::F64 => typed_from_bytes::<f64>(bytes),
        }
    }

    /// Zero-filled buffer of `len` samples.
    pub fn zeroed(scalar_type: ScalarType, len: usize) -> Result<Self> {
        Ok(match scalar_type {
            ScalarType::I8 => Self::I8(try_alloc_zeroed(len)?),
            ScalarType::U8 => Self::U8(try_alloc_zeroed(len)?),
            ScalarType::I16 => Self::I16(try_alloc_zeroed(len)?),
            ScalarType::U16 => Self::U16(try_alloc_zeroed(len)?),
            ScalarType::I32 => Self::I32(try_alloc_zeroed(len)?),
            ScalarType::U32 => Self::U32(try_alloc_zeroed(len)?),
            ScalarType::I64 => Self::I64(try_alloc_zeroed(len)?),
            ScalarType::U64 => Self::U64(try_alloc_zeroed(len)?),
            ScalarType::F32 => Self::F32(try_alloc_zeroed(len)?),
            ScalarType::F64 => Self::F64(try_alloc_zeroed(len)?),
        })
    }
}

fn typed_from_bytes<T: Sample>(bytes: &[u8]) -> Result<VolumeData> {
    let size = T::SCALAR_TYPE.size_bytes();
    if bytes.len() % size != 0 {
        return Err(VoxcalError::invalid(format!(
            "buffer of {} bytes is not a whole number of {} samples",
            bytes.len(),
            T::SCALAR_TYPE
        )));
    }
    let mut samples = try_alloc_zeroed::<T>(bytes.len() / size)?;
    bytemuck::cast_slice_mut::<T, u8>(&mut samples).copy_from_slice(bytes);
    Ok(T::into_data(samples))
}

/// Empty vector with room for exactly `len` samples, or `OutOfMemory`.
pub(crate) fn try_with_capacity<T: Sample>(len: usize) -> Result<Vec<T>> {
    let mut buf: Vec<T> = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| VoxcalError::OutOfMemory {
            bytes: len.saturating_mul(T::SCALAR_TYPE.size_bytes()),
        })?;
    Ok(buf)
}

pub(crate) fn try_alloc_zeroed<T: Sample>(len: usize) -> Result<Vec<T>> {
    let mut buf = try_with_capacity::<T>(len)?;
    buf.resize(len, <T as bytemuck::Zeroable>::zeroed());
    Ok(buf)
}

/// Dense 3-D scalar volume.
///
/// The buffer length always equals `nx × ny × nz × components`; every
/// constructor checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    dims: UVec3,
    components: u32,
    data: VolumeData,
}

impl Volume {
    /// Wrap an existing buffer, validating its length against `dims`.
    pub fn new(dims: UVec3, components: u32, data: VolumeData) -> Result<Self> {
        let expected = sample_count(dims, components)?;
        if data.len() != expected {
            return Err(VoxcalError::invalid(format!(
                "volume {}x{}x{} with {} component(s) needs {} samples, buffer has {}",
                dims.x,
                dims.y,
                dims.z,
                components,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            dims,
            components,
            data,
        })
    }

    /// Single-component volume from typed samples.
    pub fn from_samples<T: Sample>(dims: UVec3, samples: Vec<T>) -> Result<Self> {
        Self::new(dims, 1, T::into_data(samples))
    }

    /// Single-component volume with every sample set to `value`.
    pub fn filled<T: Sample>(dims: UVec3, value: T) -> Result<Self> {
        let len = sample_count(dims, 1)?;
        let mut samples = try_with_capacity::<T>(len)?;
        samples.resize(len, value);
        Self::from_samples(dims, samples)
    }

    /// Zero-filled volume.
    pub fn zeroed(dims: UVec3, components: u32, scalar_type: ScalarType) -> Result<Self> {
        let len = sample_count(dims, components)?;
        Self::new(dims, components, VolumeData::zeroed(scalar_type, len)?)
    }

    /// Build a volume from a host descriptor and its raw, native-endian buffer.
    pub fn from_bytes(
        dims: UVec3,
        components: u32,
        scalar_type: ScalarType,
        bytes: &[u8],
    ) -> Result<Self> {
        Self::new(dims, components, VolumeData::from_bytes(scalar_type, bytes)?)
    }

    /// Voxel counts along x, y and z.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Scalar components stored per voxel.
    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.data.scalar_type()
    }

    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut VolumeData {
        &mut self.data
    }

    pub fn into_data(self) -> VolumeData {
        self.data
    }

    /// Typed view of the samples, if the volume holds `T`.
    pub fn samples<T: Sample>(&self) -> Option<&[T]> {
        T::samples(&self.data)
    }

    /// Number of voxel positions (`nx × ny × nz`).
    pub fn voxel_count(&self) -> usize {
        self.dims.x as usize * self.dims.y as usize * self.dims.z as usize
    }

    /// Number of stored samples (`voxel_count × components`).
    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    /// Linear sample index of the first component at `(x, y, z)`.
    pub fn index(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= self.dims.x || y >= self.dims.y || z >= self.dims.z {
            return None;
        }
        let nx = self.dims.x as usize;
        let ny = self.dims.y as usize;
        let voxel = (z as usize * ny + y as usize) * nx + x as usize;
        Some(voxel * self.components as usize)
    }

    /// First-component value at `(x, y, z)` widened to `f64`.
    pub fn value_f64(&self, x: u32, y: u32, z: u32) -> Option<f64> {
        self.index(x, y, z).and_then(|i| self.data.get_f64(i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

fn sample_count(dims: UVec3, components: u32) -> Result<usize> {
    if components == 0 {
        return Err(VoxcalError::invalid("volume must have at least one component"));
    }
    (dims.x as usize)
        .checked_mul(dims.y as usize)
        .and_then(|n| n.checked_mul(dims.z as usize))
        .and_then(|n| n.checked_mul(components as usize))
        .ok_or_else(|| VoxcalError::invalid("volume sample count overflows usize"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_allocation_is_out_of_memory() {
        let result = try_with_capacity::<u64>(usize::MAX / 4);
        assert!(matches!(result, Err(VoxcalError::OutOfMemory { .. })));
        let result = VolumeData::zeroed(ScalarType::F64, usize::MAX / 4);
        assert!(matches!(result, Err(VoxcalError::OutOfMemory { .. })));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = Volume::new(UVec3::new(2, 2, 2), 1, VolumeData::U8(vec![0; 7]));
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_zero_components() {
        let result = Volume::new(UVec3::ONE, 0, VolumeData::U8(vec![]));
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_multi_component_length() {
        let volume = Volume::zeroed(UVec3::new(3, 2, 1), 2, ScalarType::I16).unwrap();
        assert_eq!(volume.voxel_count(), 6);
        assert_eq!(volume.sample_count(), 12);
        assert_eq!(volume.components(), 2);
    }

    #[test]
    fn test_index_is_x_fastest() {
        let samples: Vec<u16> = (0..24).collect();
        let volume = Volume::from_samples(UVec3::new(4, 3, 2), samples).unwrap();
        assert_eq!(volume.index(1, 0, 0), Some(1));
        assert_eq!(volume.index(0, 1, 0), Some(4));
        assert_eq!(volume.index(0, 0, 1), Some(12));
        assert_eq!(volume.value_f64(3, 2, 1), Some(23.0));
        assert_eq!(volume.index(4, 0, 0), None);
    }

    #[test]
    fn test_from_bytes_accepts_unaligned_source() {
        let values: [f32; 3] = [1.5, -2.0, 8.25];
        let mut raw = vec![0u8];
        raw.extend_from_slice(bytemuck::cast_slice(&values));
        let volume =
            Volume::from_bytes(UVec3::new(3, 1, 1), 1, ScalarType::F32, &raw[1..]).unwrap();
        assert_eq!(volume.samples::<f32>(), Some(&values[..]));
        assert_eq!(volume.as_bytes(), &raw[1..]);
    }

    #[test]
    fn test_from_bytes_rejects_partial_sample() {
        let result = Volume::from_bytes(UVec3::ONE, 1, ScalarType::U32, &[0u8; 3]);
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_filled_volume() {
        let volume = Volume::filled(UVec3::new(2, 2, 2), 7i32).unwrap();
        assert_eq!(volume.scalar_type(), ScalarType::I32);
        assert!(volume.samples::<i32>().unwrap().iter().all(|&v| v == 7));
        assert!(volume.samples::<u32>().is_none());
    }

    #[test]
    fn test_empty_dims_are_valid() {
        let volume = Volume::from_samples::<f64>(UVec3::new(0, 4, 4), vec![]).unwrap();
        assert_eq!(volume.voxel_count(), 0);
        assert!(volume.data().is_empty());
    }
}
