//! Per-voxel polynomial evaluation: the calibration kernel.
//!
//! Every output sample is `p(v)` for the input sample `v` at the same index:
//!
//! ```text
//! out[i] = narrow(Σ c[k] · v^(N-1-k)),   v = widen(in[i])
//! ```
//!
//! The sum is evaluated with Horner's method in `f64` and narrowed to the
//! output element type once per sample (see [`Sample`] for the narrowing
//! rules). There is no dependency between samples, so large volumes may be
//! split into disjoint z-slabs and evaluated on the rayon pool; both paths
//! produce identical bits.
//!
//! # Dispatch
//! The input buffer's [`ScalarType`] selects the source type and the
//! configured output type selects the destination, giving one monomorphized
//! loop per `(input, output)` pair.

use glam::UVec3;

use crate::config::TransformConfig;
use crate::error::{Result, VoxcalError};
use crate::transform::coefficients::CoefficientList;
#[cfg(feature = "parallel")]
use crate::volume::try_alloc_zeroed;
use crate::volume::{Extent, Sample, ScalarType, Volume, VolumeData, try_with_capacity};

/// Apply `coefficients` to every sample of `input` using the default config.
///
/// Returns a newly allocated volume with the same dimensions and element
/// type. The input is never modified. Fails with `InvalidInput` when the
/// volume has more than one component per voxel.
pub fn apply(input: &Volume, coefficients: &CoefficientList) -> Result<Volume> {
    apply_with(input, coefficients, &TransformConfig::default())
}

/// Apply `coefficients` to every sample of `input`.
///
/// The output element type is `config.output_type`, or the input's type when
/// unset. Either the whole output is produced or an error is returned; no
/// partially written volume is ever handed back.
pub fn apply_with(
    input: &Volume,
    coefficients: &CoefficientList,
    config: &TransformConfig,
) -> Result<Volume> {
    require_single_component(input, "input")?;

    let output_type = config.resolve_output_type(input.scalar_type());
    let chunk_len = parallel_chunk_len(input, config);
    let dims = input.dims();
    tracing::debug!(
        "apply polynomial: {}x{}x{} {} -> {}, degree {}, {}",
        dims.x,
        dims.y,
        dims.z,
        input.scalar_type(),
        output_type,
        coefficients.degree(),
        if chunk_len.is_some() { "parallel" } else { "sequential" }
    );

    let data = match input.data() {
        VolumeData::I8(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::U8(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::I16(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::U16(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::I32(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::U32(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::I64(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::U64(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::F32(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
        VolumeData::F64(s) => evaluate_as(s, output_type, coefficients, chunk_len)?,
    };

    Volume::new(dims, 1, data)
}

/// Evaluate one block of voxels into a caller-owned output volume.
///
/// `input` and `output` must both be single-component with identical
/// dimensions, and `extent` must lie inside them. Only samples inside
/// `extent` are written. Element types may differ. All checks run before the
/// first write.
pub fn apply_block(
    input: &Volume,
    extent: Extent,
    coefficients: &CoefficientList,
    output: &mut Volume,
) -> Result<()> {
    require_single_component(input, "input")?;
    require_single_component(output, "output")?;
    let dims = input.dims();
    if output.dims() != dims {
        return Err(VoxcalError::invalid(format!(
            "output dims {} do not match input dims {}",
            output.dims(),
            dims
        )));
    }
    if !extent.fits_within(dims) {
        return Err(VoxcalError::invalid(format!(
            "extent {}..{} is outside volume dims {}",
            extent.min, extent.max, dims
        )));
    }
    if extent.is_empty() {
        return Ok(());
    }

    let out = output.data_mut();
    match input.data() {
        VolumeData::I8(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::U8(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::I16(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::U16(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::I32(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::U32(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::I64(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::U64(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::F32(s) => evaluate_block_as(s, out, dims, extent, coefficients),
        VolumeData::F64(s) => evaluate_block_as(s, out, dims, extent, coefficients),
    }
    Ok(())
}

/// Evaluate one contiguous run of samples.
///
/// `input` and `output` must have the same length.
#[inline]
pub fn evaluate_span<I: Sample, O: Sample>(
    input: &[I],
    output: &mut [O],
    coefficients: &CoefficientList,
) {
    debug_assert_eq!(input.len(), output.len());
    for (src, dst) in input.iter().zip(output.iter_mut()) {
        *dst = O::from_f64(coefficients.evaluate(src.to_f64()));
    }
}

fn require_single_component(volume: &Volume, role: &str) -> Result<()> {
    if volume.components() != 1 {
        tracing::warn!(
            "apply polynomial: {role} has {} instead of 1 scalar component",
            volume.components()
        );
        return Err(VoxcalError::invalid(format!(
            "{role} volume has {} scalar components, expected 1",
            volume.components()
        )));
    }
    Ok(())
}

/// Chunk length for the parallel path, or `None` to stay on this thread.
fn parallel_chunk_len(input: &Volume, config: &TransformConfig) -> Option<usize> {
    if !cfg!(feature = "parallel")
        || !config.parallel
        || input.sample_count() < config.min_parallel_samples
    {
        return None;
    }
    let slice_len = input.dims().x as usize * input.dims().y as usize;
    Some(slice_len.saturating_mul(config.slices_per_task.max(1)).max(1))
}

fn evaluate_as<I: Sample>(
    input: &[I],
    output_type: ScalarType,
    coefficients: &CoefficientList,
    chunk_len: Option<usize>,
) -> Result<VolumeData> {
    Ok(match output_type {
        ScalarType::I8 => VolumeData::I8(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::U8 => VolumeData::U8(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::I16 => VolumeData::I16(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::U16 => VolumeData::U16(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::I32 => VolumeData::I32(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::U32 => VolumeData::U32(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::I64 => VolumeData::I64(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::U64 => VolumeData::U64(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::F32 => VolumeData::F32(evaluate_buffer(input, coefficients, chunk_len)?),
        ScalarType::F64 => VolumeData::F64(evaluate_buffer(input, coefficients, chunk_len)?),
    })
}

fn evaluate_buffer<I: Sample, O: Sample>(
    input: &[I],
    coefficients: &CoefficientList,
    chunk_len: Option<usize>,
) -> Result<Vec<O>> {
    match chunk_len {
        #[cfg(feature = "parallel")]
        Some(chunk_len) => {
            let mut output = try_alloc_zeroed::<O>(input.len())?;
            evaluate_parallel(input, &mut output, coefficients, chunk_len);
            Ok(output)
        }
        _ => {
            let mut output = try_with_capacity::<O>(input.len())?;
            output.extend(
                input
                    .iter()
                    .map(|src| O::from_f64(coefficients.evaluate(src.to_f64()))),
            );
            Ok(output)
        }
    }
}

#[cfg(feature = "parallel")]
fn evaluate_parallel<I: Sample, O: Sample>(
    input: &[I],
    output: &mut [O],
    coefficients: &CoefficientList,
    chunk_len: usize,
) {
    use rayon::prelude::*;

    output
        .par_chunks_mut(chunk_len)
        .zip(input.par_chunks(chunk_len))
        .for_each(|(dst, src)| evaluate_span(src, dst, coefficients));
}

fn evaluate_block_as<I: Sample>(
    input: &[I],
    output: &mut VolumeData,
    dims: UVec3,
    extent: Extent,
    coefficients: &CoefficientList,
) {
    match output {
        VolumeData::I8(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::U8(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::I16(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::U16(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::I32(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::U32(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::I64(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::U64(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::F32(o) => evaluate_rows(input, o, dims, extent, coefficients),
        VolumeData::F64(o) => evaluate_rows(input, o, dims, extent, coefficients),
    }
}

/// Walk the x-rows of `extent`, one contiguous span per `(y, z)`.
fn evaluate_rows<I: Sample, O: Sample>(
    input: &[I],
    output: &mut [O],
    dims: UVec3,
    extent: Extent,
    coefficients: &CoefficientList,
) {
    let nx = dims.x as usize;
    let ny = dims.y as usize;
    let (x0, x1) = (extent.min.x as usize, extent.max.x as usize);
    for z in extent.min.z as usize..extent.max.z as usize {
        for y in extent.min.y as usize..extent.max.y as usize {
            let row = (z * ny + y) * nx;
            evaluate_span(
                &input[row + x0..row + x1],
                &mut output[row + x0..row + x1],
                coefficients,
            );
        }
    }
}
