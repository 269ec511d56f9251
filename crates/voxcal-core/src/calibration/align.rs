//! Alignment of a measured optical-density profile with a PDD curve.
//!
//! The measured profile is registered against the percent depth dose by a
//! depth shift and a linear y-mapping:
//!
//! ```text
//! depth' = depth + x_shift
//! y'     = od · y_scale + y_shift
//! ```
//!
//! [`alignment_error`] scores one set of parameters. Searching for the best
//! parameters is left to the caller; [`AlignmentParams::initial`] gives the
//! usual starting point.

use serde::{Deserialize, Serialize};

use crate::calibration::curve::PiecewiseLinear;
use crate::error::{Result, VoxcalError};

/// Depth shift and y-mapping applied to a measured profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentParams {
    /// Added to every measured depth.
    pub x_shift: f64,
    /// Multiplies every measured optical density.
    pub y_scale: f64,
    /// Added after scaling.
    pub y_shift: f64,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            x_shift: 0.0,
            y_scale: 1.0,
            y_shift: 0.0,
        }
    }
}

impl AlignmentParams {
    /// No shift, with `y_scale = max(pdd) / max(calibration)`.
    pub fn initial(pdd: &[[f64; 2]], calibration: &[[f64; 2]]) -> Result<Self> {
        let max_pdd = max_y(pdd);
        let max_calibration = max_y(calibration);
        if !(max_calibration > 0.0) || !max_pdd.is_finite() || !max_calibration.is_finite() {
            return Err(VoxcalError::invalid(format!(
                "cannot derive initial scale from maxima {max_pdd} and {max_calibration}"
            )));
        }
        Ok(Self {
            y_scale: max_pdd / max_calibration,
            ..Self::default()
        })
    }

    /// The measured profile with these parameters applied.
    pub fn transform(&self, calibration: &[[f64; 2]]) -> Result<PiecewiseLinear> {
        PiecewiseLinear::new(
            calibration
                .iter()
                .map(|&[depth, od]| [depth + self.x_shift, od * self.y_scale + self.y_shift])
                .collect(),
        )
    }
}

/// Drop rows whose y-value is exactly zero from both ends.
///
/// Zero readings at the edges of the gel are invalid. Fails with
/// `InvalidInput` when no row remains.
pub fn trim_zero_ends(points: &[[f64; 2]]) -> Result<&[[f64; 2]]> {
    let start = points.iter().position(|p| p[1] != 0.0);
    let end = points.iter().rposition(|p| p[1] != 0.0);
    match (start, end) {
        (Some(start), Some(end)) => Ok(&points[start..=end]),
        _ => Err(VoxcalError::invalid("calibration profile holds only zero values")),
    }
}

/// Sum of squared differences between the PDD and the transformed profile.
///
/// Only PDD depths inside the transformed profile's depth range count.
pub fn alignment_error(
    pdd: &[[f64; 2]],
    calibration: &[[f64; 2]],
    params: &AlignmentParams,
) -> Result<f64> {
    let curve = params.transform(calibration)?;
    Ok(pdd
        .iter()
        .filter(|[depth, _]| curve.contains(*depth))
        .map(|&[depth, percent]| {
            let difference = percent - curve.value(depth);
            difference * difference
        })
        .sum())
}

/// Measured optical density resampled at the PDD depths.
///
/// Only the depth shift is applied, so the y-values stay in optical density
/// units. Rows follow the PDD order and cover the PDD depths that fall
/// inside the shifted profile.
pub fn aligned_calibration(
    pdd: &[[f64; 2]],
    calibration: &[[f64; 2]],
    x_shift: f64,
) -> Result<Vec<[f64; 2]>> {
    let shift_only = AlignmentParams {
        x_shift,
        ..AlignmentParams::default()
    };
    resample(pdd, &shift_only.transform(calibration)?)
}

/// Fully transformed profile resampled at the PDD depths, for overlaying
/// on the PDD curve.
pub fn aligned_for_display(
    pdd: &[[f64; 2]],
    calibration: &[[f64; 2]],
    params: &AlignmentParams,
) -> Result<Vec<[f64; 2]>> {
    resample(pdd, &params.transform(calibration)?)
}

fn resample(pdd: &[[f64; 2]], curve: &PiecewiseLinear) -> Result<Vec<[f64; 2]>> {
    let rows: Vec<[f64; 2]> = pdd
        .iter()
        .filter(|[depth, _]| curve.contains(*depth))
        .map(|&[depth, _]| [depth, curve.value(depth)])
        .collect();
    if rows.is_empty() {
        let (lo, hi) = curve.range();
        return Err(VoxcalError::invalid(format!(
            "no PDD depth lies inside the aligned profile range {lo}..={hi}"
        )));
    }
    tracing::debug!("aligned profile resampled at {} PDD depths", rows.len());
    Ok(rows)
}

fn max_y(points: &[[f64; 2]]) -> f64 {
    points.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max)
}
