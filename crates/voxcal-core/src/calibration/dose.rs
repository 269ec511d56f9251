//! Dose curves from percent-depth-dose data and their pairing with measured
//! optical density.

use std::ops::RangeInclusive;

use crate::calibration::curve::PiecewiseLinear;

/// PDD is given in percent and output factors per 100 MU, hence `100 × 100`.
const PDD_SCALE: f64 = 10_000.0;

/// Depth window accepted when no narrower range is requested.
pub const DEFAULT_DEPTH_WINDOW: RangeInclusive<f64> = -1000.0..=1000.0;

/// Convert a percent-depth-dose curve to absolute dose.
///
/// Each `[depth, pdd]` row becomes `[depth, pdd × rdf × monitor_units / 10000]`.
pub fn dose_from_pdd(pdd: &[[f64; 2]], rdf: f64, monitor_units: f64) -> Vec<[f64; 2]> {
    pdd.iter()
        .map(|&[depth, percent]| [depth, percent * rdf * monitor_units / PDD_SCALE])
        .collect()
}

/// Pair measured optical density with delivered dose at matching depths.
///
/// `calibration` is the aligned optical-density-vs-depth curve. For each
/// `[depth, dose]` row whose depth lies inside both the curve's range and
/// `depth_window`, emits `[od(depth), dose]`. Rows are emitted in reverse
/// depth order, so with a falling PDD the smallest dose comes first.
pub fn optical_density_vs_dose(
    calibration: &PiecewiseLinear,
    dose: &[[f64; 2]],
    depth_window: RangeInclusive<f64>,
) -> Vec<[f64; 2]> {
    dose.iter()
        .rev()
        .filter(|[depth, _]| calibration.contains(*depth) && depth_window.contains(depth))
        .map(|&[depth, value]| [calibration.value(depth), value])
        .collect()
}
