//! Calibration math: profile alignment, dose curves, outlier trimming, and
//! polynomial fitting.
//!
//! These steps turn a measured optical-density profile and a reference
//! percent-depth-dose curve into the [`crate::CoefficientList`] applied to
//! a measured volume.

pub mod align;
pub mod curve;
pub mod dose;
pub mod fit;
pub mod outliers;

pub use align::{
    AlignmentParams, aligned_calibration, aligned_for_display, alignment_error, trim_zero_ends,
};
pub use curve::PiecewiseLinear;
pub use dose::{DEFAULT_DEPTH_WINDOW, dose_from_pdd, optical_density_vs_dose};
pub use fit::{PolynomialFit, fit_polynomial};
pub use outliers::{OutlierParams, OutlierRemoval, remove_end_outliers};
