//! Calibration logic driven by the host.
//!
//! This is the only place a node's image data is replaced. Every operation
//! reads the node's current volume, runs the kernel without holding any
//! node lock, and installs the result only once the kernel has succeeded.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use voxcal_core::{CoefficientList, Result, TransformConfig, Volume, VoxcalError, apply_with};

use crate::node::VolumeNode;

/// Suffix appended to a measured volume's name for its calibrated copy.
pub const CALIBRATED_SUFFIX: &str = "_Calibrated";

/// Timing of the most recent successful transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyStats {
    /// Voxel samples evaluated.
    pub samples: usize,
    /// Wall-clock time of the kernel, in milliseconds.
    pub kernel_ms: f64,
}

/// Host-facing entry points for polynomial calibration.
#[derive(Debug, Default)]
pub struct CalibrationLogic {
    config: TransformConfig,
    last_apply: Mutex<Option<ApplyStats>>,
}

impl CalibrationLogic {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config,
            last_apply: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Stats of the last transform that completed, if any.
    pub fn last_apply(&self) -> Option<ApplyStats> {
        *self.last_apply.lock()
    }

    /// Replace the node's image data with the polynomial applied per voxel.
    ///
    /// On success the node receives the new volume and is marked modified
    /// exactly once. On any error the node is left untouched.
    pub fn apply_polynomial_on_volume(
        &self,
        node: &mut impl VolumeNode,
        coefficients: &[f64],
    ) -> Result<()> {
        let output = self.transform_node(&*node, coefficients)?;
        tracing::info!("Replaced image data of '{}'", node.name());
        node.set_image_data(Arc::new(output));
        node.mark_modified();
        Ok(())
    }

    /// Write the calibrated copy of `measured` into `target`.
    ///
    /// `measured` is only read. `target` receives the transformed volume and
    /// is marked modified, or is left untouched on error.
    pub fn calibrate_into(
        &self,
        measured: &impl VolumeNode,
        target: &mut impl VolumeNode,
        coefficients: &[f64],
    ) -> Result<()> {
        let output = self.transform_node(measured, coefficients)?;
        tracing::info!("Calibrated '{}' into '{}'", measured.name(), target.name());
        target.set_image_data(Arc::new(output));
        target.mark_modified();
        Ok(())
    }

    fn transform_node(&self, node: &impl VolumeNode, coefficients: &[f64]) -> Result<Volume> {
        let Some(input) = node.get_image_data() else {
            tracing::warn!("Node '{}' has no image data", node.name());
            return Err(VoxcalError::InvalidInput(format!(
                "node '{}' has no image data",
                node.name()
            )));
        };
        let coefficients = CoefficientList::try_from(coefficients)?;

        let start = Instant::now();
        let output = match apply_with(&input, &coefficients, &self.config) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Polynomial transform on '{}' failed: {e}", node.name());
                return Err(e);
            }
        };
        let stats = ApplyStats {
            samples: input.sample_count(),
            kernel_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!(
            "Transform on '{}': {} samples, degree {}, {:.2}ms",
            node.name(),
            stats.samples,
            coefficients.degree(),
            stats.kernel_ms
        );
        *self.last_apply.lock() = Some(stats);
        Ok(output)
    }
}

/// Name for the calibrated copy of `base`, unique among `existing`.
///
/// Returns `<base>_Calibrated`, or `<base>_Calibrated_<n>` with the smallest
/// `n >= 1` not already taken.
pub fn calibrated_name<'a>(base: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = existing.into_iter().collect();
    let candidate = format!("{base}{CALIBRATED_SUFFIX}");
    if !taken.contains(&candidate.as_str()) {
        return candidate;
    }
    let mut n = 1usize;
    loop {
        let name = format!("{candidate}_{n}");
        if !taken.contains(&name.as_str()) {
            return name;
        }
        n += 1;
    }
}
