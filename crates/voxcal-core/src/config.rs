//! Runtime configuration for the polynomial transform.

use serde::{Deserialize, Serialize};

use crate::volume::ScalarType;

/// Volumes smaller than this run on the calling thread.
const DEFAULT_MIN_PARALLEL_SAMPLES: usize = 1 << 18;
/// z-slices handed to one worker at a time.
const DEFAULT_SLICES_PER_TASK: usize = 4;

/// Knobs for [`crate::transform::polynomial::apply_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Output element type. `None` keeps the input's type.
    pub output_type: Option<ScalarType>,
    /// Allow splitting large volumes across the rayon pool.
    pub parallel: bool,
    /// Minimum sample count before the parallel path is taken.
    pub min_parallel_samples: usize,
    /// Number of z-slices per parallel work item.
    pub slices_per_task: usize,
}

impl TransformConfig {
    /// Single-threaded configuration, ignoring environment overrides.
    pub fn sequential() -> Self {
        Self {
            output_type: None,
            parallel: false,
            min_parallel_samples: DEFAULT_MIN_PARALLEL_SAMPLES,
            slices_per_task: DEFAULT_SLICES_PER_TASK,
        }
    }

    pub fn with_output_type(mut self, output_type: ScalarType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    /// Element type the transform will produce for an input of `input_type`.
    pub fn resolve_output_type(&self, input_type: ScalarType) -> ScalarType {
        self.output_type.unwrap_or(input_type)
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            output_type: None,
            parallel: std::env::var("VOXCAL_PARALLEL")
                .map(|s| !matches!(s.trim(), "0" | "false" | "off"))
                .unwrap_or(true),
            min_parallel_samples: std::env::var("VOXCAL_MIN_PARALLEL_SAMPLES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_PARALLEL_SAMPLES),
            slices_per_task: std::env::var("VOXCAL_SLICES_PER_TASK")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_SLICES_PER_TASK),
        }
    }
}
