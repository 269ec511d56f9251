//! Trimming of outliers from the two ends of a measured curve.
//!
//! Measured calibration profiles are noisy at the edges of the gel. Points
//! are dropped from either end while the jump to their neighbour exceeds a
//! multiple of the mean neighbour difference.
//!
//! # Algorithm
//! Repeat up to `max_iterations` times:
//! 1. `mean = Σ|y[i] − y[i+1]| / (n − 1)`
//! 2. Stop if `mean < max(y) × min_mean_difference_fraction`
//! 3. Drop leading points while `|y[0] − y[1]| > threshold × mean`
//! 4. Drop trailing points while `|y[n−1] − y[n−2]| > threshold × mean`
//! 5. Stop if nothing was dropped

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxcalError};

/// Fewest points the trimming keeps, and accepts.
const MIN_POINTS: usize = 3;

/// Tuning for [`remove_end_outliers`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierParams {
    /// Multiple of the mean neighbour difference that marks an outlier.
    pub threshold: f64,
    /// Upper bound on trimming passes.
    pub max_iterations: usize,
    /// The curve counts as clean once the mean neighbour difference falls
    /// below this fraction of its maximum y-value.
    pub min_mean_difference_fraction: f64,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            max_iterations: 10,
            min_mean_difference_fraction: 0.0075,
        }
    }
}

/// Result of [`remove_end_outliers`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRemoval {
    /// Remaining points, in input order.
    pub points: Vec<[f64; 2]>,
    /// Total number of points dropped across all passes.
    pub removed: usize,
}

/// Drop outliers from both ends of `points` (`[x, y]` rows, y is tested).
pub fn remove_end_outliers(points: &[[f64; 2]], params: &OutlierParams) -> Result<OutlierRemoval> {
    if points.len() < MIN_POINTS {
        return Err(VoxcalError::invalid(format!(
            "outlier removal needs at least {MIN_POINTS} points, got {}",
            points.len()
        )));
    }

    let (mut start, mut end) = (0, points.len());
    for _ in 0..params.max_iterations {
        let window = &points[start..end];
        if window.len() < MIN_POINTS {
            break;
        }

        let max_y = window.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
        let mean = mean_neighbor_difference(window);
        if mean < max_y * params.min_mean_difference_fraction {
            break;
        }

        let limit = mean * params.threshold;
        let mut found = 0;
        while end - start > MIN_POINTS && (points[start][1] - points[start + 1][1]).abs() > limit {
            start += 1;
            found += 1;
        }
        while end - start > MIN_POINTS && (points[end - 1][1] - points[end - 2][1]).abs() > limit {
            end -= 1;
            found += 1;
        }

        if found == 0 {
            break;
        }
    }

    let removed = points.len() - (end - start);
    if removed > 0 {
        tracing::debug!("outlier removal: dropped {removed} of {} points", points.len());
    }
    Ok(OutlierRemoval {
        points: points[start..end].to_vec(),
        removed,
    })
}

fn mean_neighbor_difference(points: &[[f64; 2]]) -> f64 {
    let sum: f64 = points.windows(2).map(|w| (w[0][1] - w[1][1]).abs()).sum();
    sum / (points.len() - 1) as f64
}
