//! Piecewise-linear curves through measured `(x, y)` samples.
//!
//! Used to resample a calibration curve (optical density vs depth) at the
//! depths of a dose curve. Values outside the point range clamp to the first
//! or last point's y-value.
//!
//! # Complexity
//! - Construction: O(N log N) sort
//! - Evaluate: O(log N) binary search + O(1) interpolation

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxcalError};

/// Linear interpolation through points sorted by x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseLinear {
    points: Vec<[f64; 2]>,
}

impl PiecewiseLinear {
    /// Build a curve from unordered points.
    ///
    /// Points are sorted by x. When several points share an x-value the last
    /// one given wins. Requires at least one point and finite coordinates.
    pub fn new(mut points: Vec<[f64; 2]>) -> Result<Self> {
        if points.is_empty() {
            return Err(VoxcalError::invalid("curve needs at least one point"));
        }
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(VoxcalError::invalid("curve points must be finite"));
        }

        // Stable sort keeps input order among equal x, so the last duplicate
        // is the one to keep.
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        let mut deduped: Vec<[f64; 2]> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last[0] == p[0] => *last = p,
                _ => deduped.push(p),
            }
        }
        Ok(Self { points: deduped })
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// `(min_x, max_x)` covered by the points.
    pub fn range(&self) -> (f64, f64) {
        (self.points[0][0], self.points[self.points.len() - 1][0])
    }

    /// True when `x` lies inside [`Self::range`] (inclusive).
    pub fn contains(&self, x: f64) -> bool {
        let (lo, hi) = self.range();
        x >= lo && x <= hi
    }

    /// Evaluate the curve at `x`.
    pub fn value(&self, x: f64) -> f64 {
        let pts = &self.points;
        if x <= pts[0][0] {
            return pts[0][1];
        }
        let last = pts[pts.len() - 1];
        if x >= last[0] {
            return last[1];
        }

        // First point strictly right of x; x > pts[0] so hi >= 1.
        let hi = pts.partition_point(|p| p[0] <= x);
        let (p1, p2) = (pts[hi - 1], pts[hi]);
        let t = (x - p1[0]) / (p2[0] - p1[0]);
        p1[1] + (p2[1] - p1[1]) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_empty_curve_is_invalid() {
        assert!(PiecewiseLinear::new(vec![]).is_err());
        assert!(PiecewiseLinear::new(vec![[0.0, f64::NAN]]).is_err());
    }

    #[test]
    fn test_points_are_sorted() {
        let curve = PiecewiseLinear::new(vec![[2.0, 20.0], [0.0, 0.0], [1.0, 10.0]]).unwrap();
        assert_eq!(curve.points(), &[[0.0, 0.0], [1.0, 10.0], [2.0, 20.0]]);
        assert_eq!(curve.range(), (0.0, 2.0));
    }

    #[test]
    fn test_interpolates_between_points() {
        let curve = PiecewiseLinear::new(vec![[0.0, 0.0], [2.0, 4.0], [4.0, 0.0]]).unwrap();
        assert!((curve.value(1.0) - 2.0).abs() < EPSILON);
        assert!((curve.value(3.0) - 2.0).abs() < EPSILON);
        assert!((curve.value(2.0) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_clamps_outside_range() {
        let curve = PiecewiseLinear::new(vec![[1.0, 5.0], [3.0, 9.0]]).unwrap();
        assert_eq!(curve.value(-10.0), 5.0);
        assert_eq!(curve.value(10.0), 9.0);
        assert!(curve.contains(1.0));
        assert!(curve.contains(3.0));
        assert!(!curve.contains(3.0001));
    }

    #[test]
    fn test_duplicate_x_keeps_last() {
        let curve = PiecewiseLinear::new(vec![[1.0, 5.0], [0.0, 0.0], [1.0, 7.0]]).unwrap();
        assert_eq!(curve.points().len(), 2);
        assert_eq!(curve.value(1.0), 7.0);
    }

    #[test]
    fn test_single_point_is_constant() {
        let curve = PiecewiseLinear::new(vec![[2.0, 3.5]]).unwrap();
        assert_eq!(curve.value(-1.0), 3.5);
        assert_eq!(curve.value(2.0), 3.5);
        assert_eq!(curve.value(9.0), 3.5);
    }
}
