//! Least-squares polynomial fitting of dose against optical density.
//!
//! Produces the [`CoefficientList`] that the volume transform applies.
//!
//! # Algorithm
//! 1. Build the Vandermonde matrix `A[i][j] = x[i]^(order − j)` (highest
//!    degree first, matching `CoefficientList`)
//! 2. Scale each column to unit norm to tame conditioning
//! 3. Householder QR: `A = Q·R`, apply `Qᵀ` to `y`
//! 4. Back-substitute `R·c = Qᵀy`, then undo the column scaling
//!
//! # Complexity
//! O(m·n²) for `m` points and `n = order + 1` coefficients.

use crate::error::{Result, VoxcalError};
use crate::transform::coefficients::CoefficientList;

/// Columns whose remaining norm falls below this (after unit scaling) are
/// treated as linearly dependent.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted polynomial and its goodness of fit.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    /// Coefficients, highest degree first.
    pub coefficients: CoefficientList,
    /// `Σ (y[i] − p(x[i]))²` over the fitted points.
    pub residual_sum_of_squares: f64,
}

/// Fit a polynomial of degree `order` to the points `(x[i], y[i])`.
///
/// Fails with `InvalidInput` when the slices differ in length, hold fewer
/// than `order + 1` points, contain non-finite values, or when the x-values
/// cannot determine a unique polynomial (too few distinct x-values).
pub fn fit_polynomial(x: &[f64], y: &[f64], order: usize) -> Result<PolynomialFit> {
    if x.len() != y.len() {
        return Err(VoxcalError::invalid(format!(
            "fit needs matching x/y lengths, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let m = x.len();
    let n = order
        .checked_add(1)
        .ok_or_else(|| VoxcalError::invalid(format!("fit order {order} is too large")))?;
    if m < n {
        return Err(VoxcalError::invalid(format!(
            "degree-{order} fit needs at least {n} points, got {m}"
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(VoxcalError::invalid("fit data must be finite"));
    }

    // Column-major Vandermonde matrix, each column scaled to unit norm.
    let mut columns: Vec<Vec<f64>> = (0..n)
        .map(|j| x.iter().map(|&xi| xi.powi((order - j) as i32)).collect())
        .collect();
    let mut scales = vec![0.0; n];
    for (column, scale) in columns.iter_mut().zip(scales.iter_mut()) {
        let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(rank_deficient(order));
        }
        column.iter_mut().for_each(|v| *v /= norm);
        *scale = norm;
    }

    let mut rhs = y.to_vec();
    let mut diagonal = vec![0.0; n];
    for k in 0..n {
        let norm = columns[k][k..].iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm < RANK_TOLERANCE {
            return Err(rank_deficient(order));
        }
        let alpha = if columns[k][k] > 0.0 { -norm } else { norm };

        // Householder vector v = a_k − α·e_k, stored over rows k..m.
        let mut v = columns[k][k..].to_vec();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|e| e * e).sum();

        for column in columns.iter_mut().skip(k) {
            reflect(&v, v_norm_sq, &mut column[k..]);
        }
        reflect(&v, v_norm_sq, &mut rhs[k..]);
        diagonal[k] = alpha;
    }

    // Back substitution on the upper triangle of R.
    let mut scaled = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|j| columns[j][i] * scaled[j]).sum();
        scaled[i] = (rhs[i] - tail) / diagonal[i];
    }
    let raw: Vec<f64> = scaled.iter().zip(&scales).map(|(c, s)| c / s).collect();
    let coefficients = CoefficientList::new(raw)?;

    let residual_sum_of_squares = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - coefficients.evaluate(xi);
            r * r
        })
        .sum();

    tracing::debug!(
        "polynomial fit: order {order}, {m} points, coefficients {:?}, residual {:.6e}",
        coefficients.as_slice(),
        residual_sum_of_squares
    );

    Ok(PolynomialFit {
        coefficients,
        residual_sum_of_squares,
    })
}

/// Apply the reflection `I − 2vvᵀ/(vᵀv)` to `target` in place.
fn reflect(v: &[f64], v_norm_sq: f64, target: &mut [f64]) {
    if v_norm_sq == 0.0 {
        return;
    }
    let dot: f64 = v.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    let tau = 2.0 * dot / v_norm_sq;
    for (t, vi) in target.iter_mut().zip(v) {
        *t -= tau * vi;
    }
}

fn rank_deficient(order: usize) -> VoxcalError {
    VoxcalError::invalid(format!(
        "x-values do not determine a unique degree-{order} polynomial"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_coefficients(fit: &PolynomialFit, expected: &[f64]) {
        let actual = fit.coefficients.as_slice();
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < EPSILON, "coefficient {i}: {a:.12} vs {e:.12}");
        }
    }

    #[test]
    fn test_recovers_exact_quadratic() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v * v - 3.0 * v + 1.0).collect();
        let fit = fit_polynomial(&x, &y, 2).unwrap();
        assert_coefficients(&fit, &[2.0, -3.0, 1.0]);
        assert!(fit.residual_sum_of_squares < 1e-18);
    }

    #[test]
    fn test_recovers_cubic_on_optical_density_scale() {
        // Optical density values are small; dose values are large.
        let x = [0.05, 0.12, 0.2, 0.31, 0.44, 0.58, 0.7];
        let expected = [120.0, -35.0, 48.0, 0.5];
        let y: Vec<f64> = x
            .iter()
            .map(|&v| CoefficientList::new(expected.to_vec()).unwrap().evaluate(v))
            .collect();
        let fit = fit_polynomial(&x, &y, 3).unwrap();
        for (a, e) in fit.coefficients.as_slice().iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{a} vs {e}");
        }
    }

    #[test]
    fn test_least_squares_line() {
        let fit = fit_polynomial(&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.0], 1).unwrap();
        assert_coefficients(&fit, &[0.5, 1.0 / 6.0]);
        assert!((fit.residual_sum_of_squares - 1.0 / 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_order_zero_is_mean() {
        let fit = fit_polynomial(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0], 0).unwrap();
        assert_coefficients(&fit, &[5.0]);
        assert!((fit.residual_sum_of_squares - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_too_few_points_is_invalid() {
        let result = fit_polynomial(&[1.0, 2.0], &[1.0, 2.0], 2);
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_huge_order_is_invalid() {
        let result = fit_polynomial(&[1.0, 2.0], &[1.0, 2.0], usize::MAX);
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_mismatched_lengths_is_invalid() {
        assert!(fit_polynomial(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn test_repeated_x_is_rank_deficient() {
        let result = fit_polynomial(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0], 1);
        assert!(matches!(result, Err(VoxcalError::InvalidInput(_))));
    }

    #[test]
    fn test_non_finite_is_invalid() {
        assert!(fit_polynomial(&[0.0, f64::NAN], &[1.0, 2.0], 1).is_err());
    }
}
