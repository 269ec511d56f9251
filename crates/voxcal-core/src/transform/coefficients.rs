//! Ordered polynomial coefficients, highest degree first.
//!
//! For a list `c` of length `N` the polynomial is
//!
//! ```text
//! p(x) = c[0]·x^(N-1) + c[1]·x^(N-2) + … + c[N-1]
//! ```
//!
//! which is the layout produced by least-squares fitting in
//! [`crate::calibration::fit`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxcalError};

/// Non-empty list of polynomial coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CoefficientList(Vec<f64>);

impl CoefficientList {
    /// Returns `InvalidInput` for an empty list.
    pub fn new(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(VoxcalError::invalid(
                "polynomial coefficient list must contain at least one entry",
            ));
        }
        Ok(Self(coefficients))
    }

    /// Degree-0 polynomial `p(x) = value`.
    pub fn constant(value: f64) -> Self {
        Self(vec![value])
    }

    /// `p(x) = x`.
    pub fn identity() -> Self {
        Self(vec![1.0, 0.0])
    }

    /// Polynomial degree (`N - 1`).
    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Coefficient multiplying `x^degree`, if within the polynomial's degree.
    pub fn coefficient_of_degree(&self, degree: usize) -> Option<f64> {
        let max = self.degree();
        (degree <= max).then(|| self.0[max - degree])
    }

    /// Evaluate `p(x)` with Horner's method.
    ///
    /// The full sum is accumulated before returning; callers narrow it to the
    /// output element type exactly once.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        // Seeded with the leading coefficient so `[c]` stays `c` for non-finite x.
        let Some((&leading, rest)) = self.0.split_first() else {
            // Empty lists are rejected at construction.
            return 0.0;
        };
        rest.iter().fold(leading, |acc, &c| acc * x + c)
    }
}

impl TryFrom<Vec<f64>> for CoefficientList {
    type Error = VoxcalError;

    fn try_from(coefficients: Vec<f64>) -> Result<Self> {
        Self::new(coefficients)
    }
}

impl TryFrom<&[f64]> for CoefficientList {
    type Error = VoxcalError;

    fn try_from(coefficients: &[f64]) -> Result<Self> {
        Self::new(coefficients.to_vec())
    }
}

impl From<CoefficientList> for Vec<f64> {
    fn from(list: CoefficientList) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_empty_list_is_invalid() {
        assert!(matches!(
            CoefficientList::new(vec![]),
            Err(VoxcalError::InvalidInput(_))
        ));
        assert!(CoefficientList::try_from(&[][..]).is_err());
    }

    #[test]
    fn test_constant_ignores_input() {
        let poly = CoefficientList::constant(4.5);
        assert_eq!(poly.degree(), 0);
        for x in [-1e9, -1.0, 0.0, 3.0, f64::MAX] {
            assert_eq!(poly.evaluate(x), 4.5);
        }
    }

    #[test]
    fn test_non_finite_input() {
        let constant = CoefficientList::constant(7.0);
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(constant.evaluate(x), 7.0);
        }

        let linear = CoefficientList::new(vec![2.0, 3.0]).unwrap();
        assert_eq!(linear.evaluate(f64::INFINITY), f64::INFINITY);
        assert_eq!(linear.evaluate(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert!(linear.evaluate(f64::NAN).is_nan());
    }

    #[test]
    fn test_linear_known_value() {
        let poly = CoefficientList::new(vec![2.0, 3.0]).unwrap();
        assert_eq!(poly.evaluate(5.0), 13.0);
    }

    #[test]
    fn test_horner_matches_power_sum() {
        let coefficients = vec![0.5, -1.25, 3.0, 7.0];
        let poly = CoefficientList::new(coefficients.clone()).unwrap();
        let degree = coefficients.len() - 1;
        for x in [-2.5, -0.1, 0.0, 1.0, 4.75] {
            let direct: f64 = coefficients
                .iter()
                .enumerate()
                .map(|(order, c)| c * f64::powi(x, (degree - order) as i32))
                .sum();
            assert!(
                (poly.evaluate(x) - direct).abs() < EPSILON,
                "x={x}: horner {:.15} vs direct {:.15}",
                poly.evaluate(x),
                direct
            );
        }
    }

    #[test]
    fn test_coefficient_of_degree() {
        let poly = CoefficientList::new(vec![2.0, -3.0, 1.0]).unwrap();
        assert_eq!(poly.coefficient_of_degree(2), Some(2.0));
        assert_eq!(poly.coefficient_of_degree(0), Some(1.0));
        assert_eq!(poly.coefficient_of_degree(3), None);
    }

    #[test]
    fn test_serde_rejects_empty_list() {
        let parsed: CoefficientList = serde_json::from_str("[1.0, 0.0]").unwrap();
        assert_eq!(parsed, CoefficientList::identity());
        assert!(serde_json::from_str::<CoefficientList>("[]").is_err());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "[1.0,0.0]");
    }
}
