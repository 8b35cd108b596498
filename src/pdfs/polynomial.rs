#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::DensityShape;

/// A polynomial with an implicit unit constant term
///
/// ```math
/// y = 1 + \sum_{i=0}^{n-1} c_i x^{i+1}
/// ```
///
/// As with [`ExponentialShape`](super::ExponentialShape), the efficiency only enters
/// the normalization integral and not the returned density.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolynomialShape {
    pub coefficients: Vec<f64>,
}

impl PolynomialShape {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.coefficients.iter()
    }
}

impl DensityShape for PolynomialShape {
    fn name(&self) -> &'static str {
        "polynomial"
    }

    fn value(&self, x: f64) -> f64 {
        self.iter()
            .enumerate()
            .fold(1.0, |y, (i, c)| y + c * x.powi(i as i32 + 1))
    }

    fn weights_output(&self) -> bool {
        false
    }
}

impl AsRef<[f64]> for PolynomialShape {
    fn as_ref(&self) -> &[f64] {
        &self.coefficients
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pdfs::NormalizationConfig;

    #[test]
    fn test_implicit_constant_term() {
        let shape = PolynomialShape::new(vec![2.0, 3.0]);
        assert_eq!(shape.value(0.0), 1.0);
        assert_eq!(shape.value(2.0), 1.0 + 4.0 + 12.0);
        assert_eq!(PolynomialShape::new(Vec::new()).value(5.0), 1.0);
    }

    #[test]
    fn test_normalization() {
        let shape = PolynomialShape::new(vec![0.5, -0.05]);
        let config = NormalizationConfig::new(0.0, 5.0);
        let norm = shape.normalization(&config).unwrap();
        let expected = 5.0 + 0.25 * 25.0 - 0.05 / 3.0 * 125.0;
        assert!((norm - expected).abs() < 1e-5, "{norm} != {expected}");
    }
}
