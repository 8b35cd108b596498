use std::f64::consts::{PI, SQRT_2};

use libm::erf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PdfError;

use super::DensityShape;

/// The normal density
///
/// ```math
/// y = \frac{1}{\sigma\sqrt{2\pi}}\exp\left({\frac{-(\mu - x)^2}{2\sigma^2}}\right)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianShape {
    pub mean: f64,
    pub sigma: f64,
}

impl GaussianShape {
    pub fn new(mean: f64, sigma: f64) -> Self {
        Self { mean, sigma }
    }

    #[inline]
    pub fn density(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * PI).sqrt())
    }

    /// The probability mass in `[lo, hi]`, computed with the error function
    pub fn analytic_mass(&self, lo: f64, hi: f64) -> f64 {
        let scale = self.sigma * SQRT_2;
        0.5 * (erf((hi - self.mean) / scale) - erf((lo - self.mean) / scale))
    }
}

impl DensityShape for GaussianShape {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    #[inline]
    fn value(&self, x: f64) -> f64 {
        self.density(x)
    }

    fn validate(&self) -> Result<(), PdfError> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(PdfError::InvalidParameter {
                name: "sigma",
                value: self.sigma,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pdfs::NormalizationConfig;

    #[rstest::rstest]
    #[case(0.0, 1.0, -1.0, 1.0)]
    #[case(1.0, 0.8, -2.0, 4.0)]
    #[case(-3.0, 2.5, 0.0, 10.0)]
    fn test_numerical_matches_analytic_mass(
        #[case] mean: f64,
        #[case] sigma: f64,
        #[case] lo: f64,
        #[case] hi: f64,
    ) {
        let shape = GaussianShape::new(mean, sigma);
        let config = NormalizationConfig::new(lo, hi);
        let norm = shape.normalization(&config).unwrap();
        let expected = shape.analytic_mass(lo, hi);
        assert!(
            (norm - expected).abs() / expected < 1e-5,
            "{norm} != {expected}"
        );
    }

    #[test]
    fn test_invalid_sigma() {
        let config = NormalizationConfig::new(-1.0, 1.0);
        let err = GaussianShape::new(0.0, 0.0)
            .normalization(&config)
            .unwrap_err();
        assert_eq!(
            err,
            PdfError::InvalidParameter {
                name: "sigma",
                value: 0.0
            }
        );
    }
}
