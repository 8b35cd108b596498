//! Normalized probability densities over a bounded fit domain.
//!
//! Each shape is sampled on an evenly spaced grid over `[xlo, xhi]`, optionally
//! weighted by an [`Efficiency`], and integrated with [`simpson`] to find its
//! normalization constant. When a [`SubrangeSet`] is given, the normalization is
//! instead the sum of the integrals over each subrange, which lets a fit domain
//! exclude a vetoed window.
//!
//! The supported shapes:
//! - [`ExponentialShape`]
//! - [`CosineShape`]
//! - [`GaussianShape`]
//! - [`PolynomialShape`]
//!
//! # Example
//!
//! ```rust
//! use bmixing::pdfs::{DensityShape, ExponentialShape, NormalizationConfig, SubrangeSet};
//!
//! let config = NormalizationConfig::new(0.0, 10.0)
//!     .subranges(SubrangeSet::from_pairs(&[(0.0, 4.0), (6.0, 10.0)]).unwrap());
//! let pdf = ExponentialShape::new(0.5).normalized(&config).unwrap();
//! let density = pdf.evaluate(&[1.0, 2.0, 7.5]).unwrap();
//! assert!(density[0] > density[1]);
//! ```
use std::fmt::Debug;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::efficiency::Efficiency;
use crate::error::PdfError;
use crate::integrate::{linspace, simpson};

mod cosine;
mod exponential;
mod gaussian;
mod polynomial;

pub use cosine::CosineShape;
pub use exponential::ExponentialShape;
pub use gaussian::GaussianShape;
pub use polynomial::PolynomialShape;

/// The default number of samples used to integrate a shape
pub const DEFAULT_NUM_INT_POINTS: usize = 100;

/// A closed interval of the fit domain that contributes to the normalization
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subrange {
    pub lo: f64,
    pub hi: f64,
}

impl Subrange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    fn is_valid(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi
    }
}

/// A non-empty, ordered collection of [`Subrange`]s. Subranges may overlap, in which
/// case the overlap is counted once per subrange.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubrangeSet {
    ranges: Vec<Subrange>,
}

impl SubrangeSet {
    pub fn new(ranges: Vec<Subrange>) -> Result<Self, PdfError> {
        if ranges.is_empty() {
            return Err(PdfError::mismatch("a subrange set cannot be empty"));
        }
        if let Some(bad) = ranges.iter().find(|r| !r.is_valid()) {
            return Err(PdfError::mismatch(format!(
                "subrange [{}, {}] must have finite bounds with lo < hi",
                bad.lo, bad.hi
            )));
        }
        Ok(Self { ranges })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, PdfError> {
        Self::new(pairs.iter().map(|(lo, hi)| Subrange::new(*lo, *hi)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subrange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Controls how a shape is normalized over its fit domain
#[derive(Clone)]
pub struct NormalizationConfig<'a> {
    /// The lower bound of the fit domain
    pub xlo: f64,
    /// The upper bound of the fit domain
    pub xhi: f64,
    /// The number of samples used to integrate the shape over the domain, or over
    /// each subrange
    pub num_int_points: usize,
    /// The detector efficiency, or `None` for uniform efficiency
    pub efficiency: Option<&'a dyn Efficiency>,
    /// When present, replaces the domain normalization with the sum over these
    /// subranges
    pub subranges: Option<SubrangeSet>,
}

impl<'a> NormalizationConfig<'a> {
    pub fn new(xlo: f64, xhi: f64) -> Self {
        Self {
            xlo,
            xhi,
            num_int_points: DEFAULT_NUM_INT_POINTS,
            efficiency: None,
            subranges: None,
        }
    }

    pub fn num_int_points(mut self, num_int_points: usize) -> Self {
        self.num_int_points = num_int_points;
        self
    }

    pub fn efficiency(mut self, efficiency: &'a dyn Efficiency) -> Self {
        self.efficiency = Some(efficiency);
        self
    }

    pub fn subranges(mut self, subranges: SubrangeSet) -> Self {
        self.subranges = Some(subranges);
        self
    }
}

impl Debug for NormalizationConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizationConfig")
            .field("xlo", &self.xlo)
            .field("xhi", &self.xhi)
            .field("num_int_points", &self.num_int_points)
            .field("efficiency", &self.efficiency.is_some())
            .field("subranges", &self.subranges)
            .finish()
    }
}

/// An unnormalized one dimensional shape that can be turned into a density
pub trait DensityShape {
    /// A short name for log messages
    fn name(&self) -> &'static str;

    /// The unnormalized value of the shape at `x`
    fn value(&self, x: f64) -> f64;

    /// Whether the efficiency weights the returned density, or only the
    /// normalization integral.
    fn weights_output(&self) -> bool {
        true
    }

    /// Check that the shape parameters are usable
    fn validate(&self) -> Result<(), PdfError> {
        Ok(())
    }

    fn sample(&self, points: &[f64]) -> Vec<f64> {
        points.iter().map(|x| self.value(*x)).collect()
    }

    /// Integrate the (efficiency weighted) shape over `[lo, hi]`
    fn integrate_over(
        &self,
        lo: f64,
        hi: f64,
        num_int_points: usize,
        efficiency: Option<&dyn Efficiency>,
    ) -> Result<f64, PdfError> {
        let grid = linspace(lo, hi, num_int_points)?;
        let mut values = self.sample(&grid);
        if let Some(efficiency) = efficiency {
            efficiency.apply(&grid, &mut values)?;
        }
        simpson(&grid, &values)
    }

    /// Compute the normalization constant described by `config`
    fn normalization(&self, config: &NormalizationConfig<'_>) -> Result<f64, PdfError> {
        self.validate()?;
        let normalization = match config.subranges.as_ref() {
            Some(subranges) => subranges.iter().try_fold(0.0, |acc, sr| {
                self.integrate_over(sr.lo, sr.hi, config.num_int_points, config.efficiency)
                    .map(|part| acc + part)
            })?,
            None => self.integrate_over(
                config.xlo,
                config.xhi,
                config.num_int_points,
                config.efficiency,
            )?,
        };
        if !(normalization.is_finite() && normalization > 0.0) {
            return Err(PdfError::DegenerateNormalization(normalization));
        }
        debug!(
            "{} normalization over [{}, {}] with {} subranges: {normalization}",
            self.name(),
            config.xlo,
            config.xhi,
            config.subranges.as_ref().map(|s| s.len()).unwrap_or(0),
        );
        Ok(normalization)
    }

    /// Normalize the shape, producing a density that can be evaluated repeatedly
    fn normalized<'a>(
        &self,
        config: &NormalizationConfig<'a>,
    ) -> Result<NormalizedPdf<'a, Self>, PdfError>
    where
        Self: Clone + Sized,
    {
        let normalization = self.normalization(config)?;
        Ok(NormalizedPdf {
            shape: self.clone(),
            normalization,
            efficiency: config.efficiency,
        })
    }
}

/// A shape paired with its normalization constant
#[derive(Clone)]
pub struct NormalizedPdf<'a, S: DensityShape> {
    pub shape: S,
    pub normalization: f64,
    efficiency: Option<&'a dyn Efficiency>,
}

impl<S: DensityShape> NormalizedPdf<'_, S> {
    /// Evaluate the normalized density at each of `x`
    pub fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, PdfError> {
        let mut values = self.shape.sample(x);
        if self.shape.weights_output() {
            if let Some(efficiency) = self.efficiency {
                efficiency.apply(x, &mut values)?;
            }
        }
        values.iter_mut().for_each(|v| *v /= self.normalization);
        Ok(values)
    }
}

impl<S: DensityShape + Debug> Debug for NormalizedPdf<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedPdf")
            .field("shape", &self.shape)
            .field("normalization", &self.normalization)
            .field("efficiency", &self.efficiency.is_some())
            .finish()
    }
}

/// The normalized exponential density `exp(-slope * x)` evaluated at `x`
pub fn exponential(
    x: &[f64],
    slope: f64,
    config: &NormalizationConfig<'_>,
) -> Result<Vec<f64>, PdfError> {
    ExponentialShape::new(slope).normalized(config)?.evaluate(x)
}

/// The normalized density `offset + amplitude * cos(frequency * x + phase)` evaluated at `x`
pub fn cosine(
    x: &[f64],
    frequency: f64,
    phase: f64,
    amplitude: f64,
    offset: f64,
    config: &NormalizationConfig<'_>,
) -> Result<Vec<f64>, PdfError> {
    CosineShape::new(frequency, phase, amplitude, offset)
        .normalized(config)?
        .evaluate(x)
}

/// The normal density truncated and renormalized to the fit domain, evaluated at `x`
pub fn gaussian(
    x: &[f64],
    mean: f64,
    sigma: f64,
    config: &NormalizationConfig<'_>,
) -> Result<Vec<f64>, PdfError> {
    GaussianShape::new(mean, sigma).normalized(config)?.evaluate(x)
}

/// The normalized polynomial `1 + sum(c_i * x^(i + 1))` evaluated at `x`
pub fn polynomial(
    x: &[f64],
    coefficients: &[f64],
    config: &NormalizationConfig<'_>,
) -> Result<Vec<f64>, PdfError> {
    PolynomialShape::new(coefficients.to_vec())
        .normalized(config)?
        .evaluate(x)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::integrate::linspace;

    macro_rules! assert_is_close {
        ($t1:expr, $t2:expr, $tol:expr, $label:literal) => {
            assert!(
                ($t1 - $t2).abs() < $tol,
                "Observed {} {}, expected {}, difference {}",
                $label,
                $t1,
                $t2,
                $t1 - $t2,
            );
        };
    }

    fn efficiency(x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| 1.0 - 0.1 * v).collect()
    }

    #[derive(Debug, Clone, Copy)]
    enum Case {
        Exponential,
        Cosine,
        Gaussian,
        Polynomial,
    }

    impl Case {
        fn domain(&self) -> (f64, f64) {
            match self {
                Case::Gaussian => (-2.0, 4.0),
                _ => (0.0, 5.0),
            }
        }

        fn weights_output(&self) -> bool {
            matches!(self, Case::Cosine | Case::Gaussian)
        }

        fn density(&self, x: &[f64], config: &NormalizationConfig<'_>) -> Vec<f64> {
            match self {
                Case::Exponential => exponential(x, 1.3, config),
                Case::Cosine => cosine(x, 2.0, 0.3, 0.5, 1.0, config),
                Case::Gaussian => gaussian(x, 1.0, 0.8, config),
                Case::Polynomial => polynomial(x, &[0.5, -0.05], config),
            }
            .unwrap()
        }
    }

    fn integrate_on(lo: f64, hi: f64, f: impl Fn(&[f64]) -> Vec<f64>) -> f64 {
        let x = linspace(lo, hi, 1001).unwrap();
        let y = f(&x);
        simpson(&x, &y).unwrap()
    }

    #[rstest::rstest]
    #[test_log::test]
    fn test_unit_integral(
        #[values(Case::Exponential, Case::Cosine, Case::Gaussian, Case::Polynomial)] case: Case,
    ) {
        let (lo, hi) = case.domain();
        let config = NormalizationConfig::new(lo, hi);
        let total = integrate_on(lo, hi, |x| case.density(x, &config));
        assert_is_close!(total, 1.0, 1e-3, "integral");
    }

    #[rstest::rstest]
    #[test_log::test]
    fn test_unit_integral_with_efficiency(
        #[values(Case::Exponential, Case::Cosine, Case::Gaussian, Case::Polynomial)] case: Case,
    ) {
        let eff = efficiency;
        let (lo, hi) = case.domain();
        let config = NormalizationConfig::new(lo, hi).efficiency(&eff);
        let total = integrate_on(lo, hi, |x| {
            let mut y = case.density(x, &config);
            // Exponential and polynomial outputs are not efficiency weighted,
            // only their normalization is.
            if !case.weights_output() {
                eff.apply(x, &mut y).unwrap();
            }
            y
        });
        assert_is_close!(total, 1.0, 1e-3, "integral");
    }

    #[rstest::rstest]
    #[test_log::test]
    fn test_unit_integral_with_covering_subranges(
        #[values(Case::Exponential, Case::Cosine, Case::Gaussian, Case::Polynomial)] case: Case,
    ) {
        let (lo, hi) = case.domain();
        let mid = 0.5 * (lo + hi);
        let config = NormalizationConfig::new(lo, hi)
            .subranges(SubrangeSet::from_pairs(&[(lo, mid), (mid, hi)]).unwrap());
        let total = integrate_on(lo, hi, |x| case.density(x, &config));
        assert_is_close!(total, 1.0, 1e-3, "integral");
    }

    #[test]
    fn test_vetoed_window() {
        let config = NormalizationConfig::new(0.0, 5.0)
            .subranges(SubrangeSet::from_pairs(&[(0.0, 2.0), (3.0, 5.0)]).unwrap());
        let density = |x: &[f64]| exponential(x, 0.7, &config).unwrap();
        let total = integrate_on(0.0, 2.0, density) + integrate_on(3.0, 5.0, density);
        assert_is_close!(total, 1.0, 1e-3, "integral");

        let full = NormalizationConfig::new(0.0, 5.0);
        let unvetoed = exponential(&[1.0], 0.7, &full).unwrap()[0];
        assert!(density(&[1.0])[0] > unvetoed);
    }

    #[test]
    fn test_exponential_ignores_efficiency_on_output() {
        let eff = efficiency;
        let config = NormalizationConfig::new(0.0, 5.0).efficiency(&eff);
        let pdf = ExponentialShape::new(1.0).normalized(&config).unwrap();
        let x = [0.5, 4.5];
        let y = pdf.evaluate(&x).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_is_close!(*yi, (-xi).exp() / pdf.normalization, 1e-12, "density");
        }

        let pdf = CosineShape::new(1.0, 0.0, 0.5, 1.0)
            .normalized(&config)
            .unwrap();
        let y = pdf.evaluate(&x).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            let expected = (1.0 + 0.5 * xi.cos()) * (1.0 - 0.1 * xi) / pdf.normalization;
            assert_is_close!(*yi, expected, 1e-12, "density");
        }
    }

    #[test]
    fn test_degenerate_normalization() {
        let eff = |x: &[f64]| vec![0.0; x.len()];
        let config = NormalizationConfig::new(0.0, 1.0).efficiency(&eff);
        let err = exponential(&[0.5], 1.0, &config).unwrap_err();
        assert!(matches!(err, PdfError::DegenerateNormalization(_)));

        let config = NormalizationConfig::new(0.0, 1.0);
        let err = cosine(&[0.5], 1.0, 0.0, 0.0, -1.0, &config).unwrap_err();
        assert!(matches!(err, PdfError::DegenerateNormalization(_)));
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            SubrangeSet::new(Vec::new()),
            Err(PdfError::ShapeMismatch(_))
        ));
        assert!(matches!(
            SubrangeSet::from_pairs(&[(1.0, 0.0)]),
            Err(PdfError::ShapeMismatch(_))
        ));

        let eff = |_: &[f64]| vec![1.0; 3];
        let config = NormalizationConfig::new(0.0, 1.0).efficiency(&eff);
        assert!(matches!(
            gaussian(&[0.5], 0.0, 1.0, &config),
            Err(PdfError::ShapeMismatch(_))
        ));

        let config = NormalizationConfig::new(0.0, 1.0).num_int_points(1);
        assert!(matches!(
            polynomial(&[0.5], &[1.0], &config),
            Err(PdfError::InvalidDomain(_))
        ));
    }
}
