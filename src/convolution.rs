//! Smear sampled signals with a Gaussian-mixture resolution function.
//!
//! Two independent paths are provided so they can be checked against each other:
//!
//! - [`convolve_with_gaussians`] builds a discrete kernel on the signal's own grid
//!   and performs a discrete convolution.
//! - [`convolve_exp_with_gaussians_numerical`] evaluates the convolution integral of
//!   a two-sided exponential directly with [`simpson`] at every output point.
//!
//! [`residuals`] differences the two.
//!
//! # Example
//!
//! ```rust
//! use bmixing::convolution::{convolve_with_gaussians, GaussianMixture};
//! use bmixing::integrate::linspace;
//!
//! let x: Vec<f64> = linspace(-20.0, 20.0, 1001).unwrap();
//! let y: Vec<f64> = x.iter().map(|v| (-1.547 * v.abs()).exp()).collect();
//! let mixture = GaussianMixture::new(vec![0.0, 0.0], vec![1.0, 5.0], vec![1.0, 1.0]).unwrap();
//! let smeared = convolve_with_gaussians(&x, &y, &mixture).unwrap();
//! assert_eq!(smeared.values.len(), x.len());
//! ```
use cfg_if::cfg_if;
use log::{debug, warn};

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PdfError;
use crate::integrate::{linspace, simpson, SampleGrid};
use crate::pdfs::GaussianShape;

/// The largest relative deviation from the mean spacing a convolution grid may have
const UNIFORM_RTOL: f64 = 1e-6;

/// The smallest share of the resolution function's mass the discrete kernel should
/// capture before a warning is emitted
const MIN_KERNEL_MASS: f64 = 0.99;

/// A resolution function made of weighted Gaussian components.
///
/// The fractions are relative; they are rescaled to sum to one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianMixture {
    pub means: Vec<f64>,
    pub sigmas: Vec<f64>,
    pub fractions: Vec<f64>,
}

impl GaussianMixture {
    pub fn new(means: Vec<f64>, sigmas: Vec<f64>, fractions: Vec<f64>) -> Result<Self, PdfError> {
        let inst = Self {
            means,
            sigmas,
            fractions,
        };
        inst.validate()?;
        Ok(inst)
    }

    /// A single Gaussian component
    pub fn single(mean: f64, sigma: f64) -> Result<Self, PdfError> {
        Self::new(vec![mean], vec![sigma], vec![1.0])
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn validate(&self) -> Result<(), PdfError> {
        if self.means.is_empty() {
            return Err(PdfError::mismatch(
                "a Gaussian mixture needs at least one component",
            ));
        }
        if self.sigmas.len() != self.means.len() || self.fractions.len() != self.means.len() {
            return Err(PdfError::mismatch(format!(
                "mixture has {} means, {} sigmas and {} fractions",
                self.means.len(),
                self.sigmas.len(),
                self.fractions.len()
            )));
        }
        if let Some(sigma) = self.sigmas.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(PdfError::InvalidParameter {
                name: "sigma",
                value: *sigma,
            });
        }
        if let Some(fraction) = self
            .fractions
            .iter()
            .find(|f| !(f.is_finite() && **f >= 0.0))
        {
            return Err(PdfError::InvalidParameter {
                name: "fraction",
                value: *fraction,
            });
        }
        let total = self.fraction_total();
        if total <= 0.0 {
            return Err(PdfError::InvalidParameter {
                name: "fraction total",
                value: total,
            });
        }
        Ok(())
    }

    fn fraction_total(&self) -> f64 {
        self.fractions.iter().sum()
    }

    /// Each component and its share of the total fraction
    pub fn components(&self) -> impl Iterator<Item = (GaussianShape, f64)> + '_ {
        let total = self.fraction_total();
        self.means
            .iter()
            .zip(self.sigmas.iter())
            .zip(self.fractions.iter())
            .map(move |((mean, sigma), fraction)| {
                (GaussianShape::new(*mean, *sigma), fraction / total)
            })
    }

    /// The unit area mixture density at `x`
    pub fn density(&self, x: f64) -> f64 {
        self.components()
            .map(|(component, weight)| weight * component.density(x))
            .sum()
    }

    /// The mixture's probability mass in `[lo, hi]`
    pub fn mass(&self, lo: f64, hi: f64) -> f64 {
        self.components()
            .map(|(component, weight)| weight * component.analytic_mass(lo, hi))
            .sum()
    }
}

/// The result of a discrete convolution
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Convolution {
    /// The smeared signal, aligned with the input grid
    pub values: Vec<f64>,
    /// The unit area resolution kernel, sampled at offsets centered on the grid
    pub kernel: Vec<f64>,
}

#[cfg(any(not(feature = "nalgebra"), test))]
pub(crate) fn convolve_full_direct(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let mut result = vec![0.0; signal.len() + kernel.len() - 1];
    for (i, s) in signal.iter().enumerate() {
        for (j, k) in kernel.iter().enumerate() {
            result[i + j] += s * k;
        }
    }
    result
}

fn convolve_full(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    cfg_if! {
        if #[cfg(feature = "nalgebra")] {
            let signal = nalgebra::DVector::from_column_slice(signal);
            let kernel = nalgebra::DVector::from_column_slice(kernel);
            signal.convolve_full(kernel).data.into()
        } else {
            convolve_full_direct(signal, kernel)
        }
    }
}

fn uniform_grid(x: &[f64]) -> Result<SampleGrid, PdfError> {
    let grid = SampleGrid::new(x.to_vec())?;
    if !grid.is_uniform(UNIFORM_RTOL) {
        return Err(PdfError::domain(
            "discrete convolution requires evenly spaced points",
        ));
    }
    Ok(grid)
}

/// Convolve the signal `y` sampled on `x` with the resolution function `mixture`.
///
/// `x` must be evenly spaced. The kernel is sampled at offsets `(j - c) * dx` with
/// `c = floor((n - 1) / 2)`, so every offset is a whole multiple of `dx`. They coincide
/// with `x` when the grid is symmetric about zero and has an odd number of points. The
/// kernel is rescaled so that `sum(kernel) * dx == 1`. The output is aligned with `x`.
pub fn convolve_with_gaussians(
    x: &[f64],
    y: &[f64],
    mixture: &GaussianMixture,
) -> Result<Convolution, PdfError> {
    mixture.validate()?;
    if x.len() != y.len() {
        return Err(PdfError::mismatch(format!(
            "{} grid points but {} signal values",
            x.len(),
            y.len()
        )));
    }
    let grid = uniform_grid(x)?;
    let n = grid.len();
    let dx = grid.spacing();
    let center = (n - 1) / 2;

    let mut kernel: Vec<f64> = (0..n)
        .map(|j| mixture.density((j as f64 - center as f64) * dx))
        .collect();
    let area = kernel.iter().sum::<f64>() * dx;
    if !(area.is_finite() && area > 0.0) {
        return Err(PdfError::DegenerateNormalization(area));
    }
    let captured = mixture.mass(
        -(center as f64 + 0.5) * dx,
        ((n - 1 - center) as f64 + 0.5) * dx,
    );
    if captured < MIN_KERNEL_MASS {
        warn!(
            "The convolution kernel spans only {:.2}% of the resolution function, widen the grid",
            captured * 100.0
        );
    }
    debug!("Convolution kernel area {area} over {n} points, spacing {dx}");
    kernel.iter_mut().for_each(|k| *k /= area);

    let full = convolve_full(y, &kernel);
    let values = full[center..center + n].iter().map(|v| v * dx).collect();
    Ok(Convolution { values, kernel })
}

/// Controls the direct numerical convolution
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumericalConvolutionConfig {
    /// The integral at `x` runs over `[x - half_width, x + half_width]`
    pub half_width: f64,
    /// The number of samples in each integral
    pub num_points: usize,
}

impl Default for NumericalConvolutionConfig {
    fn default() -> Self {
        Self {
            half_width: 4.0,
            num_points: 500,
        }
    }
}

impl NumericalConvolutionConfig {
    pub fn new(half_width: f64, num_points: usize) -> Self {
        Self {
            half_width,
            num_points,
        }
    }

    pub fn half_width(mut self, half_width: f64) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }
}

/// Directly integrate the convolution of `exp(-tau * |t|)` with `mixture` at each of `x`.
///
/// The mixture is the unit area density from [`GaussianMixture::density`]; the exponential
/// is not normalized.
pub fn convolve_exp_with_gaussians_numerical(
    x: &[f64],
    tau: f64,
    mixture: &GaussianMixture,
    config: &NumericalConvolutionConfig,
) -> Result<Vec<f64>, PdfError> {
    mixture.validate()?;
    if !tau.is_finite() {
        return Err(PdfError::InvalidParameter {
            name: "tau",
            value: tau,
        });
    }
    if !(config.half_width.is_finite() && config.half_width > 0.0) {
        return Err(PdfError::InvalidParameter {
            name: "half_width",
            value: config.half_width,
        });
    }

    let at_point = |xi: f64| -> Result<f64, PdfError> {
        let t = linspace(xi - config.half_width, xi + config.half_width, config.num_points)?;
        let integrand: Vec<f64> = t
            .iter()
            .map(|t| (-tau * t.abs()).exp() * mixture.density(xi - t))
            .collect();
        simpson(&t, &integrand)
    };

    cfg_if! {
        if #[cfg(feature = "parallelism")] {
            x.par_iter().map(|xi| at_point(*xi)).collect()
        } else {
            x.iter().map(|xi| at_point(*xi)).collect()
        }
    }
}

/// The absolute and fractional difference between two curves
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Residuals {
    /// `reference - other`
    pub difference: Vec<f64>,
    /// `(reference - other) / reference`; not finite where `reference` is zero
    pub fractional: Vec<f64>,
}

impl Residuals {
    /// The largest absolute fractional residual among the points `keep` selects
    pub fn max_fractional_where(&self, keep: impl Fn(usize) -> bool) -> f64 {
        self.fractional
            .iter()
            .enumerate()
            .filter(|(i, _)| keep(*i))
            .fold(0.0, |acc: f64, (_, r)| acc.max(r.abs()))
    }
}

pub fn residuals(reference: &[f64], other: &[f64]) -> Result<Residuals, PdfError> {
    if reference.len() != other.len() {
        return Err(PdfError::mismatch(format!(
            "cannot difference curves of length {} and {}",
            reference.len(),
            other.len()
        )));
    }
    let difference: Vec<f64> = reference.iter().zip(other).map(|(a, b)| a - b).collect();
    let fractional = difference
        .iter()
        .zip(reference)
        .map(|(d, r)| d / r)
        .collect();
    Ok(Residuals {
        difference,
        fractional,
    })
}
