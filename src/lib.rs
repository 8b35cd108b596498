//! `bmixing` is a library of normalized probability densities and likelihood
//! machinery for fitting time-dependent B-meson mixing.
//!
//! The building blocks are:
//!
//! - [`integrate`] holds the trapezoid and composite Simpson rules every normalization
//!   is computed with.
//! - [`pdfs`] provides the exponential, cosine, Gaussian and polynomial shapes, normalized
//!   numerically over a domain or a set of vetoed subranges, optionally weighted by an
//!   [`Efficiency`].
//! - [`model`] provides flat-parameter curves and a reduced chi-squared for least squares fits.
//! - [`mixing`] and [`likelihood`] implement the mixing density and the extended maximum
//!   likelihood objective over the four tag charge combinations.
//! - [`convolution`] smears signals with a Gaussian-mixture resolution function.
//!
//! # Usage
//! ```
//! use bmixing::prelude::*;
//! use bmixing::likelihood::{ExtendedLikelihood, LikelihoodDataset};
//!
//! let fit: Vec<f64> = (0..50).map(|i| -4.9 + 0.2 * i as f64).collect();
//! let dataset = LikelihoodDataset::from_samples(
//!     vec![fit.clone(), fit.clone(), fit.clone(), fit.clone()],
//!     vec![fit.clone(), fit.clone(), fit.clone(), fit],
//! )
//! .unwrap();
//! let likelihood = ExtendedLikelihood::new(dataset);
//! let nll = likelihood
//!     .objective(&[0.658, 1.0, 0.507, 0.1, 50.0, 50.0, 50.0, 50.0])
//!     .unwrap();
//! assert!(nll.is_finite());
//! ```
//!
//! ## Features
//! - `nalgebra` (default) performs discrete convolutions with [`nalgebra`](https://docs.rs/nalgebra).
//! - `parallelism` (default) evaluates numerical convolutions across points with `rayon`.
//! - `serde` derives serialization for parameter and configuration types.
pub mod convolution;
pub mod efficiency;
pub mod error;
pub mod integrate;
pub mod likelihood;
pub mod mixing;
pub mod model;
pub mod pdfs;
pub mod prelude;

pub use crate::convolution::{
    convolve_exp_with_gaussians_numerical, convolve_with_gaussians, residuals, GaussianMixture,
    NumericalConvolutionConfig,
};
pub use crate::efficiency::{Efficiency, LinearEfficiency};
pub use crate::error::PdfError;
pub use crate::likelihood::{extended_maximum_likelihood, ExtendedLikelihood, LikelihoodDataset};
pub use crate::mixing::{pdf_bmixing, ChargeSign, MixingParameters};
pub use crate::pdfs::{DensityShape, NormalizationConfig, NormalizedPdf, SubrangeSet};
