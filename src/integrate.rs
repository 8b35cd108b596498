//! Sample grids and fixed-grid quadrature.
//!
//! Every normalization in this crate is computed by sampling a curve on a
//! [`SampleGrid`] and integrating it with [`simpson`]. The composite rule
//! handles unequally spaced points, and an even number of samples is treated by
//! averaging the two ways of closing the final odd interval with a trapezoid.
use std::ops::Deref;

use num_traits::{Float, ToPrimitive};

use crate::error::PdfError;

/// Build `n` evenly spaced points from `start` to `end`, inclusive of both ends.
pub fn linspace<T: Float + ToPrimitive>(start: T, end: T, n: usize) -> Result<Vec<T>, PdfError> {
    if n < 2 {
        return Err(PdfError::domain(format!(
            "a grid needs at least 2 points, received {n}"
        )));
    }
    if !(start.is_finite() && end.is_finite()) || start >= end {
        return Err(PdfError::domain(format!(
            "grid bounds must be finite and increasing, received ({}, {})",
            start.to_f64().unwrap_or(f64::NAN),
            end.to_f64().unwrap_or(f64::NAN)
        )));
    }
    let last = T::from(n - 1).unwrap();
    let step = (end - start) / last;
    let mut result = Vec::with_capacity(n);
    for i in 0..n - 1 {
        result.push(start + T::from(i).unwrap() * step);
    }
    result.push(end);
    Ok(result)
}

/// Check if the values in `it` are strictly ascending
pub fn is_strictly_increasing<F: Float>(it: &[F]) -> bool {
    it.windows(2).all(|w| w[0] < w[1])
}

fn check_inputs<F: Float>(x: &[F], y: &[F]) -> Result<(), PdfError> {
    if x.len() < 2 {
        return Err(PdfError::domain(format!(
            "integration requires at least 2 points, received {}",
            x.len()
        )));
    }
    if x.len() != y.len() {
        return Err(PdfError::domain(format!(
            "the grid has {} points but {} values were provided",
            x.len(),
            y.len()
        )));
    }
    if !is_strictly_increasing(x) {
        return Err(PdfError::domain("the integration grid is not strictly increasing"));
    }
    Ok(())
}

/// Trapezoid rule integral of `y` over `x`
pub fn trapz<F: Float>(x: &[F], y: &[F]) -> Result<F, PdfError> {
    check_inputs(x, y)?;
    Ok(trapz_unchecked(x, y))
}

fn trapz_unchecked<F: Float>(x: &[F], y: &[F]) -> F {
    let half = F::from(0.5).unwrap();
    x.windows(2)
        .zip(y.windows(2))
        .fold(F::zero(), |acc, (xs, ys)| {
            acc + (xs[1] - xs[0]) * half * (ys[0] + ys[1])
        })
}

/// Composite Simpson's rule over an odd number of points, allowing each pair of
/// intervals to have different widths.
fn simpson_odd<F: Float>(x: &[F], y: &[F]) -> F {
    let two = F::from(2.0).unwrap();
    let six = F::from(6.0).unwrap();
    let mut total = F::zero();
    let mut i = 0;
    while i + 2 < x.len() {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let hprod = h0 * h1;
        let h0_div_h1 = h0 / h1;
        total = total
            + hsum / six
                * (y[i] * (two - h0_div_h1.recip())
                    + y[i + 1] * (hsum * hsum / hprod)
                    + y[i + 2] * (two - h0_div_h1));
        i += 2;
    }
    total
}

/// Integrate `y` sampled at `x` using the composite Simpson's rule.
///
/// With an even number of samples there is one interval left over. It is closed with a
/// trapezoid once at the end and once at the start of the grid, and the two estimates are
/// averaged. Two samples degrade to a single trapezoid.
///
/// # Errors
/// [`PdfError::InvalidDomain`] if fewer than two points are given, the lengths differ, or
/// `x` is not strictly increasing.
pub fn simpson<F: Float>(x: &[F], y: &[F]) -> Result<F, PdfError> {
    check_inputs(x, y)?;
    let n = x.len();
    if n == 2 {
        return Ok(trapz_unchecked(x, y));
    }
    if n % 2 == 1 {
        return Ok(simpson_odd(x, y));
    }
    let half = F::from(0.5).unwrap();
    let close_last = simpson_odd(&x[..n - 1], &y[..n - 1])
        + half * (x[n - 1] - x[n - 2]) * (y[n - 1] + y[n - 2]);
    let close_first = half * (x[1] - x[0]) * (y[0] + y[1]) + simpson_odd(&x[1..], &y[1..]);
    Ok((close_last + close_first) * half)
}

/// An ordered, strictly increasing set of sample points with at least two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    points: Vec<f64>,
}

impl SampleGrid {
    pub fn new(points: Vec<f64>) -> Result<Self, PdfError> {
        if points.len() < 2 {
            return Err(PdfError::domain(format!(
                "a grid needs at least 2 points, received {}",
                points.len()
            )));
        }
        if !is_strictly_increasing(&points) {
            return Err(PdfError::domain("grid points must be strictly increasing"));
        }
        Ok(Self { points })
    }

    /// An evenly spaced grid over `[start, end]`
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self, PdfError> {
        Ok(Self {
            points: linspace(start, end, n)?,
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.points
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// The mean spacing between consecutive points
    pub fn spacing(&self) -> f64 {
        (self.end() - self.start()) / (self.points.len() - 1) as f64
    }

    /// Whether every interval is within `rtol` of the mean spacing
    pub fn is_uniform(&self, rtol: f64) -> bool {
        let dx = self.spacing();
        self.points
            .windows(2)
            .all(|w| ((w[1] - w[0]) - dx).abs() <= rtol * dx)
    }

    /// Integrate `values` sampled on this grid
    pub fn integrate(&self, values: &[f64]) -> Result<f64, PdfError> {
        simpson(&self.points, values)
    }
}

impl Deref for SampleGrid {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl TryFrom<Vec<f64>> for SampleGrid {
    type Error = PdfError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
