//! Parametric curves over a flat parameter vector, for use with a minimizer.
//!
//! A minimizer only knows about `&[f64]`, so each model reads its parameters
//! positionally. [`Addition`] combines two models by handing each a fixed slice of
//! the shared parameter vector.
use crate::error::PdfError;

/// A curve `f(p, x)` parameterized by a flat parameter vector
pub trait ParametricModel {
    /// The minimum number of parameters [`ParametricModel::value`] reads
    fn n_params(&self) -> usize;

    /// Evaluate the model at `x`. `p` must already have passed
    /// [`ParametricModel::check_params`].
    ///
    /// # Panics
    /// Implementations index `p` directly and panic when it holds fewer than
    /// [`ParametricModel::n_params`] entries. Use [`ParametricModel::evaluate`] to get
    /// a [`PdfError::ShapeMismatch`] instead.
    fn value(&self, p: &[f64], x: f64) -> f64;

    fn check_params(&self, p: &[f64]) -> Result<(), PdfError> {
        if p.len() < self.n_params() {
            return Err(PdfError::mismatch(format!(
                "expected at least {} parameters, received {}",
                self.n_params(),
                p.len()
            )));
        }
        Ok(())
    }

    /// Evaluate the model at each of `x`
    fn evaluate(&self, p: &[f64], x: &[f64]) -> Result<Vec<f64>, PdfError> {
        self.check_params(p)?;
        Ok(x.iter().map(|x| self.value(p, *x)).collect())
    }
}

/// `p[0] + p[1] * x`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Linear;

impl ParametricModel for Linear {
    fn n_params(&self) -> usize {
        2
    }

    #[inline]
    fn value(&self, p: &[f64], x: f64) -> f64 {
        p[0] + p[1] * x
    }
}

/// A Gaussian peak whose height is `p[0] / p[2]`
///
/// ```math
/// y = \frac{p_0}{p_2}\exp\left({\frac{-(x - p_1)^2}{2p_2^2}}\right)
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GaussianPeak;

impl ParametricModel for GaussianPeak {
    fn n_params(&self) -> usize {
        3
    }

    #[inline]
    fn value(&self, p: &[f64], x: f64) -> f64 {
        (p[0] / p[2]) * (-(x - p[1]).powi(2) / (2.0 * p[2] * p[2])).exp()
    }
}

/// The sum of two models.
///
/// `p[0]` and `p[1]` set the weights `p0²/√(p0² + p1²)` and `p1²/√(p0² + p1²)`.
/// These do not sum to one. The first model reads `p[2..4]`, the second `p[4..7]`,
/// regardless of how many parameters each actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addition<A: ParametricModel, B: ParametricModel> {
    pub first: A,
    pub second: B,
}

const FIRST_SLICE: std::ops::Range<usize> = 2..4;
const SECOND_SLICE: std::ops::Range<usize> = 4..7;

impl<A: ParametricModel, B: ParametricModel> Addition<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The weights applied to the first and second model
    ///
    /// # Panics
    /// If `p` has fewer than two entries.
    pub fn weights(&self, p: &[f64]) -> (f64, f64) {
        let norm = (p[0] * p[0] + p[1] * p[1]).sqrt();
        (p[0].powi(2) / norm, p[1].powi(2) / norm)
    }
}

impl<A: ParametricModel, B: ParametricModel> ParametricModel for Addition<A, B> {
    fn n_params(&self) -> usize {
        SECOND_SLICE.end
    }

    fn check_params(&self, p: &[f64]) -> Result<(), PdfError> {
        if p.len() < self.n_params() {
            return Err(PdfError::mismatch(format!(
                "expected at least {} parameters, received {}",
                self.n_params(),
                p.len()
            )));
        }
        self.first.check_params(&p[FIRST_SLICE])?;
        self.second.check_params(&p[SECOND_SLICE])?;
        if p[0] == 0.0 && p[1] == 0.0 {
            return Err(PdfError::InvalidParameter {
                name: "p[0]^2 + p[1]^2",
                value: 0.0,
            });
        }
        Ok(())
    }

    fn value(&self, p: &[f64], x: f64) -> f64 {
        let (w0, w1) = self.weights(p);
        w0 * self.first.value(&p[FIRST_SLICE], x) + w1 * self.second.value(&p[SECOND_SLICE], x)
    }
}

pub fn pdf_linear() -> Linear {
    Linear
}

pub fn pdf_gaussian() -> GaussianPeak {
    GaussianPeak
}

pub fn pdf_addition<A: ParametricModel, B: ParametricModel>(first: A, second: B) -> Addition<A, B> {
    Addition::new(first, second)
}

/// Residuals of a model against observations, the quantity a least squares
/// minimizer drives to zero
#[derive(Debug, Clone, Copy)]
pub struct Chi2Function<M: ParametricModel> {
    pub model: M,
}

impl<M: ParametricModel> Chi2Function<M> {
    /// `model(p, x) - y`
    pub fn residuals(&self, p: &[f64], x: &[f64], y: &[f64]) -> Result<Vec<f64>, PdfError> {
        if x.len() != y.len() {
            return Err(PdfError::mismatch(format!(
                "{} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        let mut predicted = self.model.evaluate(p, x)?;
        predicted.iter_mut().zip(y).for_each(|(f, y)| *f -= y);
        Ok(predicted)
    }
}

pub fn chi2_function<M: ParametricModel>(model: M) -> Chi2Function<M> {
    Chi2Function { model }
}

/// The chi-squared of `model` against `y ± dy`, divided by `len(x) - len(params)`
pub fn red_chi_sq<M: ParametricModel>(
    model: &M,
    x: &[f64],
    y: &[f64],
    dy: &[f64],
    params: &[f64],
) -> Result<f64, PdfError> {
    if x.len() != y.len() || x.len() != dy.len() {
        return Err(PdfError::mismatch(format!(
            "x, y and dy have lengths {}, {} and {}",
            x.len(),
            y.len(),
            dy.len()
        )));
    }
    if x.len() <= params.len() {
        return Err(PdfError::domain(format!(
            "{} points leave no degrees of freedom for {} parameters",
            x.len(),
            params.len()
        )));
    }
    let predicted = model.evaluate(params, x)?;
    let chisq: f64 = y
        .iter()
        .zip(predicted)
        .zip(dy)
        .map(|((y, f), dy)| ((y - f) / dy).powi(2))
        .sum();
    Ok(chisq / (x.len() - params.len()) as f64)
}
