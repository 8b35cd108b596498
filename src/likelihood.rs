//! The extended maximum likelihood objective for the four charge combinations.
//!
//! Each combination contributes the negative log of the mixing density over its
//! fit sample, normalized by the mean density over a calibration sample, minus a
//! Poisson term for the number of events observed. The minimizer parameter vector
//! is laid out as
//!
//! | index | meaning |
//! |-------|---------|
//! | 0 | `gamma` |
//! | 1 | `|p/q|` |
//! | 2 | `delta_m` |
//! | 3 | `delta_gamma` |
//! | 4..8 | expected event counts, in [`CHARGE_COMBINATIONS`] order |
use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PdfError;
use crate::mixing::{ChargeSign, MixingParameters};

/// The charge combinations `(q1, q2)` in the order their records and event counts
/// appear
pub const CHARGE_COMBINATIONS: [(ChargeSign, ChargeSign); 4] = [
    (ChargeSign::Plus, ChargeSign::Plus),
    (ChargeSign::Minus, ChargeSign::Minus),
    (ChargeSign::Plus, ChargeSign::Minus),
    (ChargeSign::Minus, ChargeSign::Plus),
];

/// The number of physics parameters leading the parameter vector
pub const N_PHYSICS_PARAMS: usize = 4;

/// The total number of parameters the objective reads
pub const N_PARAMS: usize = N_PHYSICS_PARAMS + CHARGE_COMBINATIONS.len();

/// The parameter dependent part of the log Poisson probability of observing `k`
/// events when `mu` are expected. The `ln(k!)` term is omitted.
#[inline]
pub fn poisson_term(mu: f64, k: usize) -> f64 {
    -mu + k as f64 * mu.ln()
}

fn combination_nll(
    combination: usize,
    fit: &[f64],
    calibration: &[f64],
    pars: &MixingParameters,
    expected_events: f64,
) -> Result<f64, PdfError> {
    if calibration.is_empty() {
        return Err(PdfError::domain(format!(
            "the calibration sample for charge combination {combination} is empty"
        )));
    }
    if !(expected_events.is_finite() && expected_events > 0.0) {
        return Err(PdfError::InvalidParameter {
            name: "expected event count",
            value: expected_events,
        });
    }

    let norm_func =
        pars.evaluate(calibration).iter().sum::<f64>() / calibration.len() as f64;
    if !(norm_func.is_finite() && norm_func > 0.0) {
        return Err(PdfError::DegenerateNormalization(norm_func));
    }

    let mut nll = 0.0;
    for (index, value) in pars.evaluate(fit).into_iter().enumerate() {
        if !(value.is_finite() && value > 0.0) {
            return Err(PdfError::NonPositiveDensity {
                combination,
                index,
                value,
            });
        }
        nll -= (value / norm_func).ln();
    }
    let count_term = poisson_term(expected_events, fit.len());

    if log::log_enabled!(log::Level::Trace) {
        trace!(
            "Combination {combination} ({:?}, {:?}): {} events, norm {norm_func}, shape {nll}, count {count_term}",
            pars.q1,
            pars.q2,
            fit.len(),
        );
    }
    Ok(nll - count_term)
}

/// Evaluate the extended negative log likelihood.
///
/// `x` holds the fit sample and `y` the calibration sample of each charge
/// combination, in [`CHARGE_COMBINATIONS`] order.
///
/// # Errors
/// - [`PdfError::ShapeMismatch`] if `p` has fewer than [`N_PARAMS`] entries or `x`
///   and `y` do not hold exactly four samples.
/// - [`PdfError::NonPositiveDensity`] if the density of any fit event is not positive.
/// - [`PdfError::DegenerateNormalization`] if a calibration mean is not positive.
/// - [`PdfError::InvalidDomain`] if a calibration sample is empty.
/// - [`PdfError::InvalidParameter`] if an expected event count is not positive.
pub fn extended_maximum_likelihood<X: AsRef<[f64]>, Y: AsRef<[f64]>>(
    p: &[f64],
    x: &[X],
    y: &[Y],
) -> Result<f64, PdfError> {
    if p.len() < N_PARAMS {
        return Err(PdfError::mismatch(format!(
            "expected {N_PARAMS} parameters, received {}",
            p.len()
        )));
    }
    let n = CHARGE_COMBINATIONS.len();
    if x.len() != n || y.len() != n {
        return Err(PdfError::mismatch(format!(
            "expected {n} fit and calibration samples, received {} and {}",
            x.len(),
            y.len()
        )));
    }

    CHARGE_COMBINATIONS
        .iter()
        .zip(x.iter().zip(y))
        .enumerate()
        .try_fold(0.0, |acc, (i, ((q1, q2), (fit, calibration)))| {
            let pars = MixingParameters::from_slice(p, *q1, *q2)?;
            combination_nll(
                i,
                fit.as_ref(),
                calibration.as_ref(),
                &pars,
                p[N_PHYSICS_PARAMS + i],
            )
            .map(|v| acc + v)
        })
}

/// The decay-time samples for one charge combination
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChargeRecord {
    /// The events being fit
    pub fit: Vec<f64>,
    /// A reference sample used only to estimate the normalization
    pub calibration: Vec<f64>,
}

impl ChargeRecord {
    pub fn new(fit: Vec<f64>, calibration: Vec<f64>) -> Self {
        Self { fit, calibration }
    }
}

/// One [`ChargeRecord`] per charge combination, in [`CHARGE_COMBINATIONS`] order
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LikelihoodDataset {
    records: [ChargeRecord; 4],
}

impl LikelihoodDataset {
    pub fn new(records: [ChargeRecord; 4]) -> Self {
        Self { records }
    }

    /// Pair up parallel fit and calibration samples
    pub fn from_samples(x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Result<Self, PdfError> {
        let n = CHARGE_COMBINATIONS.len();
        if x.len() != n || y.len() != n {
            return Err(PdfError::mismatch(format!(
                "expected {n} fit and calibration samples, received {} and {}",
                x.len(),
                y.len()
            )));
        }
        let mut records: [ChargeRecord; 4] = Default::default();
        for (record, (fit, calibration)) in records.iter_mut().zip(x.into_iter().zip(y)) {
            *record = ChargeRecord::new(fit, calibration);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ChargeRecord; 4] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(ChargeSign, ChargeSign), &ChargeRecord)> {
        let combinations: &'static [(ChargeSign, ChargeSign); 4] = &CHARGE_COMBINATIONS;
        combinations.iter().zip(self.records.iter())
    }

    /// The number of fit events in each combination
    pub fn event_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        counts
            .iter_mut()
            .zip(self.records.iter())
            .for_each(|(c, r)| *c = r.fit.len());
        counts
    }

    pub fn negative_log_likelihood(&self, p: &[f64]) -> Result<f64, PdfError> {
        let fit: Vec<&[f64]> = self.records.iter().map(|r| r.fit.as_slice()).collect();
        let calibration: Vec<&[f64]> = self
            .records
            .iter()
            .map(|r| r.calibration.as_slice())
            .collect();
        extended_maximum_likelihood(p, &fit, &calibration)
    }
}

/// An objective bound to a dataset fixed at construction, for minimizers that only
/// pass the parameter vector.
#[derive(Debug, Clone)]
pub struct ExtendedLikelihood {
    dataset: LikelihoodDataset,
}

impl ExtendedLikelihood {
    pub fn new(dataset: LikelihoodDataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &LikelihoodDataset {
        &self.dataset
    }

    /// Evaluate the extended negative log likelihood at `p`
    pub fn objective(&self, p: &[f64]) -> Result<f64, PdfError> {
        self.dataset.negative_log_likelihood(p)
    }

    /// A closure over the objective with the minimizer calling convention
    pub fn fcn(&self) -> impl Fn(&[f64]) -> Result<f64, PdfError> + '_ {
        move |p| self.objective(p)
    }
}

impl From<LikelihoodDataset> for ExtendedLikelihood {
    fn from(value: LikelihoodDataset) -> Self {
        Self::new(value)
    }
}
