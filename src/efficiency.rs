//! Detector efficiency weighting.
//!
//! An efficiency maps sample points to multiplicative weights. Any pure
//! `Fn(&[f64]) -> Vec<f64>` can be used directly.
use crate::error::PdfError;

/// A pointwise weighting applied to a curve before it is integrated
pub trait Efficiency {
    /// Compute one weight per point in `points`
    fn weights(&self, points: &[f64]) -> Vec<f64>;

    /// Multiply `values` sampled at `points` by their weights in place
    fn apply(&self, points: &[f64], values: &mut [f64]) -> Result<(), PdfError> {
        let weights = self.weights(points);
        if weights.len() != points.len() {
            return Err(PdfError::mismatch(format!(
                "efficiency returned {} weights for {} points",
                weights.len(),
                points.len()
            )));
        }
        values
            .iter_mut()
            .zip(weights)
            .for_each(|(v, w)| *v *= w);
        Ok(())
    }
}

impl<F> Efficiency for F
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn weights(&self, points: &[f64]) -> Vec<f64> {
        self(points)
    }
}

/// A linear turn-on `offset + slope * x`, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearEfficiency {
    pub offset: f64,
    pub slope: f64,
}

impl LinearEfficiency {
    pub fn new(offset: f64, slope: f64) -> Self {
        Self { offset, slope }
    }
}

impl Efficiency for LinearEfficiency {
    fn weights(&self, points: &[f64]) -> Vec<f64> {
        points
            .iter()
            .map(|x| (self.offset + self.slope * x).max(0.0))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_closure_efficiency() {
        let eff = |x: &[f64]| x.iter().map(|v| 0.5 * v).collect::<Vec<_>>();
        let points = [1.0, 2.0, 4.0];
        let mut values = [2.0, 2.0, 2.0];
        eff.apply(&points, &mut values).unwrap();
        assert_eq!(values, [1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_wrong_length() {
        let eff = |_: &[f64]| vec![1.0];
        let mut values = [2.0, 2.0];
        let err = eff.apply(&[0.0, 1.0], &mut values).unwrap_err();
        assert!(matches!(err, PdfError::ShapeMismatch(_)));
    }

    #[test]
    fn test_linear_clamped() {
        let eff = LinearEfficiency::new(-1.0, 1.0);
        assert_eq!(eff.weights(&[0.0, 1.0, 3.0]), vec![0.0, 0.0, 2.0]);
    }
}
