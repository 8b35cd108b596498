#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::DensityShape;

/// Exponential decay shape, with the slope interpreted as negative
///
/// ```math
/// y = \exp(-\lambda x)
/// ```
///
/// The efficiency only enters the normalization integral. The density returned
/// by [`NormalizedPdf::evaluate`](super::NormalizedPdf::evaluate) is not weighted by
/// the efficiency at the evaluation points, so it integrates to one only once the
/// caller applies the efficiency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExponentialShape {
    pub slope: f64,
}

impl ExponentialShape {
    pub fn new(slope: f64) -> Self {
        Self { slope }
    }
}

impl DensityShape for ExponentialShape {
    fn name(&self) -> &'static str {
        "exponential"
    }

    #[inline]
    fn value(&self, x: f64) -> f64 {
        (-self.slope * x).exp()
    }

    fn weights_output(&self) -> bool {
        false
    }
}
