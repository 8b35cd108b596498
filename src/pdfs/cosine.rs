#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::DensityShape;

/// An offset cosine oscillation
///
/// ```math
/// y = c + a\cos(\omega x + \phi)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CosineShape {
    pub frequency: f64,
    pub phase: f64,
    pub amplitude: f64,
    pub offset: f64,
}

impl CosineShape {
    pub fn new(frequency: f64, phase: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            frequency,
            phase,
            amplitude,
            offset,
        }
    }
}

impl DensityShape for CosineShape {
    fn name(&self) -> &'static str {
        "cosine"
    }

    #[inline]
    fn value(&self, x: f64) -> f64 {
        self.offset + self.amplitude * (self.frequency * x + self.phase).cos()
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use super::*;
    use crate::pdfs::NormalizationConfig;

    #[test]
    fn test_full_periods_integrate_offset() {
        let shape = CosineShape::new(2.0, 0.4, 0.7, 1.5);
        let config = NormalizationConfig::new(0.0, 2.0 * PI).num_int_points(501);
        let norm = shape.normalization(&config).unwrap();
        assert!((norm - 1.5 * 2.0 * PI).abs() < 1e-6, "{norm}");
    }
}
