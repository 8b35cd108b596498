//! The time-dependent B-meson mixing density.
//!
//! For a pair of decays with flavor tags of charge `q1` and `q2`, the decay-time
//! difference is distributed as
//!
//! ```math
//! N(\Delta t) = \frac{1}{4}e^{-\gamma|\Delta t|}\left[A\cosh\frac{\Delta\Gamma\Delta t}{2}
//!     + B\cos(\Delta M \Delta t) + C\sinh\frac{\Delta\Gamma\Delta t}{2} + D\sin(\Delta M \Delta t)\right]
//! ```
//!
//! The density is not normalized here; the likelihood normalizes it against a
//! calibration sample.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// The charge of a flavor tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChargeSign {
    Plus,
    Minus,
}

impl ChargeSign {
    pub const fn value(&self) -> f64 {
        match self {
            ChargeSign::Plus => 1.0,
            ChargeSign::Minus => -1.0,
        }
    }

    pub const fn flip(&self) -> Self {
        match self {
            ChargeSign::Plus => ChargeSign::Minus,
            ChargeSign::Minus => ChargeSign::Plus,
        }
    }
}

/// The coefficients of the cosh, cos, sinh and sin terms
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MixingCoefficients {
    pub a: f64,
    pub b: f64,
    /// Always zero, kept so the four-term structure stays explicit
    pub c: f64,
    /// Always zero, kept so the four-term structure stays explicit
    pub d: f64,
}

/// Physics parameters for one charge combination
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MixingParameters {
    /// The decay width. Negative values make the density diverge and are not rejected.
    pub gamma: f64,
    /// `|p/q|`, the CP-violation ratio
    pub p_over_q: f64,
    /// The mass difference
    pub delta_m: f64,
    /// The width difference
    pub delta_gamma: f64,
    pub q1: ChargeSign,
    pub q2: ChargeSign,
}

impl MixingParameters {
    pub fn new(
        gamma: f64,
        p_over_q: f64,
        delta_m: f64,
        delta_gamma: f64,
        q1: ChargeSign,
        q2: ChargeSign,
    ) -> Self {
        Self {
            gamma,
            p_over_q,
            delta_m,
            delta_gamma,
            q1,
            q2,
        }
    }

    /// Read `(gamma, |p/q|, delta_m, delta_gamma)` from the start of a minimizer's
    /// parameter vector
    pub fn from_slice(p: &[f64], q1: ChargeSign, q2: ChargeSign) -> Result<Self, PdfError> {
        match p {
            [gamma, p_over_q, delta_m, delta_gamma, ..] => Ok(Self::new(
                *gamma,
                *p_over_q,
                *delta_m,
                *delta_gamma,
                q1,
                q2,
            )),
            _ => Err(PdfError::mismatch(format!(
                "mixing requires 4 physics parameters, received {}",
                p.len()
            ))),
        }
    }

    /// `q1 * q2`, `+1` for same-sign and `-1` for opposite-sign tags
    pub fn qq(&self) -> f64 {
        self.q1.value() * self.q2.value()
    }

    pub fn coefficients(&self) -> MixingCoefficients {
        let qq = self.qq();
        let cp_term = self.p_over_q.powf(2.0 * self.q1.value());
        MixingCoefficients {
            a: 0.5 * (1.0 + qq) * cp_term + 0.5 * (1.0 - qq),
            b: -0.5 * (1.0 + qq) * cp_term + 0.5 * (1.0 - qq),
            c: 0.0,
            d: 0.0,
        }
    }

    #[inline]
    fn density_with(&self, coefs: &MixingCoefficients, deltat: f64) -> f64 {
        let half_width_term = self.delta_gamma * deltat / 2.0;
        let mass_term = self.delta_m * deltat;
        0.25 * (-self.gamma * deltat.abs()).exp()
            * (coefs.a * half_width_term.cosh()
                + coefs.b * mass_term.cos()
                + coefs.c * half_width_term.sinh()
                + coefs.d * mass_term.sin())
    }

    /// The unnormalized density at a single decay-time difference
    pub fn density(&self, deltat: f64) -> f64 {
        self.density_with(&self.coefficients(), deltat)
    }

    /// The unnormalized density at each of `deltat`
    pub fn evaluate(&self, deltat: &[f64]) -> Vec<f64> {
        let coefs = self.coefficients();
        deltat
            .iter()
            .map(|t| self.density_with(&coefs, *t))
            .collect()
    }
}

/// Evaluate the mixing density at each of `deltat`
pub fn pdf_bmixing(deltat: &[f64], pars: &MixingParameters) -> Vec<f64> {
    pars.evaluate(deltat)
}

#[cfg(test)]
mod test {
    use super::*;
    use super::ChargeSign::{Minus, Plus};

    fn params(q1: ChargeSign, q2: ChargeSign) -> MixingParameters {
        MixingParameters::new(0.658, 1.2, 0.507, 0.1, q1, q2)
    }

    #[rstest::rstest]
    #[case(Plus, Plus)]
    #[case(Minus, Minus)]
    fn test_same_sign_coefficients(#[case] q1: ChargeSign, #[case] q2: ChargeSign) {
        let pars = params(q1, q2);
        let coefs = pars.coefficients();
        let expected = 1.2f64.powf(2.0 * q1.value());
        assert!((coefs.a - expected).abs() < 1e-12);
        assert!((coefs.b + expected).abs() < 1e-12);
        assert_eq!((coefs.c, coefs.d), (0.0, 0.0));

        for t in [-3.0, -0.5, 0.0, 1.5, 4.0] {
            let closed = 0.25
                * (-0.658 * f64::abs(t)).exp()
                * expected
                * ((0.1 * t / 2.0).cosh() - (0.507 * t).cos());
            assert!((pars.density(t) - closed).abs() < 1e-12);
        }
    }

    #[rstest::rstest]
    #[case(Plus, Minus)]
    #[case(Minus, Plus)]
    fn test_opposite_sign_coefficients(#[case] q1: ChargeSign, #[case] q2: ChargeSign) {
        let pars = params(q1, q2);
        let coefs = pars.coefficients();
        assert_eq!((coefs.a, coefs.b), (1.0, 1.0));

        for t in [-3.0, -0.5, 0.0, 1.5, 4.0] {
            let closed = 0.25
                * (-0.658 * f64::abs(t)).exp()
                * ((0.1 * t / 2.0).cosh() + (0.507 * t).cos());
            assert!((pars.density(t) - closed).abs() < 1e-12);
        }
    }

    #[test]
    fn test_evaluate_shape_and_symmetry() {
        let pars = params(Plus, Minus);
        let t = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let y = pdf_bmixing(&t, &pars);
        assert_eq!(y.len(), t.len());
        assert!((y[0] - y[4]).abs() < 1e-15);
        assert_eq!(y[2], 0.5);
    }

    #[test]
    fn test_flip() {
        assert_eq!(Plus.flip(), Minus);
        assert_eq!(Minus.flip().flip(), Minus);
        assert_eq!(Plus.flip().value(), -Plus.value());
    }

    #[test]
    fn test_from_slice() {
        let p = [0.6, 1.0, 0.5, 0.0, 100.0];
        let pars = MixingParameters::from_slice(&p, Minus, Minus).unwrap();
        assert_eq!(pars.delta_m, 0.5);
        assert_eq!(pars.qq(), 1.0);
        assert!(MixingParameters::from_slice(&p[..3], Plus, Plus).is_err());
    }
}
