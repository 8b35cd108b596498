use thiserror::Error;

/// All the ways building, normalizing or fitting a density can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PdfError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
    #[error("The normalization constant {0} is not a positive, finite number")]
    DegenerateNormalization(f64),
    #[error(
        "The density {value} of event {index} in charge combination {combination} is not positive"
    )]
    NonPositiveDensity {
        combination: usize,
        index: usize,
        value: f64,
    },
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("The parameter {name} has an invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

impl PdfError {
    pub(crate) fn domain(message: impl Into<String>) -> Self {
        Self::InvalidDomain(message.into())
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Self::ShapeMismatch(message.into())
    }
}
