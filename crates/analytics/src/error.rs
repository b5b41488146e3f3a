use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Couldn't resolve the sampling frequency: {0}")]
    Frequency(String),

    #[error("Index type constraint violated: {0}")]
    TypeConstraint(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Failed to construct the normal distribution: {0}")]
    Distribution(String),
}

impl From<CoreError> for AnalyticsError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::ShapeMismatch { .. } => AnalyticsError::ShapeMismatch(error.to_string()),
            CoreError::InvalidFrequency(..) => AnalyticsError::Frequency(error.to_string()),
            CoreError::TypeConstraint(_) => AnalyticsError::TypeConstraint(error.to_string()),
        }
    }
}
