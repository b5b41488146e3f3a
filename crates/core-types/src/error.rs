use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid frequency '{0}': {1}")]
    InvalidFrequency(String, String),

    #[error("Index must be datetime-like for this operation: {0}")]
    TypeConstraint(String),
}

impl CoreError {
    pub(crate) fn shape(what: &str, expected: impl ToString, actual: impl ToString) -> Self {
        CoreError::ShapeMismatch {
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
