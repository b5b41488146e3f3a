use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A metric parameter that is either shared by all columns or given per column.
///
/// Deserializes from either a bare number (`0.02`) or an array (`[0.01, 0.02]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Scalar(f64),
    PerColumn(Vec<f64>),
}

impl Param {
    /// Expands the parameter to exactly one value per column.
    ///
    /// A vector whose length differs from `n_columns` is rejected.
    pub fn broadcast(&self, n_columns: usize) -> Result<Vec<f64>, CoreError> {
        match self {
            Param::Scalar(value) => Ok(vec![*value; n_columns]),
            Param::PerColumn(values) if values.len() == n_columns => Ok(values.clone()),
            Param::PerColumn(values) => Err(CoreError::shape(
                "per-column parameter",
                format!("{} values", n_columns),
                format!("{} values", values.len()),
            )),
        }
    }

    /// Applies `check` to every value, returning the first offending one.
    pub fn find_invalid(&self, check: impl Fn(f64) -> bool) -> Option<f64> {
        match self {
            Param::Scalar(value) => (!check(*value)).then_some(*value),
            Param::PerColumn(values) => values.iter().copied().find(|v| !check(*v)),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Scalar(value)
    }
}

impl From<Vec<f64>> for Param {
    fn from(values: Vec<f64>) -> Self {
        Param::PerColumn(values)
    }
}

impl From<&[f64]> for Param {
    fn from(values: &[f64]) -> Self {
        Param::PerColumn(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_expands_to_every_column() {
        assert_eq!(Param::from(0.5).broadcast(3).unwrap(), vec![0.5, 0.5, 0.5]);
        assert!(Param::from(0.5).broadcast(0).unwrap().is_empty());
    }

    #[test]
    fn vector_must_match_column_count() {
        let param = Param::from(vec![0.1, 0.2]);
        assert_eq!(param.broadcast(2).unwrap(), vec![0.1, 0.2]);
        assert!(matches!(
            param.broadcast(3),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn deserializes_scalar_or_list() {
        let scalar: Param = serde_json::from_str("0.02").unwrap();
        let list: Param = serde_json::from_str("[0.01, 0.03]").unwrap();
        assert_eq!(scalar, Param::Scalar(0.02));
        assert_eq!(list, Param::PerColumn(vec![0.01, 0.03]));
    }

    #[test]
    fn finds_invalid_values() {
        let param = Param::from(vec![0.05, 1.5]);
        assert_eq!(param.find_invalid(|c| c > 0.0 && c < 1.0), Some(1.5));
        assert_eq!(Param::from(0.05).find_invalid(|c| c > 0.0), None);
    }
}
