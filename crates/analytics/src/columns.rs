//! Column-parallel drivers. Every kernel treats columns independently, so the
//! per-column work is fanned out with rayon and gathered back in column order.

use crate::error::AnalyticsError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Applies a reducing kernel to each column.
pub(crate) fn reduce<F>(returns: ArrayView2<'_, f64>, kernel: F) -> Vec<f64>
where
    F: Fn(usize, ArrayView1<'_, f64>) -> f64 + Sync + Send,
{
    (0..returns.ncols())
        .into_par_iter()
        .map(|j| kernel(j, returns.column(j)))
        .collect()
}

/// Applies a full-length kernel to each column and reassembles the matrix.
pub(crate) fn map<F>(returns: ArrayView2<'_, f64>, kernel: F) -> Array2<f64>
where
    F: Fn(usize, ArrayView1<'_, f64>) -> Array1<f64> + Sync + Send,
{
    let columns: Vec<Array1<f64>> = (0..returns.ncols())
        .into_par_iter()
        .map(|j| kernel(j, returns.column(j)))
        .collect();

    let mut out = Array2::<f64>::zeros(returns.dim());
    for (j, column) in columns.iter().enumerate() {
        out.column_mut(j).assign(column);
    }
    out
}

/// Fails with `InsufficientData` for a matrix without rows.
pub(crate) fn require_rows(returns: ArrayView2<'_, f64>, metric: &str) -> Result<(), AnalyticsError> {
    if returns.nrows() == 0 {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} requires at least one observation",
            metric
        )));
    }
    Ok(())
}

/// Fails with `ShapeMismatch` unless a per-column parameter has one value per column.
pub(crate) fn require_params(returns: ArrayView2<'_, f64>, name: &str, values: &[f64]) -> Result<(), AnalyticsError> {
    if values.len() != returns.ncols() {
        return Err(AnalyticsError::ShapeMismatch(format!(
            "{} has {} values for {} columns",
            name,
            values.len(),
            returns.ncols()
        )));
    }
    Ok(())
}

/// Fails with `ShapeMismatch` unless the benchmark was already broadcast to the return shape.
pub(crate) fn require_same_shape(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
) -> Result<(), AnalyticsError> {
    if returns.dim() != benchmark.dim() {
        return Err(AnalyticsError::ShapeMismatch(format!(
            "benchmark has shape {:?}, returns have shape {:?}",
            benchmark.dim(),
            returns.dim()
        )));
    }
    Ok(())
}
