//! Metrics of a strategy relative to a benchmark of the same shape.
//!
//! Only rows where both the return and the benchmark are observed take part in the
//! moment-based metrics.

use crate::columns;
use crate::compounding::{annualized_return_1d, total_1d};
use crate::error::AnalyticsError;
use crate::stats;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Rows where both series are observed.
fn paired(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>) -> Vec<(f64, f64)> {
    returns
        .iter()
        .zip(benchmark.iter())
        .filter(|(r, b)| !r.is_nan() && !b.is_nan())
        .map(|(&r, &b)| (r, b))
        .collect()
}

/// `cov(r, b) / var(b)` with population moments; `NaN` when the benchmark does not vary.
pub fn beta_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>) -> f64 {
    let pairs = paired(returns, benchmark);
    let mean_r = stats::mean(pairs.iter().map(|p| p.0));
    let mean_b = stats::mean(pairs.iter().map(|p| p.1));
    let covariance = stats::mean(pairs.iter().map(|(r, b)| (r - mean_r) * (b - mean_b)));
    let variance = stats::mean(pairs.iter().map(|(_, b)| (b - mean_b).powi(2)));
    if variance.is_nan() || variance < 1.0e-30 {
        return f64::NAN;
    }
    covariance / variance
}

/// Jensen's alpha, annualized geometrically.
pub fn alpha_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>, ann_factor: f64, risk_free: f64) -> f64 {
    let beta = beta_1d(returns, benchmark);
    let rf = risk_free / ann_factor;
    let pairs = paired(returns, benchmark);
    let excess = stats::mean(pairs.iter().map(|p| p.0 - rf));
    let benchmark_excess = stats::mean(pairs.iter().map(|p| p.1 - rf));
    (1.0 + excess - beta * benchmark_excess).powf(ann_factor) - 1.0
}

/// Mean active return over its sample standard deviation. Not annualized.
pub fn information_ratio_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>) -> f64 {
    let active: Vec<f64> = paired(returns, benchmark).into_iter().map(|(r, b)| r - b).collect();
    stats::mean(active.iter().copied()) / stats::std_of(&active, 1)
}

pub fn capture_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    annualized_return_1d(returns, ann_factor) / annualized_return_1d(benchmark, ann_factor)
}

/// Capture ratio restricted to the rows selected by `keep(benchmark)`.
fn conditional_capture_1d(
    returns: ArrayView1<'_, f64>,
    benchmark: ArrayView1<'_, f64>,
    ann_factor: f64,
    keep: impl Fn(f64) -> bool,
) -> f64 {
    let (r, b): (Vec<f64>, Vec<f64>) = returns
        .iter()
        .zip(benchmark.iter())
        .filter(|(_, b)| keep(**b))
        .map(|(&r, &b)| (r, b))
        .unzip();
    if r.is_empty() {
        return f64::NAN;
    }
    capture_1d(Array1::from(r).view(), Array1::from(b).view(), ann_factor)
}

/// Capture ratio over the periods where the benchmark rose.
pub fn up_capture_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    conditional_capture_1d(returns, benchmark, ann_factor, |b| b > 0.0)
}

/// Capture ratio over the periods where the benchmark fell.
pub fn down_capture_1d(returns: ArrayView1<'_, f64>, benchmark: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    conditional_capture_1d(returns, benchmark, ann_factor, |b| b < 0.0)
}

fn pairwise<F>(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
    metric: &str,
    kernel: F,
) -> Result<Vec<f64>, AnalyticsError>
where
    F: Fn(usize, ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Sync + Send,
{
    columns::require_rows(returns, metric)?;
    columns::require_same_shape(returns, benchmark)?;
    Ok(columns::reduce(returns, |j, col| kernel(j, col, benchmark.column(j))))
}

pub fn beta(returns: ArrayView2<'_, f64>, benchmark: ArrayView2<'_, f64>) -> Result<Vec<f64>, AnalyticsError> {
    pairwise(returns, benchmark, "beta", |_, r, b| beta_1d(r, b))
}

pub fn alpha(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
    ann_factor: f64,
    risk_free: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_params(returns, "risk_free", risk_free)?;
    pairwise(returns, benchmark, "alpha", |j, r, b| alpha_1d(r, b, ann_factor, risk_free[j]))
}

pub fn information_ratio(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
) -> Result<Vec<f64>, AnalyticsError> {
    pairwise(returns, benchmark, "information_ratio", |_, r, b| information_ratio_1d(r, b))
}

pub fn capture(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
    ann_factor: f64,
) -> Result<Vec<f64>, AnalyticsError> {
    pairwise(returns, benchmark, "capture", |_, r, b| capture_1d(r, b, ann_factor))
}

pub fn up_capture(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
    ann_factor: f64,
) -> Result<Vec<f64>, AnalyticsError> {
    pairwise(returns, benchmark, "up_capture", |_, r, b| up_capture_1d(r, b, ann_factor))
}

pub fn down_capture(
    returns: ArrayView2<'_, f64>,
    benchmark: ArrayView2<'_, f64>,
    ann_factor: f64,
) -> Result<Vec<f64>, AnalyticsError> {
    pairwise(returns, benchmark, "down_capture", |_, r, b| down_capture_1d(r, b, ann_factor))
}

/// Total compounded return of each (already broadcast) benchmark column.
pub fn benchmark_total(benchmark: ArrayView2<'_, f64>) -> Vec<f64> {
    columns::reduce(benchmark, |_, col| total_1d(col))
}
