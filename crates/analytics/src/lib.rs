//! # Returns Analytics
//!
//! Performance and risk metrics for matrices of periodic returns: compounding and
//! drawdowns, Sharpe/Sortino/Calmar/Omega, VaR and CVaR, benchmark-relative alpha, beta and
//! capture ratios, and the deflated Sharpe ratio for multiple-testing correction.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O. Inputs are a `core_types::ReturnFrame` and a
//!   `configuration::MetricsConfig`; outputs are labelled results.
//! - **Column independence:** every kernel works on one column at a time, and the columns of
//!   a matrix are processed in parallel.
//! - **NaN is missing data:** kernels skip `NaN` observations. Numeric edge cases (zero
//!   variance, no drawdown) produce `NaN` or `inf` values rather than errors.
//!
//! ## Public API
//!
//! - `ReturnsAnalyzer`: the façade exposing every metric over a borrowed `ReturnFrame`.
//! - `PerformanceStats` / `StatsReport`: the summary produced by `ReturnsAnalyzer::stats`.
//! - The kernel modules (`compounding`, `ratios`, `benchmark`, `deflated`) for direct use
//!   on `ndarray` views.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod annualization;
pub mod benchmark;
mod columns;
pub mod compounding;
pub mod deflated;
pub mod engine;
pub mod error;
pub mod ratios;
pub mod report;
pub mod resample;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use annualization::resolve_ann_factor;
pub use engine::ReturnsAnalyzer;
pub use error::AnalyticsError;
pub use report::{PerformanceStats, StatsReport};
