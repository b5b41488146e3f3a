//! # Core Types
//!
//! Foundational data structures shared by every crate in the workspace.
//!
//! - `ReturnFrame`: a matrix of periodic fractional returns with its time axis,
//!   column labels and (optionally) a known sampling frequency.
//! - `Frequency`: the spacing between rows, used to annualize statistics.
//! - `Param`: a scalar-or-per-column parameter with a single broadcast rule.
//! - `LabeledFrame` / `Reduced`: results with labels re-attached.

pub mod error;
pub mod frame;
pub mod frequency;
pub mod param;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use frame::{broadcast_benchmark, LabeledFrame, MetricValue, Reduced, ReturnFrame, TimeIndex};
pub use frequency::Frequency;
pub use param::Param;
