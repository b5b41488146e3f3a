//! Compounded growth, drawdown and their scalar summaries.
//!
//! Each `*_1d` function works on one column; the matrix versions fan the same kernel out
//! over every column.

use crate::columns;
use crate::error::AnalyticsError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Cumulative returns of one column.
///
/// With `start_value == 0` this is the cumulative return `Π(1 + r) - 1`; otherwise it is the
/// growth of `start_value` units, `start_value * Π(1 + r)`. `NaN` rows stay `NaN` and do not
/// interrupt the compounding.
pub fn cumulative_1d(returns: ArrayView1<'_, f64>, start_value: f64) -> Array1<f64> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|&r| {
            if r.is_nan() {
                return f64::NAN;
            }
            growth *= 1.0 + r;
            if start_value == 0.0 { growth - 1.0 } else { growth * start_value }
        })
        .collect()
}

/// Final growth multiple `Π(1 + r)` over the non-`NaN` rows.
fn growth_1d(returns: ArrayView1<'_, f64>) -> f64 {
    returns
        .iter()
        .filter(|r| !r.is_nan())
        .fold(1.0, |acc, r| acc * (1.0 + r))
}

/// Total compounded return of one column, folded directly without building the curve.
pub fn total_1d(returns: ArrayView1<'_, f64>) -> f64 {
    growth_1d(returns) - 1.0
}

/// Relative decline of the growth curve from its running peak. Every value is `<= 0`.
pub fn drawdown_1d(returns: ArrayView1<'_, f64>) -> Array1<f64> {
    let curve = cumulative_1d(returns, 1.0);
    let mut peak = f64::NEG_INFINITY;
    curve
        .iter()
        .map(|&value| {
            if value.is_nan() {
                return f64::NAN;
            }
            peak = peak.max(value);
            value / peak - 1.0
        })
        .collect()
}

/// The most negative drawdown; 0 for a series that never falls below its peak.
pub fn max_drawdown_1d(returns: ArrayView1<'_, f64>) -> f64 {
    drawdown_1d(returns)
        .iter()
        .copied()
        .filter(|d| !d.is_nan())
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Compound annual growth rate: `Π(1 + r)^(ann_factor / n) - 1` with `n` the row count.
pub fn annualized_return_1d(returns: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    let n = returns.len();
    if n == 0 {
        return f64::NAN;
    }
    growth_1d(returns).powf(ann_factor / n as f64) - 1.0
}

/// Annualized return over the absolute maximum drawdown.
///
/// A series without any drawdown divides by zero and yields `inf` (or `NaN` for a zero
/// annualized return); that is a property of the data, not an error.
pub fn calmar_ratio_1d(returns: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    annualized_return_1d(returns, ann_factor) / max_drawdown_1d(returns).abs()
}

pub fn cumulative(returns: ArrayView2<'_, f64>, start_value: &[f64]) -> Result<Array2<f64>, AnalyticsError> {
    columns::require_params(returns, "start_value", start_value)?;
    Ok(columns::map(returns, |j, col| cumulative_1d(col, start_value[j])))
}

pub fn total(returns: ArrayView2<'_, f64>) -> Vec<f64> {
    columns::reduce(returns, |_, col| total_1d(col))
}

pub fn drawdown(returns: ArrayView2<'_, f64>) -> Array2<f64> {
    columns::map(returns, |_, col| drawdown_1d(col))
}

pub fn max_drawdown(returns: ArrayView2<'_, f64>) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "max_drawdown")?;
    Ok(columns::reduce(returns, |_, col| max_drawdown_1d(col)))
}

pub fn annualized_return(returns: ArrayView2<'_, f64>, ann_factor: f64) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "annualized_return")?;
    Ok(columns::reduce(returns, |_, col| annualized_return_1d(col, ann_factor)))
}

pub fn calmar_ratio(returns: ArrayView2<'_, f64>, ann_factor: f64) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "calmar_ratio")?;
    Ok(columns::reduce(returns, |_, col| calmar_ratio_1d(col, ann_factor)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn cumulative_from_zero_is_cumulative_return() {
        let r = array![0.01, 0.02, -0.01];
        let cum = cumulative_1d(r.view(), 0.0);
        assert_relative_eq!(cum[0], 0.01, epsilon = 1e-12);
        assert_relative_eq!(cum[1], 0.0302, epsilon = 1e-12);
        assert_relative_eq!(cum[2], 0.019698, epsilon = 1e-12);
        assert_relative_eq!(total_1d(r.view()), 0.019698, epsilon = 1e-12);
    }

    #[test]
    fn cumulative_from_one_is_growth_curve() {
        let r = array![0.1, -0.5];
        let cum = cumulative_1d(r.view(), 1.0);
        assert_relative_eq!(cum[0], 1.1);
        assert_relative_eq!(cum[1], 0.55);
        let scaled = cumulative_1d(r.view(), 100.0);
        assert_relative_eq!(scaled[1], 55.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_rows_are_skipped_in_compounding() {
        let r = array![0.1, f64::NAN, 0.1];
        let cum = cumulative_1d(r.view(), 0.0);
        assert!(cum[1].is_nan());
        assert_relative_eq!(cum[2], 0.21, epsilon = 1e-12);
        assert_relative_eq!(total_1d(r.view()), 0.21, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let r = array![0.1, -0.5, 0.2, 1.0];
        let dd = drawdown_1d(r.view());
        // growth: 1.1, 0.55, 0.66, 1.32
        assert_relative_eq!(dd[0], 0.0);
        assert_relative_eq!(dd[1], -0.5, epsilon = 1e-12);
        assert_relative_eq!(dd[2], 0.66 / 1.1 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(dd[3], 0.0);
        assert_relative_eq!(max_drawdown_1d(r.view()), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_returns_have_no_total_and_no_drawdown() {
        let r = Array2::<f64>::zeros((10, 2));
        assert_eq!(total(r.view()), vec![0.0, 0.0]);
        assert_eq!(max_drawdown(r.view()).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn constant_daily_return_compounds_over_a_year() {
        let r = Array2::from_elem((252, 1), 0.001);
        let ann = annualized_return(r.view(), 252.0).unwrap();
        assert_relative_eq!(ann[0], 1.001_f64.powi(252) - 1.0, epsilon = 1e-12);
        assert_relative_eq!(ann[0], 0.2863, epsilon = 1e-3);
    }

    #[test]
    fn calmar_without_drawdown_is_infinite() {
        let r = Array2::from_elem((5, 1), 0.01);
        let calmar = calmar_ratio(r.view(), 252.0).unwrap();
        assert!(calmar[0].is_infinite() && calmar[0] > 0.0);

        let flat = Array2::<f64>::zeros((5, 1));
        assert!(calmar_ratio(flat.view(), 252.0).unwrap()[0].is_nan());
    }

    #[test]
    fn calmar_divides_by_absolute_drawdown() {
        let r = array![[0.1], [-0.5], [0.2], [1.0]];
        let calmar = calmar_ratio(r.view(), 4.0).unwrap()[0];
        let expected = annualized_return_1d(r.column(0), 4.0) / 0.5;
        assert_relative_eq!(calmar, expected, epsilon = 1e-12);
    }

    #[test]
    fn empty_input_is_insufficient_for_reductions() {
        let r = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            annualized_return(r.view(), 252.0),
            Err(AnalyticsError::InsufficientData(_))
        ));
        assert!(max_drawdown(r.view()).is_err());
        assert_eq!(total(r.view()), vec![0.0, 0.0]);
    }

    #[test]
    fn start_value_must_match_columns() {
        let r = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            cumulative(r.view(), &[0.0]),
            Err(AnalyticsError::ShapeMismatch(_))
        ));
    }
}
