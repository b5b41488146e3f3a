//! Risk/return ratios computed from a return matrix and its annualization factor alone.
//!
//! Rates passed as `risk_free` are annual and converted to a per-period rate with
//! `risk_free / ann_factor`. `required_return` is used per period except in the Omega
//! ratio, which de-annualizes it geometrically.

use crate::columns;
use crate::compounding::annualized_return_1d;
use crate::error::AnalyticsError;
use crate::stats;
use ndarray::{ArrayView1, ArrayView2};

/// Standard deviation scaled to a year with the Levy stability exponent:
/// `std(r) * ann_factor^(1 / levy_alpha)`.
pub fn annualized_volatility_1d(returns: ArrayView1<'_, f64>, ann_factor: f64, levy_alpha: f64) -> f64 {
    if stats::count(returns) < 2 {
        return f64::NAN;
    }
    stats::nanstd(returns, 1) * ann_factor.powf(1.0 / levy_alpha)
}

/// Annualized root-mean-square of the shortfalls below `required_return`.
pub fn downside_risk_1d(returns: ArrayView1<'_, f64>, ann_factor: f64, required_return: f64) -> f64 {
    let shortfall = stats::mean(
        returns
            .iter()
            .filter(|r| !r.is_nan())
            .map(|r| (r - required_return).min(0.0).powi(2)),
    );
    (ann_factor * shortfall).sqrt()
}

/// Annualized mean excess return over downside risk; `NaN` without any downside.
pub fn sortino_ratio_1d(returns: ArrayView1<'_, f64>, ann_factor: f64, required_return: f64) -> f64 {
    if stats::count(returns) < 2 {
        return f64::NAN;
    }
    let excess = ann_factor * stats::mean(returns.iter().filter(|r| !r.is_nan()).map(|r| r - required_return));
    let downside = downside_risk_1d(returns, ann_factor, required_return);
    if downside == 0.0 {
        return f64::NAN;
    }
    excess / downside
}

pub fn sharpe_ratio_1d(returns: ArrayView1<'_, f64>, ann_factor: f64, risk_free: f64) -> f64 {
    let rf = risk_free / ann_factor;
    let excess: Vec<f64> = stats::observed(returns).into_iter().map(|r| r - rf).collect();
    if excess.len() < 2 {
        return f64::NAN;
    }
    let mean = stats::mean(excess.iter().copied());
    mean / stats::std_of(&excess, 1) * ann_factor.sqrt()
}

/// Probability-weighted gains over losses relative to a per-period threshold derived from
/// the annual `required_return`.
pub fn omega_ratio_1d(returns: ArrayView1<'_, f64>, ann_factor: f64, risk_free: f64, required_return: f64) -> f64 {
    if stats::count(returns) < 2 {
        return f64::NAN;
    }
    let threshold = if ann_factor == 1.0 {
        required_return
    } else if required_return <= -1.0 {
        return f64::NAN;
    } else {
        (1.0 + required_return).powf(1.0 / ann_factor) - 1.0
    };
    let rf = risk_free / ann_factor;

    let (gains, losses) = returns
        .iter()
        .filter(|r| !r.is_nan())
        .map(|r| r - rf - threshold)
        .fold((0.0, 0.0), |(gains, losses), x| {
            if x > 0.0 { (gains + x, losses) } else { (gains, losses - x) }
        });
    gains / losses
}

/// `|p95| / |p05|` of the observed returns.
pub fn tail_ratio_1d(returns: ArrayView1<'_, f64>) -> f64 {
    let mut obs = stats::observed(returns);
    if obs.is_empty() {
        return f64::NAN;
    }
    obs.sort_by(f64::total_cmp);
    stats::percentile_sorted(&obs, 95.0).abs() / stats::percentile_sorted(&obs, 5.0).abs()
}

pub fn common_sense_ratio_1d(returns: ArrayView1<'_, f64>, ann_factor: f64) -> f64 {
    tail_ratio_1d(returns) * (1.0 + annualized_return_1d(returns, ann_factor))
}

/// The `cutoff` quantile of returns (e.g. 0.05 is the 5th percentile).
pub fn value_at_risk_1d(returns: ArrayView1<'_, f64>, cutoff: f64) -> f64 {
    stats::nanpercentile(returns, cutoff * 100.0)
}

/// Mean of the returns at or below the VaR; `NaN` when nothing qualifies.
pub fn conditional_value_at_risk_1d(returns: ArrayView1<'_, f64>, cutoff: f64) -> f64 {
    let var = value_at_risk_1d(returns, cutoff);
    stats::mean(returns.iter().copied().filter(|r| *r <= var))
}

pub fn annualized_volatility(
    returns: ArrayView2<'_, f64>,
    ann_factor: f64,
    levy_alpha: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "annualized_volatility")?;
    columns::require_params(returns, "levy_alpha", levy_alpha)?;
    Ok(columns::reduce(returns, |j, col| {
        annualized_volatility_1d(col, ann_factor, levy_alpha[j])
    }))
}

pub fn downside_risk(
    returns: ArrayView2<'_, f64>,
    ann_factor: f64,
    required_return: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "downside_risk")?;
    columns::require_params(returns, "required_return", required_return)?;
    Ok(columns::reduce(returns, |j, col| {
        downside_risk_1d(col, ann_factor, required_return[j])
    }))
}

pub fn sortino_ratio(
    returns: ArrayView2<'_, f64>,
    ann_factor: f64,
    required_return: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "sortino_ratio")?;
    columns::require_params(returns, "required_return", required_return)?;
    Ok(columns::reduce(returns, |j, col| {
        sortino_ratio_1d(col, ann_factor, required_return[j])
    }))
}

pub fn sharpe_ratio(returns: ArrayView2<'_, f64>, ann_factor: f64, risk_free: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "sharpe_ratio")?;
    columns::require_params(returns, "risk_free", risk_free)?;
    Ok(columns::reduce(returns, |j, col| sharpe_ratio_1d(col, ann_factor, risk_free[j])))
}

pub fn omega_ratio(
    returns: ArrayView2<'_, f64>,
    ann_factor: f64,
    risk_free: &[f64],
    required_return: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "omega_ratio")?;
    columns::require_params(returns, "risk_free", risk_free)?;
    columns::require_params(returns, "required_return", required_return)?;
    Ok(columns::reduce(returns, |j, col| {
        omega_ratio_1d(col, ann_factor, risk_free[j], required_return[j])
    }))
}

pub fn tail_ratio(returns: ArrayView2<'_, f64>) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "tail_ratio")?;
    Ok(columns::reduce(returns, |_, col| tail_ratio_1d(col)))
}

pub fn common_sense_ratio(returns: ArrayView2<'_, f64>, ann_factor: f64) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "common_sense_ratio")?;
    Ok(columns::reduce(returns, |_, col| common_sense_ratio_1d(col, ann_factor)))
}

pub fn value_at_risk(returns: ArrayView2<'_, f64>, cutoff: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "value_at_risk")?;
    columns::require_params(returns, "cutoff", cutoff)?;
    Ok(columns::reduce(returns, |j, col| value_at_risk_1d(col, cutoff[j])))
}

pub fn conditional_value_at_risk(returns: ArrayView2<'_, f64>, cutoff: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    columns::require_rows(returns, "conditional_value_at_risk")?;
    columns::require_params(returns, "cutoff", cutoff)?;
    Ok(columns::reduce(returns, |j, col| {
        conditional_value_at_risk_1d(col, cutoff[j])
    }))
}
