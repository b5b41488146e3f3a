//! Deflated Sharpe ratio (Bailey & López de Prado): the probability that an observed Sharpe
//! ratio beats the best ratio expected from `nb_trials` unskilled strategies, corrected for
//! the skew and fat tails of the returns.

use crate::error::AnalyticsError;
use statrs::distribution::{ContinuousCDF, Normal};

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

fn standard_normal() -> Result<Normal, AnalyticsError> {
    Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Distribution(e.to_string()))
}

/// Expected maximum Sharpe ratio among `nb_trials` independent zero-skill trials whose
/// Sharpe ratios have variance `var_sharpe`.
pub fn expected_max_sharpe(var_sharpe: f64, nb_trials: usize) -> Result<f64, AnalyticsError> {
    if nb_trials == 0 {
        return Err(AnalyticsError::InsufficientData(
            "the deflated Sharpe ratio needs at least one trial".to_string(),
        ));
    }
    if nb_trials == 1 {
        return Ok(0.0);
    }
    let normal = standard_normal()?;
    let n = nb_trials as f64;
    let z = (1.0 - EULER_GAMMA) * normal.inverse_cdf(1.0 - 1.0 / n)
        + EULER_GAMMA * normal.inverse_cdf(1.0 - 1.0 / (n * std::f64::consts::E));
    Ok(var_sharpe.sqrt() * z)
}

/// Deflated Sharpe ratio of each column.
///
/// `est_sharpe` holds per-period (non-annualized) Sharpe ratios, `var_sharpe` their variance
/// across trials, `backtest_horizon` the number of observations per trial. `kurtosis` is
/// Pearson's (3 for normal returns).
pub fn deflated_sharpe_ratio(
    est_sharpe: &[f64],
    var_sharpe: f64,
    nb_trials: usize,
    backtest_horizon: usize,
    skew: &[f64],
    kurtosis: &[f64],
) -> Result<Vec<f64>, AnalyticsError> {
    if backtest_horizon <= 1 {
        return Err(AnalyticsError::InsufficientData(format!(
            "the deflated Sharpe ratio needs a backtest horizon above 1, got {}",
            backtest_horizon
        )));
    }
    if skew.len() != est_sharpe.len() || kurtosis.len() != est_sharpe.len() {
        return Err(AnalyticsError::ShapeMismatch(format!(
            "{} Sharpe ratios with {} skews and {} kurtoses",
            est_sharpe.len(),
            skew.len(),
            kurtosis.len()
        )));
    }

    let sr0 = expected_max_sharpe(var_sharpe, nb_trials)?;
    let normal = standard_normal()?;
    let horizon = backtest_horizon as f64;
    tracing::debug!(sr0, nb_trials, backtest_horizon, "Deflating Sharpe ratios.");

    Ok(est_sharpe
        .iter()
        .zip(skew.iter().zip(kurtosis))
        .map(|(&sr, (&g3, &g4))| {
            let sigma = ((1.0 - g3 * sr + (g4 - 1.0) / 4.0 * sr * sr) / (horizon - 1.0)).sqrt();
            normal.cdf((sr - sr0) / sigma)
        })
        .collect())
}
