use crate::error::ConfigError;
use core_types::{Frequency, Param};
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub returns: MetricsConfig,
}

/// Default parameters for every return metric.
///
/// Each `Param` is either one number shared by all columns or a list with one value per column.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// The length of one year, used to annualize periodic statistics.
    pub year_freq: Frequency,
    /// Annual risk-free rate (e.g. 0.02 for 2%).
    pub risk_free: Param,
    /// Minimum acceptable annual return for Sortino, Omega and downside risk.
    pub required_return: Param,
    /// Levy stability exponent for volatility time-scaling. 2.0 is the Gaussian square-root rule.
    pub levy_alpha: Param,
    /// Lower-tail probability for VaR and CVaR (0.05 is the 5th percentile).
    pub cutoff: Param,
    pub deflated_sharpe: DeflatedSharpeConfig,
}

/// Settings for the multiple-testing correction of the Sharpe ratio.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeflatedSharpeConfig {
    /// Number of independent strategy trials. Defaults to the column count when unset.
    pub nb_trials: Option<usize>,
    /// Variance of the annualized Sharpe ratio across trials. Estimated from the columns when unset.
    pub var_sharpe: Option<f64>,
    /// Delta degrees of freedom for the cross-trial Sharpe variance.
    pub ddof: usize,
    /// Use the biased (population) skew and kurtosis estimators.
    pub bias: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            year_freq: Frequency::default_year(),
            risk_free: Param::Scalar(0.0),
            required_return: Param::Scalar(0.0),
            levy_alpha: Param::Scalar(2.0),
            cutoff: Param::Scalar(0.05),
            deflated_sharpe: DeflatedSharpeConfig::default(),
        }
    }
}

impl Default for DeflatedSharpeConfig {
    fn default() -> Self {
        Self {
            nb_trials: None,
            var_sharpe: None,
            ddof: 0,
            bias: true,
        }
    }
}

impl MetricsConfig {
    /// Rejects values that would make every downstream metric meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self.levy_alpha.find_invalid(|a| a.is_finite() && a > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "levy_alpha must be positive, got {}",
                bad
            )));
        }
        if let Some(bad) = self.cutoff.find_invalid(|c| c > 0.0 && c < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "cutoff must lie strictly between 0 and 1, got {}",
                bad
            )));
        }
        for (name, param) in [("risk_free", &self.risk_free), ("required_return", &self.required_return)] {
            if let Some(bad) = param.find_invalid(|v| v.is_finite() && v > -1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a finite rate above -100%, got {}",
                    name, bad
                )));
            }
        }
        if self.deflated_sharpe.nb_trials == Some(0) {
            return Err(ConfigError::ValidationError(
                "deflated_sharpe.nb_trials must be at least 1".to_string(),
            ));
        }
        if let Some(var) = self.deflated_sharpe.var_sharpe {
            if !(var.is_finite() && var >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "deflated_sharpe.var_sharpe must be a non-negative number, got {}",
                    var
                )));
            }
        }
        Ok(())
    }

    /// Layers command-line overrides on top of the loaded values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(year_freq) = overrides.year_freq {
            self.year_freq = year_freq;
        }
        if let Some(rf) = overrides.risk_free {
            self.risk_free = Param::Scalar(rf);
        }
        if let Some(rr) = overrides.required_return {
            self.required_return = Param::Scalar(rr);
        }
        if let Some(alpha) = overrides.levy_alpha {
            self.levy_alpha = Param::Scalar(alpha);
        }
        if let Some(cutoff) = overrides.cutoff {
            self.cutoff = Param::Scalar(cutoff);
        }
        if let Some(n) = overrides.nb_trials {
            self.deflated_sharpe.nb_trials = Some(n);
        }
    }
}

/// Scalar overrides typically supplied on the command line.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Length of one year (e.g. "365.25 days", "252d").
    #[cfg_attr(feature = "clap", arg(long))]
    pub year_freq: Option<Frequency>,
    /// Annual risk-free rate.
    #[cfg_attr(feature = "clap", arg(long))]
    pub risk_free: Option<f64>,
    /// Minimum acceptable annual return.
    #[cfg_attr(feature = "clap", arg(long))]
    pub required_return: Option<f64>,
    /// Levy stability exponent for volatility scaling.
    #[cfg_attr(feature = "clap", arg(long))]
    pub levy_alpha: Option<f64>,
    /// VaR / CVaR tail cutoff.
    #[cfg_attr(feature = "clap", arg(long))]
    pub cutoff: Option<f64>,
    /// Number of strategy trials for the deflated Sharpe ratio.
    #[cfg_attr(feature = "clap", arg(long))]
    pub nb_trials: Option<usize>,
}
