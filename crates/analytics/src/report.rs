use serde::Serialize;
use std::time::Duration;

/// A summary of one return series, as produced by `ReturnsAnalyzer::stats`.
///
/// Percentages are already multiplied by 100. Undefined values are `NaN` and serialize as
/// `null`; benchmark-relative fields are `None` when no benchmark was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub column: String,

    // I. Period
    pub start: String,
    pub end: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    // II. Returns
    pub total_return_pct: f64,
    pub benchmark_return_pct: Option<f64>,
    pub annualized_return_pct: f64,
    pub annualized_volatility_pct: f64,

    // III. Risk-adjusted ratios
    pub sharpe_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown_pct: f64,
    pub omega_ratio: f64,
    pub sortino_ratio: f64,

    // IV. Distribution
    pub skew: f64,
    pub kurtosis: f64,
    pub tail_ratio: f64,
    pub common_sense_ratio: f64,
    pub value_at_risk: f64,

    // V. Benchmark
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
}

impl PerformanceStats {
    /// Display name and formatted value of every metric, in report order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
        vec![
            ("Start", self.start.clone()),
            ("End", self.end.clone()),
            ("Duration", humantime::format_duration(self.duration).to_string()),
            ("Total Return [%]", format!("{:.4}", self.total_return_pct)),
            ("Benchmark Return [%]", opt(self.benchmark_return_pct)),
            ("Annual Return [%]", format!("{:.4}", self.annualized_return_pct)),
            ("Annual Volatility [%]", format!("{:.4}", self.annualized_volatility_pct)),
            ("Sharpe Ratio", format!("{:.4}", self.sharpe_ratio)),
            ("Calmar Ratio", format!("{:.4}", self.calmar_ratio)),
            ("Max Drawdown [%]", format!("{:.4}", self.max_drawdown_pct)),
            ("Omega Ratio", format!("{:.4}", self.omega_ratio)),
            ("Sortino Ratio", format!("{:.4}", self.sortino_ratio)),
            ("Skew", format!("{:.4}", self.skew)),
            ("Kurtosis", format!("{:.4}", self.kurtosis)),
            ("Tail Ratio", format!("{:.4}", self.tail_ratio)),
            ("Common Sense Ratio", format!("{:.4}", self.common_sense_ratio)),
            ("Value at Risk", format!("{:.4}", self.value_at_risk)),
            ("Alpha", opt(self.alpha)),
            ("Beta", opt(self.beta)),
        ]
    }
}

/// Stats for a single series collapse to one record; several columns form a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsReport {
    Single(PerformanceStats),
    Table(Vec<PerformanceStats>),
}

impl StatsReport {
    pub fn columns(&self) -> &[PerformanceStats] {
        match self {
            StatsReport::Single(stats) => std::slice::from_ref(stats),
            StatsReport::Table(stats) => stats,
        }
    }
}
