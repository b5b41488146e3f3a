use crate::annualization::resolve_ann_factor;
use crate::error::AnalyticsError;
use crate::report::{PerformanceStats, StatsReport};
use crate::{benchmark, columns, compounding, deflated, ratios, resample, stats};
use configuration::MetricsConfig;
use core_types::{broadcast_benchmark, Frequency, LabeledFrame, Param, Reduced, ReturnFrame};
use ndarray::{Array2, ArrayView2};

/// Computes return metrics for a borrowed `ReturnFrame`.
///
/// Every metric method accepts optional per-call parameters; `None` falls back to the
/// configured default. Scalars apply to every column, vectors must have one value per column.
/// Reductions come back as `Reduced` (one labelled value per column) and full-length series as
/// `LabeledFrame`.
#[derive(Debug, Clone)]
pub struct ReturnsAnalyzer<'a> {
    frame: &'a ReturnFrame,
    config: MetricsConfig,
    freq: Option<Frequency>,
}

impl<'a> ReturnsAnalyzer<'a> {
    pub fn new(frame: &'a ReturnFrame, config: MetricsConfig) -> Self {
        let freq = match frame.freq() {
            Some(freq) => Some(freq),
            None => {
                let inferred = frame.index().infer_freq();
                if let Some(freq) = inferred {
                    tracing::warn!(%freq, "No frequency set on the returns; inferred it from the index.");
                }
                inferred
            }
        };
        tracing::info!(
            rows = frame.nrows(),
            columns = frame.ncols(),
            freq = ?freq.map(|f| f.to_string()),
            "Created returns analyzer."
        );
        Self { frame, config, freq }
    }

    pub fn frame(&self) -> &ReturnFrame {
        self.frame
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// The sampling frequency, explicit or inferred.
    pub fn freq(&self) -> Option<Frequency> {
        self.freq
    }

    pub fn year_freq(&self) -> Frequency {
        self.config.year_freq
    }

    /// Number of periods per year; fails when the sampling frequency is unknown.
    pub fn ann_factor(&self) -> Result<f64, AnalyticsError> {
        resolve_ann_factor(self.freq, self.config.year_freq)
    }

    fn returns(&self) -> ArrayView2<'_, f64> {
        self.frame.values()
    }

    fn param(&self, given: Option<&Param>, default: &Param) -> Result<Vec<f64>, AnalyticsError> {
        Ok(given.unwrap_or(default).broadcast(self.frame.ncols())?)
    }

    fn broadcast(&self, benchmark: ArrayView2<'_, f64>) -> Result<Array2<f64>, AnalyticsError> {
        Ok(broadcast_benchmark(benchmark, self.frame.shape())?)
    }

    fn reduced(&self, values: Vec<f64>) -> Result<Reduced, AnalyticsError> {
        Ok(self.frame.wrap_reduced(values)?)
    }

    // ---- Compounding & drawdown ----

    /// Cumulative returns; `start_value` defaults to 0 (pure cumulative return).
    pub fn cumulative(&self, start_value: Option<&Param>) -> Result<LabeledFrame, AnalyticsError> {
        let start_value = self.param(start_value, &Param::Scalar(0.0))?;
        let curve = compounding::cumulative(self.returns(), &start_value)?;
        Ok(self.frame.wrap(curve)?)
    }

    pub fn total(&self) -> Result<Reduced, AnalyticsError> {
        self.reduced(compounding::total(self.returns()))
    }

    pub fn drawdown(&self) -> Result<LabeledFrame, AnalyticsError> {
        Ok(self.frame.wrap(compounding::drawdown(self.returns()))?)
    }

    pub fn max_drawdown(&self) -> Result<Reduced, AnalyticsError> {
        self.reduced(compounding::max_drawdown(self.returns())?)
    }

    pub fn annualized_return(&self) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        self.reduced(compounding::annualized_return(self.returns(), ann_factor)?)
    }

    pub fn calmar_ratio(&self) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        self.reduced(compounding::calmar_ratio(self.returns(), ann_factor)?)
    }

    // ---- Risk/return ratios ----

    pub fn annualized_volatility(&self, levy_alpha: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let levy_alpha = self.param(levy_alpha, &self.config.levy_alpha)?;
        self.reduced(ratios::annualized_volatility(self.returns(), ann_factor, &levy_alpha)?)
    }

    pub fn downside_risk(&self, required_return: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let required_return = self.param(required_return, &self.config.required_return)?;
        self.reduced(ratios::downside_risk(self.returns(), ann_factor, &required_return)?)
    }

    pub fn sortino_ratio(&self, required_return: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let required_return = self.param(required_return, &self.config.required_return)?;
        self.reduced(ratios::sortino_ratio(self.returns(), ann_factor, &required_return)?)
    }

    pub fn sharpe_ratio(&self, risk_free: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let risk_free = self.param(risk_free, &self.config.risk_free)?;
        self.reduced(ratios::sharpe_ratio(self.returns(), ann_factor, &risk_free)?)
    }

    pub fn omega_ratio(
        &self,
        risk_free: Option<&Param>,
        required_return: Option<&Param>,
    ) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let risk_free = self.param(risk_free, &self.config.risk_free)?;
        let required_return = self.param(required_return, &self.config.required_return)?;
        self.reduced(ratios::omega_ratio(self.returns(), ann_factor, &risk_free, &required_return)?)
    }

    pub fn tail_ratio(&self) -> Result<Reduced, AnalyticsError> {
        self.reduced(ratios::tail_ratio(self.returns())?)
    }

    pub fn common_sense_ratio(&self) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        self.reduced(ratios::common_sense_ratio(self.returns(), ann_factor)?)
    }

    pub fn value_at_risk(&self, cutoff: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let cutoff = self.param(cutoff, &self.config.cutoff)?;
        self.reduced(ratios::value_at_risk(self.returns(), &cutoff)?)
    }

    pub fn conditional_value_at_risk(&self, cutoff: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let cutoff = self.param(cutoff, &self.config.cutoff)?;
        self.reduced(ratios::conditional_value_at_risk(self.returns(), &cutoff)?)
    }

    // ---- Benchmark-relative ----
    //
    // The benchmark is broadcast to the return shape first: a single `(rows, 1)` series is
    // shared by every column.

    pub fn beta(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::beta(self.returns(), benchmark.view())?)
    }

    pub fn alpha(&self, benchmark: ArrayView2<'_, f64>, risk_free: Option<&Param>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let risk_free = self.param(risk_free, &self.config.risk_free)?;
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::alpha(self.returns(), benchmark.view(), ann_factor, &risk_free)?)
    }

    pub fn information_ratio(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::information_ratio(self.returns(), benchmark.view())?)
    }

    pub fn capture(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::capture(self.returns(), benchmark.view(), ann_factor)?)
    }

    pub fn up_capture(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::up_capture(self.returns(), benchmark.view(), ann_factor)?)
    }

    pub fn down_capture(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let ann_factor = self.ann_factor()?;
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::down_capture(self.returns(), benchmark.view(), ann_factor)?)
    }

    pub fn benchmark_total(&self, benchmark: ArrayView2<'_, f64>) -> Result<Reduced, AnalyticsError> {
        let benchmark = self.broadcast(benchmark)?;
        self.reduced(benchmark::benchmark_total(benchmark.view()))
    }

    // ---- Distribution ----

    /// Sample skewness with the small-sample correction.
    pub fn skew(&self) -> Result<Reduced, AnalyticsError> {
        columns::require_rows(self.returns(), "skew")?;
        self.reduced(columns::reduce(self.returns(), |_, col| {
            stats::skew(&stats::observed(col), false)
        }))
    }

    /// Sample excess kurtosis with the small-sample correction.
    pub fn kurtosis(&self) -> Result<Reduced, AnalyticsError> {
        columns::require_rows(self.returns(), "kurtosis")?;
        self.reduced(columns::reduce(self.returns(), |_, col| {
            stats::kurtosis(&stats::observed(col), true, false)
        }))
    }

    /// Deflated Sharpe ratio of every column, treating the columns as the trials.
    ///
    /// `nb_trials` and `var_sharpe` fall back to the configured values, then to the column
    /// count and the cross-column variance of the Sharpe ratio. Skew and kurtosis are taken
    /// over the returns with missing values counted as 0.
    ///
    /// The kurtosis fed into the Sharpe standard error is Pearson's (3 for normal returns),
    /// as in Bailey & López de Prado. Implementations that pass excess kurtosis here report a
    /// smaller standard error, and so a more extreme ratio, for fat-tailed returns.
    pub fn deflated_sharpe_ratio(
        &self,
        nb_trials: Option<usize>,
        var_sharpe: Option<f64>,
    ) -> Result<Reduced, AnalyticsError> {
        let settings = &self.config.deflated_sharpe;
        let ann_factor = self.ann_factor()?;
        let sharpe = self.sharpe_ratio(None)?.to_vec();

        let var_sharpe = match var_sharpe.or(settings.var_sharpe) {
            Some(var) => var,
            None => {
                let observed: Vec<f64> = sharpe.iter().copied().filter(|s| !s.is_nan()).collect();
                stats::std_of(&observed, settings.ddof).powi(2) / ann_factor
            }
        };
        let nb_trials = nb_trials.or(settings.nb_trials).unwrap_or(self.frame.ncols());
        let est_sharpe: Vec<f64> = sharpe.iter().map(|s| s / ann_factor.sqrt()).collect();

        let filled = self.returns().mapv(|r| if r.is_nan() { 0.0 } else { r });
        let bias = settings.bias;
        let skew = columns::reduce(filled.view(), |_, col| stats::skew(&col.to_vec(), bias));
        let kurtosis = columns::reduce(filled.view(), |_, col| stats::kurtosis(&col.to_vec(), false, bias));

        let dsr = deflated::deflated_sharpe_ratio(
            &est_sharpe,
            var_sharpe,
            nb_trials,
            self.frame.nrows(),
            &skew,
            &kurtosis,
        )?;
        self.reduced(dsr)
    }

    // ---- Resampling ----

    /// The returns compounded per calendar day.
    pub fn daily(&self) -> Result<ReturnFrame, AnalyticsError> {
        resample::daily(&self.with_resolved_freq())
    }

    /// The returns compounded per `year_freq`.
    pub fn annual(&self) -> Result<ReturnFrame, AnalyticsError> {
        resample::annual(&self.with_resolved_freq(), self.config.year_freq)
    }

    fn with_resolved_freq(&self) -> ReturnFrame {
        match self.freq {
            Some(freq) => self.frame.clone().with_freq(freq),
            None => self.frame.clone(),
        }
    }

    // ---- Summary ----

    /// One `PerformanceStats` per column, using the configured defaults throughout.
    pub fn stats(&self, benchmark: Option<ArrayView2<'_, f64>>) -> Result<StatsReport, AnalyticsError> {
        let freq = self.freq.ok_or_else(|| {
            AnalyticsError::Frequency("stats need a known sampling frequency".to_string())
        })?;
        columns::require_rows(self.returns(), "stats")?;

        for (j, name) in self.frame.columns().iter().enumerate() {
            if stats::count(self.frame.column(j)) == 0 {
                tracing::warn!(column = %name, "Column has no observations; its metrics will be NaN.");
            }
        }

        let total = self.total()?;
        let annualized_return = self.annualized_return()?;
        let volatility = self.annualized_volatility(None)?;
        let sharpe = self.sharpe_ratio(None)?;
        let calmar = self.calmar_ratio()?;
        let max_drawdown = self.max_drawdown()?;
        // Omega is judged against the required return alone.
        let omega = self.omega_ratio(Some(&Param::Scalar(0.0)), None)?;
        let sortino = self.sortino_ratio(None)?;
        let skew = self.skew()?;
        let kurtosis = self.kurtosis()?;
        let tail = self.tail_ratio()?;
        let common_sense = self.common_sense_ratio()?;
        let var = self.value_at_risk(None)?;

        let relative = match benchmark {
            Some(benchmark) => {
                let broadcast = self.broadcast(benchmark)?;
                Some((
                    self.benchmark_total(broadcast.view())?,
                    self.alpha(broadcast.view(), None)?,
                    self.beta(broadcast.view())?,
                ))
            }
            None => None,
        };

        let index = self.frame.index();
        let rows = self.frame.nrows();
        let start = index.label(0).unwrap_or_default();
        let end = index.label(rows - 1).unwrap_or_default();
        let duration = freq.times(rows).to_std().unwrap_or_default();

        let mut report: Vec<PerformanceStats> = self
            .frame
            .columns()
            .iter()
            .enumerate()
            .map(|(j, name)| PerformanceStats {
                column: name.clone(),
                start: start.clone(),
                end: end.clone(),
                duration,
                total_return_pct: total.values[j] * 100.0,
                benchmark_return_pct: relative.as_ref().map(|(b, _, _)| b.values[j] * 100.0),
                annualized_return_pct: annualized_return.values[j] * 100.0,
                annualized_volatility_pct: volatility.values[j] * 100.0,
                sharpe_ratio: sharpe.values[j],
                calmar_ratio: calmar.values[j],
                max_drawdown_pct: max_drawdown.values[j] * 100.0,
                omega_ratio: omega.values[j],
                sortino_ratio: sortino.values[j],
                skew: skew.values[j],
                kurtosis: kurtosis.values[j],
                tail_ratio: tail.values[j],
                common_sense_ratio: common_sense.values[j],
                value_at_risk: var.values[j],
                alpha: relative.as_ref().map(|(_, a, _)| a.values[j]),
                beta: relative.as_ref().map(|(_, _, b)| b.values[j]),
            })
            .collect();

        tracing::info!(columns = report.len(), benchmark = relative.is_some(), "Performance stats calculated.");
        if self.frame.is_single_column() {
            if let Some(single) = report.pop() {
                return Ok(StatsReport::Single(single));
            }
        }
        Ok(StatsReport::Table(report))
    }
}
