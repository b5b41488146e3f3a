use analytics::{AnalyticsError, ReturnsAnalyzer, StatsReport};
use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use configuration::MetricsConfig;
use core_types::{Frequency, Param, ReturnFrame, TimeIndex};
use ndarray::Array2;

fn config(year_days: f64) -> MetricsConfig {
    MetricsConfig {
        year_freq: Frequency::days(year_days).unwrap(),
        ..MetricsConfig::default()
    }
}

fn daily_series(returns: Vec<f64>) -> ReturnFrame {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let index = (0..returns.len()).map(|i| start + Duration::days(i as i64)).collect();
    ReturnFrame::from_series("strategy", returns, TimeIndex::Timestamps(index)).unwrap()
}

#[test]
fn cumulative_and_total_of_a_short_series() {
    let frame = daily_series(vec![0.01, 0.02, -0.01]);
    let analyzer = ReturnsAnalyzer::new(&frame, MetricsConfig::default());

    let cum = analyzer.cumulative(None).unwrap();
    let curve = cum.column("strategy").unwrap();
    assert_relative_eq!(curve[0], 0.01, epsilon = 1e-12);
    assert_relative_eq!(curve[1], 0.0302, epsilon = 1e-12);
    assert_relative_eq!(curve[2], 0.019698, epsilon = 1e-12);
    assert_relative_eq!(analyzer.total().unwrap().scalar().unwrap(), 0.019698, epsilon = 1e-12);
}

#[test]
fn constant_return_over_a_trading_year() {
    let frame = daily_series(vec![0.001; 252]);
    let analyzer = ReturnsAnalyzer::new(&frame, config(252.0));
    assert_relative_eq!(analyzer.ann_factor().unwrap(), 252.0);
    let annual = analyzer.annualized_return().unwrap().scalar().unwrap();
    assert_relative_eq!(annual, 1.001_f64.powi(252) - 1.0, epsilon = 1e-10);
    assert_relative_eq!(annual, 0.2863, epsilon = 1e-3);
}

#[test]
fn strategy_equal_to_its_benchmark() {
    let returns = vec![0.01, -0.005, 0.02, -0.015, 0.003, 0.007, -0.01];
    let frame = daily_series(returns.clone());
    let analyzer = ReturnsAnalyzer::new(&frame, config(252.0));
    let benchmark = Array2::from_shape_vec((returns.len(), 1), returns).unwrap();

    assert_relative_eq!(analyzer.beta(benchmark.view()).unwrap().scalar().unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(analyzer.alpha(benchmark.view(), None).unwrap().scalar().unwrap(), 0.0, epsilon = 1e-10);
    assert!(analyzer.information_ratio(benchmark.view()).unwrap().scalar().unwrap().is_nan());
    assert_relative_eq!(analyzer.capture(benchmark.view()).unwrap().scalar().unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn value_at_risk_matches_interpolated_percentile() {
    // 41 evenly spaced returns from -0.20 to 0.20; the 5th percentile sits at rank 2.
    let returns: Vec<f64> = (0..41).map(|i| -0.2 + i as f64 * 0.01).collect();
    let mut shuffled = returns.clone();
    shuffled.reverse();
    let frame = daily_series(shuffled);
    let analyzer = ReturnsAnalyzer::new(&frame, MetricsConfig::default());

    let var = analyzer.value_at_risk(None).unwrap().scalar().unwrap();
    assert_relative_eq!(var, returns[2], epsilon = 1e-12);

    // Rank 0.1 * 40 = 4 -> mean of the five smallest returns.
    let cvar = analyzer.conditional_value_at_risk(Some(&Param::Scalar(0.1))).unwrap().scalar().unwrap();
    let expected = returns[..5].iter().sum::<f64>() / 5.0;
    assert_relative_eq!(cvar, expected, epsilon = 1e-12);
}

#[test]
fn single_zero_skill_trial_deflates_to_one_half() {
    // Symmetric around zero: zero mean, zero skew.
    let mut returns = Vec::new();
    for k in 1..=50 {
        let x = (k as f64 * 0.37).sin() * 0.01;
        returns.push(x);
        returns.push(-x);
    }
    let frame = daily_series(returns);
    let analyzer = ReturnsAnalyzer::new(&frame, config(252.0));
    let dsr = analyzer.deflated_sharpe_ratio(Some(1), None).unwrap().scalar().unwrap();
    assert_relative_eq!(dsr, 0.5, epsilon = 1e-6);
}

#[test]
fn many_trials_penalize_the_best_column() {
    let columns: Vec<(String, Vec<f64>)> = (0..5)
        .map(|c| {
            let returns = (0..100)
                .map(|i| ((i * (c + 3)) as f64 * 0.71).sin() * 0.01 + 0.0005 * c as f64)
                .collect();
            (format!("trial_{}", c), returns)
        })
        .collect();
    let frame = ReturnFrame::from_columns(columns, TimeIndex::Range(100))
        .unwrap()
        .with_freq(Frequency::daily());
    let analyzer = ReturnsAnalyzer::new(&frame, config(252.0));

    let single = analyzer.deflated_sharpe_ratio(Some(1), None).unwrap();
    let all = analyzer.deflated_sharpe_ratio(None, None).unwrap();
    for (one, five) in single.values.iter().zip(all.values.iter()) {
        assert!((0.0..=1.0).contains(five));
        assert!(five <= one);
    }
}

#[test]
fn stats_on_a_timestamped_series() {
    let frame = daily_series(vec![0.01, -0.02, 0.015, 0.0, 0.005, -0.01, 0.02]);
    let analyzer = ReturnsAnalyzer::new(&frame, config(252.0));
    let StatsReport::Single(stats) = analyzer.stats(None).unwrap() else {
        panic!("one column collapses to a single record");
    };

    assert_eq!(stats.start, "2023-01-02T00:00:00+00:00");
    assert_eq!(stats.duration, std::time::Duration::from_secs(7 * 86_400));
    assert_relative_eq!(
        stats.total_return_pct,
        analyzer.total().unwrap().scalar().unwrap() * 100.0,
        epsilon = 1e-12
    );
    assert!(stats.max_drawdown_pct < 0.0);
    assert!(stats.alpha.is_none());

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["duration"], "7days");
}

#[test]
fn positional_index_without_frequency_is_rejected_for_annualized_metrics() {
    let frame = ReturnFrame::from_series("s", vec![0.01, 0.02, 0.03], TimeIndex::Range(3)).unwrap();
    let analyzer = ReturnsAnalyzer::new(&frame, MetricsConfig::default());
    assert!(matches!(analyzer.calmar_ratio(), Err(AnalyticsError::Frequency(_))));
    assert!(matches!(analyzer.stats(None), Err(AnalyticsError::Frequency(_))));
    assert!(analyzer.max_drawdown().is_ok());
}

#[test]
fn resampled_daily_returns_keep_the_annualized_return() {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let returns: Vec<f64> = (0..24 * 10).map(|i| ((i as f64) * 0.3).cos() * 0.001).collect();
    let index = (0..returns.len()).map(|i| start + Duration::hours(i as i64)).collect();
    let frame = ReturnFrame::from_series("s", returns, TimeIndex::Timestamps(index)).unwrap();
    let analyzer = ReturnsAnalyzer::new(&frame, MetricsConfig::default());

    let daily = analyzer.daily().unwrap();
    assert_eq!(daily.nrows(), 10);
    let daily_analyzer = ReturnsAnalyzer::new(&daily, MetricsConfig::default());
    assert_relative_eq!(
        analyzer.annualized_return().unwrap().scalar().unwrap(),
        daily_analyzer.annualized_return().unwrap().scalar().unwrap(),
        epsilon = 1e-9
    );
}
