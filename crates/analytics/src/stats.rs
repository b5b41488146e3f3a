//! NaN-aware moment and percentile helpers shared by the kernels.
//!
//! Missing observations are encoded as `NaN` and skipped, so a column padded with `NaN`
//! before its first trade yields the same statistics as the unpadded column.

use ndarray::ArrayView1;
use statrs::statistics::Statistics;

/// Non-`NaN` observations of a column, in row order.
pub fn observed(values: ArrayView1<'_, f64>) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

pub fn count(values: ArrayView1<'_, f64>) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

/// Mean of the non-`NaN` entries; `NaN` when there are none.
pub fn nanmean(values: ArrayView1<'_, f64>) -> f64 {
    mean(values.iter().copied().filter(|v| !v.is_nan()))
}

/// Standard deviation of the non-`NaN` entries with `ddof` delta degrees of freedom.
///
/// `NaN` when fewer than `ddof + 1` observations remain.
pub fn nanstd(values: ArrayView1<'_, f64>, ddof: usize) -> f64 {
    let obs = observed(values);
    std_of(&obs, ddof)
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

pub fn std_of(obs: &[f64], ddof: usize) -> f64 {
    if obs.len() <= ddof {
        return f64::NAN;
    }
    match ddof {
        0 => obs.iter().population_std_dev(),
        1 => obs.iter().std_dev(),
        _ => {
            let mu = mean(obs.iter().copied());
            let ss: f64 = obs.iter().map(|v| (v - mu).powi(2)).sum();
            (ss / (obs.len() - ddof) as f64).sqrt()
        }
    }
}

/// Percentile of an ascending slice with linear interpolation between closest ranks.
///
/// `q` is in percent (0..=100). `NaN` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Percentile of the non-`NaN` entries of a column.
pub fn nanpercentile(values: ArrayView1<'_, f64>, q: f64) -> f64 {
    let mut obs = observed(values);
    obs.sort_by(f64::total_cmp);
    percentile_sorted(&obs, q)
}

/// Central moments `(m2, m3, m4)` of the observations, population-normalised.
fn central_moments(obs: &[f64]) -> (f64, f64, f64) {
    let n = obs.len() as f64;
    let mu = mean(obs.iter().copied());
    let (m2, m3, m4) = obs.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), v| {
        let d = v - mu;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    (m2 / n, m3 / n, m4 / n)
}

/// Sample skewness of the observations.
///
/// With `bias = false` the adjusted Fisher-Pearson estimator is used (needs at least 3
/// observations). Zero variance yields `NaN`.
pub fn skew(obs: &[f64], bias: bool) -> f64 {
    let n = obs.len();
    if n == 0 {
        return f64::NAN;
    }
    let (m2, m3, _) = central_moments(obs);
    if m2 == 0.0 {
        return f64::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    if bias {
        return g1;
    }
    if n < 3 {
        return f64::NAN;
    }
    let n = n as f64;
    (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
}

/// Sample kurtosis of the observations.
///
/// `fisher = true` returns excess kurtosis (0 for a normal distribution), otherwise
/// Pearson's definition (3 for a normal distribution). With `bias = false` the standard
/// small-sample correction is applied (needs at least 4 observations).
pub fn kurtosis(obs: &[f64], fisher: bool, bias: bool) -> f64 {
    let n = obs.len();
    if n == 0 {
        return f64::NAN;
    }
    let (m2, _, m4) = central_moments(obs);
    if m2 == 0.0 {
        return f64::NAN;
    }
    let mut pearson = m4 / (m2 * m2);
    if !bias {
        if n < 4 {
            return f64::NAN;
        }
        let n = n as f64;
        pearson = ((n * n - 1.0) * pearson - 3.0 * (n - 1.0).powi(2)) / ((n - 2.0) * (n - 3.0)) + 3.0;
    }
    if fisher { pearson - 3.0 } else { pearson }
}
