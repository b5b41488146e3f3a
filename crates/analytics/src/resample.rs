//! Down-sampling of return frames by compounding the returns that fall into each bin.

use crate::compounding::total_1d;
use crate::error::AnalyticsError;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use core_types::{Frequency, ReturnFrame, TimeIndex};
use ndarray::{s, Array2};

/// Compounds returns into consecutive `bin`-long periods anchored at UTC midnight of the
/// first timestamp.
///
/// A bin that no row falls into is a period without movement and gets a return of 0. A bin
/// whose rows are all `NaN` stays `NaN`. The result is pinned to frequency `bin`.
pub fn resample_total(frame: &ReturnFrame, bin: Frequency) -> Result<ReturnFrame, AnalyticsError> {
    let timestamps = frame.index().timestamps().ok_or_else(|| {
        AnalyticsError::TypeConstraint("resampling needs a timestamp index".to_string())
    })?;
    let Some(first) = timestamps.first() else {
        return Ok(frame.clone().with_freq(bin));
    };
    if !timestamps.windows(2).all(|w| w[0] < w[1]) {
        return Err(AnalyticsError::TypeConstraint(
            "resampling needs a strictly increasing timestamp index".to_string(),
        ));
    }

    let anchor = Utc.from_utc_datetime(&first.date_naive().and_time(NaiveTime::MIN));
    let bin_nanos = bin.as_nanos();
    let bins: Vec<usize> = timestamps
        .iter()
        .map(|t| bin_of(*t, anchor, bin_nanos))
        .collect::<Result<_, _>>()?;
    let nbins = bins.last().map_or(0, |last| last + 1);

    let returns = frame.values();
    let mut out = Array2::<f64>::zeros((nbins, frame.ncols()));
    // Rows are time-ordered, so every bin is one contiguous run.
    let mut start = 0;
    while start < bins.len() {
        let bin_id = bins[start];
        let end = start + bins[start..].iter().take_while(|b| **b == bin_id).count();
        let rows = returns.slice(s![start..end, ..]);
        for j in 0..rows.ncols() {
            let column = rows.column(j);
            out[[bin_id, j]] = if column.iter().all(|r| r.is_nan()) {
                f64::NAN
            } else {
                total_1d(column)
            };
        }
        start = end;
    }

    let index: Vec<DateTime<Utc>> = (0..nbins).map(|k| anchor + bin.times(k)).collect();
    tracing::debug!(rows = frame.nrows(), bins = nbins, %bin, "Resampled returns.");
    let resampled = ReturnFrame::new(out, TimeIndex::Timestamps(index), frame.columns().to_vec())?;
    Ok(resampled.with_freq(bin))
}

fn bin_of(t: DateTime<Utc>, anchor: DateTime<Utc>, bin_nanos: i64) -> Result<usize, AnalyticsError> {
    let offset = (t - anchor).num_nanoseconds().ok_or_else(|| {
        AnalyticsError::Frequency(format!("{} is too far from {} to be binned", t, anchor))
    })?;
    if offset < 0 {
        return Err(AnalyticsError::TypeConstraint(
            "resampling needs an increasing timestamp index".to_string(),
        ));
    }
    Ok((offset / bin_nanos) as usize)
}

/// Compounds returns per UTC calendar day; a frame already at daily frequency is returned as is.
pub fn daily(frame: &ReturnFrame) -> Result<ReturnFrame, AnalyticsError> {
    at_frequency(frame, Frequency::daily())
}

/// Compounds returns per `year_freq`; a frame already at that frequency is returned as is.
pub fn annual(frame: &ReturnFrame, year_freq: Frequency) -> Result<ReturnFrame, AnalyticsError> {
    at_frequency(frame, year_freq)
}

fn at_frequency(frame: &ReturnFrame, target: Frequency) -> Result<ReturnFrame, AnalyticsError> {
    if !frame.index().is_datetime() {
        return Err(AnalyticsError::TypeConstraint(
            "resampling needs a timestamp index".to_string(),
        ));
    }
    if frame.resolved_freq() == Some(target) {
        return Ok(frame.clone());
    }
    resample_total(frame, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn hourly(start: DateTime<Utc>, returns: Vec<f64>) -> ReturnFrame {
        let index = (0..returns.len()).map(|i| start + Duration::hours(i as i64)).collect();
        ReturnFrame::from_series("s", returns, TimeIndex::Timestamps(index)).unwrap()
    }

    #[test]
    fn hourly_returns_compound_into_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut returns = vec![0.0; 48];
        returns[0] = 0.1;
        returns[23] = 0.1;
        returns[30] = -0.5;
        let days = daily(&hourly(start, returns)).unwrap();

        assert_eq!(days.nrows(), 2);
        assert_eq!(days.freq(), Some(Frequency::daily()));
        assert_relative_eq!(days.column(0)[0], 0.21, epsilon = 1e-12);
        assert_relative_eq!(days.column(0)[1], -0.5, epsilon = 1e-12);
        let index = days.index().timestamps().unwrap();
        assert_eq!(index[1], start + Duration::days(1));
    }

    #[test]
    fn bins_anchor_at_midnight_and_fill_gaps_with_zero() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let index = vec![start, start + Duration::days(2)];
        let frame = ReturnFrame::from_series("s", vec![0.1, 0.2], TimeIndex::Timestamps(index)).unwrap();
        let days = daily(&frame).unwrap();

        let col = days.column(0);
        assert_eq!(col.len(), 3);
        assert_relative_eq!(col[0], 0.1, epsilon = 1e-12);
        assert_eq!(col[1], 0.0);
        assert_relative_eq!(col[2], 0.2, epsilon = 1e-12);
        assert_eq!(
            days.index().timestamps().unwrap()[0],
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn daily_frame_is_returned_unchanged() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let index = (0..3).map(|i| start + Duration::days(i)).collect();
        let frame = ReturnFrame::from_series("s", vec![0.1, f64::NAN, 0.2], TimeIndex::Timestamps(index)).unwrap();
        let out = daily(&frame).unwrap();
        assert_eq!(out.nrows(), 3);
        assert!(out.column(0)[1].is_nan());
    }

    #[test]
    fn positional_index_cannot_be_resampled() {
        let frame = ReturnFrame::from_series("s", vec![0.1, 0.2], TimeIndex::Range(2)).unwrap();
        assert!(matches!(daily(&frame), Err(AnalyticsError::TypeConstraint(_))));
        assert!(matches!(
            annual(&frame, Frequency::default_year()),
            Err(AnalyticsError::TypeConstraint(_))
        ));
    }

    #[test]
    fn unordered_index_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let index = vec![start, start + Duration::days(2), start + Duration::days(1)];
        let frame = ReturnFrame::from_series("s", vec![0.1, 0.2, 0.3], TimeIndex::Timestamps(index))
            .unwrap()
            .with_freq(Frequency::hours(1.0).unwrap());
        assert!(matches!(daily(&frame), Err(AnalyticsError::TypeConstraint(_))));

        let repeated = vec![start, start];
        let frame = ReturnFrame::from_series("s", vec![0.1, 0.2], TimeIndex::Timestamps(repeated)).unwrap();
        assert!(matches!(daily(&frame), Err(AnalyticsError::TypeConstraint(_))));
    }

    #[test]
    fn annual_bins_use_the_year_length() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let index = (0..10).map(|i| start + Duration::days(i * 100)).collect();
        let frame = ReturnFrame::from_series("s", vec![0.01; 10], TimeIndex::Timestamps(index)).unwrap();
        let year = Frequency::days(365.0).unwrap();
        let years = annual(&frame, year).unwrap();
        // Days 0..=900 span bins 0, 1 and 2.
        assert_eq!(years.nrows(), 3);
        assert_eq!(years.freq(), Some(year));
        assert_relative_eq!(years.column(0)[0], 1.01_f64.powi(4) - 1.0, epsilon = 1e-12);
    }
}
