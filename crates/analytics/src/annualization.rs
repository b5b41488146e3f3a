use crate::error::AnalyticsError;
use core_types::Frequency;

/// Number of sampling periods in one year: `year_freq / sample_freq`.
///
/// The sampling frequency must be known; it is never silently assumed.
pub fn resolve_ann_factor(sample_freq: Option<Frequency>, year_freq: Frequency) -> Result<f64, AnalyticsError> {
    let sample = sample_freq.ok_or_else(|| {
        AnalyticsError::Frequency(
            "the index has no regular spacing to infer it from; set the frequency explicitly".to_string(),
        )
    })?;
    let ann_factor = year_freq.ratio_to(&sample);
    tracing::debug!(%sample, %year_freq, ann_factor, "Resolved annualization factor.");
    Ok(ann_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn daily_against_default_year() {
        let ann = resolve_ann_factor(Some(Frequency::daily()), Frequency::default_year()).unwrap();
        assert_relative_eq!(ann, 365.25);
    }

    #[test]
    fn trading_year_of_hourly_bars() {
        let year = Frequency::days(252.0).unwrap();
        let ann = resolve_ann_factor(Some(Frequency::hours(1.0).unwrap()), year).unwrap();
        assert_relative_eq!(ann, 252.0 * 24.0);
    }

    #[test]
    fn missing_frequency_is_an_error() {
        let err = resolve_ann_factor(None, Frequency::default_year()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Frequency(_)));
    }
}
