use crate::error::CoreError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NANOS_PER_MICRO: f64 = 1e3;
const NANOS_PER_MILLI: f64 = 1e6;
const NANOS_PER_SECOND: f64 = 1e9;
const NANOS_PER_MINUTE: f64 = 60.0 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: f64 = 60.0 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: f64 = 24.0 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: f64 = 7.0 * NANOS_PER_DAY;

/// The fixed spacing between two consecutive rows of a return matrix.
///
/// Only fixed-length units are accepted. Calendar months and years vary in length,
/// so a "year" is expressed as a number of days (e.g. `365.25 days`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency(Duration);

impl Frequency {
    /// Wraps a strictly positive duration.
    pub fn new(duration: Duration) -> Result<Self, CoreError> {
        if duration <= Duration::zero() {
            return Err(CoreError::InvalidFrequency(
                format!("{}", duration),
                "frequency must be strictly positive".to_string(),
            ));
        }
        Ok(Self(duration))
    }

    pub fn days(days: f64) -> Result<Self, CoreError> {
        Self::from_nanos_f64(days * NANOS_PER_DAY, &format!("{} days", days))
    }

    pub fn hours(hours: f64) -> Result<Self, CoreError> {
        Self::from_nanos_f64(hours * NANOS_PER_HOUR, &format!("{} hours", hours))
    }

    /// One calendar day, the most common sampling period.
    pub fn daily() -> Self {
        Self(Duration::days(1))
    }

    /// The default year length used for annualization.
    pub fn default_year() -> Self {
        // 365.25 days expressed exactly in seconds.
        Self(Duration::seconds(31_557_600))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_nanos(&self) -> i64 {
        // Durations we construct are bounded well below i64::MAX nanoseconds (~292 years),
        // but chrono can hold longer spans, so fall back to microsecond precision.
        self.0
            .num_nanoseconds()
            .unwrap_or_else(|| self.0.num_microseconds().unwrap_or(i64::MAX).saturating_mul(1_000))
    }

    /// How many periods of `other` fit into `self`.
    pub fn ratio_to(&self, other: &Frequency) -> f64 {
        self.as_nanos() as f64 / other.as_nanos() as f64
    }

    /// Multiplies the period by a row count, e.g. to get the duration covered by a series.
    pub fn times(&self, periods: usize) -> Duration {
        Duration::nanoseconds(self.as_nanos().saturating_mul(periods as i64))
    }

    /// Infers the frequency of a timestamp axis.
    ///
    /// Returns `None` when there are fewer than two timestamps or when the spacing is
    /// not perfectly regular and increasing.
    pub fn infer(timestamps: &[DateTime<Utc>]) -> Option<Self> {
        let mut deltas = timestamps.windows(2).map(|w| w[1] - w[0]);
        let first = deltas.next()?;
        if first <= Duration::zero() {
            return None;
        }
        if deltas.all(|d| d == first) {
            Some(Self(first))
        } else {
            None
        }
    }

    fn from_nanos_f64(nanos: f64, raw: &str) -> Result<Self, CoreError> {
        if !nanos.is_finite() || nanos < 1.0 || nanos > i64::MAX as f64 {
            return Err(CoreError::InvalidFrequency(
                raw.to_string(),
                "frequency must be a positive, finite duration".to_string(),
            ));
        }
        Ok(Self(Duration::nanoseconds(nanos.round() as i64)))
    }
}

/// Maps a unit token to its length in nanoseconds.
fn unit_nanos(unit: &str) -> Option<f64> {
    // "M" is the calendar month in the usual offset aliases and has no fixed length.
    if unit == "M" {
        return None;
    }
    let nanos = match unit.to_ascii_lowercase().as_str() {
        "ns" | "nanos" | "nanosecond" | "nanoseconds" => 1.0,
        "us" | "micros" | "microsecond" | "microseconds" => NANOS_PER_MICRO,
        "ms" | "l" | "millis" | "millisecond" | "milliseconds" => NANOS_PER_MILLI,
        "s" | "sec" | "secs" | "second" | "seconds" => NANOS_PER_SECOND,
        "m" | "t" | "min" | "mins" | "minute" | "minutes" => NANOS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => NANOS_PER_HOUR,
        "d" | "day" | "days" => NANOS_PER_DAY,
        "w" | "wk" | "week" | "weeks" => NANOS_PER_WEEK,
        _ => return None,
    };
    Some(nanos)
}

impl FromStr for Frequency {
    type Err = CoreError;

    /// Parses `"1d"`, `"D"`, `"4h"`, `"15min"`, `"365.25 days"` and similar.
    /// A missing number means one unit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(CoreError::InvalidFrequency(s.to_string(), "empty string".to_string()));
        }

        let split = raw
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(raw.len());
        let (number, unit) = raw.split_at(split);
        let unit = unit.trim();

        let count = if number.is_empty() {
            1.0
        } else {
            number
                .parse::<f64>()
                .map_err(|e| CoreError::InvalidFrequency(s.to_string(), e.to_string()))?
        };
        let per_unit = unit_nanos(unit).ok_or_else(|| {
            CoreError::InvalidFrequency(s.to_string(), format!("unknown or variable-length unit '{}'", unit))
        })?;

        Self::from_nanos_f64(count * per_unit, s)
    }
}

impl TryFrom<String> for Frequency {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> Self {
        freq.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.as_nanos() as f64;
        let units = [
            (NANOS_PER_DAY, "days"),
            (NANOS_PER_HOUR, "hours"),
            (NANOS_PER_MINUTE, "minutes"),
            (NANOS_PER_SECOND, "seconds"),
        ];
        for (size, name) in units {
            if nanos >= size {
                return write!(f, "{} {}", nanos / size, name);
            }
        }
        write!(f, "{} ns", nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_common_aliases() {
        assert_eq!("1d".parse::<Frequency>().unwrap(), Frequency::daily());
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::daily());
        assert_eq!("1 day".parse::<Frequency>().unwrap(), Frequency::daily());
        assert_eq!(
            "4h".parse::<Frequency>().unwrap().as_duration(),
            Duration::hours(4)
        );
        assert_eq!(
            "15min".parse::<Frequency>().unwrap().as_duration(),
            Duration::minutes(15)
        );
        assert_eq!(
            "365.25 days".parse::<Frequency>().unwrap(),
            Frequency::default_year()
        );
    }

    #[test]
    fn rejects_variable_length_and_garbage() {
        assert!("1M".parse::<Frequency>().is_err());
        assert!("abc".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
        assert!("0d".parse::<Frequency>().is_err());
    }

    #[test]
    fn ratio_of_year_to_day() {
        let ann = Frequency::default_year().ratio_to(&Frequency::daily());
        assert!((ann - 365.25).abs() < 1e-12);
    }

    #[test]
    fn infers_regular_spacing_only() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let regular: Vec<_> = (0..5).map(|i| start + Duration::days(i)).collect();
        assert_eq!(Frequency::infer(&regular), Some(Frequency::daily()));

        let mut irregular = regular.clone();
        irregular[3] = irregular[3] + Duration::hours(1);
        assert_eq!(Frequency::infer(&irregular), None);
        assert_eq!(Frequency::infer(&regular[..1]), None);
    }

    #[test]
    fn serde_goes_through_strings() {
        let freq: Frequency = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(freq.as_duration(), Duration::hours(1));
        let back = serde_json::to_string(&freq).unwrap();
        assert_eq!(serde_json::from_str::<Frequency>(&back).unwrap(), freq);
    }
}
