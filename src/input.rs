use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use core_types::{Frequency, ReturnFrame, TimeIndex};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk layout of a return set.
///
/// ```json
/// {"index": ["2024-01-01T00:00:00Z", ...], "columns": {"fund": [0.01, null, ...]}}
/// ```
///
/// `null` marks a missing observation. Without an index, rows are positional and the
/// frequency has to be given explicitly. Columns are ordered by name.
#[derive(Debug, Deserialize)]
pub struct ReturnsFile {
    #[serde(default)]
    pub index: Option<Vec<DateTime<Utc>>>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl ReturnsFile {
    /// Builds the frame; `null` entries become `NaN`. With `from_prices` the columns hold
    /// prices and are converted to simple returns.
    pub fn into_frame(self, freq: Option<Frequency>, from_prices: bool) -> Result<ReturnFrame> {
        let rows = match &self.index {
            Some(index) => index.len(),
            None => self.columns.values().next().map_or(0, Vec::len),
        };
        let index = match self.index {
            Some(timestamps) => TimeIndex::Timestamps(timestamps),
            None => TimeIndex::Range(rows),
        };
        let columns: Vec<(String, Vec<f64>)> = self
            .columns
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()))
            .collect();

        let frame = if from_prices {
            let mut prices = Array2::<f64>::zeros((rows, columns.len()));
            let mut names = Vec::with_capacity(columns.len());
            for (j, (name, data)) in columns.into_iter().enumerate() {
                if data.len() != rows {
                    bail!("Price column '{}' has {} rows, expected {}", name, data.len(), rows);
                }
                prices.column_mut(j).assign(&Array1::from(data));
                names.push(name);
            }
            ReturnFrame::from_prices(prices, index, names)?
        } else {
            ReturnFrame::from_columns(columns, index)?
        };
        Ok(match freq {
            Some(freq) => frame.with_freq(freq),
            None => frame,
        })
    }
}

fn read(path: &Path) -> Result<ReturnsFile> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads a return set, pinning `freq` when given. With `from_prices` the file holds prices.
pub fn load_returns(path: &Path, freq: Option<Frequency>, from_prices: bool) -> Result<ReturnFrame> {
    let frame = read(path)?.into_frame(freq, from_prices)?;
    tracing::info!(path = %path.display(), rows = frame.nrows(), columns = frame.ncols(), "Loaded returns.");
    Ok(frame)
}

/// Loads a benchmark as a `(rows, k)` matrix; `k` is 1 (shared) or the return column count.
pub fn load_benchmark(path: &Path) -> Result<Array2<f64>> {
    let frame = read(path)?.into_frame(None, false)?;
    if frame.ncols() == 0 {
        bail!("Benchmark file {} has no columns", path.display());
    }
    Ok(frame.values().to_owned())
}
