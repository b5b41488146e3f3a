use crate::error::CoreError;
use crate::frequency::Frequency;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

/// The row labels of a return matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    /// One UTC timestamp per row, in increasing order.
    Timestamps(Vec<DateTime<Utc>>),
    /// Positional rows `0..n` with no time information.
    Range(usize),
}

impl TimeIndex {
    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Timestamps(ts) => ts.len(),
            TimeIndex::Range(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, TimeIndex::Timestamps(_))
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        match self {
            TimeIndex::Timestamps(ts) => Some(ts),
            TimeIndex::Range(_) => None,
        }
    }

    /// Human-readable label of row `i`.
    pub fn label(&self, i: usize) -> Option<String> {
        match self {
            TimeIndex::Timestamps(ts) => ts.get(i).map(|t| t.to_rfc3339()),
            TimeIndex::Range(n) => (i < *n).then(|| i.to_string()),
        }
    }

    pub fn infer_freq(&self) -> Option<Frequency> {
        self.timestamps().and_then(Frequency::infer)
    }
}

/// A matrix of periodic fractional returns: rows ordered by time, one column per strategy.
#[derive(Debug, Clone)]
pub struct ReturnFrame {
    values: Array2<f64>,
    index: TimeIndex,
    columns: Vec<String>,
    freq: Option<Frequency>,
}

impl ReturnFrame {
    pub fn new(values: Array2<f64>, index: TimeIndex, columns: Vec<String>) -> Result<Self, CoreError> {
        let (rows, cols) = values.dim();
        if index.len() != rows {
            return Err(CoreError::shape("time index", format!("{} rows", rows), format!("{} labels", index.len())));
        }
        if columns.len() != cols {
            return Err(CoreError::shape("column labels", format!("{} columns", cols), format!("{} labels", columns.len())));
        }
        Ok(Self {
            values,
            index,
            columns,
            freq: None,
        })
    }

    /// A single return series. The result collapses to scalars wherever a reduction is taken.
    pub fn from_series(name: impl Into<String>, returns: Vec<f64>, index: TimeIndex) -> Result<Self, CoreError> {
        let values = Array1::from(returns).insert_axis(Axis(1));
        Self::new(values, index, vec![name.into()])
    }

    /// Builds a frame from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>, index: TimeIndex) -> Result<Self, CoreError> {
        let rows = index.len();
        let mut values = Array2::<f64>::zeros((rows, columns.len()));
        let mut names = Vec::with_capacity(columns.len());
        for (j, (name, data)) in columns.into_iter().enumerate() {
            if data.len() != rows {
                return Err(CoreError::shape(
                    &format!("column '{}'", name),
                    format!("{} rows", rows),
                    format!("{} rows", data.len()),
                ));
            }
            values.column_mut(j).assign(&Array1::from(data));
            names.push(name);
        }
        Self::new(values, index, names)
    }

    /// Converts a price matrix into simple returns `p[t] / p[t-1] - 1`.
    ///
    /// The first row has no predecessor and is `NaN`, so the frame keeps the price index.
    pub fn from_prices(prices: Array2<f64>, index: TimeIndex, columns: Vec<String>) -> Result<Self, CoreError> {
        let mut returns = Array2::from_elem(prices.dim(), f64::NAN);
        for t in 1..prices.nrows() {
            let change = &prices.row(t) / &prices.row(t - 1) - 1.0;
            returns.row_mut(t).assign(&change);
        }
        Self::new(returns, index, columns)
    }

    /// Pins the sampling frequency instead of relying on inference from the index.
    pub fn with_freq(mut self, freq: Frequency) -> Self {
        self.freq = Some(freq);
        self
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.values.column(j)
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn is_single_column(&self) -> bool {
        self.ncols() == 1
    }

    /// The explicitly configured frequency, if any.
    pub fn freq(&self) -> Option<Frequency> {
        self.freq
    }

    /// The configured frequency, falling back to inference from a regular timestamp index.
    pub fn resolved_freq(&self) -> Option<Frequency> {
        self.freq.or_else(|| self.index.infer_freq())
    }

    /// Re-attaches this frame's labels to a full-length result of the same shape.
    pub fn wrap(&self, values: Array2<f64>) -> Result<LabeledFrame, CoreError> {
        if values.dim() != self.shape() {
            return Err(CoreError::shape(
                "wrapped result",
                format!("{:?}", self.shape()),
                format!("{:?}", values.dim()),
            ));
        }
        Ok(LabeledFrame {
            values,
            index: self.index.clone(),
            columns: self.columns.clone(),
        })
    }

    /// Re-attaches the column labels to one reduced value per column.
    pub fn wrap_reduced(&self, values: Vec<f64>) -> Result<Reduced, CoreError> {
        if values.len() != self.ncols() {
            return Err(CoreError::shape(
                "reduced result",
                format!("{} values", self.ncols()),
                format!("{} values", values.len()),
            ));
        }
        Ok(Reduced {
            columns: self.columns.clone(),
            values: Array1::from(values),
        })
    }
}

/// Broadcasts a benchmark matrix to `shape` following the usual array rules:
/// a `(rows, 1)` series spreads across columns, a `(1, cols)` row across rows.
pub fn broadcast_benchmark(benchmark: ArrayView2<'_, f64>, shape: (usize, usize)) -> Result<Array2<f64>, CoreError> {
    benchmark
        .broadcast(shape)
        .map(|view| view.to_owned())
        .ok_or_else(|| CoreError::shape("benchmark", format!("{:?}", shape), format!("{:?}", benchmark.dim())))
}

/// A full-length result aligned to the input time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledFrame {
    pub values: Array2<f64>,
    pub index: TimeIndex,
    pub columns: Vec<String>,
}

impl LabeledFrame {
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.values.column(j))
    }
}

/// One reduced value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    pub columns: Vec<String>,
    pub values: Array1<f64>,
}

/// A reduced result after collapsing: a bare scalar for single-column input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    PerColumn(Vec<(String, f64)>),
}

impl Reduced {
    pub fn get(&self, column: &str) -> Option<f64> {
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[j])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value when there is exactly one column.
    pub fn scalar(&self) -> Option<f64> {
        (self.values.len() == 1).then(|| self.values[0])
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    pub fn collapse(self) -> MetricValue {
        match self.scalar() {
            Some(value) => MetricValue::Scalar(value),
            None => {
                let values = self.values.to_vec();
                MetricValue::PerColumn(self.columns.into_iter().zip(values).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_columns() -> ReturnFrame {
        ReturnFrame::from_columns(
            vec![
                ("a".to_string(), vec![0.01, 0.02, -0.01]),
                ("b".to_string(), vec![0.0, 0.0, 0.0]),
            ],
            TimeIndex::Range(3),
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_labels() {
        let err = ReturnFrame::new(Array2::zeros((3, 2)), TimeIndex::Range(4), vec!["a".into(), "b".into()]);
        assert!(matches!(err, Err(CoreError::ShapeMismatch { .. })));
        let err = ReturnFrame::new(Array2::zeros((3, 2)), TimeIndex::Range(3), vec!["a".into()]);
        assert!(matches!(err, Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn from_columns_places_data_column_wise() {
        let frame = two_columns();
        assert_eq!(frame.shape(), (3, 2));
        assert_eq!(frame.column(0).to_vec(), vec![0.01, 0.02, -0.01]);
        assert_eq!(frame.columns(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn benchmark_series_spreads_across_columns() {
        let series = array![[0.1], [0.2], [0.3]];
        let out = broadcast_benchmark(series.view(), (3, 2)).unwrap();
        assert_eq!(out, array![[0.1, 0.1], [0.2, 0.2], [0.3, 0.3]]);

        let row = array![[0.1, 0.2]];
        let out = broadcast_benchmark(row.view(), (3, 2)).unwrap();
        assert_eq!(out.column(1).to_vec(), vec![0.2, 0.2, 0.2]);
    }

    #[test]
    fn benchmark_with_wrong_length_is_rejected() {
        let series = array![[0.1], [0.2]];
        assert!(matches!(
            broadcast_benchmark(series.view(), (3, 2)),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn single_column_reduction_collapses_to_scalar() {
        let frame = ReturnFrame::from_series("s", vec![0.1, 0.2], TimeIndex::Range(2)).unwrap();
        let reduced = frame.wrap_reduced(vec![0.5]).unwrap();
        assert_eq!(reduced.clone().collapse(), MetricValue::Scalar(0.5));
        assert_eq!(reduced.get("s"), Some(0.5));

        let reduced = two_columns().wrap_reduced(vec![1.0, 2.0]).unwrap();
        assert_eq!(
            reduced.collapse(),
            MetricValue::PerColumn(vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)])
        );
    }

    #[test]
    fn prices_become_simple_returns() {
        let prices = array![[100.0, 10.0], [110.0, 10.0], [99.0, f64::NAN], [99.0, 12.0]];
        let frame = ReturnFrame::from_prices(prices, TimeIndex::Range(4), vec!["a".into(), "b".into()]).unwrap();

        assert_eq!(frame.shape(), (4, 2));
        assert!(frame.column(0)[0].is_nan());
        assert!((frame.column(0)[1] - 0.1).abs() < 1e-12);
        assert!((frame.column(0)[2] + 0.1).abs() < 1e-12);
        assert_eq!(frame.column(0)[3], 0.0);
        assert_eq!(frame.column(1)[1], 0.0);
        // A missing price leaves both returns around it undefined.
        assert!(frame.column(1)[2].is_nan());
        assert!(frame.column(1)[3].is_nan());

        let short = ReturnFrame::from_prices(array![[1.0]], TimeIndex::Range(2), vec!["a".into()]);
        assert!(short.is_err());
    }

    #[test]
    fn wrap_keeps_labels() {
        let frame = two_columns();
        let wrapped = frame.wrap(Array2::ones((3, 2))).unwrap();
        assert_eq!(wrapped.column("b").unwrap().to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(wrapped.values.row(2).to_vec(), vec![1.0, 1.0]);
        assert!(frame.wrap(Array2::ones((2, 2))).is_err());
    }
}
