use crate::models::ObservationSet;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_stats::QuantileExt;

/// Clustering input: one row per observation, one column (the port number)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    records: Array2<f64>,
}

impl FeatureMatrix {
    /// Number of rows (observations)
    pub fn n_rows(&self) -> usize {
        self.records.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.records.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Underlying (N, 1) array
    pub fn records(&self) -> &Array2<f64> {
        &self.records
    }

    /// Port feature column
    pub fn column(&self) -> ArrayView1<'_, f64> {
        self.records.column(0)
    }

    /// Smallest and largest port, or None for an empty matrix
    pub fn range(&self) -> Option<(f64, f64)> {
        let column = self.column();
        let min = column.min().ok()?;
        let max = column.max().ok()?;
        Some((*min, *max))
    }

    /// Number of distinct port values
    pub fn distinct_values(&self) -> usize {
        let mut values: Vec<f64> = self.column().to_vec();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        values.len()
    }
}

/// Converts retrieved observations into a feature matrix
#[derive(Debug, Clone, Default)]
pub struct FeaturePreparer;

impl FeaturePreparer {
    pub fn new() -> Self {
        Self
    }

    /// Arrange observations as an (N, 1) matrix, preserving order
    pub fn prepare(&self, observations: &ObservationSet) -> FeatureMatrix {
        let column: Array1<f64> = observations.iter().map(|o| o.as_feature()).collect();
        let records = column.insert_axis(Axis(1));

        tracing::debug!(rows = records.nrows(), "Feature matrix prepared");
        FeatureMatrix { records }
    }
}
