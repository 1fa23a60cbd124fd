use crate::error::{AppError, Result};
use crate::ml::features::FeatureMatrix;
use crate::ml::models::{AnalysisOutcome, ClusterConfig, ClusterGroup, ClusterResult};
use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Partitions port features into K groups with k-means
#[derive(Debug)]
pub struct ClusterAnalyzer {
    config: ClusterConfig,
    fits_attempted: AtomicUsize,
}

impl ClusterAnalyzer {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            fits_attempted: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// How many times the clustering algorithm has been invoked
    pub fn fits_attempted(&self) -> usize {
        self.fits_attempted.load(Ordering::SeqCst)
    }

    /// Cluster the matrix, or report that there is too little data to do so
    pub fn analyze(&self, matrix: &FeatureMatrix) -> Result<AnalysisOutcome> {
        let n = matrix.n_rows();
        let k = self.config.clusters;

        if n < self.config.min_observations {
            tracing::info!(
                observations = n,
                required = self.config.min_observations,
                "Not enough observations to cluster"
            );
            return Ok(AnalysisOutcome::InsufficientData { observations: n });
        }

        if n < k {
            return Err(AppError::Fit(format!(
                "cannot form {} clusters from {} observations",
                k, n
            )));
        }

        // Fewer distinct values than K still yields K centroids, some duplicated
        // and some with no members
        let distinct = matrix.distinct_values();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!(
            observations = n,
            distinct,
            clusters = k,
            seed,
            "Fitting k-means"
        );

        let centroids = self.fit_centroids(matrix.records(), seed)?;
        let result = summarize(matrix, &centroids, seed);

        tracing::info!(
            centroids = ?result.centroids(),
            inertia = result.inertia,
            "Clustering complete"
        );
        Ok(AnalysisOutcome::Clustered(result))
    }

    fn fit_centroids(&self, records: &Array2<f64>, seed: u64) -> Result<Vec<f64>> {
        self.fits_attempted.fetch_add(1, Ordering::SeqCst);

        let rng = Xoshiro256Plus::seed_from_u64(seed);
        let dataset = DatasetBase::from(records.clone());

        let model = KMeans::params_with_rng(self.config.clusters, rng)
            .max_n_iterations(self.config.max_iterations)
            .tolerance(self.config.tolerance)
            .n_runs(self.config.n_runs)
            .fit(&dataset)
            .map_err(|e| AppError::Fit(format!("k-means failed: {}", e)))?;

        let centroids: Vec<f64> = model.centroids().column(0).to_vec();
        if centroids.len() != self.config.clusters || centroids.iter().any(|c| !c.is_finite()) {
            return Err(AppError::Fit(format!(
                "k-means produced unusable centroids: {:?}",
                centroids
            )));
        }
        Ok(centroids)
    }
}

/// Assign each port to its nearest centroid and describe the resulting groups
fn summarize(matrix: &FeatureMatrix, centroids: &[f64], seed: u64) -> ClusterResult {
    let mut groups: Vec<ClusterGroup> = centroids
        .iter()
        .map(|&centroid| ClusterGroup {
            centroid,
            size: 0,
            min_port: None,
            max_port: None,
        })
        .collect();

    let mut inertia = 0.0;
    for &value in matrix.column() {
        let (idx, distance) = nearest(centroids, value);
        inertia += distance * distance;

        let port = value as i64;
        let group = &mut groups[idx];
        group.size += 1;
        group.min_port = Some(group.min_port.map_or(port, |m| m.min(port)));
        group.max_port = Some(group.max_port.map_or(port, |m| m.max(port)));
    }

    // Raw centroid order depends on the seed
    groups.sort_by(|a, b| a.centroid.total_cmp(&b.centroid));

    ClusterResult {
        k: centroids.len(),
        observations: matrix.n_rows(),
        seed,
        inertia,
        groups,
    }
}

fn nearest(centroids: &[f64], value: f64) -> (usize, f64) {
    centroids
        .iter()
        .map(|c| (value - c).abs())
        .enumerate()
        .fold((0, f64::INFINITY), |best, (idx, d)| {
            if d < best.1 {
                (idx, d)
            } else {
                best
            }
        })
}
