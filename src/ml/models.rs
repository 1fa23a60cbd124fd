use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterConfig {
    /// Number of clusters to form (K)
    #[serde(default = "default_clusters")]
    #[validate(range(min = 1))]
    pub clusters: usize,

    /// RNG seed for k-means++ seeding; drawn from entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Maximum Lloyd iterations per run
    #[serde(default = "default_max_iterations")]
    #[validate(range(min = 1))]
    pub max_iterations: u64,

    /// Convergence threshold on centroid movement
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Independent k-means runs; the lowest-inertia run wins
    #[serde(default = "default_n_runs")]
    #[validate(range(min = 1))]
    pub n_runs: usize,

    /// Fewer observations than this yields an insufficient-data outcome
    #[serde(default = "default_min_observations")]
    #[validate(range(min = 2))]
    pub min_observations: usize,
}

impl ClusterConfig {
    /// Configuration for `k` clusters with default tuning
    pub fn with_clusters(k: usize) -> Self {
        Self {
            clusters: k,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run derive-based validation plus the float bounds it cannot express
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AppError::Configuration(format!(
                "analysis.tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: default_clusters(),
            seed: None,
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            n_runs: default_n_runs(),
            min_observations: default_min_observations(),
        }
    }
}

/// One cluster of port numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGroup {
    /// Centroid, in port units
    pub centroid: f64,

    /// Observations assigned to this cluster
    pub size: usize,

    /// Smallest assigned port
    pub min_port: Option<i64>,

    /// Largest assigned port
    pub max_port: Option<i64>,
}

/// Fitted clusters, ordered by centroid ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// Number of clusters (K)
    pub k: usize,

    /// Number of clustered observations
    pub observations: usize,

    /// Seed the fit actually used
    pub seed: u64,

    /// Sum of squared distances to the assigned centroids
    pub inertia: f64,

    pub groups: Vec<ClusterGroup>,
}

impl ClusterResult {
    /// The K centroid values
    pub fn centroids(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.centroid).collect()
    }
}

/// What the analyzer produced for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Clustered(ClusterResult),
    InsufficientData { observations: usize },
}

impl AnalysisOutcome {
    pub fn is_clustered(&self) -> bool {
        matches!(self, AnalysisOutcome::Clustered(_))
    }

    pub fn cluster_result(&self) -> Option<&ClusterResult> {
        match self {
            AnalysisOutcome::Clustered(result) => Some(result),
            AnalysisOutcome::InsufficientData { .. } => None,
        }
    }
}

fn default_clusters() -> usize {
    3
}

fn default_max_iterations() -> u64 {
    300
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_n_runs() -> usize {
    10
}

fn default_min_observations() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cluster_config() {
        let config = ClusterConfig::default();
        assert_eq!(config.clusters, 3);
        assert_eq!(config.min_observations, 2);
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_invalid_cluster_config() {
        assert!(ClusterConfig::with_clusters(0).validate_all().is_err());

        let config = ClusterConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate_all(),
            Err(AppError::Configuration(_))
        ));

        let config = ClusterConfig {
            min_observations: 1,
            ..Default::default()
        };
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = AnalysisOutcome::InsufficientData { observations: 1 };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["observations"], 1);
        assert!(outcome.cluster_result().is_none());
    }
}
