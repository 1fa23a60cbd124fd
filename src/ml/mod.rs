/// Machine learning over recorded port observations
///
/// - Feature preparation: observations become an (N, 1) matrix
/// - Cluster analysis: k-means over the port feature
/// - Result types shared with the reporter

pub mod cluster;
pub mod features;
pub mod models;

pub use cluster::ClusterAnalyzer;
pub use features::{FeatureMatrix, FeaturePreparer};
pub use models::{AnalysisOutcome, ClusterConfig, ClusterGroup, ClusterResult};
