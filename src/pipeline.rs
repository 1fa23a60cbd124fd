use crate::error::Result;
use crate::ml::{AnalysisOutcome, ClusterAnalyzer, ClusterConfig, FeaturePreparer};
use crate::report::Reporter;
use crate::state::PortSource;
use std::io::Write;

/// One-shot analysis: source, preparer, analyzer, reporter
pub struct AnalysisPipeline {
    source: Box<dyn PortSource>,
    preparer: FeaturePreparer,
    analyzer: ClusterAnalyzer,
    reporter: Reporter,
}

impl AnalysisPipeline {
    pub fn new(source: Box<dyn PortSource>, config: ClusterConfig, reporter: Reporter) -> Self {
        Self {
            source,
            preparer: FeaturePreparer::new(),
            analyzer: ClusterAnalyzer::new(config),
            reporter,
        }
    }

    pub fn analyzer(&self) -> &ClusterAnalyzer {
        &self.analyzer
    }

    /// Run the pipeline once and write the report.
    ///
    /// Errors abort the run before anything is written.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<AnalysisOutcome> {
        tracing::info!(source = %self.source.describe(), "Starting port cluster analysis");

        let observations = self.source.fetch_ports()?;
        let matrix = self.preparer.prepare(&observations);
        let outcome = self.analyzer.analyze(&matrix)?;

        self.reporter.write_outcome(&outcome, out)?;
        Ok(outcome)
    }

    /// Report port, banner and day frequencies
    pub fn statistics<W: Write>(&self, limit: usize, out: &mut W) -> Result<()> {
        tracing::info!(source = %self.source.describe(), limit, "Collecting port statistics");

        let stats = self.source.port_statistics(limit)?;
        self.reporter.write_statistics(&stats, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ObservationSet, PortStatistics};
    use crate::report::{ReportFormat, INSUFFICIENT_DATA_MESSAGE};
    use crate::state::InMemoryStore;

    struct FailingSource;

    impl PortSource for FailingSource {
        fn fetch_ports(&self) -> Result<ObservationSet> {
            Err(AppError::StorageUnavailable("offline".to_string()))
        }

        fn port_statistics(&self, _limit: usize) -> Result<PortStatistics> {
            Err(AppError::StorageUnavailable("offline".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn pipeline(ports: &[i64]) -> AnalysisPipeline {
        AnalysisPipeline::new(
            Box::new(InMemoryStore::with_ports(ports.iter().copied())),
            ClusterConfig::default().with_seed(17),
            Reporter::new(ReportFormat::Text),
        )
    }

    #[test]
    fn test_run_clusters_and_reports() {
        let pipeline = pipeline(&[22, 22, 80, 443, 8080, 8443]);
        let mut out = Vec::new();
        let outcome = pipeline.run(&mut out).unwrap();

        assert!(outcome.is_clustered());
        assert_eq!(pipeline.analyzer().fits_attempted(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Cluster Centers (Common Port Groups): ["));
    }

    #[test]
    fn test_run_single_observation_reports_insufficient_data() {
        let pipeline = pipeline(&[80]);
        let mut out = Vec::new();
        let outcome = pipeline.run(&mut out).unwrap();

        assert!(!outcome.is_clustered());
        assert_eq!(pipeline.analyzer().fits_attempted(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap().trim_end(),
            INSUFFICIENT_DATA_MESSAGE
        );
    }

    #[test]
    fn test_failure_writes_no_report() {
        let pipeline = AnalysisPipeline::new(
            Box::new(FailingSource),
            ClusterConfig::default(),
            Reporter::default(),
        );
        let mut out = Vec::new();

        let result = pipeline.run(&mut out);
        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
        assert!(out.is_empty());
        assert!(pipeline.statistics(5, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_statistics_writes_rankings() {
        let mut store = InMemoryStore::new();
        store.record(443, Some("nginx"), Some("Friday"));
        store.record(443, Some("nginx"), Some("Friday"));
        store.record(22, Some("OpenSSH"), Some("Saturday"));

        let pipeline = AnalysisPipeline::new(
            Box::new(store),
            ClusterConfig::default(),
            Reporter::new(ReportFormat::Text),
        );
        let mut out = Vec::new();
        pipeline.statistics(1, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Top 1 Most Frequently Open Ports:\n\
             Port: 443 | Occurrences: 2\n\
             \n\
             Top 1 Most Common Banners:\n\
             Banner: nginx | Occurrences: 2\n\
             \n\
             Day With Most Open Ports:\n\
             Day: Friday | Open Ports: 2\n"
        );
        assert_eq!(pipeline.analyzer().fits_attempted(), 0);
    }

    #[test]
    fn test_fit_error_writes_no_report() {
        let pipeline = pipeline(&[22, 80]);
        let mut out = Vec::new();
        assert!(matches!(pipeline.run(&mut out), Err(AppError::Fit(_))));
        assert!(out.is_empty());
    }
}
