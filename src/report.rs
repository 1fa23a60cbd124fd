//! Rendering of analysis outcomes and port statistics

use crate::error::Result;
use crate::ml::{AnalysisOutcome, ClusterResult};
use crate::models::PortStatistics;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;

/// Diagnostic printed instead of cluster centres when there is too little data
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Not enough data for machine learning analysis.";

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Writes human-readable (or JSON) reports to an output channel
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn write_outcome<W: Write>(&self, outcome: &AnalysisOutcome, out: &mut W) -> Result<()> {
        match self.format {
            ReportFormat::Text => match outcome {
                AnalysisOutcome::Clustered(result) => write_clusters_text(result, out)?,
                AnalysisOutcome::InsufficientData { .. } => {
                    writeln!(out, "{}", INSUFFICIENT_DATA_MESSAGE)?
                }
            },
            ReportFormat::Json => {
                let mut value = serde_json::to_value(outcome)?;
                if let AnalysisOutcome::InsufficientData { .. } = outcome {
                    value["message"] = json!(INSUFFICIENT_DATA_MESSAGE);
                }
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            }
        }
        Ok(())
    }

    pub fn write_statistics<W: Write>(&self, stats: &PortStatistics, out: &mut W) -> Result<()> {
        match self.format {
            ReportFormat::Text => write_statistics_text(stats, out)?,
            ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(stats)?)?,
        }
        Ok(())
    }
}

fn write_clusters_text<W: Write>(result: &ClusterResult, out: &mut W) -> std::io::Result<()> {
    let centers: Vec<String> = result
        .centroids()
        .iter()
        .map(|c| format!("{:.2}", c))
        .collect();
    writeln!(
        out,
        "Cluster Centers (Common Port Groups): [{}]",
        centers.join(", ")
    )?;

    for (i, group) in result.groups.iter().enumerate() {
        match (group.min_port, group.max_port) {
            (Some(min), Some(max)) => writeln!(
                out,
                "  group {}: center {:.2} ({} observations, ports {}-{})",
                i + 1,
                group.centroid,
                group.size,
                min,
                max
            )?,
            _ => writeln!(
                out,
                "  group {}: center {:.2} (0 observations)",
                i + 1,
                group.centroid
            )?,
        }
    }
    Ok(())
}

fn write_statistics_text<W: Write>(stats: &PortStatistics, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Top {} Most Frequently Open Ports:", stats.limit)?;
    for entry in &stats.top_ports {
        writeln!(out, "Port: {} | Occurrences: {}", entry.value, entry.occurrences)?;
    }

    if !stats.top_banners.is_empty() {
        writeln!(out)?;
        writeln!(out, "Top {} Most Common Banners:", stats.limit)?;
        for entry in &stats.top_banners {
            writeln!(out, "Banner: {} | Occurrences: {}", entry.value, entry.occurrences)?;
        }
    }

    if let Some(day) = &stats.busiest_day {
        writeln!(out)?;
        writeln!(out, "Day With Most Open Ports:")?;
        writeln!(out, "Day: {} | Open Ports: {}", day.value, day.occurrences)?;
    }
    Ok(())
}
