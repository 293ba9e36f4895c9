//! Report generation for overlay trace analysis.
//!
//! Builds the summary and t-test tables, prints them, and writes everything
//! (tables plus graph data) as a JSON report.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::group::{TraceGroup, TraceSummary};
use super::plot_data::PlotData;
use super::stats::{self, TTest};

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub analysis_timestamp: String,
    pub time_resolution: f64,
    pub total_groups: usize,
    pub total_runs: usize,
}

/// One line of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub active_nodes: f64,
    pub acks: f64,
    pub direct_acks: f64,
    /// Infinite (no direct ACK baseline) is exported as `null`
    pub improvement: f64,
    pub utility: Option<f64>,
    pub stdev: f64,
}

/// Metric compared between paired groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    /// ACKs received through the overlay only (ACKs minus direct ACKs)
    NetAcks,
    Utility,
}

impl ComparisonMetric {
    fn run_samples(self, group: &TraceGroup) -> Vec<f64> {
        match self {
            ComparisonMetric::NetAcks => group.traces().iter().map(|t| t.net_acks()).collect(),
            ComparisonMetric::Utility => {
                let samples: Vec<f64> = group.traces().iter().filter_map(|t| t.utility()).collect();
                let dropped = group.len() - samples.len();
                if dropped > 0 {
                    log::warn!(
                        "Leaving {} of {} runs in group {} out of the utility comparison: every node got a direct ACK",
                        dropped,
                        group.len(),
                        group.name()
                    );
                }
                samples
            }
        }
    }

    fn group_mean(self, group: &TraceGroup) -> Option<f64> {
        match self {
            ComparisonMetric::NetAcks => Some(group.n_acks() - group.n_direct_acks()),
            ComparisonMetric::Utility => group.utility(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestRow {
    pub group1: String,
    pub group2: String,
    pub mean1: Option<f64>,
    pub mean2: Option<f64>,
    /// `None` when the samples are too small to test
    pub test: Option<TTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestReport {
    pub metric: ComparisonMetric,
    pub rows: Vec<TTestRow>,
    /// Last group when an odd number of groups was given
    pub untested: Option<String>,
}

/// Complete report written to disk
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub summary: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_test: Option<TTestReport>,
    pub plots: PlotData,
}

pub fn summary_row<G: TraceSummary>(group: &G) -> SummaryRow {
    SummaryRow {
        name: group.name().to_string(),
        active_nodes: group.n_nodes(),
        acks: group.n_acks(),
        direct_acks: group.n_direct_acks(),
        improvement: group.percent_improvement(),
        utility: group.utility(),
        stdev: group.stdev_acks(),
    }
}

pub fn summarize<G: TraceSummary>(groups: &[G]) -> Vec<SummaryRow> {
    groups.iter().map(summary_row).collect()
}

/// Compare groups two at a time in the order given
pub fn pairwise_t_tests(groups: &[TraceGroup], metric: ComparisonMetric) -> TTestReport {
    let mut rows = Vec::new();
    let mut untested = None;

    for pair in groups.chunks(2) {
        match pair {
            [g1, g2] => {
                let test = stats::student_t_test(&metric.run_samples(g1), &metric.run_samples(g2));
                if test.is_none() {
                    log::warn!(
                        "Not enough runs to compare {} with {}",
                        g1.name(),
                        g2.name()
                    );
                }
                rows.push(TTestRow {
                    group1: g1.name().to_string(),
                    group2: g2.name().to_string(),
                    mean1: metric.group_mean(g1),
                    mean2: metric.group_mean(g2),
                    test,
                });
            }
            [last] => untested = Some(last.name().to_string()),
            _ => {}
        }
    }

    TTestReport {
        metric,
        rows,
        untested,
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Render the summary table
pub fn format_summary_table(rows: &[SummaryRow]) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(110));
    lines.push(format!("{:^110}", "Summary"));
    lines.push("=".repeat(110));
    lines.push(format!(
        "{:<24} {:>12} {:>12} {:>14} {:>14} {:>12} {:>12}",
        "Group name", "Active Nodes", "# ACKs", "# Direct ACKs", "% Improvement", "Utility", "Stdev"
    ));
    lines.push(String::new());

    for row in rows {
        lines.push(format!(
            "{:<24} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>12} {:>12.2}",
            row.name,
            row.active_nodes,
            row.acks,
            row.direct_acks,
            row.improvement,
            fmt_opt(row.utility),
            row.stdev
        ));
    }

    lines.push("=".repeat(110));
    lines.join("\n")
}

/// Render the t-test table
pub fn format_t_test_table(report: &TTestReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(110));
    lines.push(format!("{:^110}", "T-Test"));
    lines.push("=".repeat(110));
    if report.metric == ComparisonMetric::Utility {
        lines.push("Using utility instead of # ACKs".to_string());
    }
    lines.push(format!(
        "{:<24} {:<24} {:>12} {:>12} {:>14} {:>12}",
        "Group 1 name", "Group 2 name", "Group 1 mean", "Group 2 mean", "t-statistic", "p-value"
    ));
    lines.push(String::new());

    for row in &report.rows {
        let (t, p) = match row.test {
            Some(ref test) => (format!("{:.2}", test.t_statistic), format!("{:.2}", test.p_value)),
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        lines.push(format!(
            "{:<24} {:<24} {:>12} {:>12} {:>14} {:>12}",
            row.group1,
            row.group2,
            fmt_opt(row.mean1),
            fmt_opt(row.mean2),
            t,
            p
        ));
    }

    if let Some(ref name) = report.untested {
        lines.push(format!("Not testing {} as uneven number of groups provided.", name));
    }

    lines.push("=".repeat(110));
    lines.join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}
