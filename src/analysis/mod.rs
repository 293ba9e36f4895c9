//! Trace analysis for resilient overlay network simulations.
//!
//! This module parses client traces into runs, averages runs into groups,
//! and derives the statistics and graph data used to compare groups.

pub mod types;
pub mod params;
pub mod log_parser;
pub mod run;
pub mod group;
pub mod time_series;
pub mod stats;
pub mod plot_data;
pub mod report;

pub use types::*;
pub use log_parser::parse_trace_file;
pub use run::TraceRun;
pub use group::{apply_labels, LabelMode, TraceGroup, TraceSummary};
pub use time_series::{average_times, cumulative, normalized};
pub use stats::percent_improvement;
pub use report::{generate_json_report, AnalysisReport, ComparisonMetric};
