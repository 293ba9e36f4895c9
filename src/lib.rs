//! # RonTrace - Trace analyzer for resilient overlay network simulations
//!
//! This library parses the client traces written by overlay-routing resilience
//! simulations, aggregates them per node, per run and per experiment group, and
//! derives the statistics used to compare routing heuristics.
//!
//! ## Overview
//!
//! Every simulation run writes one trace file in which each line records a
//! node sending a packet, forwarding a packet for another node, or receiving an
//! ACK from the server (either directly or through the overlay). Runs sharing
//! the same parameters live in one directory and are averaged together.
//!
//! ## Directory Layout
//!
//! Parameters are encoded in the directory hierarchy:
//!
//! ```text
//! <root>/<failure probability>/<heuristic>/<run file>
//! traces/0.25/random/0
//! traces/0.25/random/1
//! traces/0.25/ortho/0
//! ```
//!
//! ## Architecture
//!
//! - `config`: analyzer settings (time resolution, output directory)
//! - `config_loader`: YAML configuration loading and CLI overrides
//! - `analysis::params`: parameter extraction from trace paths
//! - `analysis::log_parser`: trace line parsing into node counters and histograms
//! - `analysis::run`: per-run statistics
//! - `analysis::group`: per-group averages and merged time series
//! - `analysis::time_series`: k-way time series merge, cumulative and normalized views
//! - `analysis::stats`: percent improvement, standard deviation, t-tests
//! - `analysis::plot_data`: the series behind each comparison graph
//! - `analysis::report`: summary/t-test tables and JSON export
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rontrace::analysis::{TraceGroup, TraceSummary};
//! use rontrace::config::AnalyzerConfig;
//!
//! let config = AnalyzerConfig::default();
//! let group = TraceGroup::from_dir(Path::new("traces/0.25/random"), &config)?;
//!
//! println!("{}: {:.2} nodes, {:.2} ACKs", group.name(), group.n_nodes(), group.n_acks());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Parsing and aggregation return [`analysis::TraceError`]. The binary wraps
//! these with `color_eyre` for reporting; any malformed path or line aborts the
//! whole analysis.

pub mod analysis;
pub mod config;
pub mod config_loader;
