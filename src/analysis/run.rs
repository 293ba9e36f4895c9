//! A single simulation run parsed from one trace file.

use std::collections::HashMap;
use std::path::Path;

use crate::config::AnalyzerConfig;

use super::log_parser::{histogram_to_series, parse_trace_file, ParsedTrace};
use super::stats;
use super::types::*;

/// One parsed trace with its derived statistics.
///
/// All statistics are computed when the run is built; a run never changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct TraceRun {
    name: String,
    params: Parameters,
    nodes: HashMap<String, TraceNode>,
    send_times: TimeSeries,
    forward_times: TimeSeries,
    ack_times: TimeSeries,
    n_nodes: usize,
    n_acks: usize,
    n_direct_acks: usize,
    n_sends: u64,
    utility: Option<f64>,
}

impl TraceRun {
    /// Parse the trace at `path`, taking the parameters from its directory.
    pub fn from_path(path: &Path, config: &AnalyzerConfig) -> Result<Self, TraceError> {
        let params = Parameters::from_path(path)?;
        let trace = parse_trace_file(path, config)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Run".to_string());

        Ok(Self::new(name, params, trace, config))
    }

    pub fn new(
        name: impl Into<String>,
        params: Parameters,
        trace: ParsedTrace,
        config: &AnalyzerConfig,
    ) -> Self {
        let nodes = trace.nodes;

        let n_nodes = nodes.values().filter(|n| n.sends > 0).count();
        let n_acks = nodes.values().filter(|n| n.acks > 0).count();
        let n_direct_acks = nodes.values().filter(|n| n.direct_acks > 0).count();
        let n_sends = nodes.values().map(|n| n.sends).sum();

        let utilities: Vec<f64> = nodes.values().filter_map(TraceNode::utility).collect();
        let utility = stats::mean(&utilities);

        Self {
            name: name.into(),
            params,
            send_times: histogram_to_series(&trace.send_times, config),
            forward_times: histogram_to_series(&trace.forward_times, config),
            ack_times: histogram_to_series(&trace.ack_times, config),
            nodes,
            n_nodes,
            n_acks,
            n_direct_acks,
            n_sends,
            utility,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn nodes(&self) -> &HashMap<String, TraceNode> {
        &self.nodes
    }

    /// Number of nodes that attempted contact with the server
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of nodes that received at least one ACK
    pub fn n_acks(&self) -> usize {
        self.n_acks
    }

    /// Number of nodes that received at least one direct ACK
    pub fn n_direct_acks(&self) -> usize {
        self.n_direct_acks
    }

    /// Nodes reached only through the overlay
    pub fn net_acks(&self) -> f64 {
        self.n_acks as f64 - self.n_direct_acks as f64
    }

    /// Total packets originated by all nodes
    pub fn n_sends(&self) -> u64 {
        self.n_sends
    }

    /// Mean node utility, `None` when every node got a direct ACK
    pub fn utility(&self) -> Option<f64> {
        self.utility
    }

    pub fn send_times(&self) -> &TimeSeries {
        &self.send_times
    }

    pub fn forward_times(&self) -> &TimeSeries {
        &self.forward_times
    }

    pub fn ack_times(&self) -> &TimeSeries {
        &self.ack_times
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_parser::parse_trace;
    use std::io::Cursor;

    fn run_from_str(text: &str) -> TraceRun {
        let config = AnalyzerConfig::default();
        let trace = parse_trace(Cursor::new(text), Path::new("run0"), &config).unwrap();
        let params = Parameters {
            fprob: 0.1,
            heuristic: "random".to_string(),
        };
        TraceRun::new("run0", params, trace, &config)
    }

    #[test]
    fn test_run_counts() {
        let run = run_from_str(
            "Node 1 sent 1 packet at 1.0\n\
             Node 2 sent 1 packet at 1.0\n\
             Node 3 sent 1 packet at 1.1\n\
             Node 4 forwarded 1 packet at 1.5\n\
             Node 1 received direct ACK at 1.2\n\
             Node 2 received indirect ACK at 2.0\n\
             Node 2 received indirect ACK at 2.5\n",
        );

        assert_eq!(run.nodes().len(), 4);
        assert_eq!(run.n_nodes(), 3);
        assert_eq!(run.n_acks(), 2);
        assert_eq!(run.n_direct_acks(), 1);
        assert_eq!(run.net_acks(), 1.0);
        assert_eq!(run.n_sends(), 3);

        // Node 1 excluded; node 2 -> 1/2.0; nodes 3 and 4 -> 0
        let utility = run.utility().unwrap();
        assert!((utility - 0.5 / 3.0).abs() < 1e-12);

        assert_eq!(run.send_times().times, vec![1.0, 1.1]);
        assert_eq!(run.send_times().counts, vec![2.0, 1.0]);
        assert_eq!(run.forward_times().counts, vec![1.0]);
        assert_eq!(run.ack_times().times, vec![1.2, 2.0, 2.5]);
    }

    #[test]
    fn test_node_count_matches_senders() {
        let run = run_from_str(
            "Node 1 sent 1 packet at 0.3\n\
             Node 9 forwarded 1 packet at 0.4\n\
             Node 7 received indirect ACK at 0.9\n",
        );

        let senders = run.nodes().values().filter(|n| n.sends > 0).count();
        assert_eq!(run.n_nodes(), senders);
        assert!(run.n_nodes() <= run.nodes().len());
        assert!(run.nodes().values().all(|n| n.direct_acks <= n.acks));
    }

    #[test]
    fn test_all_direct_acks_leave_utility_undefined() {
        let run = run_from_str(
            "Node 1 sent 1 packet at 0.5\n\
             Node 1 received direct ACK at 1.0\n",
        );
        assert_eq!(run.n_direct_acks(), 1);
        assert_eq!(run.utility(), None);
    }
}
