//! Groups of runs that share simulation parameters.
//!
//! A group usually holds every run found in one experiment directory. Its
//! statistics are means over the runs (a mean of per-run values, never a
//! recomputation from pooled nodes), and its time series are the runs' series
//! merged with [`average_times`].

use std::fs;
use std::path::{Component, Path};

use crate::config::AnalyzerConfig;

use super::run::TraceRun;
use super::stats;
use super::time_series::average_times;
use super::types::*;

/// Statistics shared by single runs and averaged groups
pub trait TraceSummary {
    fn name(&self) -> &str;
    fn n_nodes(&self) -> f64;
    fn n_acks(&self) -> f64;
    fn n_direct_acks(&self) -> f64;
    fn utility(&self) -> Option<f64>;
    fn stdev_acks(&self) -> f64;
    fn send_times(&self) -> &TimeSeries;
    fn forward_times(&self) -> &TimeSeries;
    fn ack_times(&self) -> &TimeSeries;

    fn percent_improvement(&self) -> f64 {
        stats::percent_improvement(self.n_acks(), self.n_direct_acks())
    }
}

impl TraceSummary for TraceRun {
    fn name(&self) -> &str {
        TraceRun::name(self)
    }

    fn n_nodes(&self) -> f64 {
        TraceRun::n_nodes(self) as f64
    }

    fn n_acks(&self) -> f64 {
        TraceRun::n_acks(self) as f64
    }

    fn n_direct_acks(&self) -> f64 {
        TraceRun::n_direct_acks(self) as f64
    }

    fn utility(&self) -> Option<f64> {
        TraceRun::utility(self)
    }

    fn stdev_acks(&self) -> f64 {
        0.0
    }

    fn send_times(&self) -> &TimeSeries {
        TraceRun::send_times(self)
    }

    fn forward_times(&self) -> &TimeSeries {
        TraceRun::forward_times(self)
    }

    fn ack_times(&self) -> &TimeSeries {
        TraceRun::ack_times(self)
    }
}

/// Several runs averaged together
#[derive(Debug, Clone)]
pub struct TraceGroup {
    name: String,
    traces: Vec<TraceRun>,
    n_nodes: f64,
    n_acks: f64,
    n_direct_acks: f64,
    stdev_acks: f64,
    utility: Option<f64>,
    send_times: TimeSeries,
    forward_times: TimeSeries,
    ack_times: TimeSeries,
}

impl TraceGroup {
    /// Parse every non-hidden file in `folder` as one run of this group.
    ///
    /// Subdirectories are skipped; they hold notes and graphs. Entries are
    /// read in name order.
    pub fn from_dir(folder: &Path, config: &AnalyzerConfig) -> Result<Self, TraceError> {
        let io_err = |source| TraceError::Io {
            path: folder.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(folder).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                log::debug!("Skipping subdirectory {}", path.display());
                continue;
            }
            entries.push(path);
        }
        entries.sort();

        log::info!("Parsing {} runs from {}", entries.len(), folder.display());
        let traces = entries
            .iter()
            .map(|path| TraceRun::from_path(path, config))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_runs(group_name(folder), traces).ok_or_else(|| TraceError::EmptyGroup {
            path: folder.to_path_buf(),
        })
    }

    /// Average the given runs. Returns `None` for an empty set.
    pub fn from_runs(name: impl Into<String>, traces: Vec<TraceRun>) -> Option<Self> {
        if traces.is_empty() {
            return None;
        }
        Some(Self::aggregate(name.into(), traces))
    }

    /// Wrap one run as its own group, named after the run
    pub fn single(run: TraceRun) -> Self {
        let name = run.name().to_string();
        Self::aggregate(name, vec![run])
    }

    fn aggregate(name: String, traces: Vec<TraceRun>) -> Self {
        let per_run = |f: fn(&TraceRun) -> usize| -> Vec<f64> {
            traces.iter().map(|t| f(t) as f64).collect()
        };
        let nodes = per_run(TraceRun::n_nodes);
        let acks = per_run(TraceRun::n_acks);
        let direct_acks = per_run(TraceRun::n_direct_acks);

        let utilities: Vec<f64> = traces.iter().filter_map(TraceRun::utility).collect();

        let series = |f: fn(&TraceRun) -> &TimeSeries| -> TimeSeries {
            let runs: Vec<&TimeSeries> = traces.iter().map(f).collect();
            average_times(&runs)
        };
        let send_times = series(TraceRun::send_times);
        let forward_times = series(TraceRun::forward_times);
        let ack_times = series(TraceRun::ack_times);

        Self {
            name,
            n_nodes: stats::mean(&nodes).unwrap_or(0.0),
            n_acks: stats::mean(&acks).unwrap_or(0.0),
            n_direct_acks: stats::mean(&direct_acks).unwrap_or(0.0),
            stdev_acks: stats::sample_std_dev(&acks),
            utility: stats::mean(&utilities),
            send_times,
            forward_times,
            ack_times,
            traces,
        }
    }

    /// Split this group into one group per run
    pub fn separate(self) -> Vec<TraceGroup> {
        self.traces.into_iter().map(TraceGroup::single).collect()
    }

    pub fn traces(&self) -> &[TraceRun] {
        &self.traces
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl TraceSummary for TraceGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_nodes(&self) -> f64 {
        self.n_nodes
    }

    fn n_acks(&self) -> f64 {
        self.n_acks
    }

    fn n_direct_acks(&self) -> f64 {
        self.n_direct_acks
    }

    /// Mean of the per-run utilities that are defined
    fn utility(&self) -> Option<f64> {
        self.utility
    }

    fn stdev_acks(&self) -> f64 {
        self.stdev_acks
    }

    fn send_times(&self) -> &TimeSeries {
        &self.send_times
    }

    fn forward_times(&self) -> &TimeSeries {
        &self.forward_times
    }

    fn ack_times(&self) -> &TimeSeries {
        &self.ack_times
    }
}

/// Last non-empty path segment with underscores turned into spaces
pub fn group_name(folder: &Path) -> String {
    folder
        .components()
        .rev()
        .find_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().replace('_', " ")),
            _ => None,
        })
        .unwrap_or_else(|| "Group".to_string())
}

/// How a list of labels is combined with the existing group names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    Replace,
    Prepend,
    Append,
}

impl LabelMode {
    fn kind(self) -> &'static str {
        match self {
            LabelMode::Replace => "group",
            LabelMode::Prepend => "prepend",
            LabelMode::Append => "append",
        }
    }
}

/// Relabel groups. `labels` holds either one label for every group or
/// exactly one label per group.
pub fn apply_labels(
    groups: &mut [TraceGroup],
    labels: &[String],
    mode: LabelMode,
) -> Result<(), TraceError> {
    if labels.len() != groups.len() && labels.len() != 1 {
        return Err(TraceError::LabelCount {
            kind: mode.kind(),
            given: labels.len(),
            groups: groups.len(),
        });
    }

    for (i, group) in groups.iter_mut().enumerate() {
        let label = if labels.len() == 1 { &labels[0] } else { &labels[i] };
        let name = match mode {
            LabelMode::Replace => label.clone(),
            LabelMode::Prepend => format!("{}{}", label, group.name),
            LabelMode::Append => format!("{}{}", group.name, label),
        };
        group.set_name(name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_parser::parse_trace;
    use std::io::Cursor;

    fn run(name: &str, text: &str) -> TraceRun {
        let config = AnalyzerConfig::default();
        let trace = parse_trace(Cursor::new(text), Path::new(name), &config).unwrap();
        let params = Parameters {
            fprob: 0.2,
            heuristic: "ortho".to_string(),
        };
        TraceRun::new(name, params, trace, &config)
    }

    fn three_runs() -> Vec<TraceRun> {
        vec![
            run(
                "0",
                "Node 1 sent 1 packet at 1.0\n\
                 Node 1 received indirect ACK at 2.0\n",
            ),
            run(
                "1",
                "Node 1 sent 1 packet at 1.0\n\
                 Node 2 sent 1 packet at 1.0\n\
                 Node 1 received direct ACK at 1.5\n\
                 Node 2 received indirect ACK at 4.0\n",
            ),
            run(
                "2",
                "Node 1 sent 1 packet at 1.0\n\
                 Node 2 sent 1 packet at 1.0\n\
                 Node 3 sent 1 packet at 1.0\n\
                 Node 3 received direct ACK at 1.5\n",
            ),
        ]
    }

    #[test]
    fn test_group_means_of_runs() {
        let group = TraceGroup::from_runs("g", three_runs()).unwrap();

        assert_eq!(group.len(), 3);
        assert_eq!(group.n_nodes(), 2.0);
        assert_eq!(group.n_acks(), (1.0 + 2.0 + 1.0) / 3.0);
        assert_eq!(group.n_direct_acks(), 2.0 / 3.0);

        // Run utilities: 0.5, 0.25, 0.0
        let utility = group.utility().unwrap();
        assert!((utility - 0.25).abs() < 1e-12);

        let stdev = group.stdev_acks();
        assert!((stdev - 0.57735).abs() < 1e-4);

        assert_eq!(group.send_times().times, vec![1.0]);
        assert_eq!(group.send_times().counts, vec![2.0]);
        assert_eq!(group.ack_times().times, vec![1.5, 2.0, 4.0]);
        assert_eq!(group.ack_times().counts, vec![2.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
    }

    #[test]
    fn test_stdev_all_zero_acks() {
        let runs = vec![
            run("a", "Node 1 sent 1 packet at 1.0\n"),
            run("b", "Node 1 sent 1 packet at 1.0\n"),
            run("c", "Node 2 sent 1 packet at 1.3\n"),
        ];
        let group = TraceGroup::from_runs("quiet", runs).unwrap();
        assert_eq!(group.stdev_acks(), 0.0);
        assert_eq!(group.n_acks(), 0.0);
        assert_eq!(group.percent_improvement(), f64::INFINITY);
    }

    #[test]
    fn test_empty_group() {
        assert!(TraceGroup::from_runs("none", Vec::new()).is_none());
    }

    #[test]
    fn test_single_and_separate() {
        let group = TraceGroup::from_runs("g", three_runs()).unwrap();
        let separated = group.separate();
        assert_eq!(separated.len(), 3);
        assert_eq!(separated[1].name(), "1");
        assert_eq!(separated[1].n_nodes(), 2.0);
        assert_eq!(separated[1].stdev_acks(), 0.0);
        assert_eq!(separated[1].ack_times().counts, vec![1.0, 1.0]);
    }

    #[test]
    fn test_group_name() {
        assert_eq!(group_name(Path::new("runs/0.1/low_degree/")), "low degree");
        assert_eq!(group_name(Path::new("/")), "Group");
    }

    #[test]
    fn test_apply_labels() {
        let mut groups = TraceGroup::from_runs("g", three_runs()).unwrap().separate();

        apply_labels(&mut groups, &["run ".to_string()], LabelMode::Prepend).unwrap();
        assert_eq!(groups[2].name(), "run 2");

        let labels: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        apply_labels(&mut groups, &labels, LabelMode::Replace).unwrap();
        apply_labels(&mut groups, &["!".to_string()], LabelMode::Append).unwrap();
        assert_eq!(groups[0].name(), "a!");
        assert_eq!(groups[1].name(), "b!");

        let err = apply_labels(&mut groups, &labels[..2], LabelMode::Append).unwrap_err();
        assert!(matches!(err, TraceError::LabelCount { given: 2, groups: 3, .. }));
    }
}
