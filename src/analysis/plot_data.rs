//! Data behind the comparison graphs.
//!
//! Rendering is left to external tools; this module produces the exact
//! series each graph plots so they can be exported with the report.

use serde::Serialize;

use super::group::{TraceGroup, TraceSummary};
use super::run::TraceRun;
use super::stats;
use super::time_series::{cumulative, normalized};
use super::types::TimeSeries;

/// One labelled line on a time-based graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub label: String,
    pub series: TimeSeries,
}

/// One labelled bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    /// Infinite values are exported as `null`
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilityPoint {
    pub fprob: f64,
    pub utility: Option<f64>,
    pub runs: usize,
}

/// Average utility against failure probability for one heuristic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilityCurve {
    pub heuristic: String,
    pub points: Vec<UtilityPoint>,
}

/// Every graph requested on the command line
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlotData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_acks: Option<Vec<Curve>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub congestion: Option<Vec<Curve>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<Vec<Bar>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utility: Option<Vec<UtilityCurve>>,
}

fn normalized_curve<G: TraceSummary>(
    group: &G,
    series: &TimeSeries,
    what: &str,
) -> Option<TimeSeries> {
    let result = normalized(series, group.n_nodes());
    if result.is_none() {
        log::warn!(
            "Group {} has no active nodes, leaving it out of the {} graph",
            group.name(),
            what
        );
    }
    result
}

/// Cumulative fraction of nodes ACKed over time
pub fn cumulative_ack_curves<G: TraceSummary>(groups: &[G]) -> Vec<Curve> {
    groups
        .iter()
        .filter_map(|g| {
            normalized_curve(g, g.ack_times(), "ACK").map(|series| Curve {
                label: g.name().to_string(),
                series: cumulative(series),
            })
        })
        .collect()
}

/// Connection attempts per node over time
pub fn congestion_curves<G: TraceSummary>(groups: &[G]) -> Vec<Curve> {
    groups
        .iter()
        .filter_map(|g| {
            normalized_curve(g, g.send_times(), "congestion").map(|series| Curve {
                label: g.name().to_string(),
                series,
            })
        })
        .collect()
}

/// Percent improvement from overlay usage, one bar per group
pub fn improvement_bars<G: TraceSummary>(groups: &[G]) -> Vec<Bar> {
    groups
        .iter()
        .map(|g| Bar {
            label: g.name().to_string(),
            value: g.percent_improvement(),
        })
        .collect()
}

/// Average run utility for each (heuristic, failure probability) pair.
///
/// Runs from all groups are pooled, sorted by heuristic then failure
/// probability, and adjacent runs with equal keys are averaged. Curves come
/// out ordered by heuristic name with ascending failure probabilities.
pub fn utility_curves(groups: &[TraceGroup]) -> Vec<UtilityCurve> {
    let mut runs: Vec<&TraceRun> = groups.iter().flat_map(|g| g.traces()).collect();
    runs.sort_by(|a, b| {
        a.params()
            .heuristic
            .cmp(&b.params().heuristic)
            .then(a.params().fprob.total_cmp(&b.params().fprob))
    });

    runs.chunk_by(|a, b| a.params().heuristic == b.params().heuristic)
        .map(|by_heuristic| {
            let points = by_heuristic
                .chunk_by(|a, b| a.params().fprob == b.params().fprob)
                .map(|by_fprob| {
                    let utilities: Vec<f64> =
                        by_fprob.iter().filter_map(|r| r.utility()).collect();
                    UtilityPoint {
                        fprob: by_fprob[0].params().fprob,
                        utility: stats::mean(&utilities),
                        runs: by_fprob.len(),
                    }
                })
                .collect();

            UtilityCurve {
                heuristic: by_heuristic[0].params().heuristic.clone(),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_parser::parse_trace;
    use crate::analysis::types::Parameters;
    use crate::config::AnalyzerConfig;
    use std::io::Cursor;
    use std::path::Path;

    fn run(heuristic: &str, fprob: f64, ack_time: &str) -> TraceRun {
        let config = AnalyzerConfig::default();
        let text = format!(
            "Node 1 sent 1 packet at 0.5\n\
             Node 2 sent 1 packet at 0.5\n\
             Node 1 received indirect ACK at {}\n",
            ack_time
        );
        let trace = parse_trace(Cursor::new(text), Path::new("r"), &config).unwrap();
        let params = Parameters {
            fprob,
            heuristic: heuristic.to_string(),
        };
        TraceRun::new("r", params, trace, &config)
    }

    #[test]
    fn test_utility_curves_grouping() {
        let groups = vec![
            TraceGroup::from_runs("x", vec![run("random", 0.5, "1.0"), run("ortho", 0.1, "2.0")])
                .unwrap(),
            TraceGroup::from_runs("y", vec![run("random", 0.1, "4.0"), run("random", 0.5, "2.0")])
                .unwrap(),
        ];

        let curves = utility_curves(&groups);
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].heuristic, "ortho");
        assert_eq!(curves[1].heuristic, "random");

        let random = &curves[1].points;
        assert_eq!(random.len(), 2);
        assert_eq!(random[0].fprob, 0.1);
        assert_eq!(random[0].runs, 1);
        // Node utilities 1/4 and 0
        assert_eq!(random[0].utility, Some(0.125));
        assert_eq!(random[1].fprob, 0.5);
        assert_eq!(random[1].runs, 2);
        // Run utilities 0.5 and 0.25
        assert_eq!(random[1].utility, Some(0.375));
    }

    #[test]
    fn test_time_curves() {
        let groups = vec![TraceGroup::single(run("random", 0.1, "1.0"))];

        let acks = cumulative_ack_curves(&groups);
        assert_eq!(acks[0].label, "r");
        assert_eq!(acks[0].series.times, vec![1.0]);
        assert_eq!(acks[0].series.counts, vec![0.5]);

        let sends = congestion_curves(&groups);
        assert_eq!(sends[0].series.counts, vec![1.0]);

        let bars = improvement_bars(&groups);
        assert_eq!(bars[0].value, f64::INFINITY);
    }
}
