//! Core data types for overlay trace analysis.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Simulation timestamp in seconds, already rounded to the configured resolution
pub type SimTime = f64;

/// Errors raised while reading traces or building aggregates
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Malformed path {path}: {reason}")]
    MalformedPath { path: PathBuf, reason: String },

    #[error("Malformed line {line} in {path}: {reason}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No trace runs found in {path}")]
    EmptyGroup { path: PathBuf },

    #[error("Number of given {kind} labels ({given}) must equal the number of groups ({groups}) or 1")]
    LabelCount {
        kind: &'static str,
        given: usize,
        groups: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Counters for a single overlay node during one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct TraceNode {
    pub id: String,
    pub acks: u64,
    pub direct_acks: u64,
    /// Rounded time of the first ACK, 0 while no ACK has been seen
    pub first_ack_time: SimTime,
    pub sends: u64,
    pub forwards: u64,
}

impl TraceNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            acks: 0,
            direct_acks: 0,
            first_ack_time: 0.0,
            sends: 0,
            forwards: 0,
        }
    }

    /// Record an ACK arriving at `time`. Only the first ACK sets the first ACK time.
    pub fn record_ack(&mut self, time: SimTime, direct: bool) {
        self.acks += 1;
        if self.first_ack_time == 0.0 {
            self.first_ack_time = time;
        }
        if direct {
            self.direct_acks += 1;
        }
    }

    pub fn first_ack(&self) -> Option<SimTime> {
        (self.first_ack_time != 0.0).then_some(self.first_ack_time)
    }

    /// Packets this node put on the wire, its own and relayed ones
    pub fn total_sends(&self) -> u64 {
        self.sends + self.forwards
    }

    /// Reciprocal of the time to first ACK.
    ///
    /// Nodes that got a direct ACK never used the overlay and yield `None`;
    /// nodes that never heard back yield 0.
    pub fn utility(&self) -> Option<f64> {
        if self.direct_acks > 0 {
            return None;
        }
        match self.first_ack() {
            Some(t) => Some(1.0 / t),
            None => Some(0.0),
        }
    }
}

impl fmt::Display for TraceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}", self.id)?;
        if self.acks > 0 {
            let kind = if self.direct_acks > 0 { "direct" } else { "indirect" };
            write!(f, " received first {} ACK at {}", kind, self.first_ack_time)?;
        }
        write!(f, " sent {} and forwarded {} packets", self.sends, self.forwards)
    }
}

/// Experiment parameters recovered from the directory hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub fprob: f64,
    pub heuristic: String,
}

/// Sparse event counts over time: `counts[i]` events at `times[i]`.
///
/// Times are strictly ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    pub times: Vec<SimTime>,
    pub counts: Vec<f64>,
}

impl TimeSeries {
    pub fn new(times: Vec<SimTime>, counts: Vec<f64>) -> Self {
        Self { times, counts }
    }

    pub fn len(&self) -> usize {
        self.times.len().min(self.counts.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(time, count)` points
    pub fn points(&self) -> impl Iterator<Item = (SimTime, f64)> + '_ {
        self.times.iter().copied().zip(self.counts.iter().copied())
    }
}
