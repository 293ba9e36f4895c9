//! Trace parsing for overlay client logs.
//!
//! Each line of a trace is whitespace-tokenized and interpreted through fixed
//! token positions. Parsing produces per-node counters plus three sparse
//! histograms (sends, forwards, ACKs) keyed by rounded timestamp.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::AnalyzerConfig;

use super::types::*;

/// Token holding the node ID
pub const NODE_ID_INDEX: usize = 1;
/// Token holding the action keyword ("sent", "forwarded", ...)
pub const ACTION_INDEX: usize = 2;
/// Token telling direct ACKs apart from overlay ones
pub const DIRECT_ACK_INDEX: usize = 3;
/// Token holding the event timestamp, on lines long enough to carry one
pub const TIME_INDEX: usize = 6;

const ACK_MARKER: &str = "ACK";
const DIRECT_KEYWORD: &str = "direct";
const FORWARDED_KEYWORD: &str = "forwarded";
const SENT_KEYWORD: &str = "sent";

/// Event counts per histogram bucket
pub type Histogram = BTreeMap<i64, u64>;

/// Everything extracted from one trace file
#[derive(Debug, Clone, Default)]
pub struct ParsedTrace {
    pub nodes: HashMap<String, TraceNode>,
    pub send_times: Histogram,
    pub forward_times: Histogram,
    pub ack_times: Histogram,
}

/// Convert a histogram into an ascending time series
pub fn histogram_to_series(histogram: &Histogram, config: &AnalyzerConfig) -> TimeSeries {
    let (times, counts) = histogram
        .iter()
        .map(|(&bucket, &count)| (config.bucket_time(bucket), count as f64))
        .unzip();
    TimeSeries::new(times, counts)
}

/// Parse a single trace file
pub fn parse_trace_file(path: &Path, config: &AnalyzerConfig) -> Result<ParsedTrace, TraceError> {
    let file = File::open(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(64 * 1024, file);

    let trace = parse_trace(reader, path, config)?;
    log::debug!(
        "Parsed {}: {} nodes, {} ACK buckets",
        path.display(),
        trace.nodes.len(),
        trace.ack_times.len()
    );
    Ok(trace)
}

/// Parse trace lines from any reader. `path` is only used for error reporting.
pub fn parse_trace<R: BufRead>(
    reader: R,
    path: &Path,
    config: &AnalyzerConfig,
) -> Result<ParsedTrace, TraceError> {
    let mut trace = ParsedTrace::default();
    // Lines without their own timestamp reuse the last one seen
    let mut last_bucket: Option<i64> = None;

    for (index, line_result) in reader.lines().enumerate() {
        let line_no = index + 1;
        let malformed = |reason: String| TraceError::MalformedLine {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let line = line_result.map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let tokens: Vec<&str> = line.split_whitespace().collect();

        let token = |i: usize| {
            tokens.get(i).copied().ok_or_else(|| {
                malformed(format!("expected at least {} tokens, found {}", i + 1, tokens.len()))
            })
        };

        let node_id = token(NODE_ID_INDEX)?;

        if let Some(raw) = tokens.get(TIME_INDEX) {
            let time: f64 = raw
                .parse()
                .map_err(|_| malformed(format!("timestamp '{}' is not a number", raw)))?;
            if !time.is_finite() {
                return Err(malformed(format!("timestamp '{}' is not finite", raw)));
            }
            last_bucket = Some(config.bucket(time));
        }
        let current_bucket =
            || last_bucket.ok_or_else(|| malformed("no timestamp seen yet".to_string()));

        let node = trace
            .nodes
            .entry(node_id.to_string())
            .or_insert_with(|| TraceNode::new(node_id));

        if line.contains(ACK_MARKER) {
            let bucket = current_bucket()?;
            let direct = token(DIRECT_ACK_INDEX)? == DIRECT_KEYWORD;
            node.record_ack(config.bucket_time(bucket), direct);
            *trace.ack_times.entry(bucket).or_insert(0) += 1;
        }

        match token(ACTION_INDEX)? {
            FORWARDED_KEYWORD => {
                let bucket = current_bucket()?;
                node.forwards += 1;
                *trace.forward_times.entry(bucket).or_insert(0) += 1;
            }
            SENT_KEYWORD => {
                let bucket = current_bucket()?;
                node.sends += 1;
                *trace.send_times.entry(bucket).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    Ok(trace)
}
