//! Time series merging and transforms.
//!
//! Runs produce sparse `(time, count)` series. Groups average them with a
//! k-way merge on timestamps; plotting code then applies the cumulative and
//! normalization transforms.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::types::{SimTime, TimeSeries};

/// Next unread point of one input series, ordered so the heap pops the
/// earliest time first
#[derive(Debug)]
struct Cursor {
    time: SimTime,
    series: usize,
    index: usize,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.series.cmp(&self.series))
    }
}

/// Merge several series into one averaged series.
///
/// The output holds every timestamp present in any input, ascending. The value
/// at a timestamp is the sum of the counts of all inputs having that exact
/// timestamp, divided by the total number of inputs: a series missing a
/// timestamp counts as zero there.
pub fn average_times(runs: &[&TimeSeries]) -> TimeSeries {
    let n_runs = runs.len() as f64;
    let mut heap = BinaryHeap::with_capacity(runs.len());

    for (series, run) in runs.iter().enumerate() {
        if !run.is_empty() {
            heap.push(Cursor {
                time: run.times[0],
                series,
                index: 0,
            });
        }
    }

    let mut merged = TimeSeries::default();

    while let Some(first) = heap.pop() {
        let time = first.time;
        let mut total = 0.0;
        let mut cursor = Some(first);

        while let Some(c) = cursor {
            let run = runs[c.series];
            total += run.counts[c.index];

            let next = c.index + 1;
            if next < run.len() {
                heap.push(Cursor {
                    time: run.times[next],
                    series: c.series,
                    index: next,
                });
            }

            let same_time = heap.peek().is_some_and(|top| top.time == time);
            cursor = if same_time { heap.pop() } else { None };
        }

        merged.times.push(time);
        merged.counts.push(total / n_runs);
    }

    merged
}

/// Turn per-slice counts into running totals.
///
/// Slices with a zero count are left at zero rather than showing the running
/// total.
pub fn cumulative(mut series: TimeSeries) -> TimeSeries {
    let mut total = 0.0;
    let len = series.len();
    for count in series.counts.iter_mut().take(len) {
        if *count != 0.0 {
            total += *count;
            *count = total;
        }
    }
    series
}

/// Divide every count by `n_nodes`, giving the fraction of nodes per slice.
///
/// Returns `None` when there are no nodes to normalize by.
pub fn normalized(series: &TimeSeries, n_nodes: f64) -> Option<TimeSeries> {
    if n_nodes == 0.0 {
        return None;
    }
    Some(TimeSeries::new(
        series.times.clone(),
        series.counts.iter().map(|c| c / n_nodes).collect(),
    ))
}
