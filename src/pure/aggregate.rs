// Day Aggregation - outlier-filtered mean of one day's runs
//
// Throughput alone decides which runs are kept: a run survives when its
// ops/sec lies inside [mean - stddev, mean + stddev] of the day, where stddev
// is the population standard deviation. Every field of the surviving runs is
// then averaged.

use crate::types::Measurement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusion interval around the mean throughput of a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub mean: f64,
    /// Population standard deviation (divides by n, not n - 1)
    pub stddev: f64,
}

impl Band {
    pub fn low(&self) -> f64 {
        self.mean - self.stddev
    }

    pub fn high(&self) -> f64 {
        self.mean + self.stddev
    }

    /// Both ends are inclusive
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.low() || value > self.high())
    }
}

/// Compute the band of a sample; `None` for an empty sample
pub fn band(values: &[f64]) -> Option<Band> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some(Band {
        mean,
        stddev: variance.sqrt(),
    })
}

/// Averages of the runs retained for one (workload, day)
///
/// `Display` renders the blob columns: throughput and amplification to one
/// decimal place, byte counters as truncated integer averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayAggregate {
    pub ops_per_sec: f64,
    pub read_bytes: i64,
    pub write_bytes: i64,
    pub read_amp: f64,
    pub write_amp: f64,
    /// Runs inside the band
    pub retained: usize,
    /// Runs in the group before filtering
    pub total: usize,
}

impl DayAggregate {
    pub fn excluded(&self) -> usize {
        self.total - self.retained
    }
}

impl fmt::Display for DayAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1},{},{},{:.1},{:.1}",
            self.ops_per_sec, self.read_bytes, self.write_bytes, self.read_amp, self.write_amp
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error("cannot aggregate an empty group of runs")]
    EmptyGroup,

    /// The closest run to the mean always lies within one stddev of it, so
    /// this only fires if that invariant is broken.
    #[error("invariant violated: no run of {total} within band {mean} +/- {stddev}")]
    NoRunsRetained { total: usize, mean: f64, stddev: f64 },
}

/// Reduce one day's runs to a single outlier-filtered aggregate
pub fn aggregate_day(runs: &[Measurement]) -> Result<DayAggregate, AggregateError> {
    let throughputs: Vec<f64> = runs.iter().map(|r| r.ops_per_sec).collect();
    let band = band(&throughputs).ok_or(AggregateError::EmptyGroup)?;

    let mut ops_per_sec = 0.0;
    let mut read_bytes: i128 = 0;
    let mut write_bytes: i128 = 0;
    let mut read_amp = 0.0;
    let mut write_amp = 0.0;
    let mut retained = 0usize;

    for run in runs.iter().filter(|r| band.contains(r.ops_per_sec)) {
        retained += 1;
        ops_per_sec += run.ops_per_sec;
        read_bytes += i128::from(run.read_bytes);
        write_bytes += i128::from(run.write_bytes);
        read_amp += run.read_amp;
        write_amp += run.write_amp;
    }

    if retained == 0 {
        return Err(AggregateError::NoRunsRetained {
            total: runs.len(),
            mean: band.mean,
            stddev: band.stddev,
        });
    }

    let count = retained as f64;
    Ok(DayAggregate {
        ops_per_sec: ops_per_sec / count,
        read_bytes: truncating_average(read_bytes, retained),
        write_bytes: truncating_average(write_bytes, retained),
        read_amp: read_amp / count,
        write_amp: write_amp / count,
        retained,
        total: runs.len(),
    })
}

/// Integer division truncating toward zero; the average of `i64` values
/// always fits back into an `i64`
fn truncating_average(sum: i128, count: usize) -> i64 {
    (sum / count as i128) as i64
}
