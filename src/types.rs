// Validated Types - Data Model
// Strongly-typed wrappers for the values that flow through the aggregation
// pipeline. Keys cannot be constructed with data that would corrupt the
// comma separated report blob.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// One benchmark run's result, as parsed from a single log line
///
/// Immutable once parsed; two measurements are equal when all five fields are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Throughput in ops/sec, drives outlier filtering
    pub ops_per_sec: f64,
    pub read_bytes: i64,
    pub write_bytes: i64,
    /// Read amplification ratio
    pub read_amp: f64,
    /// Write amplification ratio
    pub write_amp: f64,
}

impl Measurement {
    pub fn new(
        ops_per_sec: f64,
        read_bytes: i64,
        write_bytes: i64,
        read_amp: f64,
        write_amp: f64,
    ) -> Self {
        Self {
            ops_per_sec,
            read_bytes,
            write_bytes,
            read_amp,
            write_amp,
        }
    }
}

/// A day bucket identifier, usually a `YYYY-MM-DD` directory name
///
/// # Invariants
/// - Non-empty
/// - No newline (one blob line per day)
/// - No comma (first column of a blob line)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(String);

impl DayKey {
    pub fn new(day: impl Into<String>) -> Result<Self> {
        let day = day.into();
        ensure!(!day.is_empty(), "Day key cannot be empty");
        ensure!(
            !day.contains(['\n', '\r']),
            "Day key cannot contain line breaks: {day:?}"
        );
        ensure!(!day.contains(','), "Day key cannot contain commas: {day:?}");
        Ok(Self(day))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DayKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DayKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The name of a benchmark scenario, taken from the token after `Benchmark`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkloadName(String);

impl WorkloadName {
    /// # Invariants
    /// - Non-empty
    /// - No whitespace (the parser splits on it)
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        ensure!(!name.is_empty(), "Workload name cannot be empty");
        ensure!(
            !name.chars().any(char::is_whitespace),
            "Workload name cannot contain whitespace: {name:?}"
        );
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkloadName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WorkloadName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
