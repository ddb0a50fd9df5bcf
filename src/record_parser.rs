//! Benchmark log line parsing
//!
//! Turns one line of benchmark output into a typed [`Measurement`]. The line
//! format is fixed:
//!
//! ```text
//! Benchmark<name> <iterations> <ops> ops/sec <read> read <write> write <ramp> r-amp <wamp> w-amp
//! ```
//!
//! Lines without the `Benchmark` marker are not benchmark results at all and
//! are reported as [`LineOutcome::Unmarked`]. Marked lines that do not match
//! the full pattern come back as [`LineOutcome::Malformed`] so the caller can
//! emit a diagnostic and keep going.

use crate::types::{Measurement, WorkloadName};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Literal prefix every benchmark result line starts with
pub const BENCHMARK_MARKER: &str = "Benchmark";

/// Longest line, newline excluded, that is looked at
pub const MAX_LINE_BYTES: usize = 64 * 1024;

static BENCHMARK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^Benchmark(?P<name>\S+)[ \t]+",
        r"(?P<iterations>\S+)[ \t]+",
        r"(?P<ops_per_sec>\S+)[ \t]+ops/sec[ \t]+",
        r"(?P<read_bytes>\S+)[ \t]+read[ \t]+",
        r"(?P<write_bytes>\S+)[ \t]+write[ \t]+",
        r"(?P<read_amp>\S+)[ \t]+r-amp[ \t]+",
        r"(?P<write_amp>\S+)[ \t]+w-amp[ \t]*\r?$",
    ))
    .expect("benchmark line pattern is valid")
});

/// Why a marked line could not be turned into a measurement
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line does not match the benchmark result pattern")]
    PatternMismatch,

    #[error("invalid {field} {value:?}: {reason}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("non-finite {field} {value:?}")]
    NonFinite { field: &'static str, value: String },

    #[error("invalid workload name: {reason}")]
    InvalidWorkload { reason: String },

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Result of looking at a single line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Not a benchmark result line; skip without a diagnostic
    Unmarked,
    /// Carries the marker but is not a well-formed result
    Malformed(ParseError),
    /// A complete benchmark result
    Record {
        workload: WorkloadName,
        measurement: Measurement,
    },
}

impl LineOutcome {
    pub fn is_record(&self) -> bool {
        matches!(self, LineOutcome::Record { .. })
    }
}

/// Parse one line of benchmark output
pub fn parse_line(line: &str) -> LineOutcome {
    if !line.starts_with(BENCHMARK_MARKER) {
        return LineOutcome::Unmarked;
    }

    match parse_marked_line(line) {
        Ok((workload, measurement)) => LineOutcome::Record {
            workload,
            measurement,
        },
        Err(e) => LineOutcome::Malformed(e),
    }
}

/// Parse a line already known to carry the marker
pub fn parse_marked_line(line: &str) -> Result<(WorkloadName, Measurement), ParseError> {
    let caps = BENCHMARK_LINE
        .captures(line)
        .ok_or(ParseError::PatternMismatch)?;

    let workload = WorkloadName::new(&caps["name"]).map_err(|e| ParseError::InvalidWorkload {
        reason: e.to_string(),
    })?;

    // Discarded, but still has to be an integer
    let _iterations = int_field(&caps, "iterations")?;

    let measurement = Measurement {
        ops_per_sec: float_field(&caps, "ops_per_sec")?,
        read_bytes: int_field(&caps, "read_bytes")?,
        write_bytes: int_field(&caps, "write_bytes")?,
        read_amp: float_field(&caps, "read_amp")?,
        write_amp: float_field(&caps, "write_amp")?,
    };

    Ok((workload, measurement))
}

fn int_field(caps: &Captures<'_>, field: &'static str) -> Result<i64, ParseError> {
    let value = &caps[field];
    value.parse::<i64>().map_err(|e| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn float_field(caps: &Captures<'_>, field: &'static str) -> Result<f64, ParseError> {
    let value = &caps[field];
    let parsed = value.parse::<f64>().map_err(|e| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(ParseError::NonFinite {
            field,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
