// Observability Infrastructure
// Structured logging for loader runs. Diagnostics about skipped files and
// lines go through tracing, on stderr, so stdout stays free for callers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

const DEFAULT_FILTER: &str = "benchdigest=info,warn";
const VERBOSE_FILTER: &str = "benchdigest=debug,info";
const QUIET_FILTER: &str = "error";

/// Initialize the logging and tracing infrastructure
/// This should be called once at application startup
pub fn init_logging() {
    init_logging_with_level(false, false)
}

/// Initialize logging with configurable verbosity
///
/// A second call is a no-op; the first subscriber stays installed.
pub fn init_logging_with_level(verbose: bool, quiet: bool) {
    let filter_level = if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        // Warnings carry the skipped-file and skipped-line diagnostics
        EnvFilter::new(DEFAULT_FILTER)
    };

    // --quiet wins over RUST_LOG
    let env_filter = if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().unwrap_or(filter_level)
    } else {
        filter_level
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(!quiet)
        .with_line_number(verbose)
        .with_file(verbose)
        .with_ansi(use_ansi(std::io::stderr().is_terminal()));

    // Already initialized, which is fine in test environments
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Colors only when stderr is a terminal and `NO_COLOR` is unset
fn use_ansi(stderr_is_terminal: bool) -> bool {
    stderr_is_terminal && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
}

/// Loader operations that are logged on completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Startup {
        version: String,
    },
    Load {
        files_loaded: usize,
        records_parsed: usize,
        lines_rejected: usize,
    },
    BuildReport {
        workloads: usize,
    },
    WriteReport {
        path: String,
    },
}

/// Operation context for tracing a run through the system
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub parent_span_id: Option<Uuid>,
    pub operation: String,
    pub start_time: Instant,
    pub attributes: Vec<(String, String)>,
}

impl OperationContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            span_id: Uuid::new_v4(),
            parent_span_id: None,
            operation: operation.into(),
            start_time: Instant::now(),
            attributes: Vec::new(),
        }
    }

    pub fn child(&self, operation: impl Into<String>) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: Uuid::new_v4(),
            parent_span_id: Some(self.span_id),
            operation: operation.into(),
            start_time: Instant::now(),
            attributes: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Log an operation with full context
pub fn log_operation(ctx: &OperationContext, op: &Operation, result: &Result<()>) {
    let elapsed = ctx.elapsed();
    let attrs = ctx
        .attributes
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ");

    match result {
        Ok(()) => {
            info!(
                trace_id = %ctx.trace_id,
                span_id = %ctx.span_id,
                parent_span_id = ?ctx.parent_span_id,
                operation = %ctx.operation,
                elapsed_ms = elapsed.as_millis(),
                attributes = %attrs,
                "Operation completed: {:?}", op
            );
        }
        Err(e) => {
            error!(
                trace_id = %ctx.trace_id,
                span_id = %ctx.span_id,
                parent_span_id = ?ctx.parent_span_id,
                operation = %ctx.operation,
                elapsed_ms = elapsed.as_millis(),
                attributes = %attrs,
                error = %e,
                "Operation failed: {:?}", op
            );
        }
    }
}

/// Logs the elapsed time of a scope when dropped
pub struct PerfTimer {
    name: String,
    start: Instant,
    ctx: OperationContext,
}

impl PerfTimer {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let ctx = OperationContext::new(&name);
        Self {
            name,
            start: Instant::now(),
            ctx,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        info!(
            trace_id = %self.ctx.trace_id,
            elapsed_ms = self.start.elapsed().as_millis(),
            "Timer completed: {}", self.name
        );
    }
}
