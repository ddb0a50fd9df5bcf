// benchdigest - storage engine benchmark log aggregation
// Root library module

pub mod builders;
pub mod config;
pub mod grouping;
pub mod loader;
pub mod observability;
pub mod pure;
pub mod record_parser;
pub mod report;
pub mod types;

// Re-export logging entry points
pub use observability::{
    init_logging,
    init_logging_with_level,
    log_operation,
    Operation,
    OperationContext,
    PerfTimer,
};

// Re-export the data model
pub use types::{DayKey, Measurement, WorkloadName};

// Re-export the pipeline stages
pub use record_parser::{parse_line, LineOutcome, ParseError, BENCHMARK_MARKER, MAX_LINE_BYTES};
pub use grouping::{GroupingStore, Workload};
pub use pure::{
    aggregate_day,
    band,
    cook_workload,
    cook_workload_checked,
    AggregateError,
    Band,
    CookedWorkload,
    DayAggregate,
};
pub use report::{Report, ReportBuilder};

// Re-export I/O plumbing and configuration
pub use loader::{
    day_for_path,
    discover_files,
    load_file,
    load_lines,
    Discovery,
    DiscoveredFile,
    LoadError,
    LoadStats,
    Loader,
};
pub use builders::LoaderConfigBuilder;
pub use config::{LoaderConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
