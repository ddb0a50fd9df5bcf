// Pure Functions
// The numeric core of the report: per-day outlier filtering and averaging,
// and rendering a workload's days into its text blob. Nothing in here does
// I/O or logging, so every function can be tested in isolation.

pub mod aggregate;
pub mod cook;

pub use aggregate::{aggregate_day, band, AggregateError, Band, DayAggregate};
pub use cook::{cook_workload, cook_workload_checked, CookedWorkload};
