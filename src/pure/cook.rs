// Workload Cooking - render a workload's days into its report blob
//
// One line per day, `day,ops,read,write,ramp,wamp`, days ascending as plain
// strings. Every line, the last one included, ends with '\n'.

use super::aggregate::{aggregate_day, AggregateError};
use crate::grouping::Workload;
use crate::types::DayKey;

/// A rendered workload plus the days that could not be aggregated
#[derive(Debug, Clone, PartialEq)]
pub struct CookedWorkload {
    pub blob: String,
    pub days_emitted: usize,
    pub days_skipped: Vec<(DayKey, AggregateError)>,
}

/// Render a workload, reporting any day whose aggregate failed
///
/// A failed day contributes no line; the remaining days are still rendered.
pub fn cook_workload_checked(workload: &Workload) -> CookedWorkload {
    let mut blob = String::new();
    let mut days_emitted = 0;
    let mut days_skipped = Vec::new();

    for (day, runs) in workload.days() {
        match aggregate_day(runs) {
            Ok(aggregate) => {
                blob.push_str(&format!("{day},{aggregate}\n"));
                days_emitted += 1;
            }
            Err(e) => days_skipped.push((day.clone(), e)),
        }
    }

    CookedWorkload {
        blob,
        days_emitted,
        days_skipped,
    }
}

/// Render a workload to its blob
pub fn cook_workload(workload: &Workload) -> String {
    cook_workload_checked(workload).blob
}
