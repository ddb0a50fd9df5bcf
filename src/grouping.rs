// Grouping Store
// Accumulates parsed runs keyed by workload name, then by day. Every run is
// kept; nothing is deduplicated. Day buckets only come into existence when a
// run is recorded for them, so a day is never empty.

use crate::types::{DayKey, Measurement, WorkloadName};
use std::collections::{BTreeMap, HashMap};

/// All runs observed for one benchmark scenario, bucketed by day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workload {
    days: BTreeMap<DayKey, Vec<Measurement>>,
}

impl Workload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Days in ascending lexicographic order with their runs
    pub fn days(&self) -> impl Iterator<Item = (&DayKey, &[Measurement])> {
        self.days.iter().map(|(day, runs)| (day, runs.as_slice()))
    }

    pub fn day(&self, day: &str) -> Option<&[Measurement]> {
        self.days.get(day).map(Vec::as_slice)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn run_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    fn push(&mut self, day: DayKey, measurement: Measurement) {
        self.days.entry(day).or_default().push(measurement);
    }

    fn absorb(&mut self, other: Workload) {
        for (day, runs) in other.days {
            self.days.entry(day).or_default().extend(runs);
        }
    }
}

/// Process-scoped accumulator of every run, built during loading and consumed
/// once to produce the report
#[derive(Debug, Clone, Default)]
pub struct GroupingStore {
    workloads: HashMap<WorkloadName, Workload>,
}

impl GroupingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run to `workloads[workload].days[day]`, creating either level
    /// on first use
    pub fn record(&mut self, day: &DayKey, workload: WorkloadName, measurement: Measurement) {
        self.workloads
            .entry(workload)
            .or_default()
            .push(day.clone(), measurement);
    }

    /// Fold every run of `other` into this store
    ///
    /// Runs from `other` are appended after the runs already present for the
    /// same (workload, day).
    pub fn merge(&mut self, other: GroupingStore) {
        for (name, workload) in other.workloads {
            self.workloads.entry(name).or_default().absorb(workload);
        }
    }

    pub fn workload(&self, name: &str) -> Option<&Workload> {
        self.workloads.get(name)
    }

    /// Iterate workloads in no particular order
    pub fn workloads(&self) -> impl Iterator<Item = (&WorkloadName, &Workload)> {
        self.workloads.iter()
    }

    pub fn workload_count(&self) -> usize {
        self.workloads.len()
    }

    pub fn run_count(&self) -> usize {
        self.workloads.values().map(Workload::run_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DayKey {
        DayKey::new(s).unwrap()
    }

    fn name(s: &str) -> WorkloadName {
        WorkloadName::new(s).unwrap()
    }

    fn run(ops: f64) -> Measurement {
        Measurement::new(ops, 1, 2, 0.5, 1.5)
    }

    #[test]
    fn test_record_creates_workload_and_day() {
        let mut store = GroupingStore::new();
        assert!(store.is_empty());

        store.record(&day("2020-01-01"), name("X"), run(1.0));

        let workload = store.workload("X").expect("workload should exist");
        assert_eq!(workload.day_count(), 1);
        assert_eq!(workload.day("2020-01-01"), Some(&[run(1.0)][..]));
        assert!(workload.day("2020-01-02").is_none());
    }

    #[test]
    fn test_record_keeps_every_run() {
        let mut store = GroupingStore::new();
        let d = day("2020-01-01");
        store.record(&d, name("X"), run(1.0));
        store.record(&d, name("X"), run(1.0));
        store.record(&d, name("X"), run(2.0));

        assert_eq!(store.run_count(), 3);
        assert_eq!(store.workload("X").unwrap().day("2020-01-01").unwrap().len(), 3);
    }

    #[test]
    fn test_days_iterate_in_lexicographic_order() {
        let mut store = GroupingStore::new();
        store.record(&day("2020-01-02"), name("X"), run(2.0));
        store.record(&day("2020-01-01"), name("X"), run(1.0));

        let days: Vec<&str> = store
            .workload("X")
            .unwrap()
            .days()
            .map(|(d, _)| d.as_str())
            .collect();
        assert_eq!(days, vec!["2020-01-01", "2020-01-02"]);
    }

    #[test]
    fn test_workloads_are_independent() {
        let mut store = GroupingStore::new();
        store.record(&day("2020-01-01"), name("A"), run(1.0));
        store.record(&day("2020-01-02"), name("B"), run(2.0));

        assert_eq!(store.workload_count(), 2);
        assert!(store.workload("A").unwrap().day("2020-01-02").is_none());
        assert!(store.workload("B").unwrap().day("2020-01-01").is_none());
    }

    #[test]
    fn test_merge_appends_runs() {
        let mut left = GroupingStore::new();
        left.record(&day("2020-01-01"), name("X"), run(1.0));

        let mut right = GroupingStore::new();
        right.record(&day("2020-01-01"), name("X"), run(2.0));
        right.record(&day("2020-01-03"), name("Y"), run(3.0));

        left.merge(right);

        assert_eq!(left.workload_count(), 2);
        assert_eq!(
            left.workload("X").unwrap().day("2020-01-01"),
            Some(&[run(1.0), run(2.0)][..])
        );
        assert_eq!(left.run_count(), 3);
    }
}
