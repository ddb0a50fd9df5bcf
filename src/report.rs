//! Report assembly and serialization
//!
//! The report maps each workload name to its cooked blob. It is written as a
//! tab-indented JSON object that the chart renderer loads directly.

use crate::grouping::GroupingStore;
use crate::pure::cook::cook_workload_checked;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info};

/// Final artifact: workload name -> multi-line blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    workloads: BTreeMap<String, String>,
}

impl Report {
    pub fn get(&self, workload: &str) -> Option<&str> {
        self.workloads.get(workload).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.workloads
            .iter()
            .map(|(name, blob)| (name.as_str(), blob.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.workloads
    }

    /// Serialize as a JSON object indented with tabs
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .context("Failed to serialize report")?;
        String::from_utf8(buf).context("Serialized report is not valid UTF-8")
    }

    /// Serialize and write the report, replacing any existing file
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_pretty_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(
            path = %path.display(),
            workloads = self.len(),
            "Report written"
        );
        Ok(())
    }
}

/// Runs the cooker over every workload of a store
pub struct ReportBuilder;

impl ReportBuilder {
    /// Build the report from a fully loaded store
    ///
    /// Days whose aggregate fails are logged and left out of their blob; a
    /// workload whose every day failed still gets an (empty) entry.
    pub fn build(store: &GroupingStore) -> Report {
        let mut workloads = BTreeMap::new();

        for (name, workload) in store.workloads() {
            let cooked = cook_workload_checked(workload);
            for (day, e) in &cooked.days_skipped {
                error!(workload = %name, day = %day, error = %e, "Day dropped from report");
            }
            debug!(
                workload = %name,
                days = cooked.days_emitted,
                "Workload cooked"
            );
            workloads.insert(name.to_string(), cooked.blob);
        }

        Report { workloads }
    }
}

impl From<&GroupingStore> for Report {
    fn from(store: &GroupingStore) -> Self {
        ReportBuilder::build(store)
    }
}
