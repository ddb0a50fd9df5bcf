//! Benchmark log discovery and loading
//!
//! Walks the input directory, derives each file's day from its first path
//! component below the root, decompresses the bzip2 stream and feeds every
//! line through the record parser into a [`GroupingStore`].
//!
//! Nothing here is fatal: unreadable files and malformed lines are logged
//! and skipped. Only writing the report can fail a run.

use crate::config::LoaderConfig;
use crate::grouping::GroupingStore;
use crate::observability::{log_operation, Operation, OperationContext, PerfTimer};
use crate::record_parser::{parse_line, LineOutcome, ParseError, BENCHMARK_MARKER, MAX_LINE_BYTES};
use crate::report::{Report, ReportBuilder};
use crate::types::DayKey;
use anyhow::Result;
use bzip2::read::MultiBzDecoder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Why a file contributed fewer runs than it contains
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Runs parsed before the failure are kept
    #[error("failed to read {} after {lines} lines: {source}", .path.display())]
    Read {
        path: PathBuf,
        lines: usize,
        #[source]
        source: io::Error,
    },
}

/// Counters for one loading pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Regular files found under the input directory
    pub files_seen: usize,
    pub files_loaded: usize,
    /// Files that could not be opened or were cut short by a read error
    pub files_failed: usize,
    /// Files whose day could not be derived
    pub files_ignored: usize,
    pub lines_read: usize,
    pub records_parsed: usize,
    /// Marked lines that did not parse
    pub lines_rejected: usize,
}

impl LoadStats {
    pub fn absorb(&mut self, other: LoadStats) {
        self.files_seen += other.files_seen;
        self.files_loaded += other.files_loaded;
        self.files_failed += other.files_failed;
        self.files_ignored += other.files_ignored;
        self.lines_read += other.lines_read;
        self.records_parsed += other.records_parsed;
        self.lines_rejected += other.lines_rejected;
    }
}

/// A log file and the day it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub day: DayKey,
}

/// Result of walking the input directory
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// In path order
    pub files: Vec<DiscoveredFile>,
    /// Regular files skipped because no day could be derived
    pub ignored: usize,
}

/// The day of `path`: its first component below `root`
///
/// Returns `None` when `path` is not under `root` or is `root` itself. A file
/// sitting directly in `root` is its own day; files nested deeper than the
/// day directory still belong to that day.
pub fn day_for_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    match relative.components().next()? {
        Component::Normal(day) => Some(day.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Find every regular file under `root` that has a usable day
pub fn discover_files(root: &Path) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let Some(day) = day_for_path(root, &path) else {
            debug!(path = %path.display(), "No day for path, ignoring file");
            discovery.ignored += 1;
            continue;
        };

        match DayKey::new(day) {
            Ok(day) => discovery.files.push(DiscoveredFile { path, day }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unusable day directory, ignoring file");
                discovery.ignored += 1;
            }
        }
    }

    discovery
}

/// Feed newline-delimited text into the store under `day`
///
/// `source` only labels diagnostics. Invalid UTF-8 is replaced rather than
/// rejected. Lines longer than [`MAX_LINE_BYTES`] are skipped without being
/// buffered whole; marked ones count as rejected. Counters in `stats` stay
/// accurate when a read error cuts the input short.
pub fn load_lines<R: BufRead>(
    mut reader: R,
    source: &Path,
    day: &DayKey,
    store: &mut GroupingStore,
    stats: &mut LoadStats,
) -> io::Result<()> {
    // Room for the longest accepted line plus its "\r\n"
    let limit = MAX_LINE_BYTES as u64 + 2;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.by_ref().take(limit).read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        stats.lines_read += 1;

        if line_too_long(&buf) {
            if !buf.ends_with(b"\n") {
                discard_rest_of_line(&mut reader)?;
            }
            if buf.starts_with(BENCHMARK_MARKER.as_bytes()) {
                stats.lines_rejected += 1;
                warn!(
                    path = %source.display(),
                    error = %ParseError::LineTooLong { limit: MAX_LINE_BYTES },
                    "Skipping over-long benchmark line"
                );
            }
            continue;
        }

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);

        match parse_line(line) {
            LineOutcome::Unmarked => {}
            LineOutcome::Malformed(e) => {
                stats.lines_rejected += 1;
                warn!(
                    path = %source.display(),
                    line = %line,
                    error = %e,
                    "Skipping malformed benchmark line"
                );
            }
            LineOutcome::Record {
                workload,
                measurement,
            } => {
                stats.records_parsed += 1;
                store.record(day, workload, measurement);
            }
        }
    }
}

fn line_too_long(buf: &[u8]) -> bool {
    let content = buf
        .strip_suffix(b"\n")
        .map(|rest| rest.strip_suffix(b"\r").unwrap_or(rest))
        .unwrap_or(buf);
    content.len() > MAX_LINE_BYTES
}

/// Consume input up to and including the next newline
fn discard_rest_of_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let (found, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Decompress one bzip2 log file into the store
pub fn load_file(
    path: &Path,
    day: &DayKey,
    store: &mut GroupingStore,
    stats: &mut LoadStats,
) -> Result<(), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let lines_before = stats.lines_read;
    let decoder = MultiBzDecoder::new(BufReader::new(file));
    load_lines(BufReader::new(decoder), path, day, store, stats).map_err(|source| {
        LoadError::Read {
            path: path.to_path_buf(),
            lines: stats.lines_read - lines_before,
            source,
        }
    })
}

/// Drives a full run: discover, load, build, write
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Discover and parse every log file into a fresh store
    pub fn load(&self) -> (GroupingStore, LoadStats) {
        let root = self.config.input_dir();
        let discovery = discover_files(root);

        let mut stats = LoadStats {
            files_seen: discovery.files.len() + discovery.ignored,
            files_ignored: discovery.ignored,
            ..LoadStats::default()
        };
        let mut store = GroupingStore::new();

        if self.config.parallel {
            // One shard per file, merged in discovery order
            let shards: Vec<(GroupingStore, LoadStats)> = discovery
                .files
                .par_iter()
                .map(|file| {
                    let mut shard = GroupingStore::new();
                    let mut shard_stats = LoadStats::default();
                    load_one(file, &mut shard, &mut shard_stats);
                    (shard, shard_stats)
                })
                .collect();

            for (shard, shard_stats) in shards {
                store.merge(shard);
                stats.absorb(shard_stats);
            }
        } else {
            for file in &discovery.files {
                load_one(file, &mut store, &mut stats);
            }
        }

        (store, stats)
    }

    /// Load everything and write the report
    ///
    /// Only serializing or writing the report is an error.
    pub fn run(&self) -> Result<LoadStats> {
        let ctx = OperationContext::new("benchdigest.run");
        let _timer = PerfTimer::new("benchdigest.run");
        log_operation(
            &ctx,
            &Operation::Startup {
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            &Ok(()),
        );

        let load_ctx = ctx.child("load");
        let (store, stats) = self.load();
        log_operation(
            &load_ctx,
            &Operation::Load {
                files_loaded: stats.files_loaded,
                records_parsed: stats.records_parsed,
                lines_rejected: stats.lines_rejected,
            },
            &Ok(()),
        );
        info!(
            input = %self.config.input_dir().display(),
            files_seen = stats.files_seen,
            files_loaded = stats.files_loaded,
            files_failed = stats.files_failed,
            files_ignored = stats.files_ignored,
            records = stats.records_parsed,
            rejected = stats.lines_rejected,
            "Benchmark logs loaded"
        );

        let build_ctx = ctx.child("build_report");
        let report = ReportBuilder::build(&store);
        log_operation(
            &build_ctx,
            &Operation::BuildReport {
                workloads: report.len(),
            },
            &Ok(()),
        );

        self.write(&ctx, &report)?;
        Ok(stats)
    }

    fn write(&self, parent: &OperationContext, report: &Report) -> Result<()> {
        let path = self.config.output_file();
        let mut write_ctx = parent.child("write_report");
        write_ctx.add_attribute("path", path.display().to_string());

        let result = report.write_to(path);
        log_operation(
            &write_ctx,
            &Operation::WriteReport {
                path: path.display().to_string(),
            },
            &result,
        );
        result
    }
}

fn load_one(file: &DiscoveredFile, store: &mut GroupingStore, stats: &mut LoadStats) {
    match load_file(&file.path, &file.day, store, stats) {
        Ok(()) => {
            stats.files_loaded += 1;
            debug!(path = %file.path.display(), day = %file.day, "Loaded benchmark log");
        }
        Err(e) => {
            stats.files_failed += 1;
            warn!(error = %e, "Skipping unreadable benchmark log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn day(s: &str) -> DayKey {
        DayKey::new(s).unwrap()
    }

    #[test]
    fn test_day_for_path_uses_first_component() {
        let root = Path::new("data");
        assert_eq!(
            day_for_path(root, Path::new("data/2020-01-01/run1.bz2")),
            Some("2020-01-01".to_string())
        );
        assert_eq!(
            day_for_path(root, Path::new("data/2020-01-01/nested/deeper/run.bz2")),
            Some("2020-01-01".to_string())
        );
    }

    #[test]
    fn test_day_for_path_root_level_file_is_its_own_day() {
        let root = Path::new("data");
        assert_eq!(
            day_for_path(root, Path::new("data/2020-01-05")),
            Some("2020-01-05".to_string())
        );
    }

    #[test]
    fn test_day_for_path_rejects_paths_outside_root() {
        let root = Path::new("data");
        assert_eq!(day_for_path(root, Path::new("data")), None);
        assert_eq!(day_for_path(root, Path::new("other/2020-01-01/run.bz2")), None);
    }

    #[test]
    fn test_load_lines_routes_outcomes() {
        let text = "goos: linux\n\
                    BenchmarkX 1 100.0 ops/sec 10 read 20 write 1.0 r-amp 2.0 w-amp\n\
                    BenchmarkFoo not-a-number ops/sec\n\
                    BenchmarkX 1 300.0 ops/sec 30 read 40 write 3.0 r-amp 4.0 w-amp\r\n\
                    PASS";
        let mut store = GroupingStore::new();
        let mut stats = LoadStats::default();

        load_lines(
            Cursor::new(text),
            Path::new("mem"),
            &day("2020-01-01"),
            &mut store,
            &mut stats,
        )
        .unwrap();

        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.records_parsed, 2);
        assert_eq!(stats.lines_rejected, 1);
        assert_eq!(store.workload_count(), 1);
        assert!(store.workload("Foo").is_none());
        assert_eq!(
            store.workload("X").unwrap().day("2020-01-01").unwrap().len(),
            2
        );
    }

    #[test]
    fn test_load_lines_tolerates_invalid_utf8() {
        let mut bytes = b"\xff\xfe garbage\n".to_vec();
        bytes.extend_from_slice(b"BenchmarkY 1 5.0 ops/sec 1 read 1 write 0.1 r-amp 0.2 w-amp\n");
        let mut store = GroupingStore::new();
        let mut stats = LoadStats::default();

        load_lines(
            Cursor::new(bytes),
            Path::new("mem"),
            &day("d"),
            &mut store,
            &mut stats,
        )
        .unwrap();

        assert_eq!(stats.records_parsed, 1);
        assert!(store.workload("Y").is_some());
    }

    #[test]
    fn test_load_lines_skips_over_long_lines() {
        let mut text = String::from("Benchmark");
        text.push_str(&"x".repeat(MAX_LINE_BYTES * 3));
        text.push('\n');
        text.push_str(&"y".repeat(MAX_LINE_BYTES + 1));
        text.push('\n');
        text.push_str("BenchmarkX 1 100.0 ops/sec 10 read 20 write 1.0 r-amp 2.0 w-amp\n");
        let mut store = GroupingStore::new();
        let mut stats = LoadStats::default();

        load_lines(
            Cursor::new(text),
            Path::new("mem"),
            &day("2020-01-01"),
            &mut store,
            &mut stats,
        )
        .unwrap();

        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.lines_rejected, 1);
        assert_eq!(stats.records_parsed, 1);
        assert!(store.workload("X").is_some());
    }

    #[test]
    fn test_line_at_the_limit_is_kept() {
        let exact = vec![b'a'; MAX_LINE_BYTES];
        let mut crlf = exact.clone();
        crlf.extend_from_slice(b"\r\n");
        assert!(!line_too_long(&exact));
        assert!(!line_too_long(&crlf));

        let mut over = exact;
        over.push(b'a');
        assert!(line_too_long(&over));
    }

    #[test]
    fn test_load_file_missing_is_open_error() {
        let mut store = GroupingStore::new();
        let mut stats = LoadStats::default();
        let err = load_file(
            Path::new("/definitely/not/here.bz2"),
            &day("d"),
            &mut store,
            &mut stats,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_stats_absorb() {
        let mut a = LoadStats {
            files_loaded: 1,
            records_parsed: 3,
            ..LoadStats::default()
        };
        a.absorb(LoadStats {
            files_loaded: 2,
            lines_rejected: 1,
            ..LoadStats::default()
        });
        assert_eq!(a.files_loaded, 3);
        assert_eq!(a.records_parsed, 3);
        assert_eq!(a.lines_rejected, 1);
    }
}
