// Aggregation benchmarks - line parsing and per-day cooking

use benchdigest::{aggregate_day, parse_line, GroupingStore, ReportBuilder, DayKey, Measurement, WorkloadName};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const LINE: &str = "BenchmarkYCSB/A/values=1024 1 48213.7 ops/sec 734003200 read 1258291200 write 1.42 r-amp 6.87 w-amp";

fn runs(count: usize) -> Vec<Measurement> {
    (0..count)
        .map(|i| {
            let jitter = (i % 7) as f64 * 13.0;
            Measurement::new(40_000.0 + jitter, 1 << 20, 1 << 21, 1.5, 4.0)
        })
        .collect()
}

fn bench_parse_line(c: &mut Criterion) {
    c.bench_function("parse_line", |b| b.iter(|| parse_line(black_box(LINE))));
    c.bench_function("parse_line_unmarked", |b| {
        b.iter(|| parse_line(black_box("ok  \tgithub.com/cockroachdb/pebble\t12.3s")))
    });
}

fn bench_aggregate_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_day");
    for size in [1, 10, 100, 1000] {
        let data = runs(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| aggregate_day(black_box(data)))
        });
    }
    group.finish();
}

fn bench_build_report(c: &mut Criterion) {
    let mut store = GroupingStore::new();
    for workload in 0..20 {
        let name = WorkloadName::new(format!("workload{workload}")).expect("valid name");
        for day in 0..365 {
            let key = DayKey::new(format!("day{day:04}")).expect("valid day");
            for run in runs(5) {
                store.record(&key, name.clone(), run);
            }
        }
    }

    c.bench_function("build_report_20x365", |b| {
        b.iter(|| ReportBuilder::build(black_box(&store)))
    });
}

criterion_group!(benches, bench_parse_line, bench_aggregate_day, bench_build_report);
criterion_main!(benches);
