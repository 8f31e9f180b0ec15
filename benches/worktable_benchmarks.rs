use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;
use worktable::*;

fn dataset_rows(size: usize) -> Vec<HashMap<String, CellValue>> {
    (0..size)
        .map(|n| {
            let mut row = HashMap::new();
            row.insert("id".to_string(), CellValue::Number(n as f64));
            row.insert(
                "group".to_string(),
                CellValue::Text(format!("g{}", n % 7)),
            );
            row.insert(
                "score".to_string(),
                if n % 13 == 0 {
                    CellValue::Text("NA".to_string())
                } else {
                    CellValue::Number(((n * 37) % 1000) as f64)
                },
            );
            row
        })
        .collect()
}

fn loaded_engine(size: usize) -> Engine {
    let mut engine = Engine::default();
    engine.handle(Request::LoadFile {
        columns: vec!["id".to_string(), "group".to_string(), "score".to_string()],
        rows: dataset_rows(size),
    });
    engine
}

fn run(engine: &mut Engine, text: &str) {
    engine.handle(Request::RunCommand {
        text: text.to_string(),
        scope: QueryScope::Master,
    });
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    for size in [1_000, 10_000, 50_000].iter() {
        let rows = dataset_rows(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut engine = Engine::default();
                engine.handle(Request::LoadFile {
                    columns: vec![
                        "id".to_string(),
                        "group".to_string(),
                        "score".to_string(),
                    ],
                    rows: black_box(rows.clone()),
                });
                engine
            });
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for size in [1_000, 10_000, 50_000].iter() {
        let mut engine = loaded_engine(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| run(&mut engine, black_box("FILTER score > 500")));
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    for size in [1_000, 10_000, 50_000].iter() {
        let mut engine = loaded_engine(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| run(&mut engine, black_box("SORT score DESC")));
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");
    for size in [1_000, 10_000, 50_000].iter() {
        let mut engine = loaded_engine(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| run(&mut engine, black_box("STATS score")));
        });
    }
    group.finish();
}

fn bench_delete_undo_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_undo_cycle");
    for size in [1_000, 10_000].iter() {
        let mut engine = loaded_engine(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                engine.handle(Request::DeleteRow {
                    view_index: black_box(size / 2),
                });
                engine.handle(Request::Undo);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ingest,
    bench_filter,
    bench_sort,
    bench_stats,
    bench_delete_undo_cycle
);
criterion_main!(benches);
