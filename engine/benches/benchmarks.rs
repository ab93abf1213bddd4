//! Performance benchmarks for todo-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use todo_engine::{snapshot, Filter, Item, ItemStore, MemoryBackend};

fn populated(size: usize) -> (MemoryBackend, ItemStore) {
    let backend = MemoryBackend::new();
    let mut store = ItemStore::open(&backend, "todos");
    for i in 0..size {
        let item = store.add(format!("Task {}", i)).unwrap();
        if i % 3 == 0 {
            store.toggle(&item.id).unwrap();
        }
    }
    (backend, store)
}

fn bench_store_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_operations");

    group.bench_function("open_empty", |b| {
        let backend = MemoryBackend::new();
        b.iter(|| ItemStore::open(black_box(&backend), black_box("todos")))
    });

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("add", size), size, |b, &size| {
            let (_backend, mut store) = populated(size);
            b.iter(|| {
                let item = store.add(black_box("new task")).unwrap();
                store.remove(&item.id).unwrap();
            })
        });

        group.bench_with_input(BenchmarkId::new("toggle", size), size, |b, &size| {
            let (_backend, mut store) = populated(size);
            let id = store.items()[size / 2].id.clone();
            b.iter(|| store.toggle(black_box(&id)))
        });

        group.bench_with_input(BenchmarkId::new("reorder", size), size, |b, &size| {
            let (_backend, mut store) = populated(size);
            let id = store.items()[0].id.clone();
            b.iter(|| store.reorder(black_box(&id), black_box(size - 1)))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let (_backend, store) = populated(1000);
    let id = store.items()[500].id.clone();

    group.bench_function("get", |b| b.iter(|| store.get(black_box(&id))));

    for filter in [Filter::All, Filter::Active, Filter::Completed] {
        group.bench_function(format!("query_{}", filter), |b| {
            b.iter(|| store.query_by_filter(black_box(filter)))
        });
    }

    group.bench_function("has_all_completed", |b| b.iter(|| store.has_all_completed()));

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [100, 500, 1000].iter() {
        let items: Vec<Item> = (0..*size)
            .map(|i| Item::with_id(format!("todo-{}", i), format!("Task {}", i)))
            .collect();
        let raw = snapshot::encode(&items).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &items, |b, items| {
            b.iter(|| snapshot::encode(black_box(items)))
        });

        group.bench_with_input(BenchmarkId::new("load", size), &raw, |b, raw| {
            b.iter(|| snapshot::load("todos", black_box(Some(raw.as_str()))))
        });

        group.bench_with_input(BenchmarkId::new("reload", size), size, |b, &size| {
            let (backend, mut store) = populated(size);
            let raw = backend.raw("todos");
            b.iter(|| {
                if let Some(raw) = &raw {
                    backend.set_raw("todos", raw.clone());
                }
                store.sync_external()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store_operations, bench_queries, bench_snapshot);
criterion_main!(benches);
